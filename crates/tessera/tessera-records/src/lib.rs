#![forbid(unsafe_code)]

pub mod account;
pub mod codec;
pub mod codes;
pub mod command;
pub mod position;
pub mod text;
pub mod tick;
pub mod time;

pub use account::Account;
pub use codec::{MAX_RECORD_SIZE, Record};
pub use codes::{CommandKind, PositionKind, Side};
pub use command::Command;
pub use position::Position;
pub use text::{AccountId, FixedStr, Reason, Symbol};
pub use tick::Tick;
pub use time::now_ns;

use std::fmt;

// The four record streams carried by a region. The discriminant is the
// channel's position in the region layout, so the order here is part of
// the wire contract between the two processes.

/// Identifies one of the four channels and the record type it carries.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Tick = 0,
    Position = 1,
    Command = 2,
    Account = 3,
}

impl RecordKind {
    /// All kinds in layout order.
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Tick,
        RecordKind::Position,
        RecordKind::Command,
        RecordKind::Account,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Encoded size of one record of this kind, in bytes.
    pub const fn record_size(self) -> usize {
        match self {
            RecordKind::Tick => Tick::SIZE,
            RecordKind::Position => Position::SIZE,
            RecordKind::Command => Command::SIZE,
            RecordKind::Account => Account::SIZE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RecordKind::Tick => "tick",
            RecordKind::Position => "position",
            RecordKind::Command => "command",
            RecordKind::Account => "account",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
