use crate::RecordKind;
use crate::codec::{Decoder, Encoder, Record};
use crate::codes::{CommandKind, Side};
use crate::text::{AccountId, Reason, Symbol};

/// Instruction from the controller to the terminal, consumed exactly once.
///
/// ```text
/// offset  size  field
///      0     4  command_type  i32
///      4    16  symbol
///     20     4  side          i32
///     24     8  volume        f64
///     32     8  price         f64
///     40     8  take_profit   f64
///     48     8  stop_loss     f64
///     56     8  ticket        i64
///     64     4  strategy_id   i32
///     68    16  account
///     84    32  reason
///    116     8  time_ns       i64
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Command {
    pub command_type: i32,
    pub symbol: Symbol,
    pub side: i32,
    pub volume: f64,
    pub price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub ticket: i64,
    pub strategy_id: i32,
    pub account: AccountId,
    pub reason: Reason,
    pub time_ns: i64,
}

impl Command {
    /// A command of `kind` for `symbol` with every other field zeroed.
    pub fn new(kind: CommandKind, symbol: &str) -> Self {
        Self {
            command_type: kind.as_raw(),
            symbol: Symbol::new(symbol),
            ..Self::default()
        }
    }

    /// `None` when the terminal received a code it does not know.
    #[inline]
    pub fn kind(&self) -> Option<CommandKind> {
        CommandKind::from_raw(self.command_type)
    }

    #[inline]
    pub fn direction(&self) -> Side {
        Side::from_raw(self.side)
    }
}

impl Record for Command {
    const KIND: RecordKind = RecordKind::Command;
    const SIZE: usize = 124;

    fn encode(&self, out: &mut [u8]) {
        let mut enc = Encoder::new(&mut out[..Self::SIZE]);
        enc.i32(self.command_type);
        enc.text(&self.symbol);
        enc.i32(self.side);
        enc.f64(self.volume);
        enc.f64(self.price);
        enc.f64(self.take_profit);
        enc.f64(self.stop_loss);
        enc.i64(self.ticket);
        enc.i32(self.strategy_id);
        enc.text(&self.account);
        enc.text(&self.reason);
        enc.i64(self.time_ns);
        debug_assert_eq!(enc.finish(), Self::SIZE);
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut dec = Decoder::new(&bytes[..Self::SIZE]);
        let command = Command {
            command_type: dec.i32(),
            symbol: dec.text(),
            side: dec.i32(),
            volume: dec.f64(),
            price: dec.f64(),
            take_profit: dec.f64(),
            stop_loss: dec.f64(),
            ticket: dec.i64(),
            strategy_id: dec.i32(),
            account: dec.text(),
            reason: dec.text(),
            time_ns: dec.i64(),
        };
        debug_assert_eq!(dec.finish(), Self::SIZE);
        command
    }
}
