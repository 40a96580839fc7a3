// Integer codes carried in the raw `i32` fields of positions and commands.
// Records store the raw value untouched; these enums are read-side views.

/// Trade direction. On the wire buy is `1` and sell is `-1`; any negative
/// value reads as sell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    #[inline]
    pub fn from_raw(raw: i32) -> Self {
        if raw < 0 { Side::Sell } else { Side::Buy }
    }

    #[inline]
    pub fn as_raw(self) -> i32 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

/// Whether a position is live in the market or still a pending order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PositionKind {
    Market,
    Pending,
}

impl PositionKind {
    #[inline]
    pub fn from_raw(raw: i32) -> Self {
        if raw == 1 {
            PositionKind::Pending
        } else {
            PositionKind::Market
        }
    }

    #[inline]
    pub fn as_raw(self) -> i32 {
        match self {
            PositionKind::Market => 0,
            PositionKind::Pending => 1,
        }
    }
}

/// Instruction sent from the controller to the terminal. Code `0` is
/// reserved for "no command" and never maps to a variant.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Open = 1,
    Close = 2,
    Modify = 3,
    Pause = 4,
    Resume = 5,
    HedgeAll = 6,
    CloseAll = 7,
    Freeze = 8,
}

impl CommandKind {
    pub fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            1 => CommandKind::Open,
            2 => CommandKind::Close,
            3 => CommandKind::Modify,
            4 => CommandKind::Pause,
            5 => CommandKind::Resume,
            6 => CommandKind::HedgeAll,
            7 => CommandKind::CloseAll,
            8 => CommandKind::Freeze,
            _ => return None,
        })
    }

    #[inline]
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}
