use crate::RecordKind;
use crate::codec::{Decoder, Encoder, Record};
use crate::codes::{PositionKind, Side};
use crate::text::{AccountId, Symbol};

/// Snapshot of an open position or pending order, published by the terminal.
/// A later change to the same position arrives as a new record with the same id.
///
/// ```text
/// offset  size  field
///      0     8  id           i64
///      8    16  symbol
///     24     4  side         i32
///     28     4  order_type   i32
///     32     8  volume       f64
///     40     8  price        f64
///     48     8  time_ns      i64
///     56     4  strategy_id  i32
///     60    16  account
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub id: i64,
    pub symbol: Symbol,
    pub side: i32,
    pub order_type: i32,
    pub volume: f64,
    pub price: f64,
    pub time_ns: i64,
    pub strategy_id: i32,
    pub account: AccountId,
}

impl Position {
    #[inline]
    pub fn direction(&self) -> Side {
        Side::from_raw(self.side)
    }

    #[inline]
    pub fn kind(&self) -> PositionKind {
        PositionKind::from_raw(self.order_type)
    }
}

impl Record for Position {
    const KIND: RecordKind = RecordKind::Position;
    const SIZE: usize = 76;

    fn encode(&self, out: &mut [u8]) {
        let mut enc = Encoder::new(&mut out[..Self::SIZE]);
        enc.i64(self.id);
        enc.text(&self.symbol);
        enc.i32(self.side);
        enc.i32(self.order_type);
        enc.f64(self.volume);
        enc.f64(self.price);
        enc.i64(self.time_ns);
        enc.i32(self.strategy_id);
        enc.text(&self.account);
        debug_assert_eq!(enc.finish(), Self::SIZE);
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut dec = Decoder::new(&bytes[..Self::SIZE]);
        let position = Position {
            id: dec.i64(),
            symbol: dec.text(),
            side: dec.i32(),
            order_type: dec.i32(),
            volume: dec.f64(),
            price: dec.f64(),
            time_ns: dec.i64(),
            strategy_id: dec.i32(),
            account: dec.text(),
        };
        debug_assert_eq!(dec.finish(), Self::SIZE);
        position
    }
}
