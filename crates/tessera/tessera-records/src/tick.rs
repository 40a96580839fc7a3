use crate::RecordKind;
use crate::codec::{Decoder, Encoder, Record};
use crate::text::Symbol;

/// Best bid/ask quote for one symbol, published by the terminal.
///
/// ```text
/// offset  size  field
///      0    16  symbol
///     16     8  bid      f64
///     24     8  ask      f64
///     32     8  time_ns  i64
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tick {
    pub symbol: Symbol,
    pub bid: f64,
    pub ask: f64,
    pub time_ns: i64,
}

impl Tick {
    pub fn new(symbol: &str, bid: f64, ask: f64, time_ns: i64) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            bid,
            ask,
            time_ns,
        }
    }

    #[inline]
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    #[inline]
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

impl Record for Tick {
    const KIND: RecordKind = RecordKind::Tick;
    const SIZE: usize = 40;

    fn encode(&self, out: &mut [u8]) {
        let mut enc = Encoder::new(&mut out[..Self::SIZE]);
        enc.text(&self.symbol);
        enc.f64(self.bid);
        enc.f64(self.ask);
        enc.i64(self.time_ns);
        debug_assert_eq!(enc.finish(), Self::SIZE);
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut dec = Decoder::new(&bytes[..Self::SIZE]);
        let tick = Tick {
            symbol: dec.text(),
            bid: dec.f64(),
            ask: dec.f64(),
            time_ns: dec.i64(),
        };
        debug_assert_eq!(dec.finish(), Self::SIZE);
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_offsets() {
        let tick = Tick::new("EURUSD", 1.0850, 1.0852, 1_700_000_000_000_000_000);
        let mut buf = [0u8; Tick::SIZE];
        tick.encode(&mut buf);

        assert_eq!(&buf[0..6], b"EURUSD");
        assert!(buf[6..16].iter().all(|&b| b == 0));
        assert_eq!(buf[16..24], 1.0850f64.to_le_bytes());
        assert_eq!(buf[24..32], 1.0852f64.to_le_bytes());
        assert_eq!(buf[32..40], 1_700_000_000_000_000_000i64.to_le_bytes());
    }

    #[test]
    fn decode_restores_every_field() {
        let tick = Tick::new("XAUUSD", 2345.10, 2345.45, 42);
        let mut buf = [0u8; Tick::SIZE];
        tick.encode(&mut buf);
        assert_eq!(Tick::decode(&buf), tick);
    }

    #[test]
    fn mid_and_spread() {
        let tick = Tick::new("X", 99.0, 101.0, 0);
        assert_eq!(tick.mid(), 100.0);
        assert_eq!(tick.spread(), 2.0);
    }
}
