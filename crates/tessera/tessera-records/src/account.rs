use crate::RecordKind;
use crate::codec::{Decoder, Encoder, Record};
use crate::text::AccountId;

/// Balance snapshot for one trading account, published by the terminal.
///
/// ```text
/// offset  size  field
///      0    16  account
///     16     8  balance  f64
///     24     8  equity   f64
///     32     8  margin   f64
///     40     8  time_ns  i64
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Account {
    pub account: AccountId,
    pub balance: f64,
    pub equity: f64,
    pub margin: f64,
    pub time_ns: i64,
}

impl Account {
    #[inline]
    pub fn free_margin(&self) -> f64 {
        self.equity - self.margin
    }
}

impl Record for Account {
    const KIND: RecordKind = RecordKind::Account;
    const SIZE: usize = 48;

    fn encode(&self, out: &mut [u8]) {
        let mut enc = Encoder::new(&mut out[..Self::SIZE]);
        enc.text(&self.account);
        enc.f64(self.balance);
        enc.f64(self.equity);
        enc.f64(self.margin);
        enc.i64(self.time_ns);
        debug_assert_eq!(enc.finish(), Self::SIZE);
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut dec = Decoder::new(&bytes[..Self::SIZE]);
        let account = Account {
            account: dec.text(),
            balance: dec.f64(),
            equity: dec.f64(),
            margin: dec.f64(),
            time_ns: dec.i64(),
        };
        debug_assert_eq!(dec.finish(), Self::SIZE);
        account
    }
}
