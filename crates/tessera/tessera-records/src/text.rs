use std::borrow::Cow;
use std::fmt;

/// Width of symbol fields.
pub const SYMBOL_LEN: usize = 16;
/// Width of account identifier fields.
pub const ACCOUNT_LEN: usize = 16;
/// Width of the command reason field.
pub const REASON_LEN: usize = 32;

pub type Symbol = FixedStr<SYMBOL_LEN>;
pub type AccountId = FixedStr<ACCOUNT_LEN>;
pub type Reason = FixedStr<REASON_LEN>;

/// Fixed-capacity text stored as `N` bytes, NUL-padded on the right.
///
/// The raw bytes are kept verbatim so a record read from the other process
/// re-encodes to exactly the same bytes, even when that process wrote
/// something that is not valid UTF-8.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedStr<const N: usize>([u8; N]);

impl<const N: usize> FixedStr<N> {
    pub const fn empty() -> Self {
        Self([0u8; N])
    }

    /// Copy `s` in, cutting it at the last char boundary that fits in `N` bytes.
    pub fn new(s: &str) -> Self {
        let mut end = s.len().min(N);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        let mut raw = [0u8; N];
        raw[..end].copy_from_slice(&s.as_bytes()[..end]);
        Self(raw)
    }

    #[inline]
    pub const fn from_raw(raw: [u8; N]) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(&self) -> &[u8; N] {
        &self.0
    }

    /// Text bytes up to, not including, the first NUL.
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(N);
        &self.0[..end]
    }

    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> From<&str> for FixedStr<N> {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<const N: usize> PartialEq<&str> for FixedStr<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_with_nul() {
        let s = Symbol::new("EURUSD");
        assert_eq!(&s.as_raw()[..6], b"EURUSD");
        assert!(s.as_raw()[6..].iter().all(|&b| b == 0));
        assert_eq!(s, "EURUSD");
        assert_eq!(s.to_string(), "EURUSD");
    }

    #[test]
    fn truncates_to_capacity() {
        let s = FixedStr::<4>::new("ABCDEFG");
        assert_eq!(s.as_raw(), b"ABCD");
        assert_eq!(s.as_bytes(), b"ABCD");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 'é' is two bytes; it does not fit after "abc" in four bytes
        let s = FixedStr::<4>::new("abcé");
        assert_eq!(s.as_bytes(), b"abc");
        assert_eq!(s.to_str_lossy(), "abc");
    }

    #[test]
    fn foreign_bytes_survive_verbatim() {
        let raw = [b'X', 0xFF, 0, 0x41];
        let s = FixedStr::<4>::from_raw(raw);
        assert_eq!(s.as_raw(), &raw);
        assert_eq!(s.as_bytes(), &[b'X', 0xFF]);
        assert_eq!(s.to_str_lossy(), "X\u{FFFD}");
    }

    #[test]
    fn empty_text() {
        assert!(Reason::empty().is_empty());
        assert!(Reason::new("").is_empty());
        assert!(!Reason::new("grid").is_empty());
        assert_eq!(AccountId::default().to_string(), "");
    }
}
