//! Fixed-offset binary encoding shared by every record kind.
//!
//! Records never travel as in-memory structs: each kind writes its fields one
//! after the other, little-endian, with no padding. Two processes built by
//! different compilers therefore agree on the bytes as long as they agree on
//! the field order, which each record module pins down with layout tests.

use crate::RecordKind;
use crate::text::FixedStr;

/// Upper bound on `Record::SIZE` across all kinds, so callers can stage a
/// record in a stack buffer before copying it into a slot.
pub const MAX_RECORD_SIZE: usize = 128;

mod sealed {
    pub trait Sealed {}

    impl Sealed for crate::Tick {}
    impl Sealed for crate::Position {}
    impl Sealed for crate::Command {}
    impl Sealed for crate::Account {}
}

/// A fixed-size record that can live in a channel slot.
///
/// Sealed: a region sizes each slot array from `RecordKind::record_size`,
/// so only the four record types of this crate may travel in a channel.
///
/// ```compile_fail
/// use tessera_records::{Record, RecordKind};
///
/// #[derive(Clone, Copy)]
/// struct Wide([u8; 120]);
///
/// impl Record for Wide {
///     const KIND: RecordKind = RecordKind::Tick;
///     const SIZE: usize = 120;
///     fn encode(&self, out: &mut [u8]) {
///         out[..120].copy_from_slice(&self.0);
///     }
///     fn decode(bytes: &[u8]) -> Self {
///         Wide(bytes[..120].try_into().unwrap())
///     }
/// }
/// ```
pub trait Record: Copy + sealed::Sealed {
    /// Channel this record travels on.
    const KIND: RecordKind;

    /// Exact encoded size in bytes.
    const SIZE: usize;

    /// Write the record into the first `SIZE` bytes of `out`.
    ///
    /// # Panics
    /// Panics if `out` is shorter than `SIZE`.
    fn encode(&self, out: &mut [u8]);

    /// Read a record from the first `SIZE` bytes of `bytes`.
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than `SIZE`.
    fn decode(bytes: &[u8]) -> Self;
}

/// Sequential little-endian writer over a slot buffer.
pub(crate) struct Encoder<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Encoder<'a> {
    #[inline]
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn put<const N: usize>(&mut self, bytes: [u8; N]) {
        self.buf[self.pos..self.pos + N].copy_from_slice(&bytes);
        self.pos += N;
    }

    #[inline]
    pub(crate) fn i32(&mut self, v: i32) {
        self.put(v.to_le_bytes());
    }

    #[inline]
    pub(crate) fn i64(&mut self, v: i64) {
        self.put(v.to_le_bytes());
    }

    #[inline]
    pub(crate) fn f64(&mut self, v: f64) {
        self.put(v.to_le_bytes());
    }

    #[inline]
    pub(crate) fn text<const N: usize>(&mut self, v: &FixedStr<N>) {
        self.put(*v.as_raw());
    }

    /// Bytes written so far.
    #[inline]
    pub(crate) fn finish(self) -> usize {
        self.pos
    }
}

/// Sequential little-endian reader over a slot buffer.
pub(crate) struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    #[inline]
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    #[inline]
    pub(crate) fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }

    #[inline]
    pub(crate) fn i64(&mut self) -> i64 {
        i64::from_le_bytes(self.take())
    }

    #[inline]
    pub(crate) fn f64(&mut self) -> f64 {
        f64::from_le_bytes(self.take())
    }

    #[inline]
    pub(crate) fn text<const N: usize>(&mut self) -> FixedStr<N> {
        FixedStr::from_raw(self.take())
    }

    #[inline]
    pub(crate) fn finish(self) -> usize {
        self.pos
    }
}
