//! Single-producer, single-consumer (SPSC) channel over a slot array in the region.
//!
//! # Protocol
//!
//! **Producer (`try_send`):**
//! 1. Load `consumed` with Acquire; if `produced - consumed >= capacity`, fail
//! 2. Encode the record into slot `produced % capacity`
//! 3. Store `produced + 1` with Release → publishes the slot
//!
//! **Consumer (`try_receive`):**
//! 1. Load `produced` with Acquire; if it equals `consumed`, the channel is empty
//! 2. Copy slot `consumed % capacity` out and decode it
//! 3. Store `consumed + 1` with Release → hands the slot back to the producer
//!
//! The Release store of each counter pairs with the Acquire load of it on the
//! other side, so a consumer never sees a counter advance before the slot
//! bytes behind it, and a producer never reuses a slot before the consumer
//! has finished copying it out. A reader therefore sees either the previous
//! record or the complete new one, never a torn record.
//!
//! # Thread Safety
//! One producer and one consumer per channel, across both processes. The
//! counters are plain stores, not read-modify-write, so two producers on the
//! same channel would lose records.

use crate::error::RegionError;
use crate::layout::ChannelCounters;
use crate::ring::{in_flight, is_full, seq_to_index};
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::sync::atomic::Ordering;
use tessera_records::{MAX_RECORD_SIZE, Record};

/// A typed view of one channel in a mapped region.
///
/// Borrowed from a `Region`, so it cannot outlive the mapping.
pub struct Channel<'r, T: Record> {
    counters: &'r ChannelCounters,
    /// First slot of this channel's array.
    slots: NonNull<u8>,
    capacity: u32,
    _pd: PhantomData<(&'r [u8], T)>,
}

impl<'r, T: Record> Channel<'r, T> {
    /// Evaluated per `T` at monomorphization: a record must fill exactly the
    /// slot the layout reserved for its kind and fit the staging buffer.
    const SLOT_FITS: () = assert!(
        T::SIZE == T::KIND.record_size() && T::SIZE <= MAX_RECORD_SIZE,
        "record size does not match its channel's slot size"
    );

    /// # Safety
    /// `slots` must point to `capacity * T::SIZE` bytes that stay mapped for `'r`
    /// and are used by no other channel.
    #[inline]
    pub(crate) unsafe fn new(
        counters: &'r ChannelCounters,
        slots: NonNull<u8>,
        capacity: u32,
    ) -> Self {
        let () = Self::SLOT_FITS;
        Self {
            counters,
            slots,
            capacity,
            _pd: PhantomData,
        }
    }

    #[inline(always)]
    fn slot_ptr(&self, idx: usize) -> *mut u8 {
        debug_assert!(idx < self.capacity as usize);
        // SAFETY: idx < capacity, and the array holds capacity slots of T::SIZE
        unsafe { self.slots.as_ptr().add(idx * T::SIZE) }
    }

    /// Publishes `record` if a slot is free.
    ///
    /// Returns `false` without touching the region when the channel is full;
    /// the caller decides whether to retry or drop.
    #[inline]
    pub fn try_send(&self, record: &T) -> bool {
        // Only this side stores `produced`, so Relaxed reads back our own value
        let produced = self.counters.produced.load(Ordering::Relaxed);
        let consumed = self.counters.consumed.load(Ordering::Acquire);
        if is_full(produced, consumed, self.capacity) {
            return false;
        }

        let mut staged = [0u8; MAX_RECORD_SIZE];
        record.encode(&mut staged);
        let idx = seq_to_index(produced, self.capacity);
        // SAFETY: the slot is not readable by the consumer until `produced` moves past it
        unsafe { ptr::copy_nonoverlapping(staged.as_ptr(), self.slot_ptr(idx), T::SIZE) };

        self.counters
            .produced
            .store(produced.wrapping_add(1), Ordering::Release);
        true
    }

    /// Like `try_send`, but reports a full channel as `ChannelFull`.
    #[inline]
    pub fn send(&self, record: &T) -> Result<(), RegionError> {
        if self.try_send(record) {
            Ok(())
        } else {
            Err(RegionError::ChannelFull(T::KIND))
        }
    }

    /// Takes the oldest unread record, or `None` if the channel is empty.
    #[inline]
    pub fn try_receive(&self) -> Option<T> {
        let consumed = self.counters.consumed.load(Ordering::Relaxed);
        let produced = self.counters.produced.load(Ordering::Acquire);
        if produced == consumed {
            return None;
        }

        let mut staged = [0u8; MAX_RECORD_SIZE];
        let idx = seq_to_index(consumed, self.capacity);
        // SAFETY: the producer does not reuse the slot until `consumed` moves past it
        unsafe { ptr::copy_nonoverlapping(self.slot_ptr(idx), staged.as_mut_ptr(), T::SIZE) };
        let record = T::decode(&staged);

        self.counters
            .consumed
            .store(consumed.wrapping_add(1), Ordering::Release);
        Some(record)
    }

    /// Receives up to `max` records in order.
    pub fn drain(&self, max: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(max.min(self.len()));
        while out.len() < max {
            match self.try_receive() {
                Some(record) => out.push(record),
                None => break,
            }
        }
        out
    }

    /// Records published but not yet received. A snapshot: the other side may
    /// change it at any moment.
    pub fn len(&self) -> usize {
        // consumed first: it can only trail produced, never pass it
        let consumed = self.consumed();
        in_flight(self.produced(), consumed) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.produced() == self.consumed()
    }

    pub fn is_full(&self) -> bool {
        let consumed = self.consumed();
        is_full(self.produced(), consumed, self.capacity)
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Total records ever published on this channel.
    pub fn produced(&self) -> u64 {
        self.counters.produced.load(Ordering::Acquire)
    }

    /// Total records ever received from this channel.
    pub fn consumed(&self) -> u64 {
        self.counters.consumed.load(Ordering::Acquire)
    }
}
