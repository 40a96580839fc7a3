//! Shared memory layout of a region.
//!
//! This module defines the binary layout of the mapped region: the header
//! at offset 0 and the four slot arrays that follow it. Both attaching
//! processes compute the same offsets from the capacities stored in the
//! header, so the layout is stable across process restarts.
//!
//! # Memory Layout
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     RegionHeader (96 B)                        │
//! │  ┌─────────┬──────────────────┬──────────┬──────────────────┐  │
//! │  │ version │ capacities ×4    │ reserved │ counters ×4      │  │
//! │  │ (4B)    │ (4B each)        │ (4B)     │ produced/consumed│  │
//! │  │         │                  │          │ (8B+8B atomic)   │  │
//! │  └─────────┴──────────────────┴──────────┴──────────────────┘  │
//! │  heartbeat (8B atomic)                                         │
//! ├────────────────────────────────────────────────────────────────┤
//! │  Tick slots      [tick capacity × 40 B]                        │
//! ├────────────────────────────────────────────────────────────────┤
//! │  Position slots  [position capacity × 76 B]                    │
//! ├────────────────────────────────────────────────────────────────┤
//! │  Command slots   [command capacity × 124 B]                    │
//! ├────────────────────────────────────────────────────────────────┤
//! │  Account slots   [account capacity × 48 B]                     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every header field is an atomic at its natural alignment, so the header
//! is only valid at an 8-byte aligned address. Mappings start on a page
//! boundary, which satisfies that.

use crate::error::RegionError;
use std::mem::{offset_of, size_of};
use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU64, Ordering};
use tessera_records::RecordKind;

/// Current region format version.
///
/// Increment this when making incompatible changes to the layout or to any
/// record encoding. An attacher that finds a different value wipes the
/// region and starts over.
pub const REGION_VERSION: u32 = 4;

/// Size of `RegionHeader` in bytes; the first slot array starts here.
pub const HEADER_SIZE: usize = 96;

pub const VERSION_OFFSET: usize = 0;
pub const CAPACITIES_OFFSET: usize = 4;
pub const COUNTERS_OFFSET: usize = 24;
pub const HEARTBEAT_OFFSET: usize = 88;

/// Byte offset of the `produced` counter of `kind`. `consumed` follows it.
pub const fn produced_offset(kind: RecordKind) -> usize {
    COUNTERS_OFFSET + kind as usize * size_of::<ChannelCounters>()
}

/// Producer and consumer sequence counters of one channel.
///
/// Each is a running total that only its owner advances: the producing
/// process stores `produced`, the consuming process stores `consumed`.
#[repr(C)]
pub struct ChannelCounters {
    pub produced: AtomicU64,
    pub consumed: AtomicU64,
}

/// Header structure at the start of every region.
///
/// # Representation
/// Uses `#[repr(C)]` with explicit offsets checked at compile time below,
/// which is critical for cross-process memory-mapped access.
#[repr(C)]
pub struct RegionHeader {
    /// Format version. Must equal `REGION_VERSION`; anything else triggers a reset.
    pub version: AtomicU32,

    /// Slots per channel, in `RecordKind` order. Written once at reset.
    pub capacities: [AtomicU32; 4],

    _reserved: AtomicU32,

    /// Sequence counters per channel, in `RecordKind` order.
    pub counters: [ChannelCounters; 4],

    /// Last liveness timestamp, nanoseconds since the epoch.
    pub heartbeat: AtomicI64,
}

const _: () = {
    assert!(size_of::<RegionHeader>() == HEADER_SIZE);
    assert!(offset_of!(RegionHeader, version) == VERSION_OFFSET);
    assert!(offset_of!(RegionHeader, capacities) == CAPACITIES_OFFSET);
    assert!(offset_of!(RegionHeader, counters) == COUNTERS_OFFSET);
    assert!(offset_of!(RegionHeader, heartbeat) == HEARTBEAT_OFFSET);
};

impl RegionHeader {
    #[inline]
    pub fn counters(&self, kind: RecordKind) -> &ChannelCounters {
        &self.counters[kind.index()]
    }

    pub fn stored_capacities(&self) -> Capacities {
        let cap = |kind: RecordKind| self.capacities[kind.index()].load(Ordering::Relaxed);
        Capacities {
            tick: cap(RecordKind::Tick),
            position: cap(RecordKind::Position),
            command: cap(RecordKind::Command),
            account: cap(RecordKind::Account),
        }
    }

    /// Stamp a zeroed header with `capacities` and publish it by writing
    /// the version last.
    pub fn initialize(&self, capacities: Capacities) {
        for kind in RecordKind::ALL {
            self.capacities[kind.index()].store(capacities.get(kind), Ordering::Relaxed);
        }
        self.version.store(REGION_VERSION, Ordering::Release);
    }
}

/// Slots per channel. Fixed when the region is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capacities {
    pub tick: u32,
    pub position: u32,
    pub command: u32,
    pub account: u32,
}

impl Capacities {
    pub fn new(tick: u32, position: u32, command: u32, account: u32) -> Self {
        Self {
            tick,
            position,
            command,
            account,
        }
    }

    #[inline]
    pub fn get(&self, kind: RecordKind) -> u32 {
        match kind {
            RecordKind::Tick => self.tick,
            RecordKind::Position => self.position,
            RecordKind::Command => self.command,
            RecordKind::Account => self.account,
        }
    }
}

/// Byte offsets of the four slot arrays for a given set of capacities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionLayout {
    capacities: Capacities,
    offsets: [usize; 4],
    total_size: usize,
}

impl RegionLayout {
    /// Lay out the slot arrays after the header in `RecordKind` order.
    ///
    /// # Errors
    /// `InvalidCapacity` if a capacity is zero or the region size would
    /// overflow `usize`.
    pub fn new(capacities: Capacities) -> Result<Self, RegionError> {
        let mut offsets = [0usize; 4];
        let mut cursor = HEADER_SIZE;

        for kind in RecordKind::ALL {
            let cap = capacities.get(kind);
            if cap == 0 {
                return Err(RegionError::InvalidCapacity(kind));
            }
            offsets[kind.index()] = cursor;
            cursor = (cap as usize)
                .checked_mul(kind.record_size())
                .and_then(|bytes| cursor.checked_add(bytes))
                .ok_or(RegionError::InvalidCapacity(kind))?;
        }

        Ok(Self {
            capacities,
            offsets,
            total_size: cursor,
        })
    }

    #[inline]
    pub fn capacities(&self) -> Capacities {
        self.capacities
    }

    /// Offset of the first slot of `kind` from the start of the region.
    #[inline]
    pub fn offset(&self, kind: RecordKind) -> usize {
        self.offsets[kind.index()]
    }

    /// Bytes needed for the header plus every slot array.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.total_size
    }
}
