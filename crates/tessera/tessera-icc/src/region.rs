//! Lifecycle of a shared region: create-or-attach, first-writer reset, close.
//!
//! # Design
//! - The first process to attach after a version mismatch wipes the whole
//!   mapping and stamps the header with its capacities.
//! - Later attaches with the same version reuse the header and every counter,
//!   so a restarted process resumes where the counters left off.
//! - Attaching with capacities that differ from the stored ones fails with
//!   `LayoutMismatch` instead of silently adopting the stored layout.
//!
//! The reset is not synchronized against a concurrent attacher: the creating
//! side is expected to attach first and alone.

use crate::channel::Channel;
use crate::error::RegionError;
use crate::layout::{Capacities, HEADER_SIZE, REGION_VERSION, RegionHeader, RegionLayout};
use std::io;
use std::mem::align_of;
use std::path::Path;
use std::ptr::{self, NonNull};
use std::sync::atomic::Ordering;
use tessera_mmap::{SharedMapping, default_shm_dir, region_path};
use tessera_records::{Account, Command, Position, Record, Tick};
use tracing::{debug, info, warn};

const ANONYMOUS: &str = "<anonymous>";

/// A mapped region holding the header and the four channels.
///
/// The mapping stays alive as long as this value; dropping it (or calling
/// `close`) unmaps it. Other processes keep their own mappings.
pub struct Region {
    /// Owns the mmap lifetime; accessed through `base` after attach.
    mapping: SharedMapping,
    /// Start of the mapped region (header location).
    base: NonNull<u8>,
    /// Layout derived from the stored capacities, validated against the
    /// mapped extent at attach time.
    layout: RegionLayout,
    name: String,
    size: usize,
}

// SAFETY: the region is plain shared memory plus an owned mapping; nothing
// is tied to the thread that mapped it. `Region` is deliberately not `Sync`:
// one thread per handle keeps each side single-producer/single-consumer.
unsafe impl Send for Region {}

impl Region {
    /// Creates or attaches the region `name` in the default shm directory.
    pub fn open_or_create(name: &str, capacities: Capacities) -> Result<Self, RegionError> {
        Self::open_or_create_in(&default_shm_dir(), name, capacities)
    }

    /// Creates or attaches the region `name` backed by a file in `dir`.
    ///
    /// # Errors
    /// - `InvalidCapacity` if a capacity is zero or the layout overflows
    /// - `MappingFailed` if the name is invalid or the file cannot be mapped
    /// - `LayoutMismatch` if the region exists with different capacities
    pub fn open_or_create_in(
        dir: &Path,
        name: &str,
        capacities: Capacities,
    ) -> Result<Self, RegionError> {
        let requested = RegionLayout::new(capacities)?;
        let mapping_failed = |source| RegionError::MappingFailed {
            name: name.to_string(),
            source,
        };

        let path = region_path(dir, name).map_err(mapping_failed)?;
        let mapping = SharedMapping::open_or_create(&path, requested.total_size() as u64)
            .map_err(mapping_failed)?;
        Self::attach(mapping, name.to_string(), requested)
    }

    /// A region in private anonymous memory, for tests and single-process use.
    pub fn in_memory(capacities: Capacities) -> Result<Self, RegionError> {
        let requested = RegionLayout::new(capacities)?;
        let mapping = SharedMapping::anonymous(requested.total_size()).map_err(|source| {
            RegionError::MappingFailed {
                name: ANONYMOUS.to_string(),
                source,
            }
        })?;
        Self::attach(mapping, ANONYMOUS.to_string(), requested)
    }

    fn attach(
        mut mapping: SharedMapping,
        name: String,
        requested: RegionLayout,
    ) -> Result<Self, RegionError> {
        let size = mapping.len();
        if size < HEADER_SIZE {
            return Err(RegionError::ExtentTooSmall {
                required: requested.total_size(),
                actual: size,
            });
        }

        let base = NonNull::new(mapping.as_mut_ptr())
            .filter(|p| p.as_ptr().align_offset(align_of::<RegionHeader>()) == 0)
            .ok_or_else(|| RegionError::MappingFailed {
                name: name.clone(),
                source: io::Error::other("mapping is not aligned for the region header"),
            })?;

        // SAFETY: base is aligned and at least HEADER_SIZE bytes are mapped
        let found = unsafe {
            (*base.as_ptr().cast::<RegionHeader>())
                .version
                .load(Ordering::Acquire)
        };

        if found != REGION_VERSION {
            if found != 0 {
                warn!(
                    region = %name,
                    found,
                    expected = REGION_VERSION,
                    "region version mismatch, resetting"
                );
            }
            // SAFETY: the whole extent is mapped and writable
            unsafe { ptr::write_bytes(base.as_ptr(), 0, size) };
            header_at(base).initialize(requested.capacities());
            info!(
                region = %name,
                bytes = size,
                capacities = ?requested.capacities(),
                "initialized region"
            );
        } else {
            let stored = header_at(base).stored_capacities();
            if stored != requested.capacities() {
                warn!(
                    region = %name,
                    requested = ?requested.capacities(),
                    stored = ?stored,
                    "region layout mismatch"
                );
                return Err(RegionError::LayoutMismatch {
                    requested: requested.capacities(),
                    stored,
                });
            }
            debug!(region = %name, bytes = size, "attached existing region");
        }

        // Channel views are always derived from what the header stores
        let layout = RegionLayout::new(header_at(base).stored_capacities())?;
        if layout.total_size() > size {
            return Err(RegionError::ExtentTooSmall {
                required: layout.total_size(),
                actual: size,
            });
        }

        Ok(Self {
            mapping,
            base,
            layout,
            name,
            size,
        })
    }

    #[inline(always)]
    fn header(&self) -> &RegionHeader {
        header_at(self.base)
    }

    /// A typed view of the channel that carries `T`.
    ///
    /// `Record` is sealed to the four record types, and `Channel::new`
    /// rejects at compile time any `T` whose size differs from its kind's slot.
    #[inline]
    pub fn channel<T: Record>(&self) -> Channel<'_, T> {
        let kind = T::KIND;
        // SAFETY: attach checked that every slot array lies inside the mapping,
        // each kind owns a disjoint array of `record_size(kind)` byte slots,
        // and T::SIZE == record_size(kind)
        unsafe {
            Channel::new(
                self.header().counters(kind),
                self.base.add(self.layout.offset(kind)),
                self.layout.capacities().get(kind),
            )
        }
    }

    pub fn ticks(&self) -> Channel<'_, Tick> {
        self.channel()
    }

    pub fn positions(&self) -> Channel<'_, Position> {
        self.channel()
    }

    pub fn commands(&self) -> Channel<'_, Command> {
        self.channel()
    }

    pub fn accounts(&self) -> Channel<'_, Account> {
        self.channel()
    }

    /// Stores a liveness timestamp. Last write wins.
    #[inline]
    pub fn set_heartbeat(&self, timestamp_ns: i64) {
        self.header().heartbeat.store(timestamp_ns, Ordering::Release);
    }

    #[inline]
    pub fn read_heartbeat(&self) -> i64 {
        self.header().heartbeat.load(Ordering::Acquire)
    }

    pub fn capacities(&self) -> Capacities {
        self.layout.capacities()
    }

    pub fn layout(&self) -> &RegionLayout {
        &self.layout
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing file, or `None` for an in-memory region.
    pub fn path(&self) -> Option<&Path> {
        self.mapping.path()
    }

    /// Mapped bytes; at least `layout().total_size()`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Unmaps this process's view. The region itself lives on while other
    /// processes keep it mapped.
    pub fn close(self) {
        debug!(region = %self.name, "closing region");
    }
}

#[inline(always)]
fn header_at<'a>(base: NonNull<u8>) -> &'a RegionHeader {
    // SAFETY: callers pass the base of a mapping that attach validated to be
    // aligned and at least HEADER_SIZE long, and keep the mapping alive for 'a
    unsafe { &*base.as_ptr().cast::<RegionHeader>() }
}
