//! The two sides of a region.
//!
//! `Terminal` is the trading-terminal side: it produces ticks, positions and
//! account snapshots and consumes commands. `Controller` is the strategy side
//! and does the reverse. Each record stream therefore has exactly one writer
//! and one reader, which is what the channels require.

use crate::error::RegionError;
use crate::layout::Capacities;
use crate::region::Region;
use std::path::Path;
use std::time::Duration;
use tessera_records::{Account, Command, Position, Tick};
use tracing::debug;

/// Terminal-side handle with an explicit open/close lifecycle.
///
/// Every data operation on a closed handle reports failure (`false` or
/// `None`) instead of panicking, so a host polling on a timer can keep
/// calling it across reconnects.
#[derive(Default)]
pub struct Terminal {
    region: Option<Region>,
}

impl Terminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the named region in the default shm directory.
    ///
    /// # Errors
    /// `AlreadyOpen` if this handle already holds a region; otherwise any
    /// error of `Region::open_or_create`.
    pub fn open_or_create(&mut self, name: &str, capacities: Capacities) -> Result<(), RegionError> {
        self.open_with(|| Region::open_or_create(name, capacities))
    }

    pub fn open_or_create_in(
        &mut self,
        dir: &Path,
        name: &str,
        capacities: Capacities,
    ) -> Result<(), RegionError> {
        self.open_with(|| Region::open_or_create_in(dir, name, capacities))
    }

    pub fn open_in_memory(&mut self, capacities: Capacities) -> Result<(), RegionError> {
        self.open_with(|| Region::in_memory(capacities))
    }

    fn open_with(
        &mut self,
        open: impl FnOnce() -> Result<Region, RegionError>,
    ) -> Result<(), RegionError> {
        if self.region.is_some() {
            return Err(RegionError::AlreadyOpen);
        }
        self.region = Some(open()?);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.region.is_some()
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// `false` if the handle is closed or the tick channel is full.
    pub fn send_tick(&self, tick: &Tick) -> bool {
        self.region.as_ref().is_some_and(|r| r.ticks().try_send(tick))
    }

    pub fn send_position(&self, position: &Position) -> bool {
        self.region
            .as_ref()
            .is_some_and(|r| r.positions().try_send(position))
    }

    pub fn send_account(&self, account: &Account) -> bool {
        self.region
            .as_ref()
            .is_some_and(|r| r.accounts().try_send(account))
    }

    /// Next pending command, oldest first.
    pub fn get_command(&self) -> Option<Command> {
        self.region.as_ref()?.commands().try_receive()
    }

    /// Stamps the shared heartbeat. `false` if the handle is closed.
    pub fn heartbeat(&self, timestamp_ns: i64) -> bool {
        match &self.region {
            Some(region) => {
                region.set_heartbeat(timestamp_ns);
                true
            }
            None => false,
        }
    }

    /// Releases the mapping. Closing a closed handle does nothing.
    pub fn close(&mut self) {
        if let Some(region) = self.region.take() {
            region.close();
        } else {
            debug!("terminal already closed");
        }
    }
}

/// Controller-side handle: batch readers for the terminal's streams, the
/// command sender, and liveness checks on the terminal's heartbeat.
pub struct Controller {
    region: Region,
}

impl Controller {
    pub fn new(region: Region) -> Self {
        Self { region }
    }

    pub fn open_or_create(name: &str, capacities: Capacities) -> Result<Self, RegionError> {
        Region::open_or_create(name, capacities).map(Self::new)
    }

    pub fn open_or_create_in(
        dir: &Path,
        name: &str,
        capacities: Capacities,
    ) -> Result<Self, RegionError> {
        Region::open_or_create_in(dir, name, capacities).map(Self::new)
    }

    /// Up to `max` ticks, oldest first.
    pub fn read_ticks(&self, max: usize) -> Vec<Tick> {
        self.region.ticks().drain(max)
    }

    pub fn read_positions(&self, max: usize) -> Vec<Position> {
        self.region.positions().drain(max)
    }

    pub fn read_accounts(&self, max: usize) -> Vec<Account> {
        self.region.accounts().drain(max)
    }

    /// `false` when the command channel is full; the command is not queued.
    pub fn send_command(&self, command: &Command) -> bool {
        self.region.commands().try_send(command)
    }

    pub fn heartbeat(&self, timestamp_ns: i64) {
        self.region.set_heartbeat(timestamp_ns);
    }

    /// The last stored heartbeat, or `None` if nobody has stamped one yet.
    pub fn last_heartbeat(&self) -> Option<i64> {
        match self.region.read_heartbeat() {
            0 => None,
            ts => Some(ts),
        }
    }

    /// Time since the last heartbeat as seen at `now_ns`. A heartbeat stamped
    /// in the future counts as zero age.
    pub fn heartbeat_age(&self, now_ns: i64) -> Option<Duration> {
        let last = self.last_heartbeat()?;
        let age = now_ns.saturating_sub(last).max(0);
        Some(Duration::from_nanos(age as u64))
    }

    /// `true` if a heartbeat exists and is no older than `timeout`.
    pub fn is_alive(&self, now_ns: i64, timeout: Duration) -> bool {
        self.heartbeat_age(now_ns).is_some_and(|age| age <= timeout)
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn close(self) {
        self.region.close();
    }
}
