use crate::layout::Capacities;
use std::io;
use tessera_records::RecordKind;

/// Failures of the region lifecycle and of channel sends.
///
/// An empty channel is not an error: receives return `None`.
#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("a region is already open on this handle")]
    AlreadyOpen,

    #[error("failed to map region '{name}'")]
    MappingFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("{0} channel is full")]
    ChannelFull(RecordKind),

    #[error("region layout mismatch: requested {requested:?}, stored {stored:?}")]
    LayoutMismatch {
        requested: Capacities,
        stored: Capacities,
    },

    #[error("{0} channel capacity is zero or too large to map")]
    InvalidCapacity(RecordKind),

    #[error("mapped extent is {actual} bytes but the layout needs {required}")]
    ExtentTooSmall { required: usize, actual: usize },
}
