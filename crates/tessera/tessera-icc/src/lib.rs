mod channel;
mod endpoint;
mod error;
pub mod layout;
mod region;
mod ring;

pub use channel::Channel;
pub use endpoint::{Controller, Terminal};
pub use error::RegionError;
pub use layout::{Capacities, REGION_VERSION, RegionLayout};
pub use region::Region;
pub use tessera_mmap::default_shm_dir;
