//! File-backed software RAID: one logical block-addressable volume over N
//! member disks, with striping (level 0), mirroring (level 1), and rotating
//! distributed single parity (level 5) including degraded reads and offline
//! rebuild.

pub mod array;
pub mod disk;
pub mod engine;
pub mod error;
pub mod layout;
pub mod xor;

pub use array::{Array, RaidConfig};
pub use disk::{Disk, DiskStats};
pub use error::{RaidError, Result};
pub use layout::RaidLevel;
