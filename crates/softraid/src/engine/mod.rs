//! Level-specific redundancy engines and their dispatch.

pub mod raid0;
pub mod raid1;
pub mod raid5;

use crate::disk::Disk;
use crate::error::Result;
use crate::layout::RaidLevel;

pub use raid0::Raid0;
pub use raid1::Raid1;
pub use raid5::Raid5;

/// The level-specific engine held by an array. The variant is chosen at
/// construction and never changes; engines carry geometry only and address
/// member disks by index through the slice passed per call.
pub enum Engine {
    Striping(Raid0),
    Mirroring(Raid1),
    DistributedParity(Raid5),
}

impl Engine {
    pub(crate) fn new(level: RaidLevel, num_disks: usize, block_size: usize) -> Self {
        match level {
            RaidLevel::Raid0 => Self::Striping(Raid0::new(num_disks)),
            RaidLevel::Raid1 => Self::Mirroring(Raid1::new(num_disks)),
            RaidLevel::Raid5 => Self::DistributedParity(Raid5::new(num_disks, block_size)),
        }
    }

    pub(crate) fn write_block(&self, disks: &[Disk], lbid: u64, data: &[u8]) -> Result<()> {
        match self {
            Self::Striping(engine) => engine.write_block(disks, lbid, data),
            Self::Mirroring(engine) => engine.write_block(disks, lbid, data),
            Self::DistributedParity(engine) => engine.write_block(disks, lbid, data),
        }
    }

    pub(crate) fn read_block(&self, disks: &[Disk], lbid: u64) -> Result<Vec<u8>> {
        match self {
            Self::Striping(engine) => engine.read_block(disks, lbid),
            Self::Mirroring(engine) => engine.read_block(disks, lbid),
            Self::DistributedParity(engine) => engine.read_block(disks, lbid),
        }
    }
}
