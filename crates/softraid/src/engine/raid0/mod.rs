//! Round-robin striping across all members. No redundancy: a failed member
//! makes every block mapped to it unreadable, and nothing is reconstructed.


use crate::disk::Disk;
use crate::error::Result;
use crate::layout::raid0_location;

pub struct Raid0 {
    num_disks: usize,
}

impl Raid0 {
    pub(crate) const fn new(num_disks: usize) -> Self {
        Self { num_disks }
    }

    /// # Errors
    /// Whatever the owning disk reports.
    pub fn write_block(&self, disks: &[Disk], lbid: u64, data: &[u8]) -> Result<()> {
        let loc = raid0_location(lbid, self.num_disks);
        disks[loc.disk].write_block(loc.block, data)
    }

    /// # Errors
    /// Whatever the owning disk reports.
    pub fn read_block(&self, disks: &[Disk], lbid: u64) -> Result<Vec<u8>> {
        let loc = raid0_location(lbid, self.num_disks);
        disks[loc.disk].read_block(loc.block)
    }
}
