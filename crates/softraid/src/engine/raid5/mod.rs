//! Striping with rotating distributed parity: read-modify-write parity
//! maintenance, degraded reads, and offline rebuild of a failed member.


use parking_lot::Mutex;
use tracing::{debug, info};

use crate::disk::Disk;
use crate::error::{RaidError, Result};
use crate::layout::{raid5_data_disk, raid5_location};
use crate::xor::xor_in_place;

const REBUILD_PROGRESS_INTERVAL: u64 = 100;

pub struct Raid5 {
    num_disks: usize,
    block_size: usize,
    /// Serializes write, read, and rebuild: a read-modify-write of a stripe
    /// must see a consistent view of its sibling blocks.
    lock: Mutex<()>,
}

impl Raid5 {
    pub(crate) const fn new(num_disks: usize, block_size: usize) -> Self {
        Self {
            num_disks,
            block_size,
            lock: Mutex::new(()),
        }
    }

    /// `write_block` writes one logical block and brings the stripe's parity
    /// up to date.
    ///
    /// Parity is recomputed as the new data XORed with the current contents
    /// of the live sibling members, then written before the data block. A
    /// failed sibling contributes nothing; a failed parity disk is skipped.
    ///
    /// # Errors
    /// Propagates sibling read errors and member write errors.
    pub fn write_block(&self, disks: &[Disk], lbid: u64, data: &[u8]) -> Result<()> {
        let _guard = self.lock.lock();

        let loc = raid5_location(lbid, self.num_disks);

        let mut parity = data.to_vec();
        for offset in 0..self.num_disks - 1 {
            if offset == loc.stripe_offset {
                continue;
            }
            let sibling = raid5_data_disk(offset, loc.parity_disk);
            if disks[sibling].is_failed() {
                // The failed member's last value satisfied the prior parity
                // invariant; fold in live siblings only. Never substitute
                // zeroes for the missing member.
                continue;
            }
            let block = disks[sibling].read_block(loc.stripe)?;
            xor_in_place(&mut parity, &block);
        }

        if !disks[loc.parity_disk].is_failed() {
            disks[loc.parity_disk].write_block(loc.stripe, &parity)?;
        }

        disks[loc.data_disk].write_block(loc.stripe, data)
    }

    /// `read_block` reads one logical block, reconstructing it from parity
    /// when the owning member cannot serve it.
    ///
    /// # Errors
    /// `UnrecoverableRead` if more than one member at the stripe is
    /// unavailable; otherwise whatever the member disks report.
    pub fn read_block(&self, disks: &[Disk], lbid: u64) -> Result<Vec<u8>> {
        let _guard = self.lock.lock();

        let loc = raid5_location(lbid, self.num_disks);

        if !disks[loc.data_disk].is_failed() {
            if let Ok(data) = disks[loc.data_disk].read_block(loc.stripe) {
                return Ok(data);
            }
        }

        debug!(
            lbid,
            stripe = loc.stripe,
            missing = loc.data_disk,
            "degraded read: reconstructing from parity"
        );
        self.reconstruct(disks, loc.stripe, loc.data_disk, loc.parity_disk)
    }

    /// `rebuild_disk` rebuilds a failed member in place from the survivors.
    ///
    /// The target's failed flag is cleared on entry so the engine may write
    /// to it; if any stripe cannot be rebuilt the flag is restored and the
    /// error is reported as `SecondFailureDuringRebuild`. The engine lock is
    /// held for the whole scan, so client I/O stalls until rebuild finishes.
    ///
    /// # Errors
    /// `InvalidDiskIndex`, `RebuildTargetHealthy`, or
    /// `SecondFailureDuringRebuild`.
    pub fn rebuild_disk(&self, disks: &[Disk], disk_index: usize) -> Result<()> {
        let _guard = self.lock.lock();

        if disk_index >= self.num_disks {
            return Err(RaidError::InvalidDiskIndex {
                disk: disk_index,
                num_disks: self.num_disks,
            });
        }

        let target = &disks[disk_index];
        if !target.is_failed() {
            return Err(RaidError::RebuildTargetHealthy { disk: disk_index });
        }

        info!(disk = disk_index, "rebuild: starting");
        target.set_failed(false);

        let num_stripes = target.capacity();
        for stripe in 0..num_stripes {
            if let Err(err) = self.rebuild_stripe(disks, disk_index, stripe) {
                target.set_failed(true);
                return Err(RaidError::SecondFailureDuringRebuild {
                    disk: disk_index,
                    stripe,
                    source: Box::new(err),
                });
            }
            if stripe > 0 && stripe % REBUILD_PROGRESS_INTERVAL == 0 {
                info!(
                    disk = disk_index,
                    stripe,
                    total = num_stripes,
                    "rebuild: progress"
                );
            }
        }

        info!(disk = disk_index, blocks = num_stripes, "rebuild: complete");
        Ok(())
    }

    fn rebuild_stripe(&self, disks: &[Disk], disk_index: usize, stripe: u64) -> Result<()> {
        let parity_disk = (stripe % self.num_disks as u64) as usize;
        let block = if disk_index == parity_disk {
            self.recompute_parity(disks, stripe, parity_disk)?
        } else {
            self.reconstruct(disks, stripe, disk_index, parity_disk)?
        };
        disks[disk_index].write_block(stripe, &block)
    }

    /// XOR of the parity block and every surviving data member at `stripe`,
    /// which is the value the member at `missing_disk` must hold.
    fn reconstruct(
        &self,
        disks: &[Disk],
        stripe: u64,
        missing_disk: usize,
        parity_disk: usize,
    ) -> Result<Vec<u8>> {
        if disks[parity_disk].is_failed() {
            return Err(RaidError::UnrecoverableRead { stripe });
        }

        let mut block = disks[parity_disk].read_block(stripe)?;
        for (i, disk) in disks.iter().enumerate() {
            if i == parity_disk || i == missing_disk {
                continue;
            }
            if disk.is_failed() {
                return Err(RaidError::UnrecoverableRead { stripe });
            }
            let member = disk.read_block(stripe)?;
            xor_in_place(&mut block, &member);
        }
        Ok(block)
    }

    fn recompute_parity(&self, disks: &[Disk], stripe: u64, parity_disk: usize) -> Result<Vec<u8>> {
        let mut parity = vec![0u8; self.block_size];
        for (i, disk) in disks.iter().enumerate() {
            if i == parity_disk {
                continue;
            }
            let member = disk.read_block(stripe)?;
            xor_in_place(&mut parity, &member);
        }
        Ok(parity)
    }
}
