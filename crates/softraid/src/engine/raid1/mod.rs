//! Mirroring: broadcast writes to every replica, read from the first live
//! one.


use std::thread;

use crate::disk::Disk;
use crate::error::{RaidError, Result};

pub struct Raid1 {
    num_disks: usize,
}

impl Raid1 {
    pub(crate) const fn new(num_disks: usize) -> Self {
        Self { num_disks }
    }

    /// `write_block` fans the write out to all replicas in parallel and
    /// joins before returning.
    ///
    /// Every replica succeeding is a clean success. A partial success
    /// returns `DegradedWrite` carrying the failed indices; the data is
    /// durable on every replica that took the write. If no replica took it,
    /// `AllReplicasFailed` wraps the last observed error.
    ///
    /// # Errors
    /// `DegradedWrite` or `AllReplicasFailed` as above.
    pub fn write_block(&self, disks: &[Disk], lbid: u64, data: &[u8]) -> Result<()> {
        let results: Vec<Result<()>> = thread::scope(|scope| {
            let handles: Vec<_> = disks
                .iter()
                .map(|disk| scope.spawn(move || disk.write_block(lbid, data)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("replica writer panicked"))
                .collect()
        });

        let mut failed_disks = Vec::new();
        let mut last_err = None;
        for (i, result) in results.into_iter().enumerate() {
            if let Err(err) = result {
                failed_disks.push(i);
                last_err = Some(err);
            }
        }

        match last_err {
            None => Ok(()),
            Some(err) if failed_disks.len() == self.num_disks => Err(RaidError::AllReplicasFailed {
                source: Box::new(err),
            }),
            Some(_) => Err(RaidError::DegradedWrite {
                succeeded: self.num_disks - failed_disks.len(),
                total: self.num_disks,
                failed_disks,
            }),
        }
    }

    /// `read_block` returns the block from the first replica that serves it,
    /// in member-index order, skipping replicas marked failed.
    ///
    /// # Errors
    /// `NoReplicaAvailable` if every replica is failed or errors, carrying
    /// the last observed error if there was one.
    pub fn read_block(&self, disks: &[Disk], lbid: u64) -> Result<Vec<u8>> {
        let mut last_err = None;
        for disk in disks {
            if disk.is_failed() {
                continue;
            }
            match disk.read_block(lbid) {
                Ok(data) => return Ok(data),
                Err(err) => last_err = Some(Box::new(err)),
            }
        }
        Err(RaidError::NoReplicaAvailable {
            block: lbid,
            source: last_err,
        })
    }
}
