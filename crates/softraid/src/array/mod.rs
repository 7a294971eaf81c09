//! The array facade: configuration, level dispatch, bounds checks, and
//! lifecycle of the member disks.

#[cfg(test)]
mod array_tests;

use std::path::PathBuf;

use crate::disk::{Disk, DiskStats};
use crate::engine::Engine;
use crate::error::{RaidError, Result};
use crate::layout::RaidLevel;

/// Static description of an array: level, ordered member paths, geometry.
#[derive(Clone, Debug)]
pub struct RaidConfig {
    pub level: RaidLevel,
    pub disk_paths: Vec<PathBuf>,
    pub block_size: usize,
    pub blocks_per_disk: u64,
}

/// A single logical block-addressable volume over N member disks. The array
/// exclusively owns its disks; the level engine addresses them by index.
pub struct Array {
    level: RaidLevel,
    disks: Vec<Disk>,
    block_size: usize,
    capacity: u64,
    engine: Engine,
}

impl Array {
    /// `new` validates the configuration, opens every member disk in order,
    /// and instantiates the level engine. On any open failure the disks
    /// opened so far are closed again.
    ///
    /// # Errors
    /// `Config` for an invalid configuration or a member that cannot be
    /// opened.
    pub fn new(config: RaidConfig) -> Result<Self> {
        let num_disks = config.disk_paths.len();
        if num_disks < config.level.min_disks() {
            return Err(RaidError::Config(format!(
                "RAID {} requires at least {} disks, got {num_disks}",
                config.level,
                config.level.min_disks()
            )));
        }
        if config.block_size == 0 {
            return Err(RaidError::Config("block size must be positive".into()));
        }
        if config.blocks_per_disk == 0 {
            return Err(RaidError::Config("blocks per disk must be positive".into()));
        }

        let mut disks = Vec::with_capacity(num_disks);
        for (i, path) in config.disk_paths.iter().enumerate() {
            match Disk::open(path, config.block_size, config.blocks_per_disk) {
                Ok(disk) => disks.push(disk),
                Err(err) => {
                    for opened in &disks {
                        let _ = opened.close();
                    }
                    return Err(RaidError::Config(format!("failed to open disk {i}: {err}")));
                }
            }
        }

        Ok(Self {
            level: config.level,
            block_size: config.block_size,
            capacity: config.level.capacity(num_disks, config.blocks_per_disk),
            engine: Engine::new(config.level, num_disks, config.block_size),
            disks,
        })
    }

    /// `write_block` stores `data` at logical block `lbid`.
    ///
    /// # Errors
    /// `OutOfBounds`, `BadBufferSize`, or whatever the level engine reports.
    pub fn write_block(&self, lbid: u64, data: &[u8]) -> Result<()> {
        self.check_bounds(lbid)?;
        if data.len() != self.block_size {
            return Err(RaidError::BadBufferSize {
                expected: self.block_size,
                got: data.len(),
            });
        }
        self.engine.write_block(&self.disks, lbid, data)
    }

    /// `read_block` returns the data at logical block `lbid`.
    ///
    /// # Errors
    /// `OutOfBounds` or whatever the level engine reports.
    pub fn read_block(&self, lbid: u64) -> Result<Vec<u8>> {
        self.check_bounds(lbid)?;
        self.engine.read_block(&self.disks, lbid)
    }

    /// `rebuild_disk` reconstructs a failed member from the survivors.
    /// Defined for level 5 only.
    ///
    /// # Errors
    /// `UnsupportedForLevel` off level 5; otherwise the rebuild outcome.
    pub fn rebuild_disk(&self, disk_index: usize) -> Result<()> {
        match &self.engine {
            Engine::DistributedParity(raid5) => raid5.rebuild_disk(&self.disks, disk_index),
            Engine::Striping(_) | Engine::Mirroring(_) => Err(RaidError::UnsupportedForLevel {
                level: self.level,
                op: "rebuild",
            }),
        }
    }

    /// `stats` snapshots per-disk counters in member-index order.
    #[must_use]
    pub fn stats(&self) -> Vec<DiskStats> {
        self.disks.iter().map(Disk::stats).collect()
    }

    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.capacity
    }

    #[must_use]
    pub const fn level(&self) -> RaidLevel {
        self.level
    }

    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    #[must_use]
    pub fn num_disks(&self) -> usize {
        self.disks.len()
    }

    /// `disk` gives direct access to a member, for failure injection and
    /// physical inspection.
    #[must_use]
    pub fn disk(&self, i: usize) -> &Disk {
        &self.disks[i]
    }

    /// `close` closes every member disk. The first error is returned after
    /// all members have been visited.
    ///
    /// # Errors
    /// The first close failure observed.
    pub fn close(&self) -> Result<()> {
        let mut first_err = None;
        for disk in &self.disks {
            if let Err(err) = disk.close() {
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn check_bounds(&self, lbid: u64) -> Result<()> {
        if lbid >= self.capacity {
            return Err(RaidError::OutOfBounds {
                block: lbid,
                limit: self.capacity,
            });
        }
        Ok(())
    }
}
