//! File-backed fixed-size block store with failure simulation.


use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::{RaidError, Result};

/// Point-in-time snapshot of a disk's observability counters.
#[derive(Clone, Debug)]
pub struct DiskStats {
    pub path: PathBuf,
    pub read_count: u64,
    pub write_count: u64,
    pub failed: bool,
}

/// An owned handle to a backing file, addressed in fixed-size blocks.
///
/// Reads take the state lock shared; writes, failure-flag changes, and close
/// take it exclusive. The counters are best-effort observability, bumped
/// atomically under the same acquisition that covered the I/O.
pub struct Disk {
    path: PathBuf,
    block_size: usize,
    num_blocks: u64,
    read_count: AtomicU64,
    write_count: AtomicU64,
    state: RwLock<DiskState>,
}

struct DiskState {
    file: Option<File>,
    failed: bool,
}

impl Disk {
    /// `open` opens (creating if absent) the backing file and extends it to
    /// `block_size * num_blocks` bytes if it is shorter. Never-written
    /// regions read as zeroes per sparse-file semantics.
    ///
    /// # Errors
    /// `Config` for non-positive geometry, `Io` on open or resize failure.
    pub fn open(path: impl Into<PathBuf>, block_size: usize, num_blocks: u64) -> Result<Self> {
        let path = path.into();
        if block_size == 0 {
            return Err(RaidError::Config("block size must be positive".into()));
        }
        if num_blocks == 0 {
            return Err(RaidError::Config("number of blocks must be positive".into()));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| RaidError::Io {
                path: path.clone(),
                op: "open",
                source,
            })?;

        let required = block_size as u64 * num_blocks;
        let current = file
            .metadata()
            .map_err(|source| RaidError::Io {
                path: path.clone(),
                op: "stat",
                source,
            })?
            .len();
        if current < required {
            file.set_len(required).map_err(|source| RaidError::Io {
                path: path.clone(),
                op: "resize",
                source,
            })?;
        }

        Ok(Self {
            path,
            block_size,
            num_blocks,
            read_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
            state: RwLock::new(DiskState {
                file: Some(file),
                failed: false,
            }),
        })
    }

    /// `read_block` reads block `bid` in full.
    ///
    /// # Errors
    /// `DiskFailed`, `OutOfBounds`, `DiskClosed`, `Io`, or `ShortRead`.
    pub fn read_block(&self, bid: u64) -> Result<Vec<u8>> {
        let state = self.state.read();
        if state.failed {
            return Err(RaidError::DiskFailed {
                path: self.path.clone(),
            });
        }
        self.check_bounds(bid)?;
        let file = state.file.as_ref().ok_or_else(|| RaidError::DiskClosed {
            path: self.path.clone(),
        })?;

        let mut data = vec![0u8; self.block_size];
        self.read_full_at(file, bid * self.block_size as u64, &mut data)?;
        self.read_count.fetch_add(1, Ordering::Relaxed);
        Ok(data)
    }

    /// `write_block` writes block `bid` in full and fsyncs the backing file.
    /// On success the bytes are persisted to the host's storage layer.
    ///
    /// # Errors
    /// `DiskFailed`, `OutOfBounds`, `BadBufferSize`, `DiskClosed`, `Io`, or
    /// `ShortWrite`.
    pub fn write_block(&self, bid: u64, data: &[u8]) -> Result<()> {
        let state = self.state.write();
        if state.failed {
            return Err(RaidError::DiskFailed {
                path: self.path.clone(),
            });
        }
        self.check_bounds(bid)?;
        if data.len() != self.block_size {
            return Err(RaidError::BadBufferSize {
                expected: self.block_size,
                got: data.len(),
            });
        }
        let file = state.file.as_ref().ok_or_else(|| RaidError::DiskClosed {
            path: self.path.clone(),
        })?;

        self.write_full_at(file, bid * self.block_size as u64, data)?;
        file.sync_all().map_err(|source| RaidError::Io {
            path: self.path.clone(),
            op: "sync",
            source,
        })?;
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// `set_failed` toggles the simulated-failure flag. A failed disk
    /// rejects all reads and writes until the flag is cleared.
    pub fn set_failed(&self, failed: bool) {
        self.state.write().failed = failed;
    }

    /// `is_failed` reports the simulated-failure flag.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state.read().failed
    }

    /// `stats` snapshots the disk's counters and failure flag.
    #[must_use]
    pub fn stats(&self) -> DiskStats {
        let state = self.state.read();
        DiskStats {
            path: self.path.clone(),
            read_count: self.read_count.load(Ordering::Relaxed),
            write_count: self.write_count.load(Ordering::Relaxed),
            failed: state.failed,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of blocks on this disk.
    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.num_blocks
    }

    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    /// `close` releases the file handle. Idempotent; later I/O returns
    /// `DiskClosed`.
    ///
    /// # Errors
    /// `Io` if outstanding data cannot be flushed while closing.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.write();
        if let Some(file) = state.file.take() {
            file.sync_all().map_err(|source| RaidError::Io {
                path: self.path.clone(),
                op: "close",
                source,
            })?;
        }
        Ok(())
    }

    fn check_bounds(&self, bid: u64) -> Result<()> {
        if bid >= self.num_blocks {
            return Err(RaidError::OutOfBounds {
                block: bid,
                limit: self.num_blocks,
            });
        }
        Ok(())
    }

    fn read_full_at(&self, file: &File, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match file.read_at(&mut buf[filled..], offset + filled as u64) {
                Ok(0) => {
                    return Err(RaidError::ShortRead {
                        path: self.path.clone(),
                        expected: buf.len(),
                        got: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(RaidError::Io {
                        path: self.path.clone(),
                        op: "read",
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    fn write_full_at(&self, file: &File, offset: u64, data: &[u8]) -> Result<()> {
        let mut written = 0usize;
        while written < data.len() {
            match file.write_at(&data[written..], offset + written as u64) {
                Ok(0) => {
                    return Err(RaidError::ShortWrite {
                        path: self.path.clone(),
                        expected: data.len(),
                        got: written,
                    });
                }
                Ok(n) => written += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(RaidError::Io {
                        path: self.path.clone(),
                        op: "write",
                        source,
                    });
                }
            }
        }
        Ok(())
    }
}
