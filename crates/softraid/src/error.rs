//! Error types shared across the RAID engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::layout::RaidLevel;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RaidError>;

/// `RaidError` enumerates every failure the engine can surface. Variants
/// carry the context (disk index, block ID, stripe, path) a caller needs to
/// act on the error; nothing is retried inside the engine.
#[derive(Debug, Error)]
pub enum RaidError {
    /// Invalid configuration at array or disk creation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Logical or physical block ID outside the valid range.
    #[error("block {block} out of bounds [0, {limit})")]
    OutOfBounds { block: u64, limit: u64 },

    /// Write buffer length does not match the array's block size.
    #[error("buffer size {got} does not match block size {expected}")]
    BadBufferSize { expected: usize, got: usize },

    /// Host I/O failure, wrapped with the operation and backing path.
    #[error("{op} failed on {}", .path.display())]
    Io {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Positioned read returned fewer bytes than one block without an error.
    #[error("short read on {}: expected {expected} bytes, got {got}", .path.display())]
    ShortRead {
        path: PathBuf,
        expected: usize,
        got: usize,
    },

    /// Positioned write accepted fewer bytes than one block without an error.
    #[error("short write on {}: expected {expected} bytes, wrote {got}", .path.display())]
    ShortWrite {
        path: PathBuf,
        expected: usize,
        got: usize,
    },

    /// Operation against a disk currently marked failed.
    #[error("disk {} is failed", .path.display())]
    DiskFailed { path: PathBuf },

    /// Operation against a disk whose handle has been closed.
    #[error("disk {} is closed", .path.display())]
    DiskClosed { path: PathBuf },

    /// Disk index outside the array's member range.
    #[error("disk index {disk} out of range for {num_disks} disks")]
    InvalidDiskIndex { disk: usize, num_disks: usize },

    /// Mirror write landed on some replicas but not all of them. The data is
    /// durable on every replica that succeeded.
    #[error("degraded write: {succeeded}/{total} replicas succeeded, failed disks {failed_disks:?}")]
    DegradedWrite {
        succeeded: usize,
        total: usize,
        failed_disks: Vec<usize>,
    },

    /// Mirror write reached no replica at all.
    #[error("all replicas failed to write")]
    AllReplicasFailed {
        #[source]
        source: Box<RaidError>,
    },

    /// Mirror read found no live replica that could serve the block.
    #[error("no replica available for block {block}")]
    NoReplicaAvailable {
        block: u64,
        #[source]
        source: Option<Box<RaidError>>,
    },

    /// Parity reconstruction needs every surviving member; more than one was
    /// missing or erroring at this stripe.
    #[error("cannot reconstruct stripe {stripe}: more than one member unavailable")]
    UnrecoverableRead { stripe: u64 },

    /// Operation not defined for the array's RAID level.
    #[error("{op} is not supported at RAID level {level}")]
    UnsupportedForLevel { level: RaidLevel, op: &'static str },

    /// Rebuild was requested for a disk that is not marked failed.
    #[error("disk {disk} is not marked as failed")]
    RebuildTargetHealthy { disk: usize },

    /// Rebuild aborted because another member failed or errored; the target
    /// disk has been returned to the failed state.
    #[error("rebuild of disk {disk} aborted at stripe {stripe}")]
    SecondFailureDuringRebuild {
        disk: usize,
        stripe: u64,
        #[source]
        source: Box<RaidError>,
    },
}
