use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use softraid::RaidLevel;

/// Assemble a file-backed RAID array, write sample blocks, read them back,
/// and print per-disk statistics.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// RAID level to assemble.
    #[arg(long, value_enum, default_value_t = LevelArg::Raid5)]
    pub level: LevelArg,

    /// Block size in bytes.
    #[arg(long, default_value_t = 4096)]
    pub block_size: usize,

    /// Blocks per member disk.
    #[arg(long, default_value_t = 100)]
    pub blocks: u64,

    /// Directory the disk images are created under.
    #[arg(long, default_value = "disks")]
    pub disk_dir: PathBuf,

    /// Fail this member after writing, read back degraded, then rebuild it
    /// (level 5 only).
    #[arg(long)]
    pub exercise_rebuild: Option<usize>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LevelArg {
    Raid0,
    Raid1,
    Raid5,
}

impl LevelArg {
    #[must_use]
    pub const fn level(self) -> RaidLevel {
        match self {
            Self::Raid0 => RaidLevel::Raid0,
            Self::Raid1 => RaidLevel::Raid1,
            Self::Raid5 => RaidLevel::Raid5,
        }
    }

    /// Member count the demonstration driver uses for this level.
    #[must_use]
    pub const fn num_disks(self) -> usize {
        match self {
            Self::Raid0 => 3,
            Self::Raid1 => 2,
            Self::Raid5 => 4,
        }
    }
}
