//! Pure address translation from logical block IDs to physical placement.
//!
//! Translation is a function of `(level, num_disks, lbid)` alone, so the
//! same disk images are readable by any implementation that agrees on the
//! geometry.


use std::fmt;

/// Supported RAID levels.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RaidLevel {
    /// Striping: round-robin, no redundancy.
    Raid0,
    /// Mirroring: every block on every disk.
    Raid1,
    /// Striping with rotating distributed parity.
    Raid5,
}

impl RaidLevel {
    /// `min_disks` returns the smallest member count this level accepts.
    #[must_use]
    pub const fn min_disks(self) -> usize {
        match self {
            Self::Raid0 | Self::Raid1 => 2,
            Self::Raid5 => 3,
        }
    }

    /// `capacity` computes the total logical blocks for an array of
    /// `num_disks` members with `blocks_per_disk` blocks each.
    #[must_use]
    pub const fn capacity(self, num_disks: usize, blocks_per_disk: u64) -> u64 {
        match self {
            Self::Raid0 => blocks_per_disk * num_disks as u64,
            Self::Raid1 => blocks_per_disk,
            Self::Raid5 => blocks_per_disk * (num_disks as u64 - 1),
        }
    }
}

impl fmt::Display for RaidLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Self::Raid0 => "0",
            Self::Raid1 => "1",
            Self::Raid5 => "5",
        };
        f.write_str(level)
    }
}

/// Placement of a logical block under round-robin striping.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Raid0Location {
    pub disk: usize,
    pub block: u64,
}

/// `raid0_location` maps a logical block to its member disk and the physical
/// block index on that disk.
#[must_use]
pub fn raid0_location(lbid: u64, num_disks: usize) -> Raid0Location {
    Raid0Location {
        disk: (lbid % num_disks as u64) as usize,
        block: lbid / num_disks as u64,
    }
}

/// Placement of a logical block within a rotating-parity stripe.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Raid5Location {
    /// Stripe number; also the physical block index on every member disk.
    pub stripe: u64,
    /// Position among the stripe's data members, in `[0, num_disks - 1)`.
    pub stripe_offset: usize,
    /// Disk holding this stripe's parity block.
    pub parity_disk: usize,
    /// Disk holding the addressed data block.
    pub data_disk: usize,
}

/// `raid5_location` maps a logical block under the left-symmetric rotation:
/// parity occupies disk `stripe % num_disks` and data members skip over it.
#[must_use]
pub fn raid5_location(lbid: u64, num_disks: usize) -> Raid5Location {
    let data_members = num_disks as u64 - 1;
    let stripe = lbid / data_members;
    let stripe_offset = (lbid % data_members) as usize;
    let parity_disk = (stripe % num_disks as u64) as usize;

    Raid5Location {
        stripe,
        stripe_offset,
        parity_disk,
        data_disk: raid5_data_disk(stripe_offset, parity_disk),
    }
}

/// `raid5_data_disk` resolves a data-member offset within a stripe to a disk
/// index, skipping the parity slot.
#[must_use]
pub const fn raid5_data_disk(stripe_offset: usize, parity_disk: usize) -> usize {
    if stripe_offset >= parity_disk {
        stripe_offset + 1
    } else {
        stripe_offset
    }
}
