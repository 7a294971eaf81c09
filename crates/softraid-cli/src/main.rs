use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use softraid::{Array, RaidConfig};

const SAMPLE_BLOCKS: &[(u64, &str)] = &[
    (0, "hello from the first block"),
    (1, "mirrors keep a second copy"),
    (2, "parity rotates every stripe"),
    (3, "xor undoes itself"),
    (4, "block four checking in"),
    (5, "rebuilt from the survivors"),
];

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    run(&cli)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let level = cli.level.level();
    let num_disks = cli.level.num_disks();

    let disk_dir = cli.disk_dir.join(format!("raid{level}"));
    std::fs::create_dir_all(&disk_dir)
        .with_context(|| format!("creating {}", disk_dir.display()))?;

    let config = RaidConfig {
        level,
        disk_paths: (0..num_disks)
            .map(|i| disk_dir.join(format!("disk{i}.img")))
            .collect(),
        block_size: cli.block_size,
        blocks_per_disk: cli.blocks,
    };

    let array = Array::new(config).context("assembling array")?;
    info!(
        level = %array.level(),
        disks = array.num_disks(),
        capacity = array.capacity(),
        "array assembled"
    );

    for &(lbid, text) in SAMPLE_BLOCKS {
        array
            .write_block(lbid, &sample_block(cli.block_size, text))
            .with_context(|| format!("writing block {lbid}"))?;
        info!(lbid, text, "wrote");
    }

    verify_samples(&array, cli.block_size).context("reading back")?;

    if let Some(disk_index) = cli.exercise_rebuild {
        exercise_rebuild(&array, cli.block_size, disk_index)?;
    }

    for (i, stat) in array.stats().iter().enumerate() {
        info!(
            disk = i,
            path = %stat.path.display(),
            reads = stat.read_count,
            writes = stat.write_count,
            failed = stat.failed,
            "disk stats"
        );
    }

    array.close().context("closing array")?;
    Ok(())
}

fn verify_samples(array: &Array, block_size: usize) -> Result<()> {
    for &(lbid, text) in SAMPLE_BLOCKS {
        let data = array
            .read_block(lbid)
            .with_context(|| format!("reading block {lbid}"))?;
        if data != sample_block(block_size, text) {
            bail!("block {lbid} read back different data");
        }
        info!(lbid, text, "verified");
    }
    Ok(())
}

fn exercise_rebuild(array: &Array, block_size: usize, disk_index: usize) -> Result<()> {
    if disk_index >= array.num_disks() {
        bail!(
            "disk index {disk_index} out of range for {} disks",
            array.num_disks()
        );
    }

    info!(disk = disk_index, "simulating a member failure");
    array.disk(disk_index).set_failed(true);
    verify_samples(array, block_size).context("degraded read-back")?;

    array.rebuild_disk(disk_index).context("rebuilding")?;
    verify_samples(array, block_size).context("post-rebuild read-back")?;

    Ok(())
}

fn sample_block(block_size: usize, text: &str) -> Vec<u8> {
    let mut data = vec![0u8; block_size];
    data[..text.len()].copy_from_slice(text.as_bytes());
    data
}
