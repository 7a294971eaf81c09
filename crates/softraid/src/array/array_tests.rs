use std::thread;

use super::{Array, RaidConfig};
use crate::error::RaidError;
use crate::layout::RaidLevel;
use tempfile::TempDir;

const BLOCK_SIZE: usize = 4096;

fn config(dir: &TempDir, level: RaidLevel, num_disks: usize, blocks_per_disk: u64) -> RaidConfig {
    RaidConfig {
        level,
        disk_paths: (0..num_disks)
            .map(|i| dir.path().join(format!("disk{i}.img")))
            .collect(),
        block_size: BLOCK_SIZE,
        blocks_per_disk,
    }
}

fn block(text: &str) -> Vec<u8> {
    let mut data = vec![0u8; BLOCK_SIZE];
    data[..text.len()].copy_from_slice(text.as_bytes());
    data
}

#[test]
fn create_rejects_too_few_members() {
    let dir = tempfile::tempdir().expect("tmp dir");

    assert!(matches!(
        Array::new(config(&dir, RaidLevel::Raid0, 1, 10)),
        Err(RaidError::Config(_))
    ));
    assert!(matches!(
        Array::new(config(&dir, RaidLevel::Raid5, 2, 10)),
        Err(RaidError::Config(_))
    ));
}

#[test]
fn create_rejects_non_positive_geometry() {
    let dir = tempfile::tempdir().expect("tmp dir");

    let mut cfg = config(&dir, RaidLevel::Raid0, 2, 10);
    cfg.block_size = 0;
    assert!(matches!(Array::new(cfg), Err(RaidError::Config(_))));

    let cfg = config(&dir, RaidLevel::Raid0, 2, 0);
    assert!(matches!(Array::new(cfg), Err(RaidError::Config(_))));
}

#[test]
fn capacity_follows_the_level() {
    let dir = tempfile::tempdir().expect("tmp dir");

    let raid0 = Array::new(config(&dir, RaidLevel::Raid0, 3, 10)).expect("raid0");
    assert_eq!(raid0.capacity(), 30);
    assert_eq!(raid0.level(), RaidLevel::Raid0);
    assert_eq!(raid0.num_disks(), 3);

    let dir = tempfile::tempdir().expect("tmp dir");
    let raid1 = Array::new(config(&dir, RaidLevel::Raid1, 2, 10)).expect("raid1");
    assert_eq!(raid1.capacity(), 10);

    let dir = tempfile::tempdir().expect("tmp dir");
    let raid5 = Array::new(config(&dir, RaidLevel::Raid5, 4, 20)).expect("raid5");
    assert_eq!(raid5.capacity(), 60);
}

#[test]
fn out_of_bounds_logical_blocks_are_rejected() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let array = Array::new(config(&dir, RaidLevel::Raid0, 2, 10)).expect("create array");

    let capacity = array.capacity();
    assert!(matches!(
        array.write_block(capacity, &block("x")),
        Err(RaidError::OutOfBounds { block, limit }) if block == capacity && limit == capacity
    ));
    assert!(matches!(
        array.read_block(capacity),
        Err(RaidError::OutOfBounds { .. })
    ));
}

#[test]
fn buffer_length_must_match_the_block_size() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let array = Array::new(config(&dir, RaidLevel::Raid0, 2, 10)).expect("create array");

    let short = vec![0u8; BLOCK_SIZE - 1];
    assert!(matches!(
        array.write_block(0, &short),
        Err(RaidError::BadBufferSize { expected, got })
            if expected == BLOCK_SIZE && got == BLOCK_SIZE - 1
    ));
}

#[test]
fn rebuild_is_only_defined_for_level_5() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let raid0 = Array::new(config(&dir, RaidLevel::Raid0, 2, 10)).expect("raid0");
    assert!(matches!(
        raid0.rebuild_disk(0),
        Err(RaidError::UnsupportedForLevel { .. })
    ));

    let dir = tempfile::tempdir().expect("tmp dir");
    let raid1 = Array::new(config(&dir, RaidLevel::Raid1, 2, 10)).expect("raid1");
    assert!(matches!(
        raid1.rebuild_disk(0),
        Err(RaidError::UnsupportedForLevel { .. })
    ));
}

#[test]
fn stats_come_back_in_member_index_order() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let array = Array::new(config(&dir, RaidLevel::Raid0, 3, 10)).expect("create array");

    for lbid in 0..3u64 {
        array
            .write_block(lbid, &block(&format!("payload {lbid}")))
            .expect("write");
    }

    let stats = array.stats();
    assert_eq!(stats.len(), 3);
    for (i, stat) in stats.iter().enumerate() {
        assert!(
            stat.path.ends_with(format!("disk{i}.img")),
            "stats must follow member order"
        );
        assert_eq!(stat.write_count, 1, "each member took exactly one stripe");
        assert!(!stat.failed);
    }
}

#[test]
fn close_is_idempotent_and_ends_io() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let array = Array::new(config(&dir, RaidLevel::Raid0, 2, 10)).expect("create array");

    array.close().expect("first close");
    array.close().expect("second close");

    assert!(matches!(
        array.write_block(0, &block("late")),
        Err(RaidError::DiskClosed { .. })
    ));
}

#[test]
fn level_5_workout_through_the_facade() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let array = Array::new(config(&dir, RaidLevel::Raid5, 4, 20)).expect("create array");

    let payloads: Vec<Vec<u8>> = (0..8u64).map(|i| block(&format!("facade {i}"))).collect();
    for (lbid, payload) in payloads.iter().enumerate() {
        array.write_block(lbid as u64, payload).expect("write");
    }

    array.disk(2).set_failed(true);
    for (lbid, payload) in payloads.iter().enumerate() {
        assert_eq!(
            &array.read_block(lbid as u64).expect("degraded read"),
            payload
        );
    }

    array.rebuild_disk(2).expect("rebuild");
    assert!(!array.disk(2).is_failed());
    for (lbid, payload) in payloads.iter().enumerate() {
        assert_eq!(&array.read_block(lbid as u64).expect("read"), payload);
    }
}

#[test]
fn concurrent_writers_then_readers_roundtrip() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let array = Array::new(config(&dir, RaidLevel::Raid1, 2, 100)).expect("create array");

    thread::scope(|scope| {
        for worker in 0..10u64 {
            let array = &array;
            scope.spawn(move || {
                for i in 0..10u64 {
                    let lbid = worker * 10 + i;
                    array
                        .write_block(lbid, &block(&format!("worker {worker} block {i}")))
                        .expect("write");
                }
            });
        }
    });

    thread::scope(|scope| {
        for worker in 0..10u64 {
            let array = &array;
            scope.spawn(move || {
                for i in 0..10u64 {
                    let lbid = worker * 10 + i;
                    assert_eq!(
                        array.read_block(lbid).expect("read"),
                        block(&format!("worker {worker} block {i}")),
                        "lbid {lbid} must hold its writer's data"
                    );
                }
            });
        }
    });
}
