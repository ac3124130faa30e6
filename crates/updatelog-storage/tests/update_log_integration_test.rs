//! Update-Log Integration Tests
//!
//! End-to-end scenarios across process "restarts" (drop + reacquire at the
//! same path) and across caller-owned threads: crash-truncation recovery,
//! replay ordering, and append/destroy serialization.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;
use updatelog_core::{UpdateEventType, UpdateLogEntry};
use updatelog_storage::{Error, SegmentUpdateLog, SegmentUpdateLogProvider, UpdateLogConfig};

fn entry(offset: i64, value: i64, partition: i32) -> UpdateLogEntry {
    UpdateLogEntry::new(offset, value, UpdateEventType::Insert, partition)
}

/// Crash mid-append: a torn trailing record is truncated away on reopen and
/// every complete record survives.
#[test]
fn test_crash_truncation_recovery() {
    let temp_dir = TempDir::new().unwrap();
    let config = UpdateLogConfig {
        directory: temp_dir.path().to_path_buf(),
    };
    let path = config.log_path("orders", "seg0");
    let provider = SegmentUpdateLogProvider::default();

    let original = vec![entry(1, 10, 0), entry(2, 20, 0), entry(3, 30, 0)];

    {
        let log = provider
            .acquire_for_mutable_segment("orders", "seg0", &path)
            .unwrap();
        log.append(&original).unwrap();
    }
    assert_eq!(UpdateLogEntry::SIZE, 24);
    assert_eq!(fs::metadata(&path).unwrap().len(), 72);

    // The process dies after a 4th append wrote 10 of its 24 bytes
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[0x5A; 10]).unwrap();
    file.sync_all().unwrap();
    drop(file);
    assert_eq!(fs::metadata(&path).unwrap().len(), 82);

    // Server restart: recovery truncates back to the last complete record
    let log = provider
        .acquire_for_mutable_segment("orders", "seg0", &path)
        .unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 72);
    assert_eq!(log.read_all().unwrap(), original);
}

/// Replay across restarts preserves append-call order, batch by batch.
#[test]
fn test_replay_order_across_restarts() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("clicks-seg4.updlog");
    let provider = SegmentUpdateLogProvider::default();

    {
        let log = provider
            .acquire_for_mutable_segment("clicks", "seg4", &path)
            .unwrap();
        log.append(&[entry(1, 1, 0), entry(2, 2, 0)]).unwrap();
        log.append(&[entry(3, 3, 1)]).unwrap();
    }

    {
        let log = provider
            .acquire_for_mutable_segment("clicks", "seg4", &path)
            .unwrap();
        log.append(&[entry(4, 4, 1)]).unwrap();
    }

    let log = provider
        .acquire_for_immutable_segment("clicks", "seg4", &path)
        .unwrap();
    assert_eq!(
        log.read_all().unwrap(),
        vec![entry(1, 1, 0), entry(2, 2, 0), entry(3, 3, 1), entry(4, 4, 1)]
    );
}

/// Appends from multiple caller-owned threads are serialized: every batch
/// lands contiguously and in order, nothing is lost or interleaved.
#[test]
fn test_concurrent_appends_are_serialized() {
    const THREADS: i32 = 4;
    const BATCHES_PER_THREAD: i64 = 25;
    const BATCH_LEN: i64 = 3;

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("orders-seg9.updlog");
    let provider = SegmentUpdateLogProvider::default();

    let log = Arc::new(
        provider
            .acquire_for_mutable_segment("orders", "seg9", &path)
            .unwrap(),
    );

    let mut handles = Vec::new();
    for thread_id in 0..THREADS {
        let log = Arc::clone(&log);
        handles.push(thread::spawn(move || {
            for batch in 0..BATCHES_PER_THREAD {
                let base = batch * BATCH_LEN;
                let entries: Vec<_> = (0..BATCH_LEN)
                    .map(|i| entry(base + i, base + i, thread_id))
                    .collect();
                log.append(&entries).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let entries = log.read_all().unwrap();
    assert_eq!(
        entries.len(),
        (THREADS as i64 * BATCHES_PER_THREAD * BATCH_LEN) as usize
    );

    // Batches must be contiguous: one thread's batch never interleaves with
    // another's, and offsets inside a batch are consecutive.
    for batch in entries.chunks(BATCH_LEN as usize) {
        let partition = batch[0].partition;
        let base = batch[0].offset;
        for (i, e) in batch.iter().enumerate() {
            assert_eq!(e.partition, partition);
            assert_eq!(e.offset, base + i as i64);
        }
    }
}

/// Destroy races an appending thread: the lock serializes them, the appender
/// observes the terminal state, and the file is gone afterwards.
#[test]
fn test_destroy_races_appender() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("orders-seg2.updlog");
    let provider = SegmentUpdateLogProvider::default();

    let log = Arc::new(
        provider
            .acquire_for_mutable_segment("orders", "seg2", &path)
            .unwrap(),
    );

    let appender = {
        let log = Arc::clone(&log);
        thread::spawn(move || loop {
            match log.append(&[entry(1, 1, 0)]) {
                Ok(()) => {}
                Err(Error::Destroyed { .. }) => break,
                Err(e) => panic!("unexpected append error: {}", e),
            }
        })
    };

    thread::sleep(Duration::from_millis(20));
    log.destroy().unwrap();
    appender.join().unwrap();

    assert!(!path.exists());
    assert!(matches!(log.read_all(), Err(Error::Destroyed { .. })));
}

/// A log opened directly (without the provider) behaves identically for the
/// core operations.
#[test]
fn test_direct_open_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("direct.updlog");
    fs::File::create(&path).unwrap();

    let log = SegmentUpdateLog::open(&path).unwrap();
    assert_eq!(log.read_all().unwrap(), vec![]);

    let batch = vec![entry(10, -1, 2), entry(11, -2, 2)];
    log.append(&batch).unwrap();
    assert_eq!(log.read_all().unwrap(), batch);
    assert_eq!(log.path(), path.as_path());
}
