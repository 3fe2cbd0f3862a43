//! Tests for concurrent readers alongside a single writer

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use commitlog::{Config, Log, Record};

use crate::setup_temp_dir;

const RECORDS: u64 = 300;

fn payload(offset: u64) -> Vec<u8> {
    format!("record-{}", offset).into_bytes()
}

#[test]
fn test_readers_see_consistent_records_during_appends() {
    let (_temp, path) = setup_temp_dir();
    let config = Config::builder().max_store_bytes(256).max_index_bytes(120).build();
    let log = Log::open(&path, config).unwrap();
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..RECORDS {
                let offset = log.append(&Record::new(payload(i))).unwrap();
                assert_eq!(offset, i);
            }
            done.store(true, Ordering::Release);
        });

        for reader in 0..4u64 {
            let log = &log;
            let done = &done;
            s.spawn(move || {
                let mut reads = 0u64;
                while !done.load(Ordering::Acquire) || reads == 0 {
                    let (lowest, highest) = log.offset_range();
                    if highest == lowest {
                        thread::yield_now();
                        continue;
                    }
                    let offset = lowest + (reads * 31 + reader) % (highest - lowest);
                    assert_eq!(log.read(offset).unwrap().value, payload(offset));
                    reads += 1;
                }
            });
        }
    });

    assert_eq!(log.offset_range(), (0, RECORDS));
    assert!(log.segment_count() > 1);
}

#[test]
fn test_concurrent_writers_get_distinct_offsets() {
    let (_temp, path) = setup_temp_dir();
    let config = Config::builder().max_store_bytes(512).build();
    let log = Log::open(&path, config).unwrap();

    let mut offsets: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    (0..50)
                        .map(|_| log.append(&Record::new(b"x".to_vec())).unwrap())
                        .collect::<Vec<u64>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    offsets.sort_unstable();
    let expected: Vec<u64> = (0..200).collect();
    assert_eq!(offsets, expected);
}
