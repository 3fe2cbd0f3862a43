//! Tests for Index
//!
//! These tests verify:
//! - Empty-index errors for read and read_last
//! - Entry write/read through the memory map
//! - Capacity exhaustion without damage to existing entries
//! - Pre-sizing while open and truncation on close

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use commitlog::storage::{Index, ENTRY_WIDTH};
use commitlog::LogError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_index() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("0.index");
    (temp_dir, path)
}

fn open_file(path: &Path) -> File {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .unwrap()
}

fn open_index(path: &Path, max_bytes: u64) -> Index {
    Index::new(open_file(path), path, max_bytes).unwrap()
}

// =============================================================================
// Empty Index Tests
// =============================================================================

#[test]
fn test_read_last_on_empty_index() {
    let (_temp, path) = setup_temp_index();
    let index = open_index(&path, 1024);

    assert!(matches!(index.read_last(), Err(LogError::IndexEmpty)));
}

#[test]
fn test_read_on_empty_index() {
    let (_temp, path) = setup_temp_index();
    let index = open_index(&path, 1024);

    for n in [0, 1, 85] {
        let result = index.read(n);
        assert!(matches!(result, Err(LogError::EndOfData { .. })));
    }
}

// =============================================================================
// Write / Read Tests
// =============================================================================

#[test]
fn test_write_and_read_entries() {
    let (_temp, path) = setup_temp_index();
    let mut index = open_index(&path, 1024);

    let entries = [(0u32, 0u64), (1, 10), (2, 4_294_967_296)];
    for (offset, position) in entries {
        index.write(offset, position).unwrap();
    }

    for (n, (offset, position)) in entries.iter().enumerate() {
        assert_eq!(index.read(n as u32).unwrap(), (*offset, *position));
    }
    assert_eq!(index.read_last().unwrap(), entries[2]);
    assert_eq!(index.size(), 3 * ENTRY_WIDTH);
    assert_eq!(index.entry_count(), 3);

    // Entry 3 was never written
    assert!(matches!(index.read(3), Err(LogError::EndOfData { .. })));
}

#[test]
fn test_write_past_capacity_is_index_full() {
    let (_temp, path) = setup_temp_index();
    let mut index = open_index(&path, 3 * ENTRY_WIDTH);

    index.write(0, 0).unwrap();
    index.write(1, 19).unwrap();
    index.write(2, 38).unwrap();
    assert!(index.is_full());

    let err = index.write(3, 57).unwrap_err();
    assert!(err.is_capacity_exhausted());
    assert!(!err.is_not_found());

    // Existing entries are untouched
    assert_eq!(index.read(0).unwrap(), (0, 0));
    assert_eq!(index.read(1).unwrap(), (1, 19));
    assert_eq!(index.read_last().unwrap(), (2, 38));
}

#[test]
fn test_capacity_not_a_multiple_of_entry_width() {
    let (_temp, path) = setup_temp_index();
    let mut index = open_index(&path, 30);

    index.write(0, 0).unwrap();
    index.write(1, 1).unwrap();
    assert!(matches!(index.write(2, 2), Err(LogError::IndexFull { capacity: 30 })));
}

// =============================================================================
// File Size Tests
// =============================================================================

#[test]
fn test_file_is_presized_while_open() {
    let (_temp, path) = setup_temp_index();
    let _index = open_index(&path, 1024);

    assert_eq!(std::fs::metadata(&path).unwrap().len(), 1024);
}

#[test]
fn test_close_truncates_and_reopen_restores() {
    let (_temp, path) = setup_temp_index();

    {
        let mut index = open_index(&path, 1024);
        index.write(0, 0).unwrap();
        index.write(1, 19).unwrap();
        index.close().unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 2 * ENTRY_WIDTH);

        // Closed index refuses further use
        assert!(matches!(index.read(0), Err(LogError::Closed)));
    }

    let index = open_index(&path, 1024);
    assert_eq!(index.size(), 2 * ENTRY_WIDTH);
    assert_eq!(index.read_last().unwrap(), (1, 19));
}

#[test]
fn test_persisted_size_above_capacity_is_rejected() {
    let (_temp, path) = setup_temp_index();

    {
        let mut index = open_index(&path, 1024);
        for i in 0..4 {
            index.write(i, i as u64).unwrap();
        }
    }

    let result = Index::new(open_file(&path), &path, 2 * ENTRY_WIDTH);
    assert!(matches!(result, Err(LogError::Config(_))));
}

#[test]
fn test_capacity_below_one_entry_is_rejected() {
    let (_temp, path) = setup_temp_index();
    let result = Index::new(open_file(&path), &path, ENTRY_WIDTH - 1);
    assert!(matches!(result, Err(LogError::Config(_))));
}

#[test]
fn test_failed_mapping_restores_file_length() {
    let (_temp, path) = setup_temp_index();
    std::fs::write(&path, [0u8; 2 * ENTRY_WIDTH as usize]).unwrap();

    // A shared writable mapping needs read access, so mapping fails after
    // the file was already resized
    let write_only = OpenOptions::new().write(true).open(&path).unwrap();
    let result = Index::new(write_only, &path, 1024);

    assert!(matches!(result, Err(LogError::Io(_))));
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 2 * ENTRY_WIDTH);
}
