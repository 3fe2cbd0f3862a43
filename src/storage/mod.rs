//! Storage Module
//!
//! On-disk building blocks of the log: one segment = one store file + one
//! index file sharing a base offset.
//!
//! ## Responsibilities
//! - Persist record bytes in append-only, length-prefixed frames
//! - Map relative offsets to frame positions through a memory-mapped index
//! - Translate absolute offsets and report when a segment is full
//!
//! ## Directory Layout
//! ```text
//! {log_dir}/
//!   ├── 0.store      0.index
//!   ├── 12.store     12.index
//!   └── ...          (one pair per segment, named by base offset)
//! ```
//!
//! ## Store File Format
//! ```text
//! ┌──────────────────┬─────────────────────────┐
//! │ Length: u64 BE   │ Payload (Length bytes)  │  ← frame at position 0
//! ├──────────────────┼─────────────────────────┤
//! │ Length: u64 BE   │ Payload (Length bytes)  │  ← frame at position 8 + len0
//! └──────────────────┴─────────────────────────┘
//! ```
//! No header, no footer, no checksum.
//!
//! ## Index File Format
//! ```text
//! ┌─────────────────────┬──────────────────┐
//! │ RelOffset: u32 BE   │ Position: u64 BE │  ← entry 0 (12 bytes)
//! ├─────────────────────┼──────────────────┤
//! │ RelOffset: u32 BE   │ Position: u64 BE │  ← entry 1
//! ├─────────────────────┴──────────────────┤
//! │ unused slack up to max_index_bytes     │  ← only while open
//! └────────────────────────────────────────┘
//! ```

mod index;
mod segment;
mod store;

use std::path::{Path, PathBuf};

pub use index::Index;
pub use segment::Segment;
pub use store::Store;

// =============================================================================
// Shared Constants
// =============================================================================

/// Width of the big-endian length prefix in front of every store frame
pub const LEN_WIDTH: u64 = 8;

/// Width of the relative offset field of an index entry
pub const OFFSET_WIDTH: u64 = 4;

/// Width of the store position field of an index entry
pub const POSITION_WIDTH: u64 = 8;

/// Width of one index entry
pub const ENTRY_WIDTH: u64 = OFFSET_WIDTH + POSITION_WIDTH;

pub const STORE_FILE_EXTENSION: &str = "store";
pub const INDEX_FILE_EXTENSION: &str = "index";

// =============================================================================
// File Naming
// =============================================================================

/// "{dir}/{base_offset}.store"
pub fn store_path(dir: &Path, base_offset: u64) -> PathBuf {
    dir.join(format!("{}.{}", base_offset, STORE_FILE_EXTENSION))
}

/// "{dir}/{base_offset}.index"
pub fn index_path(dir: &Path, base_offset: u64) -> PathBuf {
    dir.join(format!("{}.{}", base_offset, INDEX_FILE_EXTENSION))
}

/// Parse the base offset from a store file name
/// "42.store" → Some(42), "42.index" → None, "x.store" → None
pub fn parse_base_offset(path: &Path) -> Option<u64> {
    if path.extension()? != STORE_FILE_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}
