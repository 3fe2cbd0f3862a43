//! # commitlog
//!
//! A segmented, append-only commit log with:
//! - Monotonic 64-bit offsets assigned on append
//! - Random-access reads by offset through memory-mapped indexes
//! - Segment rotation bounding per-file size
//! - Restart recovery from the files in the log directory
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                            Log                               │
//! │        (RwLock: exclusive append/truncate, shared read)      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  routes by offset
//!          ┌────────────┼────────────┬─────────────────┐
//!          ▼            ▼            ▼                 ▼
//!   ┌───────────┐ ┌───────────┐ ┌───────────┐   ┌───────────┐
//!   │ Segment 0 │ │ Segment 12│ │    ...    │   │  Active   │
//!   └─────┬─────┘ └───────────┘ └───────────┘   └───────────┘
//!         │
//!    ┌────┴──────────────┐
//!    ▼                   ▼
//! ┌─────────────┐  ┌─────────────┐
//! │    Store    │  │    Index    │
//! │ (0.store)   │  │ (0.index)   │
//! │ len+payload │  │ mmap, 12B   │
//! └─────────────┘  └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod log;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LogError, Result};
pub use config::{Config, SegmentConfig};
pub use record::{BincodeCodec, RawCodec, Record, RecordCodec};
pub use log::{Log, LogReader};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of commitlog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
