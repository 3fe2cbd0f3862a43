//! Error types for commitlog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LogError
pub type Result<T> = std::result::Result<T, LogError>;

/// Unified error type for commit log operations
#[derive(Debug, Error)]
pub enum LogError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store / Index Errors
    // -------------------------------------------------------------------------
    /// Read past the written prefix of a store or index
    #[error("End of data: nothing written at position {position}")]
    EndOfData { position: u64 },

    /// The index cannot hold another entry; the segment must rotate
    #[error("Index full: capacity of {capacity} bytes exhausted")]
    IndexFull { capacity: u64 },

    /// The index holds no entries yet
    #[error("Index is empty")]
    IndexEmpty,

    /// The store or index has already been closed
    #[error("Closed: component has already been closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Segment / Log Errors
    // -------------------------------------------------------------------------
    #[error("Offset out of range: {0}")]
    OffsetOutOfRange(u64),

    #[error("Truncate to offset {offset} would remove every segment")]
    TruncateWouldEmptyLog { offset: u64 },

    #[error("Relative offset overflow: offset {offset} in segment {base_offset}")]
    RelativeOffsetOverflow { base_offset: u64, offset: u64 },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LogError {
    /// True for the "nothing here" family: a transport maps these to not-found
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LogError::EndOfData { .. } | LogError::IndexEmpty | LogError::OffsetOutOfRange(_)
        )
    }

    /// True when a segment has no room left for another record
    pub fn is_capacity_exhausted(&self) -> bool {
        matches!(self, LogError::IndexFull { .. })
    }
}

impl From<bincode::Error> for LogError {
    fn from(err: bincode::Error) -> Self {
        LogError::Serialization(err.to_string())
    }
}
