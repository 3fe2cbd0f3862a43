//! Configuration for commitlog
//!
//! Centralized configuration with sensible defaults.

use crate::error::{LogError, Result};
use crate::storage::ENTRY_WIDTH;

/// Rotation threshold applied when a size limit is left unset (zero)
pub const DEFAULT_MAX_BYTES: u64 = 1024;

/// Main configuration for a log instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Per-segment limits and the offset of the very first segment
    pub segment: SegmentConfig,
}

/// Segment sizing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentConfig {
    /// Rotate once the store file reaches this many bytes
    pub max_store_bytes: u64,

    /// Index capacity in bytes; bounds a segment to `max_index_bytes / 12` records
    pub max_index_bytes: u64,

    /// Base offset of the first segment of a brand-new log
    pub initial_offset: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: DEFAULT_MAX_BYTES,
            max_index_bytes: DEFAULT_MAX_BYTES,
            initial_offset: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Replace unset (zero) size limits with their defaults
    pub fn normalized(mut self) -> Self {
        if self.segment.max_store_bytes == 0 {
            self.segment.max_store_bytes = DEFAULT_MAX_BYTES;
        }
        if self.segment.max_index_bytes == 0 {
            self.segment.max_index_bytes = DEFAULT_MAX_BYTES;
        }
        self
    }

    /// Reject limits that cannot hold a single index entry
    pub fn validate(&self) -> Result<()> {
        if self.segment.max_index_bytes < ENTRY_WIDTH {
            return Err(LogError::Config(format!(
                "max_index_bytes must be at least {} bytes, got {}",
                ENTRY_WIDTH, self.segment.max_index_bytes
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store rotation threshold (in bytes)
    pub fn max_store_bytes(mut self, bytes: u64) -> Self {
        self.config.segment.max_store_bytes = bytes;
        self
    }

    /// Set the index capacity (in bytes)
    pub fn max_index_bytes(mut self, bytes: u64) -> Self {
        self.config.segment.max_index_bytes = bytes;
        self
    }

    /// Set the base offset of the first segment
    pub fn initial_offset(mut self, offset: u64) -> Self {
        self.config.segment.initial_offset = offset;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
