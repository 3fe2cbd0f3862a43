//! Segment
//!
//! One store and one index sharing a base offset.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::SegmentConfig;
use crate::error::{LogError, Result};
use crate::record::{Record, RecordCodec};

use super::{index_path, store_path, Index, Store};

/// A contiguous run of offsets `[base_offset, next_offset)`
pub struct Segment {
    store: Store,
    index: Index,
    base_offset: u64,
    /// Offset the next appended record receives
    next_offset: u64,
    config: SegmentConfig,
    codec: Arc<dyn RecordCodec>,
}

impl Segment {
    /// Open or create the segment files for `base_offset` inside `dir`
    ///
    /// `next_offset` is recovered from the last index entry, or equals
    /// `base_offset` when the index is empty.
    pub fn new(
        dir: &Path,
        base_offset: u64,
        config: SegmentConfig,
        codec: Arc<dyn RecordCodec>,
    ) -> Result<Self> {
        let store_path = store_path(dir, base_offset);
        let store_file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&store_path)?;

        let index_path = index_path(dir, base_offset);
        let index_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&index_path)?;

        let store = Store::new(store_file, store_path)?;
        let index = Index::new(index_file, index_path, config.max_index_bytes)?;

        let next_offset = match index.read_last() {
            Ok((relative_offset, _)) => base_offset + relative_offset as u64 + 1,
            Err(LogError::IndexEmpty) => base_offset,
            Err(e) => return Err(e),
        };

        debug!(base_offset, next_offset, "opened segment");

        Ok(Self {
            store,
            index,
            base_offset,
            next_offset,
            config,
            codec,
        })
    }

    /// Append a record; returns its absolute offset
    ///
    /// On error `next_offset` does not move.
    pub fn append(&mut self, record: &Record) -> Result<u64> {
        if self.index.is_full() {
            return Err(LogError::IndexFull {
                capacity: self.index.capacity(),
            });
        }

        let relative_offset = u32::try_from(self.next_offset - self.base_offset).map_err(|_| {
            LogError::RelativeOffsetOverflow {
                base_offset: self.base_offset,
                offset: self.next_offset,
            }
        })?;

        let data = self.codec.encode(record)?;
        let (_, position) = self.store.append(&data)?;
        self.index.write(relative_offset, position)?;

        let offset = self.next_offset;
        self.next_offset += 1;

        Ok(offset)
    }

    /// Read the record stored at absolute `offset`
    pub fn read(&self, offset: u64) -> Result<Record> {
        if offset < self.base_offset {
            return Err(LogError::OffsetOutOfRange(offset));
        }
        let relative_offset = u32::try_from(offset - self.base_offset)
            .map_err(|_| LogError::OffsetOutOfRange(offset))?;

        let (_, position) = self.index.read(relative_offset)?;
        let data = self.store.read(position)?;

        self.codec.decode(&data)
    }

    /// True when `offset` lies in `[base_offset, next_offset)`
    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.base_offset && offset < self.next_offset
    }

    /// True once the store reached its configured limit or the index cannot
    /// take another entry
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
            || self.index.is_full()
    }

    /// Close the index, then the store
    pub fn close(&mut self) -> Result<()> {
        self.index.close()?;
        self.store.close()?;
        Ok(())
    }

    /// Close the segment and delete both files
    ///
    /// The segment is left closed if a deletion fails.
    pub fn remove(&mut self) -> Result<()> {
        self.close()?;
        fs::remove_file(self.index.path())?;
        fs::remove_file(self.store.path())?;
        debug!(base_offset = self.base_offset, "removed segment");
        Ok(())
    }

    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn index(&self) -> &Index {
        &self.index
    }
}
