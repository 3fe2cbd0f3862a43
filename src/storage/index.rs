//! Index
//!
//! Fixed-width, memory-mapped table from relative offset to store position.
//!
//! The backing file is grown to its full capacity before it is mapped,
//! because a mapping cannot grow afterwards. On close the file is cut back
//! to the bytes actually used, so on reopen the file length is the used
//! size again.

use std::fs::File;
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut};
use memmap2::MmapMut;
use tracing::{debug, trace, warn};

use crate::error::{LogError, Result};

use super::ENTRY_WIDTH;

/// Memory-mapped offset index
///
/// No internal lock: writes need `&mut self`, so callers serialize them
/// (the log holds its write lock around every append).
pub struct Index {
    path: PathBuf,
    file: File,
    /// `None` once torn down
    mmap: Option<MmapMut>,
    /// Bytes of the mapping holding written entries
    size: u64,
    /// Length of the mapping
    capacity: u64,
}

impl Index {
    /// Create an index over an opened, read/write file
    ///
    /// The current file length is taken as the used size; the file is then
    /// resized to exactly `max_bytes` and mapped.
    pub fn new(file: File, path: impl Into<PathBuf>, max_bytes: u64) -> Result<Self> {
        let path = path.into();

        if max_bytes < ENTRY_WIDTH {
            return Err(LogError::Config(format!(
                "index capacity of {} bytes cannot hold a single entry",
                max_bytes
            )));
        }

        let persisted = file.metadata()?.len();
        if persisted > max_bytes {
            return Err(LogError::Config(format!(
                "index {} holds {} bytes, more than the configured capacity of {}",
                path.display(),
                persisted,
                max_bytes
            )));
        }

        let size = persisted - persisted % ENTRY_WIDTH;
        if size != persisted {
            warn!(
                path = %path.display(),
                persisted,
                "index size is not a whole number of entries; ignoring the tail"
            );
        }

        file.set_len(max_bytes)?;

        // SAFETY: the file is owned by this index for its whole lifetime and
        // is never resized while mapped; teardown drops the map before
        // truncating.
        let mmap = match unsafe { MmapMut::map_mut(&file) } {
            Ok(mmap) => mmap,
            Err(e) => {
                if let Err(restore) = file.set_len(persisted) {
                    warn!(path = %path.display(), error = %restore, "failed to restore index length");
                }
                return Err(e.into());
            }
        };

        debug!(path = %path.display(), size, capacity = max_bytes, "mapped index");

        Ok(Self {
            path,
            file,
            mmap: Some(mmap),
            size,
            capacity: max_bytes,
        })
    }

    /// Read entry `n`: `(relative_offset, position)`
    pub fn read(&self, n: u32) -> Result<(u32, u64)> {
        let mmap = self.mmap.as_ref().ok_or(LogError::Closed)?;

        let start = n as u64 * ENTRY_WIDTH;
        if start + ENTRY_WIDTH > self.size {
            return Err(LogError::EndOfData { position: start });
        }

        let mut entry = &mmap[start as usize..(start + ENTRY_WIDTH) as usize];
        let relative_offset = entry.get_u32();
        let position = entry.get_u64();

        Ok((relative_offset, position))
    }

    /// Read the most recently written entry
    pub fn read_last(&self) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(LogError::IndexEmpty);
        }
        self.read((self.size / ENTRY_WIDTH - 1) as u32)
    }

    /// Append an entry after the last written one
    pub fn write(&mut self, relative_offset: u32, position: u64) -> Result<()> {
        if self.is_full() {
            return Err(LogError::IndexFull {
                capacity: self.capacity,
            });
        }
        let mmap = self.mmap.as_mut().ok_or(LogError::Closed)?;

        let start = self.size as usize;
        let mut slot = &mut mmap[start..start + ENTRY_WIDTH as usize];
        slot.put_u32(relative_offset);
        slot.put_u64(position);

        self.size += ENTRY_WIDTH;
        trace!(relative_offset, position, size = self.size, "wrote index entry");

        Ok(())
    }

    /// Sync the mapping, fsync the file, and truncate it to the used size.
    /// Idempotent; also run from `Drop` when not called explicitly.
    pub fn close(&mut self) -> Result<()> {
        let Some(mmap) = self.mmap.take() else {
            return Ok(());
        };

        mmap.flush()?;
        drop(mmap);

        self.file.sync_all()?;
        self.file.set_len(self.size)?;
        debug!(path = %self.path.display(), size = self.size, "closed index");

        Ok(())
    }

    /// True when one more entry would exceed the mapped capacity
    pub fn is_full(&self) -> bool {
        self.size + ENTRY_WIDTH > self.capacity
    }

    /// Bytes used by written entries
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of written entries
    pub fn entry_count(&self) -> u64 {
        self.size / ENTRY_WIDTH
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Index {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "index teardown failed");
        }
    }
}
