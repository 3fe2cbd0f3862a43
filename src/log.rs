//! Log Module
//!
//! The commit log that coordinates all segments.
//!
//! ## Responsibilities
//! - Rebuild the segment list from the directory on startup
//! - Route appends to the active (newest) segment and rotate when it is full
//! - Route reads to the segment covering an offset
//! - Drop whole segments from the front on truncation

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{LogError, Result};
use crate::record::{BincodeCodec, Record, RecordCodec};
use crate::storage::{self, Segment};

/// Segmented, append-only commit log
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader
///
/// - **Writes** (append/truncate/close/remove/reset): exclusive `segments` lock
///   - Index writes rely on this lock; the index itself has none
///
/// - **Reads** (read/offset_range/reader): shared `segments` lock
///   - Store reads still serialize on each store's own Mutex
///
/// ## Resources:
/// Every segment keeps its files open and its index mapped for the lifetime
/// of the log, so descriptors and mapped memory grow with segment count.
///
/// ## Durability:
/// Data is fsynced only on close; whatever the OS has not written back is
/// lost on a crash.
pub struct Log {
    /// Directory holding every `<base>.store` / `<base>.index` pair
    dir: PathBuf,

    /// Normalized configuration
    config: Config,

    codec: Arc<dyn RecordCodec>,

    /// Segments ordered by base offset; the last one is active
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Open or create a log in `dir` using bincode-encoded records
    pub fn open(dir: impl AsRef<Path>, config: Config) -> Result<Self> {
        Self::with_codec(dir, config, BincodeCodec)
    }

    /// Open or create a log in `dir` with a custom record codec
    ///
    /// On startup:
    /// 1. Normalize and validate the config
    /// 2. Create the directory if it doesn't exist
    /// 3. Rebuild segments from the files found there
    pub fn with_codec(
        dir: impl AsRef<Path>,
        config: Config,
        codec: impl RecordCodec + 'static,
    ) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;

        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let codec: Arc<dyn RecordCodec> = Arc::new(codec);
        let segments = Self::bootstrap(&dir, &config, &codec)?;

        Ok(Self {
            dir,
            config,
            codec,
            segments: RwLock::new(segments),
        })
    }

    /// Append a record; returns the offset it was stored at
    ///
    /// If the active segment is full afterwards, a new segment starting at
    /// `offset + 1` becomes active. A failed rotation is reported as an
    /// error even though the record itself was stored.
    pub fn append(&self, record: &Record) -> Result<u64> {
        let mut segments = self.segments.write();

        // A full segment can be left active by a failed rotation or by a
        // restart with smaller limits.
        if Self::active(&segments)?.is_maxed() {
            let base_offset = Self::active(&segments)?.next_offset();
            self.rotate(&mut segments, base_offset)?;
        }

        let active = segments.last_mut().ok_or(LogError::Closed)?;
        let offset = active.append(record)?;

        if active.is_maxed() {
            self.rotate(&mut segments, offset + 1)?;
        }

        Ok(offset)
    }

    /// Read the record stored at `offset`
    pub fn read(&self, offset: u64) -> Result<Record> {
        let segments = self.segments.read();

        // Search newest → oldest
        segments
            .iter()
            .rev()
            .find(|segment| segment.contains(offset))
            .ok_or(LogError::OffsetOutOfRange(offset))?
            .read(offset)
    }

    /// `(lowest, highest)`: the first segment's base offset and the active
    /// segment's next offset (one past the last stored record)
    pub fn offset_range(&self) -> (u64, u64) {
        let segments = self.segments.read();
        match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first.base_offset(), last.next_offset()),
            _ => {
                let initial = self.config.segment.initial_offset;
                (initial, initial)
            }
        }
    }

    /// Lowest offset still held by the log
    pub fn lowest_offset(&self) -> u64 {
        self.offset_range().0
    }

    /// One past the highest stored offset
    pub fn highest_offset(&self) -> u64 {
        self.offset_range().1
    }

    /// Remove every segment whose records all lie at or below `offset`
    ///
    /// Two phases: decide which segments survive, refuse if none would,
    /// and only then delete files. A rejected truncate changes nothing. If a
    /// deletion fails, that segment and every later one stay in the log.
    pub fn truncate(&self, offset: u64) -> Result<()> {
        let mut segments = self.segments.write();
        let cutoff = offset.saturating_add(1);

        if !segments.iter().any(|segment| segment.next_offset() > cutoff) {
            return Err(LogError::TruncateWouldEmptyLog { offset });
        }

        // Removable segments form a prefix; each one leaves the list only
        // after its files are gone.
        let mut removed = 0;
        while let Some(segment) = segments.first_mut() {
            if segment.next_offset() > cutoff {
                break;
            }
            segment.remove()?;
            segments.remove(0);
            removed += 1;
        }

        info!(offset, removed, "truncated log");
        Ok(())
    }

    /// Close every segment in order, stopping at the first error
    pub fn close(&self) -> Result<()> {
        let mut segments = self.segments.write();
        Self::close_segments(&mut segments)
    }

    /// Close the log and delete its directory
    pub fn remove(&self) -> Result<()> {
        let mut segments = self.segments.write();
        self.remove_locked(&mut segments)
    }

    /// Remove the log, then bootstrap a fresh one in the same directory
    pub fn reset(&self) -> Result<()> {
        let mut segments = self.segments.write();
        self.remove_locked(&mut segments)?;

        fs::create_dir_all(&self.dir)?;
        *segments = Self::bootstrap(&self.dir, &self.config, &self.codec)?;
        info!(dir = %self.dir.display(), "reset log");

        Ok(())
    }

    /// Raw bytes of every store, oldest segment first
    ///
    /// Holds the shared lock until the reader is dropped, so appends block
    /// meanwhile.
    pub fn reader(&self) -> LogReader<'_> {
        LogReader {
            segments: self.segments.read(),
            segment: 0,
            position: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn segment_count(&self) -> usize {
        self.segments.read().len()
    }

    /// Base offsets of all segments, ascending
    pub fn segment_base_offsets(&self) -> Vec<u64> {
        self.segments.read().iter().map(Segment::base_offset).collect()
    }

    pub fn active_base_offset(&self) -> Option<u64> {
        self.segments.read().last().map(Segment::base_offset)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Rebuild the segment list from `dir`
    ///
    /// 1. Collect base offsets from `*.store` names (index files are skipped
    ///    so each pair is counted once)
    /// 2. Sort ascending and open one segment per base offset
    /// 3. With no store files at all, create one segment at the initial offset
    fn bootstrap(dir: &Path, config: &Config, codec: &Arc<dyn RecordCodec>) -> Result<Vec<Segment>> {
        let mut base_offsets: Vec<u64> = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |ext| ext != storage::STORE_FILE_EXTENSION) {
                continue;
            }

            match storage::parse_base_offset(&path) {
                Some(base_offset) => base_offsets.push(base_offset),
                None => warn!(path = %path.display(), "skipping store file with unparsable name"),
            }
        }

        base_offsets.sort_unstable();

        if base_offsets.is_empty() {
            base_offsets.push(config.segment.initial_offset);
        }

        let segments = base_offsets
            .into_iter()
            .map(|base_offset| Segment::new(dir, base_offset, config.segment, Arc::clone(codec)))
            .collect::<Result<Vec<_>>>()?;

        info!(
            dir = %dir.display(),
            segments = segments.len(),
            next_offset = segments.last().map(Segment::next_offset),
            "bootstrapped log"
        );

        Ok(segments)
    }

    fn active(segments: &[Segment]) -> Result<&Segment> {
        segments.last().ok_or(LogError::Closed)
    }

    fn rotate(&self, segments: &mut Vec<Segment>, base_offset: u64) -> Result<()> {
        let segment = Segment::new(&self.dir, base_offset, self.config.segment, Arc::clone(&self.codec))?;
        info!(base_offset, "rotated to new segment");
        segments.push(segment);
        Ok(())
    }

    fn close_segments(segments: &mut [Segment]) -> Result<()> {
        for segment in segments.iter_mut() {
            segment.close()?;
        }
        Ok(())
    }

    fn remove_locked(&self, segments: &mut Vec<Segment>) -> Result<()> {
        Self::close_segments(segments)?;
        fs::remove_dir_all(&self.dir)?;
        segments.clear();
        info!(dir = %self.dir.display(), "removed log");
        Ok(())
    }
}

/// Sequential reader over the raw store bytes of a log
pub struct LogReader<'a> {
    segments: RwLockReadGuard<'a, Vec<Segment>>,
    /// Index into `segments` of the store being read
    segment: usize,
    /// Position within that store
    position: u64,
}

impl io::Read for LogReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while let Some(segment) = self.segments.get(self.segment) {
            let n = segment
                .store()
                .read_at(buf, self.position)
                .map_err(|e| match e {
                    LogError::Io(e) => e,
                    other => io::Error::new(io::ErrorKind::Other, other),
                })?;

            if n > 0 {
                self.position += n as u64;
                return Ok(n);
            }

            debug!(base_offset = segment.base_offset(), "reader finished segment");
            self.segment += 1;
            self.position = 0;
        }

        Ok(0)
    }
}
