//! Store
//!
//! Append-only file of length-prefixed frames.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{LogError, Result};

use super::LEN_WIDTH;

/// Append-only record store
///
/// ## Concurrency:
/// - The buffered writer and the size counter live behind one Mutex
/// - Every operation (append, read, read_at, close) takes that Mutex
/// - Reads flush the buffer first, so they observe every prior append
pub struct Store {
    /// Path of the backing file (for naming and removal)
    path: PathBuf,
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    /// Buffered writer over the backing file, opened in append mode
    writer: BufWriter<File>,
    /// Bytes written so far, buffered ones included
    size: u64,
    closed: bool,
}

impl StoreInner {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(LogError::Closed);
        }
        Ok(())
    }

    /// Flush, seek, and fill `buf` from the file, stopping early only at EOF
    fn read_at(&mut self, buf: &mut [u8], position: u64) -> Result<usize> {
        self.writer.flush()?;
        let file = self.writer.get_mut();
        file.seek(SeekFrom::Start(position))?;

        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled)
    }
}

impl Store {
    /// Create a store over an already opened file
    ///
    /// The file must be readable and opened in append mode. Its current
    /// length becomes the store size.
    pub fn new(file: File, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let size = file.metadata()?.len();
        debug!(path = %path.display(), size, "opened store");

        Ok(Self {
            path,
            inner: Mutex::new(StoreInner {
                writer: BufWriter::new(file),
                size,
                closed: false,
            }),
        })
    }

    /// Append one frame holding `data`
    ///
    /// Returns `(bytes_written, position)`: the frame size including its
    /// length prefix, and the position the frame starts at.
    pub fn append(&self, data: &[u8]) -> Result<(u64, u64)> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;

        let position = inner.size;
        inner.writer.write_all(&(data.len() as u64).to_be_bytes())?;
        inner.writer.write_all(data)?;

        let written = LEN_WIDTH + data.len() as u64;
        inner.size += written;
        trace!(position, written, "appended frame");

        Ok((written, position))
    }

    /// Read the payload of the frame starting at `position`
    pub fn read(&self, position: u64) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;

        if position + LEN_WIDTH > inner.size {
            return Err(LogError::EndOfData { position });
        }

        let mut header = [0u8; LEN_WIDTH as usize];
        if inner.read_at(&mut header, position)? < header.len() {
            return Err(LogError::EndOfData { position });
        }
        let len = u64::from_be_bytes(header);

        let start = position + LEN_WIDTH;
        if start + len > inner.size {
            return Err(LogError::EndOfData { position });
        }

        let mut data = vec![0u8; len as usize];
        if inner.read_at(&mut data, start)? < data.len() {
            return Err(LogError::EndOfData { position });
        }
        trace!(position, len, "read frame");

        Ok(data)
    }

    /// Raw positional read into `buf`; returns the number of bytes read
    ///
    /// Returns fewer than `buf.len()` bytes only when the end of the store
    /// is reached, and 0 when `offset` is at or past the end.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;
        inner.read_at(buf, offset)
    }

    /// Flush buffered frames and fsync the file. Idempotent.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Ok(());
        }

        inner.writer.flush()?;
        inner.writer.get_ref().sync_all()?;
        inner.closed = true;
        debug!(path = %self.path.display(), size = inner.size, "closed store");

        Ok(())
    }

    /// Current size in bytes, buffered frames included
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
