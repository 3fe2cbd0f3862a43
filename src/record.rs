//! Records and the codec seam
//!
//! The storage layer persists opaque bytes. A [`RecordCodec`] turns a
//! [`Record`] into those bytes and back.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single logical record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque payload
    pub value: Vec<u8>,

    /// Caller-supplied offset carried alongside the payload
    pub offset: u64,
}

impl Record {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            offset: 0,
        }
    }

    pub fn with_offset(value: impl Into<Vec<u8>>, offset: u64) -> Self {
        Self {
            value: value.into(),
            offset,
        }
    }
}

/// Serializes records to and from the bytes a store frame holds
pub trait RecordCodec: Send + Sync {
    fn encode(&self, record: &Record) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<Record>;
}

/// Bincode encoding of the whole record (payload and offset)
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl RecordCodec for BincodeCodec {
    fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        Ok(bincode::serialize(record)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Record> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Stores the payload bytes only.
///
/// The record's `offset` field is not persisted; decoded records carry 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl RecordCodec for RawCodec {
    fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        Ok(record.value.clone())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Record> {
        Ok(Record::new(bytes))
    }
}
