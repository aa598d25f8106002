//! # Checkpoint Wire Format
//!
//! Fixed-layout, little-endian encoding of a [`SyncPntCheckpoint`].
//!
//! **Layout**:
//! ```text
//!   header   magic "FTSP" (4) | version u16 | list count u32
//!   list     name length u16 | name UTF-8 | record count u32
//!   record   kind u8 (0 plain, 1 timed) | label [u8; 128] | state i32 | [time i64]
//! ```
//!
//! A plain record is 133 bytes, a timed record 141 bytes. Decoding is
//! strict: trailing bytes, unknown kinds and unknown versions are errors.

use crate::domain::rendezvous::{ListCheckpoint, SyncPntCheckpoint};
use crate::domain::sync::{LoggableRecord, LoggableSyncPnt, LoggableTimedSyncPnt, LABEL_CAPACITY};

/// File magic.
pub const CHECKPOINT_MAGIC: [u8; 4] = *b"FTSP";

/// Current format version.
pub const CHECKPOINT_VERSION: u16 = 1;

const KIND_PLAIN: u8 = 0;
const KIND_TIMED: u8 = 1;

/// Encoded size of a plain record.
pub const PLAIN_RECORD_LEN: usize = 1 + LABEL_CAPACITY + 4;

/// Encoded size of a timed record.
pub const TIMED_RECORD_LEN: usize = PLAIN_RECORD_LEN + 8;

/// Checkpoint encoding and decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckpointError {
    /// Input ended early.
    #[error("checkpoint truncated at byte {offset}: {needed} more bytes needed")]
    Truncated {
        /// Read position
        offset: usize,
        /// Bytes missing
        needed: usize,
    },

    /// Not a checkpoint.
    #[error("bad checkpoint magic {0:?}")]
    BadMagic([u8; 4]),

    /// Written by an unknown format version.
    #[error("unsupported checkpoint version {0}")]
    UnsupportedVersion(u16),

    /// Unknown record discriminant.
    #[error("unknown record kind {kind} at byte {offset}")]
    UnknownKind {
        /// Discriminant found
        kind: u8,
        /// Position of the discriminant
        offset: usize,
    },

    /// List name is not UTF-8.
    #[error("list name at byte {0} is not UTF-8")]
    InvalidListName(usize),

    /// Bytes left over after the last list.
    #[error("{0} trailing bytes after checkpoint")]
    TrailingBytes(usize),

    /// A count or name does not fit its length field.
    #[error("{0} too large for the checkpoint format")]
    TooLarge(&'static str),
}

/// Encode a checkpoint.
///
/// # Errors
/// [`CheckpointError::TooLarge`] if a list name exceeds `u16::MAX` bytes or
/// a count exceeds `u32::MAX`.
pub fn encode(checkpoint: &SyncPntCheckpoint) -> Result<Vec<u8>, CheckpointError> {
    let mut out = Vec::with_capacity(10 + checkpoint.record_count() * TIMED_RECORD_LEN);
    out.extend_from_slice(&CHECKPOINT_MAGIC);
    out.extend_from_slice(&CHECKPOINT_VERSION.to_le_bytes());
    out.extend_from_slice(&count_u32(checkpoint.lists.len(), "list count")?.to_le_bytes());

    for list in &checkpoint.lists {
        let name_len = u16::try_from(list.name.len()).map_err(|_| CheckpointError::TooLarge("list name"))?;
        out.extend_from_slice(&name_len.to_le_bytes());
        out.extend_from_slice(list.name.as_bytes());
        out.extend_from_slice(&count_u32(list.records.len(), "record count")?.to_le_bytes());

        for record in &list.records {
            match record {
                LoggableRecord::Plain(r) => {
                    out.push(KIND_PLAIN);
                    out.extend_from_slice(&r.label);
                    out.extend_from_slice(&r.state.to_le_bytes());
                }
                LoggableRecord::Timed(r) => {
                    out.push(KIND_TIMED);
                    out.extend_from_slice(&r.label);
                    out.extend_from_slice(&r.state.to_le_bytes());
                    out.extend_from_slice(&r.time.to_le_bytes());
                }
            }
        }
    }
    Ok(out)
}

fn count_u32(count: usize, what: &'static str) -> Result<u32, CheckpointError> {
    u32::try_from(count).map_err(|_| CheckpointError::TooLarge(what))
}

/// Decode a checkpoint.
///
/// # Errors
/// Any [`CheckpointError`] describing the first malformed byte range.
pub fn decode(bytes: &[u8]) -> Result<SyncPntCheckpoint, CheckpointError> {
    let mut reader = Reader { bytes, offset: 0 };

    let magic = reader.array::<4>()?;
    if magic != CHECKPOINT_MAGIC {
        return Err(CheckpointError::BadMagic(magic));
    }
    let version = u16::from_le_bytes(reader.array()?);
    if version != CHECKPOINT_VERSION {
        return Err(CheckpointError::UnsupportedVersion(version));
    }

    let list_count = u32::from_le_bytes(reader.array()?);
    // each list needs at least 6 bytes; don't trust the count for capacity
    let mut lists = Vec::with_capacity((list_count as usize).min(reader.remaining() / 6));
    for _ in 0..list_count {
        let name_len = u16::from_le_bytes(reader.array()?) as usize;
        let name_offset = reader.offset;
        let name = std::str::from_utf8(reader.take(name_len)?)
            .map_err(|_| CheckpointError::InvalidListName(name_offset))?
            .to_owned();

        let record_count = u32::from_le_bytes(reader.array()?);
        let mut records = Vec::with_capacity((record_count as usize).min(reader.remaining() / PLAIN_RECORD_LEN));
        for _ in 0..record_count {
            records.push(reader.record()?);
        }
        lists.push(ListCheckpoint { name, records });
    }

    if reader.remaining() > 0 {
        return Err(CheckpointError::TrailingBytes(reader.remaining()));
    }
    Ok(SyncPntCheckpoint { lists })
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CheckpointError> {
        if self.remaining() < len {
            return Err(CheckpointError::Truncated {
                offset: self.offset,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CheckpointError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn record(&mut self) -> Result<LoggableRecord, CheckpointError> {
        let kind_offset = self.offset;
        let [kind] = self.array::<1>()?;
        let label = self.array::<LABEL_CAPACITY>()?;
        let state = i32::from_le_bytes(self.array()?);
        match kind {
            KIND_PLAIN => Ok(LoggableRecord::Plain(LoggableSyncPnt { label, state })),
            KIND_TIMED => {
                let time = i64::from_le_bytes(self.array()?);
                Ok(LoggableRecord::Timed(LoggableTimedSyncPnt { label, state, time }))
            }
            kind => Err(CheckpointError::UnknownKind {
                kind,
                offset: kind_offset,
            }),
        }
    }
}
