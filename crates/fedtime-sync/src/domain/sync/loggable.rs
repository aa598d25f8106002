//! Loggable Sync-Point Snapshots
//!
//! Plain data records written to a checkpoint and read back on restore.
//! Labels are stored in a fixed, NUL-padded UTF-8 buffer so every record
//! of a kind has the same size on disk.
//!
//! # Layout
//! ```text
//!   LoggableSyncPnt       label [u8; 128] | state i32
//!   LoggableTimedSyncPnt  label [u8; 128] | state i32 | time i64
//! ```
//!
//! The variant of [`LoggableRecord`] is the discriminant; conversion into a
//! record matches on it instead of inspecting the source's type at runtime.

use crate::domain::error::{SyncError, SyncResult};

use super::state::SyncPntState;

/// Size of the fixed label buffer, in bytes.
pub const LABEL_CAPACITY: usize = 128;

/// Check that a label fits the fixed buffer.
///
/// # Errors
/// [`SyncError::InvalidLabel`] for empty labels, labels longer than
/// [`LABEL_CAPACITY`] bytes, or labels containing NUL.
pub fn validate_label(label: &str) -> SyncResult<()> {
    let reason = if label.is_empty() {
        "label is empty"
    } else if label.len() > LABEL_CAPACITY {
        "label exceeds 128 bytes"
    } else if label.contains('\0') {
        "label contains NUL"
    } else {
        return Ok(());
    };
    Err(SyncError::InvalidLabel {
        label: label.to_owned(),
        reason,
    })
}

/// NUL-padded label buffer. Labels longer than the buffer are cut at the
/// last character boundary that fits.
pub fn encode_label(label: &str) -> [u8; LABEL_CAPACITY] {
    let mut buf = [0u8; LABEL_CAPACITY];
    let mut end = label.len().min(LABEL_CAPACITY);
    while !label.is_char_boundary(end) {
        end -= 1;
    }
    buf[..end].copy_from_slice(&label.as_bytes()[..end]);
    buf
}

/// Label stored in a NUL-padded buffer.
///
/// # Errors
/// [`SyncError::InvalidLabel`] if the bytes before the first NUL are not
/// UTF-8 or are empty.
pub fn decode_label(buf: &[u8; LABEL_CAPACITY]) -> SyncResult<String> {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(LABEL_CAPACITY);
    let label = std::str::from_utf8(&buf[..end]).map_err(|_| SyncError::InvalidLabel {
        label: String::from_utf8_lossy(&buf[..end]).into_owned(),
        reason: "label is not UTF-8",
    })?;
    validate_label(label)?;
    Ok(label.to_owned())
}

/// Snapshot of an untimed sync point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggableSyncPnt {
    /// NUL-padded UTF-8 label
    pub label: [u8; LABEL_CAPACITY],
    /// [`SyncPntState`] code
    pub state: i32,
}

impl Default for LoggableSyncPnt {
    fn default() -> Self {
        Self {
            label: [0; LABEL_CAPACITY],
            state: SyncPntState::Error.code(),
        }
    }
}

/// Snapshot of a timed sync point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggableTimedSyncPnt {
    /// NUL-padded UTF-8 label
    pub label: [u8; LABEL_CAPACITY],
    /// [`SyncPntState`] code
    pub state: i32,
    /// Freeze time in base-time ticks; zero when never set
    pub time: i64,
}

impl Default for LoggableTimedSyncPnt {
    fn default() -> Self {
        Self {
            label: [0; LABEL_CAPACITY],
            state: SyncPntState::Error.code(),
            time: 0,
        }
    }
}

/// A checkpoint record: plain or timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggableRecord {
    /// Untimed record
    Plain(LoggableSyncPnt),
    /// Timed record
    Timed(LoggableTimedSyncPnt),
}

impl LoggableRecord {
    /// Empty untimed record, ready to be converted into.
    pub fn plain() -> Self {
        LoggableRecord::Plain(LoggableSyncPnt::default())
    }

    /// Empty timed record, ready to be converted into.
    pub fn timed() -> Self {
        LoggableRecord::Timed(LoggableTimedSyncPnt::default())
    }

    /// `"plain"` or `"timed"`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LoggableRecord::Plain(_) => "plain",
            LoggableRecord::Timed(_) => "timed",
        }
    }

    /// True for the timed variant.
    pub fn is_timed(&self) -> bool {
        matches!(self, LoggableRecord::Timed(_))
    }

    /// Raw label buffer.
    pub fn label_bytes(&self) -> &[u8; LABEL_CAPACITY] {
        match self {
            LoggableRecord::Plain(r) => &r.label,
            LoggableRecord::Timed(r) => &r.label,
        }
    }

    /// Decoded label.
    ///
    /// # Errors
    /// See [`decode_label`].
    pub fn label(&self) -> SyncResult<String> {
        decode_label(self.label_bytes())
    }

    /// Raw state code.
    pub fn state_code(&self) -> i32 {
        match self {
            LoggableRecord::Plain(r) => r.state,
            LoggableRecord::Timed(r) => r.state,
        }
    }

    /// Decoded state.
    ///
    /// # Errors
    /// [`SyncError::InvalidStateCode`] for unknown codes.
    pub fn state(&self) -> SyncResult<SyncPntState> {
        let code = self.state_code();
        SyncPntState::from_code(code).ok_or(SyncError::InvalidStateCode(code))
    }

    /// Freeze time in ticks for timed records.
    pub fn time(&self) -> Option<i64> {
        match self {
            LoggableRecord::Plain(_) => None,
            LoggableRecord::Timed(r) => Some(r.time),
        }
    }
}

/// Outcome of converting a sync point into a loggable record.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// Every field of the source was carried over.
    Exact,
    /// The copy happened but lost information; the error describes what.
    Degraded(SyncError),
}

impl Conversion {
    /// True for [`Conversion::Exact`].
    pub fn is_exact(&self) -> bool {
        matches!(self, Conversion::Exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        let buf = encode_label("FREEZE");
        assert_eq!(&buf[..6], b"FREEZE");
        assert!(buf[6..].iter().all(|&b| b == 0));
        assert_eq!(decode_label(&buf).unwrap(), "FREEZE");
    }

    #[test]
    fn test_full_length_label() {
        let label = "x".repeat(LABEL_CAPACITY);
        let buf = encode_label(&label);
        assert_eq!(decode_label(&buf).unwrap(), label);
    }

    #[test]
    fn test_encode_cuts_on_char_boundary() {
        let label = format!("{}é", "a".repeat(LABEL_CAPACITY - 1));
        let buf = encode_label(&label);
        assert_eq!(decode_label(&buf).unwrap(), "a".repeat(LABEL_CAPACITY - 1));
    }

    #[test]
    fn test_validate_label() {
        assert!(validate_label("stop").is_ok());
        assert!(matches!(validate_label(""), Err(SyncError::InvalidLabel { .. })));
        assert!(validate_label(&"y".repeat(LABEL_CAPACITY + 1)).is_err());
        assert!(validate_label("a\0b").is_err());
    }

    #[test]
    fn test_decode_rejects_empty_and_bad_utf8() {
        assert!(decode_label(&[0; LABEL_CAPACITY]).is_err());
        let mut buf = [0; LABEL_CAPACITY];
        buf[0] = 0xff;
        assert!(decode_label(&buf).is_err());
    }

    #[test]
    fn test_record_accessors() {
        let mut record = LoggableRecord::timed();
        if let LoggableRecord::Timed(r) = &mut record {
            r.label = encode_label("FREEZE");
            r.state = SyncPntState::Announced.code();
            r.time = 50;
        }
        assert!(record.is_timed());
        assert_eq!(record.kind_name(), "timed");
        assert_eq!(record.label().unwrap(), "FREEZE");
        assert_eq!(record.state().unwrap(), SyncPntState::Announced);
        assert_eq!(record.time(), Some(50));
        assert_eq!(LoggableRecord::plain().time(), None);
    }

    #[test]
    fn test_invalid_state_code() {
        let record = LoggableRecord::Plain(LoggableSyncPnt {
            label: encode_label("a"),
            state: 9,
        });
        assert_eq!(record.state(), Err(SyncError::InvalidStateCode(9)));
    }
}
