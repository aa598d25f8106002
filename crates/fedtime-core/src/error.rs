//! # Logical Time Error Types
//!
//! Arithmetic and conversion failures for fixed-precision logical time.
//! These are local errors: they are returned to the caller of the
//! conversion or arithmetic function and never clamped.

use crate::base_time::BaseTime;

/// Errors raised by [`Int64Time`](crate::Int64Time) and
/// [`Int64Interval`](crate::Int64Interval) operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeError {
    /// A seconds value does not map to a tick count in the signed 64-bit
    /// range at the given resolution (or is not finite).
    #[error("{seconds} s is outside the representable range for base time {base}")]
    Range {
        /// The offending seconds value
        seconds: f64,
        /// Resolution the conversion was attempted at
        base: BaseTime,
    },

    /// Tick arithmetic left the signed 64-bit range.
    #[error("logical time overflow in {operation}: {lhs} {operation} {rhs} ticks")]
    Overflow {
        /// Operator symbol (`+`, `-`, `neg`)
        operation: &'static str,
        /// Left operand in ticks
        lhs: i64,
        /// Right operand in ticks
        rhs: i64,
    },
}

impl TimeError {
    /// True for the range-error kind.
    pub fn is_range(&self) -> bool {
        matches!(self, TimeError::Range { .. })
    }

    /// True for the overflow-error kind.
    pub fn is_overflow(&self) -> bool {
        matches!(self, TimeError::Overflow { .. })
    }

    pub(crate) fn overflow(operation: &'static str, lhs: i64, rhs: i64) -> Self {
        TimeError::Overflow { operation, lhs, rhs }
    }
}

/// Result alias for logical time operations.
pub type TimeResult<T> = Result<T, TimeError>;
