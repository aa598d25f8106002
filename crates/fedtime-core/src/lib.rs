//! # fedtime-core
//!
//! Fixed-precision logical time for HLA-style federations.
//!
//! ## Module Organization
//!
//! - `base_time`: tick resolution shared by every federate
//! - `int64_time`: [`Int64Time`], an immutable logical timestamp
//! - `int64_interval`: [`Int64Interval`], a signed logical duration
//! - `error`: [`TimeError`] (range and overflow kinds)
//!
//! ```rust
//! use fedtime_core::{Int64Interval, Int64Time};
//!
//! let granted = Int64Time::from_seconds(12.5).unwrap();
//! let lookahead = Int64Interval::from_seconds(0.25).unwrap();
//! let request = (granted + lookahead).unwrap();
//! assert_eq!(request.to_seconds(), 12.75);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod base_time;
pub mod error;
pub mod int64_interval;
pub mod int64_time;

#[cfg(kani)]
mod proofs;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Re-export Primary Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub use base_time::{BaseTime, Seconds};
pub use error::{TimeError, TimeResult};
pub use int64_interval::Int64Interval;
pub use int64_time::{Int64Time, TAG_LEN};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
