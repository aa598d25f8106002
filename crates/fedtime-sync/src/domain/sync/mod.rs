//! Synchronization Points
//!
//! ```text
//!   SyncPnt ──► TimedSyncPnt           (freeze-time gate)
//!      │             │
//!      └──── SyncPoint ────┘           (what the manager stores)
//!                 │ convert
//!                 ▼
//!          LoggableRecord { Plain | Timed }   (checkpoint form)
//! ```

mod loggable;
mod point;
mod state;
mod timed;
mod variant;

#[cfg(kani)]
mod proofs;

pub use loggable::{
    decode_label, encode_label, validate_label, Conversion, LoggableRecord, LoggableSyncPnt, LoggableTimedSyncPnt,
    LABEL_CAPACITY,
};
pub use point::SyncPnt;
pub use state::SyncPntState;
pub use timed::TimedSyncPnt;
pub use variant::SyncPoint;
