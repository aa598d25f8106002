//! Rendezvous Coordination
//!
//! ```text
//!   host ──► SyncPntManager ──RtiAmbassador──► federation runtime
//!                  ▲                                  │
//!                  └──── FederateCallback (queued) ◄──┘
//! ```

mod ambassador;
mod checkpoint;
mod manager;

pub use ambassador::{FederateCallback, FederateHandle, FederateHandleSet, RtiAmbassador, RtiError, SyncFailureReason};
pub use checkpoint::{ListCheckpoint, SyncPntCheckpoint};
pub use manager::{ListStatus, SyncPntManager, UNKNOWN_SYNC_PNT_LIST};
