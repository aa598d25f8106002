//! # fedtime-sync
//!
//! Timeline conversions and synchronization-point rendezvous for a federate
//! in an HLA-style federation.
//!
//! # Layers
//!
//! - **Domain**: timelines, sync points, the rendezvous manager, pause
//!   points and the per-frame executive
//! - **Infrastructure**: the binary checkpoint codec
//! - **Adapters**: sled checkpoint store and an in-process federation
//!   runtime
//!
//! ```text
//!   wall clock ──► SimTimeline ──► ScenarioTimeline ──► Int64Time (HLT)
//!                                                           │
//!   host frame ──► FederateExecutive ──► SyncPntManager ◄───┘
//!                         │                    │
//!                  PausePointList        RtiAmbassador
//! ```
//!
//! # Invariants
//!
//! - A sync point's state only moves forward, except into ERROR.
//! - A point is reported ACHIEVED by [`SyncPntManager::update`] exactly once.
//! - A timed point is never ACHIEVED before its freeze time.
//!
//! # Usage
//!
//! ```rust
//! use fedtime_core::Int64Time;
//! use fedtime_sync::adapters::{deliver_callbacks, LoopbackFederation};
//! use fedtime_sync::{SyncPntManager, SyncPntState};
//!
//! let federation = LoopbackFederation::new();
//! let mut mgr = SyncPntManager::new(federation.join());
//!
//! let freeze = Int64Time::from_seconds(2.0).unwrap();
//! mgr.add_timed_sync_point("pause_1", "PAUSE_POINTS", freeze).unwrap();
//! mgr.register_sync_point("pause_1").unwrap();
//! deliver_callbacks(&mut mgr);
//! mgr.achieve_sync_point("pause_1").unwrap();
//! deliver_callbacks(&mut mgr);
//!
//! assert!(mgr.update(Int64Time::from_seconds(1.0).unwrap()).is_empty());
//! assert_eq!(mgr.update(freeze), vec!["pause_1".to_string()]);
//! assert_eq!(mgr.state_of("pause_1"), Some(SyncPntState::Achieved));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod infrastructure;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Re-export Primary Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// Timelines
pub use domain::{ClockSource, ManualClock, ScenarioTimeline, SimTimeline, Timeline, TimelineConfig, WallClock};

// Sync points
pub use domain::{
    Conversion, LoggableRecord, LoggableSyncPnt, LoggableTimedSyncPnt, SyncPnt, SyncPntState, SyncPoint,
    TimedSyncPnt, LABEL_CAPACITY,
};

// Rendezvous
pub use domain::{
    FederateCallback, FederateHandle, FederateHandleSet, ListCheckpoint, ListStatus, RtiAmbassador, RtiError,
    SyncFailureReason, SyncPntCheckpoint, SyncPntManager, UNKNOWN_SYNC_PNT_LIST,
};

// Executive
pub use domain::{
    ExecutiveConfig, ExecutivePhase, FederateExecutive, PausePointList, PausePointState, DEFAULT_PAUSE_LIST,
};

pub use domain::{SyncError, SyncResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
