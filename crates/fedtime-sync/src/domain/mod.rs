//! Domain Layer
//!
//! Pure coordination logic. Nothing here performs I/O; the federation
//! runtime and the clock are reached through the [`RtiAmbassador`] and
//! [`ClockSource`] seams.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      FederateExecutive<C, R>                  │
//! ├───────────────────────────────────────────────────────────────┤
//! │  timeline              rendezvous              pause          │
//! │  ├─ SimTimeline<C>     ├─ SyncPntManager<R>    PausePointList │
//! │  └─ ScenarioTimeline   └─ SyncPntCheckpoint                   │
//! │                                                               │
//! │  sync                                                         │
//! │  ├─ SyncPnt / TimedSyncPnt / SyncPoint                        │
//! │  └─ LoggableSyncPnt / LoggableTimedSyncPnt                    │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod executive;
pub mod pause;
pub mod rendezvous;
pub mod sync;
pub mod timeline;

pub use error::{SyncError, SyncResult};
pub use executive::{ExecutiveConfig, ExecutivePhase, FederateExecutive, DEFAULT_PAUSE_LIST};
pub use pause::{PausePointList, PausePointState};
pub use rendezvous::{
    FederateCallback, FederateHandle, FederateHandleSet, ListCheckpoint, ListStatus, RtiAmbassador, RtiError,
    SyncFailureReason, SyncPntCheckpoint, SyncPntManager, UNKNOWN_SYNC_PNT_LIST,
};
pub use sync::{
    Conversion, LoggableRecord, LoggableSyncPnt, LoggableTimedSyncPnt, SyncPnt, SyncPntState, SyncPoint,
    TimedSyncPnt, LABEL_CAPACITY,
};
pub use timeline::{
    ClockSource, ManualClock, ScenarioTimeline, SimTimeline, Timeline, TimelineConfig, WallClock,
};
