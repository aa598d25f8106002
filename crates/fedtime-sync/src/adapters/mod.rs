//! Adapters Layer
//!
//! Concrete collaborators for the domain's seams: a sled checkpoint store
//! and an in-process federation runtime.

pub mod loopback;
pub mod storage;

pub use loopback::{deliver_callbacks, LoopbackFederation, LoopbackRti};
pub use storage::{CheckpointMeta, CheckpointStore};
