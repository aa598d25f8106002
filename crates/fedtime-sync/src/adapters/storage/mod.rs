//! Storage Adapters

pub mod sled_checkpoint;

pub use sled_checkpoint::{CheckpointMeta, CheckpointStore};
