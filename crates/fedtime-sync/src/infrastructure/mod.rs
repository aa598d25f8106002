//! Infrastructure Layer
//!
//! Byte-level concerns with no I/O: the checkpoint wire format.

pub mod checkpoint_codec;

pub use checkpoint_codec::{decode, encode, CheckpointError, CHECKPOINT_MAGIC, CHECKPOINT_VERSION};
