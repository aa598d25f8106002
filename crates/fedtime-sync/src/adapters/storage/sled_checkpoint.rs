//! Sled-backed checkpoint store.

use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use fedtime_core::{BaseTime, Int64Time};
use serde::{Deserialize, Serialize};
use sled::transaction::ConflictableTransactionResult;
use sled::{Db, Transactional, Tree};
use tracing::debug;

use crate::domain::rendezvous::SyncPntCheckpoint;
use crate::infrastructure::checkpoint_codec;

/// Metadata stored next to each encoded checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    /// Checkpoint name (store key)
    pub name: String,
    /// Times this name has been saved
    pub revision: u64,
    /// Wall-clock save time, milliseconds since the Unix epoch
    pub saved_at_ms: u64,
    /// Logical time the checkpoint was taken at
    pub granted: Int64Time,
    /// Tick resolution of `granted` and of every freeze time in the checkpoint
    #[serde(default)]
    pub base_time: BaseTime,
    /// Number of lists
    pub lists: usize,
    /// Number of records
    pub records: usize,
    /// Encoded size in bytes
    pub bytes: usize,
}

/// [Hexagonal Adapter] Sled-based checkpoint storage
///
/// Two trees: `checkpoints` holds the fixed-layout encoding, `meta` holds
/// JSON [`CheckpointMeta`], both keyed by checkpoint name. A save writes
/// both trees in one transaction.
pub struct CheckpointStore {
    db: Arc<Db>,
    checkpoint_tree: Tree,
    meta_tree: Tree,
}

impl CheckpointStore {
    /// Open (or create) a store at `path`.
    ///
    /// # Errors
    /// If the database or its trees cannot be opened.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .with_context(|| format!("Failed to open checkpoint store at {}", path.as_ref().display()))?;
        let checkpoint_tree = db.open_tree("checkpoints")?;
        let meta_tree = db.open_tree("meta")?;

        Ok(Self {
            db: Arc::new(db),
            checkpoint_tree,
            meta_tree,
        })
    }

    /// [Command] Save a checkpoint under `name`, replacing any previous one.
    /// `base_time` is the tick resolution of `granted` and the freeze times.
    ///
    /// # Errors
    /// Encoding or storage failure.
    pub fn save(
        &self,
        name: &str,
        checkpoint: &SyncPntCheckpoint,
        granted: Int64Time,
        base_time: BaseTime,
    ) -> Result<CheckpointMeta> {
        let encoded = checkpoint_codec::encode(checkpoint).context("Failed to encode checkpoint")?;
        let revision = self.meta(name)?.map_or(1, |previous| previous.revision + 1);
        let saved_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);

        let meta = CheckpointMeta {
            name: name.to_owned(),
            revision,
            saved_at_ms,
            granted,
            base_time,
            lists: checkpoint.lists.len(),
            records: checkpoint.record_count(),
            bytes: encoded.len(),
        };

        let meta_bytes = serde_json::to_vec(&meta)?;
        (&self.checkpoint_tree, &self.meta_tree)
            .transaction(|(checkpoints, metas)| -> ConflictableTransactionResult<(), Infallible> {
                checkpoints.insert(name.as_bytes(), encoded.as_slice())?;
                metas.insert(name.as_bytes(), meta_bytes.as_slice())?;
                Ok(())
            })
            .with_context(|| format!("Failed to save checkpoint '{name}'"))?;
        self.db.flush().context("Failed to flush checkpoint store")?;
        debug!(name, revision, records = meta.records, "checkpoint saved");
        Ok(meta)
    }

    /// [Query] Load the checkpoint saved under `name`.
    ///
    /// # Errors
    /// Storage failure or a corrupt encoding.
    pub fn load(&self, name: &str) -> Result<Option<SyncPntCheckpoint>> {
        let Some(bytes) = self.checkpoint_tree.get(name.as_bytes())? else {
            return Ok(None);
        };
        let checkpoint = checkpoint_codec::decode(&bytes).with_context(|| format!("Checkpoint '{name}' is corrupt"))?;
        Ok(Some(checkpoint))
    }

    /// [Query] Metadata of the checkpoint saved under `name`.
    ///
    /// # Errors
    /// Storage failure or corrupt metadata.
    pub fn meta(&self, name: &str) -> Result<Option<CheckpointMeta>> {
        self.meta_tree
            .get(name.as_bytes())?
            .map(|bytes| {
                serde_json::from_slice::<CheckpointMeta>(&bytes)
                    .with_context(|| format!("Metadata of '{name}' is corrupt"))
            })
            .transpose()
    }

    /// [Query] Metadata of every checkpoint, in name order.
    ///
    /// # Errors
    /// Storage failure or corrupt metadata.
    pub fn list(&self) -> Result<Vec<CheckpointMeta>> {
        self.meta_tree
            .iter()
            .values()
            .map(|value| -> Result<CheckpointMeta> {
                let bytes = value?;
                serde_json::from_slice(&bytes).context("Checkpoint metadata is corrupt")
            })
            .collect()
    }

    /// [Command] Delete a checkpoint. Returns `false` if it did not exist.
    ///
    /// # Errors
    /// Storage failure.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let existed = (&self.checkpoint_tree, &self.meta_tree)
            .transaction(|(checkpoints, metas)| -> ConflictableTransactionResult<bool, Infallible> {
                metas.remove(name.as_bytes())?;
                Ok(checkpoints.remove(name.as_bytes())?.is_some())
            })
            .with_context(|| format!("Failed to remove checkpoint '{name}'"))?;
        self.db.flush()?;
        Ok(existed)
    }

    /// Number of stored checkpoints.
    pub fn len(&self) -> usize {
        self.checkpoint_tree.len()
    }

    /// True with no stored checkpoints.
    pub fn is_empty(&self) -> bool {
        self.checkpoint_tree.is_empty()
    }
}
