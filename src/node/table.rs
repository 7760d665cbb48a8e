//! Replicated file metadata table
//!
//! The table is the node's only cross-request shared state. It is mutated
//! exclusively by [`FileTable::apply`], driven by the consensus engine's
//! ordered apply callback, so every node replays the identical command
//! sequence. Reads work on copy-on-write snapshots: `apply` builds the next
//! map and swaps an `Arc`, readers clone the current `Arc` and iterate it
//! without holding any lock, so they never observe a half-applied mutation
//! and never wait behind an in-flight apply.

use crate::common::Result;
use crate::node::command::Command;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Metadata for one replicated file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Full path, the unique key
    pub name: String,
    /// Content size in bytes
    pub size: u64,
    /// When the record was last applied on this node
    pub last_modified: DateTime<Utc>,
}

/// In-memory path → metadata mapping, rebuilt from the log on restart.
#[derive(Default)]
pub struct FileTable {
    files: RwLock<Arc<HashMap<String, FileMetadata>>>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes and applies one committed command.
    ///
    /// Never fails on a recognized variant: Delete of an absent path is a
    /// no-op and Rename inserts `new_path` even when `old_path` was absent,
    /// keeping replay at-least-once safe. Only genuinely corrupt records
    /// error out, and the caller treats that as non-fatal.
    pub fn apply(&self, entry: &[u8]) -> Result<()> {
        let cmd = Command::decode(entry)?;

        // The engine never runs apply concurrently with itself, so the
        // next snapshot can be built outside any lock; the write lock is
        // held only for the pointer swap and readers wait for nothing
        // longer than that.
        let mut next = HashMap::clone(&self.snapshot());

        match cmd {
            Command::Create { path, size } => {
                next.insert(
                    path.clone(),
                    FileMetadata {
                        name: path.clone(),
                        size,
                        last_modified: Utc::now(),
                    },
                );
                tracing::info!("applied CreateFile: {} ({} bytes)", path, size);
            }
            Command::Delete { path } => {
                next.remove(&path);
                tracing::info!("applied DeleteFile: {}", path);
            }
            Command::Rename {
                old_path,
                new_path,
                size,
            } => {
                next.remove(&old_path);
                next.insert(
                    new_path.clone(),
                    FileMetadata {
                        name: new_path.clone(),
                        size,
                        last_modified: Utc::now(),
                    },
                );
                tracing::info!("applied RenameFile: {} -> {}", old_path, new_path);
            }
        }

        *self.files.write().unwrap() = Arc::new(next);
        Ok(())
    }

    /// Metadata for one path, if known.
    pub fn lookup(&self, path: &str) -> Option<FileMetadata> {
        self.snapshot().get(path).cloned()
    }

    /// All known metadata records, from one consistent snapshot.
    pub fn list(&self) -> Vec<FileMetadata> {
        self.snapshot().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Arc<HashMap<String, FileMetadata>> {
        self.files.read().unwrap().clone()
    }
}
