//! # minidfs
//!
//! A small distributed file store with two-tier replication:
//! - file **metadata** goes through an ordered, quorum-committed consensus
//!   log and is applied identically on every node;
//! - file **content** is pushed best-effort from the leader to every peer,
//!   concurrently and outside the log.
//!
//! ## Architecture
//!
//! ```text
//!            write                    ┌──────────────────────────┐
//!  client ──────────► Gateway ──────► │     Consensus log        │
//!                        │            │ (ordered, quorum-durable)│
//!                        │            └────────────┬─────────────┘
//!                        │ after commit            │ apply, in order
//!                        ▼                         ▼
//!            ┌─────────────────────┐      ┌─────────────────┐
//!            │ Content fan-out     │      │   FileTable     │
//!            │ (best effort, all   │      │ (path→metadata, │
//!            │  peers, concurrent) │      │  every node)    │
//!            └─────────────────────┘      └─────────────────┘
//! ```
//!
//! A write succeeds once its metadata is committed; content lands on the
//! leader plus whichever peers answered the push within the timeout. That
//! asymmetry is deliberate and documented, not an accident to be patched.
//!
//! ## Usage
//!
//! ```bash
//! minidfs-node serve \
//!   --id 1 \
//!   --bind 127.0.0.1:8001 \
//!   --data ./data-1 \
//!   --cluster "1,127.0.0.1:7001,127.0.0.1:8001;2,127.0.0.1:7002,127.0.0.1:8002"
//! ```

pub mod common;
pub mod node;

// Re-export commonly used types
pub use common::{ClusterMember, Error, NodeConfig, Result};
pub use node::Node;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build info
pub const BUILD_INFO: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARGO_PKG_NAME"), ")");
