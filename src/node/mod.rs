//! Node implementation
//!
//! A node couples two replication tiers:
//! - metadata commands flow through the consensus log and are applied, in
//!   committed order, to the in-memory file table on every node;
//! - file content is pushed best-effort from the leader to each peer's
//!   content endpoint after the commit, outside the log.

pub mod command;
pub mod consensus;
pub mod content;
pub mod http;
pub mod replication;
pub mod server;
pub mod table;

pub use server::Node;
