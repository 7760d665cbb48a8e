//! Common utilities and types shared across minidfs

pub mod config;
pub mod error;

pub use config::{parse_cluster, ClusterMember, NodeConfig};
pub use error::{Error, Result};
