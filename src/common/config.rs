//! Configuration for a minidfs node

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// One member of the static cluster roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMember {
    /// Unique node ID
    pub id: u64,

    /// Address the consensus engine listens on
    pub raft_addr: String,

    /// Address the HTTP API (and peer content endpoint) listens on
    pub http_addr: String,
}

/// Node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// This node's ID (must appear in `cluster`)
    pub node_id: u64,

    /// Bind address for the HTTP API
    pub bind_addr: SocketAddr,

    /// Directory for locally stored file content
    pub data_dir: PathBuf,

    /// Static cluster roster, including this node
    pub cluster: Vec<ClusterMember>,

    /// Per-peer content push timeout
    #[serde(default = "default_push_timeout_ms")]
    pub push_timeout_ms: u64,

    /// Upper bound on an uploaded file's size
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_push_timeout_ms() -> u64 {
    10_000
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

impl NodeConfig {
    /// The roster entry for this node.
    pub fn this_member(&self) -> Result<ClusterMember> {
        self.cluster
            .iter()
            .find(|m| m.id == self.node_id)
            .cloned()
            .ok_or_else(|| {
                Error::InvalidConfig(format!("node {} is not in the cluster roster", self.node_id))
            })
    }
}

/// Parses a cluster roster of the form `id,raft_addr,http_addr;id,raft_addr,http_addr;...`
pub fn parse_cluster(spec: &str) -> Result<Vec<ClusterMember>> {
    let mut members = Vec::new();
    for part in spec.split(';').filter(|p| !p.is_empty()) {
        let details: Vec<&str> = part.split(',').collect();
        if details.len() != 3 {
            return Err(Error::InvalidConfig(format!(
                "invalid cluster entry {:?}, expected id,raft_addr,http_addr",
                part
            )));
        }
        let id: u64 = details[0].trim().parse().map_err(|_| {
            Error::InvalidConfig(format!("expected integer for cluster ID, got {:?}", details[0]))
        })?;
        members.push(ClusterMember {
            id,
            raft_addr: details[1].trim().to_string(),
            http_addr: details[2].trim().to_string(),
        });
    }
    if members.is_empty() {
        return Err(Error::InvalidConfig("empty cluster roster".into()));
    }
    Ok(members)
}
