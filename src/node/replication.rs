//! Best-effort content fan-out from the leader to its peers
//!
//! Once a command is committed, the leader pushes the raw bytes to every
//! peer's content endpoint: one bounded-timeout attempt per peer, all
//! launched concurrently, all awaited before the triggering write returns.
//! Peer failures are recorded and logged, never surfaced to the client and
//! never able to reverse the already-committed metadata. Durability is
//! therefore two-tiered: metadata is quorum-durable, content lands on the
//! leader plus whichever peers answered within the timeout.

use crate::common::{ClusterMember, Error, Result};
use bytes::Bytes;
use std::time::Duration;

/// Result of one push attempt to one peer.
#[derive(Debug)]
pub struct PushOutcome {
    pub peer_id: u64,
    pub peer_addr: String,
    /// `Ok` on success, the recorded `ContentReplication` failure otherwise.
    pub result: Result<()>,
}

impl PushOutcome {
    pub fn ok(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct ReplicationCoordinator {
    client: reqwest::Client,
}

impl ReplicationCoordinator {
    /// Builds a coordinator whose pushes each time out after `push_timeout`.
    pub fn new(push_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(push_timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { client })
    }

    /// Pushes `data` for `path` to every peer concurrently and waits for
    /// all attempts to settle. Infallible by design: the caller gets one
    /// outcome per peer, nothing else.
    pub async fn push_to_peers(
        &self,
        peers: &[ClusterMember],
        path: &str,
        data: Bytes,
    ) -> Vec<PushOutcome> {
        if peers.is_empty() {
            tracing::debug!("no peers to replicate {} to", path);
            return Vec::new();
        }

        let pushes: Vec<_> = peers
            .iter()
            .map(|peer| {
                let url = format!("http://{}/replicate/{}", peer.http_addr, path);
                let request = self
                    .client
                    .post(url)
                    .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                    .body(data.clone());
                let peer = peer.clone();
                async move {
                    let reason = match request.send().await {
                        Ok(resp) if resp.status().is_success() => None,
                        Ok(resp) => Some(format!("peer answered {}", resp.status())),
                        Err(e) => Some(e.to_string()),
                    };
                    let result = match reason {
                        None => Ok(()),
                        Some(reason) => Err(Error::ContentReplication {
                            peer: format!("node {} at {}", peer.id, peer.http_addr),
                            reason,
                        }),
                    };
                    PushOutcome {
                        peer_id: peer.id,
                        peer_addr: peer.http_addr,
                        result,
                    }
                }
            })
            .collect();

        let outcomes = futures::future::join_all(pushes).await;

        for outcome in &outcomes {
            match &outcome.result {
                Ok(()) => tracing::info!(
                    "replicated {} to node {} at {}",
                    path,
                    outcome.peer_id,
                    outcome.peer_addr
                ),
                Err(e) => tracing::warn!("push of {} not replicated: {}", path, e),
            }
        }
        outcomes
    }
}
