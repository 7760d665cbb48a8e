//! Node server assembly

use crate::common::{NodeConfig, Result};
use crate::node::consensus::{ConsensusEngine, LocalRaft, SharedLog};
use crate::node::content::ContentStore;
use crate::node::http::{build_state, create_router};
use std::sync::Arc;
use std::time::Duration;

pub struct Node {
    config: NodeConfig,
}

impl Node {
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    /// Bootstraps the in-process engine for this node.
    ///
    /// The lowest roster ID starts out as leader; real elections are a
    /// production engine's job behind [`ConsensusEngine`].
    fn bootstrap_engine(&self) -> Result<Arc<dyn ConsensusEngine>> {
        let member = self.config.this_member()?;
        let leader_id = self
            .config
            .cluster
            .iter()
            .map(|m| m.id)
            .min()
            .unwrap_or(member.id);

        let engine = LocalRaft::new(member.id, self.config.cluster.clone(), SharedLog::new());
        if member.id == leader_id {
            engine.become_leader();
        } else {
            engine.note_leader(leader_id);
        }
        Ok(Arc::new(engine))
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("starting node {}", self.config.node_id);
        tracing::info!("  HTTP API: {}", self.config.bind_addr);
        tracing::info!("  data dir: {}", self.config.data_dir.display());
        tracing::info!("  cluster: {} nodes", self.config.cluster.len());

        let engine = self.bootstrap_engine()?;
        let content = ContentStore::open(&self.config.data_dir)?;
        let state = build_state(
            self.config.node_id,
            engine,
            content,
            Duration::from_millis(self.config.push_timeout_ms),
        )?;

        let role = state.engine.role();
        let router = create_router(state, self.config.max_upload_bytes);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!("node {} ready ({})", self.config.node_id, role);

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutting down");
            })
            .await?;
        Ok(())
    }
}
