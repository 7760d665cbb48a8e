//! HTTP API for a minidfs node
//!
//! Public endpoints:
//! - `GET  /status` - node identity, leadership hint, liveness
//! - `GET  /files` - all locally known file metadata
//! - `POST /upload/*path` - create a file (leader only)
//! - `GET  /upload/*path` - fetch a file's bytes
//!
//! Node-to-node:
//! - `POST /replicate/*path` - receive a content push from the leader

use crate::common::{Error, Result};
use crate::node::command::Command;
use crate::node::consensus::ConsensusEngine;
use crate::node::content::ContentStore;
use crate::node::replication::ReplicationCoordinator;
use crate::node::table::FileTable;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Shared node state for HTTP handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub node_id: u64,
    pub engine: Arc<dyn ConsensusEngine>,
    pub table: Arc<FileTable>,
    pub content: Arc<ContentStore>,
    pub replicator: Arc<ReplicationCoordinator>,
}

fn error_response(e: &Error) -> axum::response::Response {
    (e.to_http_status(), axum::Json(json!({ "error": format!("{}", e) }))).into_response()
}

async fn status(State(state): State<GatewayState>) -> impl IntoResponse {
    axum::Json(json!({
        "node_id": state.node_id,
        "role": state.engine.role().to_string(),
        "is_leader": state.engine.is_leader(),
        "leader_hint": state.engine.leader_hint(),
        "status": "healthy",
        "files": state.table.len(),
        "timestamp": chrono::Utc::now(),
    }))
}

/// Lists everything this node knows. A follower behind on log application
/// may lag the leader here.
async fn list_files(State(state): State<GatewayState>) -> impl IntoResponse {
    axum::Json(state.table.list())
}

async fn create_file(
    State(state): State<GatewayState>,
    Path(path): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    // The hint gates early so a follower never proposes nor pushes; the
    // propose result below stays authoritative either way.
    if !state.engine.is_leader() {
        let hint = state
            .engine
            .leader_hint()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        return error_response(&Error::NotLeader(hint));
    }

    tracing::info!("received CreateFile request for {}", path);

    let cmd = Command::Create {
        path: path.clone(),
        size: body.len() as u64,
    };
    let index = match state.engine.propose(cmd.encode()) {
        Ok(index) => index,
        Err(e) => {
            // No commit means no content activity at all.
            tracing::error!("propose failed for {}: {}", path, e);
            return error_response(&e);
        }
    };

    // Metadata is committed; everything from here is the weak tier.
    if let Err(e) = state.content.put(&path, &body).await {
        tracing::error!("local content write for {} failed: {}", path, e);
        return error_response(&e);
    }

    let outcomes = state
        .replicator
        .push_to_peers(&state.engine.peers(), &path, body.clone())
        .await;
    let replicated = outcomes.iter().filter(|o| o.ok()).count();

    (
        StatusCode::CREATED,
        axum::Json(json!({
            "path": path,
            "size": body.len(),
            "index": index,
            "replicated_to": replicated,
            "peers": outcomes.len(),
        })),
    )
        .into_response()
}

async fn fetch_file(
    State(state): State<GatewayState>,
    Path(path): Path<String>,
) -> axum::response::Response {
    tracing::info!("received GetFile request for {}", path);

    if state.table.lookup(&path).is_none() {
        return error_response(&Error::NotFound(path));
    }

    match state.content.get(&path).await {
        Ok(data) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            data,
        )
            .into_response(),
        // Metadata exists but the bytes never reached this node.
        Err(e) => error_response(&e),
    }
}

/// Stores a pushed blob and acknowledges unconditionally. No further
/// propagation happens here.
async fn replicate_file(
    State(state): State<GatewayState>,
    Path(path): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    tracing::info!("received replication push for {} ({} bytes)", path, body.len());

    match state.content.put(&path, &body).await {
        Ok(()) => (StatusCode::OK, "replicated").into_response(),
        Err(e) => error_response(&e),
    }
}

/// Creates the HTTP router with all node endpoints.
pub fn create_router(state: GatewayState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/files", get(list_files))
        .route("/upload/*path", get(fetch_file).post(create_file))
        .route("/replicate/*path", axum::routing::post(replicate_file))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

/// Wires the consensus apply stream into the file table. Corrupt entries
/// are logged and skipped; they must not take the node down.
pub fn wire_apply(engine: &dyn ConsensusEngine, table: Arc<FileTable>) {
    engine.on_apply(Box::new(move |entry| {
        if let Err(e) = table.apply(entry) {
            tracing::error!("failed to apply committed entry: {}", e);
        }
    }));
}

/// Builds the full gateway state for one node, wiring the apply stream.
pub fn build_state(
    node_id: u64,
    engine: Arc<dyn ConsensusEngine>,
    content: ContentStore,
    push_timeout: std::time::Duration,
) -> Result<GatewayState> {
    let table = Arc::new(FileTable::new());
    wire_apply(engine.as_ref(), table.clone());
    Ok(GatewayState {
        node_id,
        engine,
        table,
        content: Arc::new(content),
        replicator: Arc::new(ReplicationCoordinator::new(push_timeout)?),
    })
}
