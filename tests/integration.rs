//! Single-node integration tests for minidfs

use minidfs::common::ClusterMember;
use minidfs::node::command::Command;
use minidfs::node::consensus::{ConsensusEngine, LocalRaft, SharedLog};
use minidfs::node::content::ContentStore;
use minidfs::node::http::{build_state, create_router, GatewayState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn member(id: u64, http_addr: &str) -> ClusterMember {
    ClusterMember {
        id,
        raft_addr: format!("127.0.0.1:{}", 7000 + id),
        http_addr: http_addr.to_string(),
    }
}

async fn spawn_gateway(state: GatewayState, max_upload: usize) -> SocketAddr {
    let router = create_router(state, max_upload);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn single_node_state(data_dir: &TempDir) -> GatewayState {
    let engine = Arc::new(LocalRaft::single(member(1, "unused")));
    let content = ContentStore::open(data_dir.path()).unwrap();
    build_state(1, engine, content, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_status_reports_identity_and_leadership() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_gateway(single_node_state(&dir), 1 << 20).await;

    let status: serde_json::Value = reqwest::get(format!("http://{}/status", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status["node_id"], 1);
    assert_eq!(status["role"], "leader");
    assert_eq!(status["is_leader"], true);
    assert_eq!(status["status"], "healthy");
    assert_eq!(status["files"], 0);
}

#[tokio::test]
async fn test_create_then_fetch_and_list() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_gateway(single_node_state(&dir), 1 << 20).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{}/upload/docs/report.txt", addr))
        .body("quarterly numbers")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    let created: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(created["path"], "docs/report.txt");
    assert_eq!(created["size"], 17);
    // No peers on a single node, so nothing to push to.
    assert_eq!(created["peers"], 0);

    let body = client
        .get(format!("http://{}/upload/docs/report.txt", addr))
        .send()
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(&body[..], b"quarterly numbers");

    let files: Vec<serde_json::Value> = client
        .get(format!("http://{}/files", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "docs/report.txt");
    assert_eq!(files[0]["size"], 17);
}

#[tokio::test]
async fn test_fetch_unknown_path_is_not_found() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_gateway(single_node_state(&dir), 1 << 20).await;

    let resp = reqwest::get(format!("http://{}/upload/nothing/here", addr))
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_metadata_without_content_is_a_distinct_failure() {
    let dir = TempDir::new().unwrap();
    let state = single_node_state(&dir);

    // Commit metadata through the log without ever storing bytes, as a
    // node that missed the content push would end up after replay.
    let cmd = Command::Create {
        path: "orphan.bin".to_string(),
        size: 3,
    };
    state.engine.propose(cmd.encode()).unwrap();

    let addr = spawn_gateway(state, 1 << 20).await;
    let resp = reqwest::get(format!("http://{}/upload/orphan.bin", addr))
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Content not present on this node"));
}

#[tokio::test]
async fn test_follower_rejects_create_without_proposing() {
    let dir = TempDir::new().unwrap();
    let log = SharedLog::new();
    let roster = vec![member(1, "unused"), member(2, "unused")];
    let engine = Arc::new(LocalRaft::new(2, roster, log.clone()));
    engine.note_leader(1);

    let content = ContentStore::open(dir.path()).unwrap();
    let state = build_state(2, engine, content, Duration::from_secs(2)).unwrap();
    let table = state.table.clone();
    let addr = spawn_gateway(state, 1 << 20).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{}/upload/f.txt", addr))
        .body("data")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("leader is 1"));

    // Nothing was proposed, applied, or stored.
    assert!(log.is_empty());
    assert!(table.is_empty());
    assert!(!dir.path().join("f.txt").exists());

    let status: serde_json::Value = reqwest::get(format!("http://{}/status", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["role"], "follower");
    assert_eq!(status["is_leader"], false);
    assert_eq!(status["leader_hint"], 1);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_gateway(single_node_state(&dir), 16).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{}/upload/too-big", addr))
        .body(vec![0u8; 64])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);
}
