//! Node binary

use clap::{Parser, Subcommand};
use minidfs::{common::parse_cluster, Node, NodeConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "minidfs-node")]
#[command(about = "minidfs node: replicated file metadata, best-effort content fan-out")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a node
    Serve {
        /// Node ID (must appear in --cluster)
        #[arg(long)]
        id: u64,

        /// Bind address for the HTTP API
        #[arg(long, default_value = "0.0.0.0:8000")]
        bind: SocketAddr,

        /// Data directory for file content
        #[arg(long, default_value = "./data")]
        data: PathBuf,

        /// Cluster roster: id,raft_addr,http_addr;id,raft_addr,http_addr;...
        #[arg(long)]
        cluster: String,

        /// Per-peer content push timeout in milliseconds
        #[arg(long, default_value = "10000")]
        push_timeout_ms: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            id,
            bind,
            data,
            cluster,
            push_timeout_ms,
        } => {
            let config = NodeConfig {
                node_id: id,
                bind_addr: bind,
                data_dir: data,
                cluster: parse_cluster(&cluster)?,
                push_timeout_ms,
                max_upload_bytes: 64 * 1024 * 1024,
            };
            Node::new(config).serve().await?;
        }
    }

    Ok(())
}
