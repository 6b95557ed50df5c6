//! pdlited — the pdlite placement daemon.
//!
//! Single binary that assembles the pdlite subsystems:
//! - State store (redb)
//! - In-memory cluster view, fed by heartbeats over REST
//! - Operator controller
//! - Scheduler coordinator
//! - REST API + Prometheus metrics
//!
//! # Usage
//!
//! ```text
//! pdlited run --config /etc/pdlite.toml --listen 0.0.0.0:2379 --data-dir /var/lib/pdlite
//! ```

mod daemon;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use pdlite_core::DaemonConfig;

#[derive(Parser)]
#[command(name = "pdlited", about = "pdlite placement daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the daemon.
    Run {
        /// Path to pdlite.toml. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Listen address, overrides `server.listen`.
        #[arg(long)]
        listen: Option<SocketAddr>,

        /// Data directory, overrides `server.data_dir`.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,pdlited=debug,pdlite=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            listen,
            data_dir,
        } => {
            let mut daemon_config = match config {
                Some(path) => {
                    info!(path = ?path, "loading config");
                    DaemonConfig::from_file(&path)?
                }
                None => DaemonConfig::default(),
            };
            if let Some(listen) = listen {
                daemon_config.server.listen = listen;
            }
            if let Some(data_dir) = data_dir {
                daemon_config.server.data_dir = data_dir;
            }
            daemon::run(daemon_config).await
        }
    }
}
