//! Pledge daemon: serves a ledger over HTTP.

mod config;

use clap::Parser;
use config::DaemonConfig;
use pledge_ledger::Ledger;
use pledge_rpc::RpcServer;
use pledge_utils::LogFormat;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pledge-daemon", about = "Pledge ledger HTTP daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interface to bind (default 127.0.0.1).
    #[arg(long, env = "PLEDGE_BIND")]
    bind: Option<IpAddr>,

    /// HTTP port (default 7077).
    #[arg(long, env = "PLEDGE_PORT")]
    port: Option<u16>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "PLEDGE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "PLEDGE_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<DaemonConfig> {
        let base = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)?,
            None => DaemonConfig::default(),
        };
        Ok(DaemonConfig {
            bind: self.bind.unwrap_or(base.bind),
            port: self.port.unwrap_or(base.port),
            log_level: self.log_level.unwrap_or(base.log_level),
            log_format: self.log_format.unwrap_or(base.log_format),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;
    pledge_utils::init_logging(config.log_format, &config.log_level)?;

    let ledger = Arc::new(Ledger::new());
    tracing::info!(genesis = %ledger.genesis_hash(), "starting Pledge daemon");

    let server = RpcServer::new(config.socket_addr(), Arc::clone(&ledger));
    tokio::select! {
        result = server.start() => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutdown signal received, stopping server");
        }
    }

    let summary = ledger.summary();
    tracing::info!(
        blocks = summary.blocks,
        pending = summary.pending,
        "Pledge daemon exited cleanly"
    );
    Ok(())
}
