//! Tessera daemon: entry point for running a ledger node.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tessera_node::{init_logging, InMemoryMempool, LedgerNode, NodeConfig};
use tessera_nullables::NullStore;
use tessera_types::{ProtocolParams, SystemClock};

#[derive(Parser, Debug)]
#[command(name = "tessera-daemon", about = "Tessera ledger node daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "TESSERA_CONFIG")]
    config: Option<PathBuf>,

    /// Use the short stake/unstake windows of a local test network.
    #[arg(long, env = "TESSERA_TESTNET")]
    testnet: bool,

    /// Capacity of the chain-update queue.
    #[arg(long, env = "TESSERA_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TESSERA_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TESSERA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable Prometheus metrics.
    #[arg(long, env = "TESSERA_ENABLE_METRICS")]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Manage the node.
    #[command(name = "node")]
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
}

#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
enum NodeAction {
    /// Run the node until SIGINT or SIGTERM.
    Run,
}

/// Merge the optional config file with CLI overrides.
fn build_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(&path.to_string_lossy())?,
        None => NodeConfig::default(),
    };

    if let Some(capacity) = cli.queue_capacity {
        config.update_queue_capacity = capacity;
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.enable_metrics |= cli.metrics;
    if cli.testnet {
        config.params = ProtocolParams::testnet_defaults();
    }

    config.validate()?;
    Ok(config)
}

async fn run(config: NodeConfig) -> anyhow::Result<()> {
    tracing::info!(
        queue_capacity = config.update_queue_capacity,
        stake_window = config.params.pending_stake_window,
        unstake_window = config.params.pending_unstake_window,
        metrics = config.enable_metrics,
        "starting tessera node"
    );

    // Accounts live in memory; persistent storage is supplied by embedders.
    let mut node = LedgerNode::new(
        config,
        Arc::new(NullStore::new()),
        Arc::new(InMemoryMempool::new()),
        Arc::new(SystemClock),
    )?;
    node.start()?;

    node.shutdown.wait_for_signal().await?;
    tracing::info!("shutdown signal received, stopping node");
    node.stop().await?;

    if let Some(text) = node.metrics_text()? {
        tracing::debug!(metrics = %text, "final metrics snapshot");
    }
    tracing::info!("tessera daemon exited cleanly");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    init_logging(config.log_format()?, &config.log_level)?;

    match cli.command {
        Command::Node { action } => match action {
            NodeAction::Run => run(config).await?,
        },
    }
    Ok(())
}
