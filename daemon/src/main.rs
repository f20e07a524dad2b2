use anyhow::{Context, Result};
use chainsim_common::{
    config::VERSION,
    logger::{setup_logger, LogLevel},
    tokio::{spawn, sync::watch},
};
use chainsim_daemon::{
    core::{
        blockchain::Blockchain,
        clock::SystemClock,
        config::Config,
        storage::{MemoryStorage, Storage},
    },
    rpc::DaemonRpc,
};
use clap::Parser;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fs, path::Path, sync::Arc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser, Serialize, Deserialize)]
#[clap(version = VERSION, about = "Chainsim: local deterministic block production daemon")]
pub struct CliConfig {
    #[clap(flatten)]
    #[serde(flatten)]
    core: Config,

    /// Set log level
    #[clap(long, default_value_t = LogLevel::Info)]
    #[serde(default)]
    log_level: LogLevel,

    /// Also write the logs in this file
    #[clap(long)]
    #[serde(default)]
    log_file: Option<String>,

    /// Read JSON-RPC requests line by line on stdin and answer on stdout
    #[clap(long)]
    #[serde(default)]
    stdin_rpc: bool,

    /// JSON File to load the configuration from
    #[clap(long)]
    #[serde(skip)]
    config_file: Option<String>,

    /// Generate the template at the `config_file` path
    #[clap(long)]
    #[serde(skip)]
    generate_config_template: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = CliConfig::parse();

    if let Some(path) = config.config_file.clone() {
        if config.generate_config_template {
            if Path::new(&path).exists() {
                eprintln!("Config file already exists at {}", path);
                return Ok(());
            }

            let content = serde_json::to_string_pretty(&config)
                .context("Error while serializing the config template")?;
            fs::write(&path, content).context("Error while writing the config template")?;
            println!("Config template generated at {}", path);
            return Ok(());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Error while reading config file {}", path))?;
        config = serde_json::from_str(&content)
            .with_context(|| format!("Error while parsing config file {}", path))?;
    }

    setup_logger(config.log_level.into(), config.log_file.as_deref().map(Path::new))?;
    if log::log_enabled!(log::Level::Info) {
        info!("Chainsim daemon v{} starting...", VERSION);
    }

    let core = config.core;
    let blockchain = Blockchain::new(core.clone(), MemoryStorage::new(), Arc::new(SystemClock))
        .await
        .context("Error while initializing the blockchain")?;

    for (index, address) in blockchain.get_accounts().iter().enumerate() {
        info!("({}) {} - {}", index, address, core.initial_balance);
    }
    info!(
        "Block gas limit: {}, simulator: {}, block time: {}ms",
        core.block_gas_limit, core.simulator, core.block_time_ms
    );

    let mut subscription = blockchain.subscribe().await;
    spawn(async move {
        while let Some(event) = subscription.receiver.recv().await {
            debug!(
                "new block event #{} {} ({} txs)",
                event.number, event.hash, event.txs_count
            );
        }
    });

    let (shutdown_sender, shutdown_receiver) = watch::channel(false);
    let simulator = core.simulator;
    let simulator_handle = spawn({
        let blockchain = Arc::clone(&blockchain);
        async move { simulator.start(blockchain, shutdown_receiver).await }
    });

    if config.stdin_rpc {
        let rpc = DaemonRpc::new(Arc::clone(&blockchain));
        spawn(async move {
            if let Err(e) = run_stdin_rpc(rpc).await {
                error!("Error in stdin RPC loop: {:#}", e);
            }
        });
    }

    tokio::signal::ctrl_c()
        .await
        .context("Error while waiting for the shutdown signal")?;
    info!("Shutting down...");

    if shutdown_sender.send(true).is_err() {
        warn!("Simulator already stopped");
    }
    simulator_handle
        .await
        .context("Error while waiting for the simulator to stop")?;

    info!(
        "Stopped at block {}",
        blockchain.get_top_block_number().await?
    );
    Ok(())
}

// One JSON-RPC request per line, one response per line
async fn run_stdin_rpc<S: Storage>(rpc: DaemonRpc<S>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Error while reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(request) => rpc.handle_request(request).await,
            Err(e) => chainsim_common::rpc::InternalRpcError::InvalidJSONParams(e).to_json(),
        };

        let mut output = response.to_string();
        output.push('\n');
        stdout
            .write_all(output.as_bytes())
            .await
            .context("Error while writing to stdout")?;
        stdout.flush().await.context("Error while flushing stdout")?;
    }

    debug!("stdin closed, stopping the RPC loop");
    Ok(())
}
