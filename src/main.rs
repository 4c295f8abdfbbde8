use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use footsync::config::{self, Config};
use footsync::model::{RunLog, RunSummary};
use footsync::store::AppwriteClient;
use footsync::sync;
use footsync::upstream::FootballClient;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    let mut log = RunLog::default();
    log.info("initializing clients");

    // Initialization failures are the only errors that escape the per-task
    // boundary; they surface as an error-status summary.
    let summary = match init(&args) {
        Ok((cfg, upstream, store)) => {
            info!(config = %args.config.display(), "configuration loaded");
            sync::run_sync(
                &cfg.store.collections,
                &upstream,
                &store,
                cfg.sync.request_budget,
                log,
            )
            .await
        }
        Err(err) => RunSummary::Error {
            message: format!("{err:#}"),
            logs: log.into_entries(),
        },
    };

    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn init(args: &Args) -> Result<(Config, FootballClient, AppwriteClient)> {
    let cfg = config::load(Some(&args.config))?;
    let upstream = FootballClient::from_config(&cfg)?;
    let store = AppwriteClient::from_config(&cfg)?;
    Ok((cfg, upstream, store))
}
