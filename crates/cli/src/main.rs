mod cli;
mod replay;
mod workload;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use taskheap_core::config::{load_dotenv, Config};

use crate::cli::CliArgs;
use crate::replay::Replayer;
use crate::workload::Workload;

fn main() -> Result<()> {
    load_dotenv();
    let config = Config::from_env();

    // RUST_LOG wins; otherwise fall back to the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    config.log_summary();

    let workload = Workload::load(&args.workload)
        .with_context(|| format!("failed to load workload: {}", args.workload.display()))?;
    info!(path = %args.workload.display(), operations = workload.operations.len(), "workload ready");

    let report = Replayer::new(&config)
        .with_verify(args.verify || config.replay.verify)
        .run(&workload, args.drain)
        .context("replay failed")?;

    if args.json {
        let out = serde_json::json!({
            "config": config.summary(),
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&out).context("failed to serialize report")?);
    } else {
        println!("{}", report);
    }

    Ok(())
}
