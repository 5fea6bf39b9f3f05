use std::path::PathBuf;

use clap::Parser;

/// Replay a workload of priority-queue operations.
///
/// Reads a JSON or TOML file of insert / extract / increase / decrease
/// steps, runs them against a max-priority task queue and reports the
/// extraction order.
#[derive(Parser, Debug)]
#[command(name = "taskheap", version, about)]
pub struct CliArgs {
    /// Workload file (.json or .toml)
    #[arg(long, env = "TASKHEAP_WORKLOAD")]
    pub workload: PathBuf,

    /// Validate the heap after every step (also enabled by TASKHEAP_VERIFY)
    #[arg(long)]
    pub verify: bool,

    /// Extract everything left in the queue once the workload is done
    #[arg(long)]
    pub drain: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
