//! Sweep launcher CLI.
//!
//! ```bash
//! # Stock rhino sweep: 5 datasets x 9 values of N, 5 runs at a time
//! sw-launch
//!
//! # Two datasets, one GPU, per-run log files, fail the batch on any failure
//! sw-launch --tasks Ecoli1,Yeast2 --concurrency 1 --log-dir logs --fail-on-error
//!
//! # Show what would run
//! sw-launch --config sweep.json --list
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sw_launcher::{launch, preflight, CommandRunner, DryRunRunner, ProcessRunner};
use sw_sweep::{build_commands, FailurePolicy};
use sw_types::LaunchConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sw-launch")]
#[command(about = "Run an experiment sweep as parallel external processes")]
struct Args {
    /// JSON launch configuration. Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated task names, replacing the configured set.
    #[arg(long, value_delimiter = ',')]
    tasks: Option<Vec<String>>,

    /// Maximum number of runs in flight.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Write each run's stdout/stderr to <DIR>/<run_name>.log.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log the commands instead of running them.
    #[arg(long)]
    dry_run: bool,

    /// Print the rendered commands and exit.
    #[arg(long)]
    list: bool,

    /// Exit non-zero if any run fails.
    #[arg(long)]
    fail_on_error: bool,

    /// Write the sweep report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn launch_config(&self) -> Result<LaunchConfig> {
        let mut config = match &self.config {
            Some(path) => LaunchConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => LaunchConfig::default(),
        };

        if let Some(tasks) = &self.tasks {
            config = config.with_tasks(tasks.iter().cloned());
        }
        if let Some(n) = self.concurrency {
            config = config.with_concurrency(n);
        }
        if let Some(dir) = &self.log_dir {
            config = config.with_log_dir(dir);
        }
        Ok(config)
    }

    fn failure_policy(&self) -> FailurePolicy {
        if self.fail_on_error {
            FailurePolicy::FailOnAny
        } else {
            FailurePolicy::Ignore
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = args.launch_config()?;

    if args.list {
        for command in build_commands(&config)? {
            println!("{command}");
        }
        return Ok(());
    }

    let runner: Arc<dyn CommandRunner> = if args.dry_run {
        Arc::new(DryRunRunner)
    } else {
        preflight(&config);
        Arc::new(ProcessRunner::from_config(&config))
    };

    let report = launch(&config, runner).await?;

    for failure in report.failures() {
        warn!(run_name = %failure.run_name, status = ?failure.status, "failed run");
    }
    info!(
        total = report.total(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "all runs exited"
    );

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    if report.violates(args.failure_policy()) {
        anyhow::bail!("{} of {} runs failed", report.failed(), report.total());
    }
    Ok(())
}
