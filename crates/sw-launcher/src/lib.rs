//! # sw-launcher
//!
//! Runs sweep commands as independent external processes with a fixed
//! concurrency ceiling.

pub mod executor;
pub mod runner;

pub use executor::BoundedExecutor;
pub use runner::{CommandRunner, DryRunRunner, ExitState, ProcessRunner};

use std::sync::Arc;
use sw_sweep::{build_commands, SweepReport};
use sw_types::{LaunchConfig, SwResult};
use tracing::warn;

/// Build the commands for `config` and run them with `runner`.
pub async fn launch(config: &LaunchConfig, runner: Arc<dyn CommandRunner>) -> SwResult<SweepReport> {
    let commands = build_commands(config)?;
    let executor = BoundedExecutor::new(config.concurrency)?;
    executor.run(commands, runner).await
}

/// Warn about config files the external runner will not find. The launcher
/// does not read them, so a missing file is not an error here.
pub fn preflight(config: &LaunchConfig) -> Vec<std::path::PathBuf> {
    let missing: Vec<_> = config
        .template
        .referenced_files(config.working_dir.as_deref())
        .into_iter()
        .filter(|path| !path.exists())
        .collect();

    for path in &missing {
        warn!(path = %path.display(), "config file referenced by the command template not found");
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn launch_dry_run_covers_whole_sweep() {
        let config = LaunchConfig::default().with_tasks(["Ecoli1", "Yeast1"]);
        let report = launch(&config, Arc::new(DryRunRunner)).await.unwrap();

        assert_eq!(report.total(), 18);
        assert!(report.is_success());
        assert_eq!(report.concurrency, 5);
        assert!(report.outcomes[0].command.contains("Ecoli1_5"));
    }

    #[tokio::test]
    async fn launch_rejects_invalid_config() {
        let config = LaunchConfig::default().with_tasks(Vec::<String>::new());
        assert!(launch(&config, Arc::new(DryRunRunner)).await.is_err());
    }

    #[test]
    fn preflight_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LaunchConfig::default();
        config.working_dir = Some(dir.path().to_path_buf());

        assert_eq!(preflight(&config).len(), 2);

        let dataset = dir.path().join(&config.template.dataset_config);
        std::fs::create_dir_all(dataset.parent().unwrap()).unwrap();
        std::fs::write(&dataset, "{}").unwrap();

        let missing = preflight(&config);
        assert_eq!(missing, vec![dir.path().join(&config.template.model_config)]);
    }
}
