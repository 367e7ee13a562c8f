//! Launch configuration: which tasks, which sweep values, how many runs at
//! once, and the command template every run is rendered from.
//!
//! [`LaunchConfig::default`] reproduces the stock rhino sweep: five gene
//! regulatory datasets, N in `5..=40` by 5 plus 43, five runs in flight.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::errors::{ConfigError, SwResult};

pub const DEFAULT_TASKS: [&str; 5] = ["Ecoli1", "Ecoli2", "Yeast1", "Yeast2", "Yeast3"];
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Top-level configuration for a sweep launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Task identifiers, in launch order.
    pub tasks: Vec<String>,

    /// Values of the sweep parameter N, applied to every task.
    pub sweep: SweepRange,

    /// Maximum number of commands running at the same time.
    pub concurrency: usize,

    /// Template every command is rendered from.
    pub template: CommandTemplate,

    /// Working directory for spawned commands. Inherited when unset.
    pub working_dir: Option<PathBuf>,

    /// When set, each run writes stdout/stderr to `<log_dir>/<run_name>.log`.
    pub log_dir: Option<PathBuf>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            tasks: DEFAULT_TASKS.iter().map(|t| t.to_string()).collect(),
            sweep: SweepRange::default(),
            concurrency: DEFAULT_CONCURRENCY,
            template: CommandTemplate::default(),
            working_dir: None,
            log_dir: None,
        }
    }
}

impl LaunchConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// defaults.
    pub fn from_file(path: impl AsRef<Path>) -> SwResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn with_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tasks = tasks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    pub fn with_sweep(mut self, sweep: SweepRange) -> Self {
        self.sweep = sweep;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Check the configuration before anything is rendered or spawned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tasks.is_empty() {
            return Err(ConfigError::NoTasks);
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            // Task names end up inside a single argv entry; whitespace would
            // make the rendered command line ambiguous.
            if task.is_empty() || task.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidTaskName { name: task.clone() });
            }
            if !seen.insert(task.as_str()) {
                return Err(ConfigError::DuplicateTask { name: task.clone() });
            }
        }

        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        self.sweep.validate()?;
        self.template.validate()
    }
}

/// Stride range for the sweep parameter plus explicitly appended values.
///
/// Extras are kept verbatim: `43` in the default range is a dataset boundary,
/// not a stride step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepRange {
    pub start: i64,
    /// Inclusive upper bound of the stride.
    pub end: i64,
    pub step: i64,
    #[serde(default)]
    pub extra: Vec<i64>,
}

impl Default for SweepRange {
    fn default() -> Self {
        Self {
            start: 5,
            end: 40,
            step: 5,
            extra: vec![43],
        }
    }
}

impl SweepRange {
    pub fn new(start: i64, end: i64, step: i64) -> Self {
        Self {
            start,
            end,
            step,
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, value: i64) -> Self {
        self.extra.push(value);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step <= 0 {
            return Err(ConfigError::NonPositiveStep { step: self.step });
        }
        if self.start > self.end {
            return Err(ConfigError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Fixed parts of the experiment-runner invocation. Only the run name varies
/// between commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandTemplate {
    /// Program followed by its leading arguments.
    pub entrypoint: Vec<String>,
    pub model_type: String,
    pub dataset_config: PathBuf,
    pub model_config: PathBuf,
    pub device: String,
    /// Renders the trailing `-c` flag.
    pub continue_run: bool,
    pub run_name_separator: String,
}

impl Default for CommandTemplate {
    fn default() -> Self {
        Self {
            entrypoint: vec![
                "python".to_string(),
                "-m".to_string(),
                "causica.run_experiment".to_string(),
            ],
            model_type: "rhino".to_string(),
            dataset_config: PathBuf::from("configs/dataset_config_temporal_causal_dataset.json"),
            model_config: PathBuf::from("configs/rhino/model_config_rhino_ecoli1.json"),
            device: "gpu".to_string(),
            continue_run: true,
            run_name_separator: "_".to_string(),
        }
    }
}

impl CommandTemplate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entrypoint.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(ConfigError::EmptyEntrypoint);
        }
        if self.run_name_separator.is_empty() {
            return Err(ConfigError::EmptySeparator);
        }
        Ok(())
    }

    /// Config files the external runner will read, resolved against `base`.
    pub fn referenced_files(&self, base: Option<&Path>) -> Vec<PathBuf> {
        [&self.dataset_config, &self.model_config]
            .into_iter()
            .map(|p| match base {
                Some(dir) if p.is_relative() => dir.join(p),
                _ => p.clone(),
            })
            .collect()
    }
}
