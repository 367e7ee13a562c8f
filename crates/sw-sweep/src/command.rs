//! Command records: the fully rendered invocation for one sweep point.

use serde::{Deserialize, Serialize};
use std::fmt;
use sw_types::{CommandTemplate, LaunchConfig, SwResult};
use tracing::debug;

use crate::sweep::{enumerate_points, sweep_values, SweepPoint};

/// A rendered external invocation. Opaque to the executor beyond launch and
/// exit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub run_name: String,
    pub program: String,
    pub args: Vec<String>,
}

impl CommandRecord {
    pub fn new<I, S>(run_name: impl Into<String>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            run_name: run_name.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Substitute `run_name` into the template.
    pub fn render(template: &CommandTemplate, run_name: &str) -> Self {
        let mut parts = template.entrypoint.iter();
        let program = parts.next().cloned().unwrap_or_default();

        let mut args: Vec<String> = parts.cloned().collect();
        args.push(run_name.to_string());
        args.extend([
            "--model_type".to_string(),
            template.model_type.clone(),
            "-dc".to_string(),
            template.dataset_config.to_string_lossy().into_owned(),
            "--model_config".to_string(),
            template.model_config.to_string_lossy().into_owned(),
            "-dv".to_string(),
            template.device.clone(),
        ]);
        if template.continue_run {
            args.push("-c".to_string());
        }

        Self {
            run_name: run_name.to_string(),
            program,
            args,
        }
    }

    pub fn for_point(template: &CommandTemplate, point: &SweepPoint) -> Self {
        Self::render(template, &point.run_name(&template.run_name_separator))
    }

    /// Space-joined command line, as an operator would type it.
    pub fn command_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CommandRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Validate the configuration and render one command per sweep point,
/// task-major and N-minor.
pub fn build_commands(config: &LaunchConfig) -> SwResult<Vec<CommandRecord>> {
    config.validate()?;

    let commands: Vec<CommandRecord> = enumerate_points(&config.tasks, &config.sweep)
        .iter()
        .map(|point| CommandRecord::for_point(&config.template, point))
        .collect();

    debug!(
        tasks = config.tasks.len(),
        commands = commands.len(),
        "rendered sweep commands"
    );
    Ok(commands)
}

/// Number of commands [`build_commands`] produces for a valid config.
pub fn expected_command_count(config: &LaunchConfig) -> usize {
    config.tasks.len() * sweep_values(&config.sweep).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_types::{ConfigError, SwError};

    const ECOLI1_5: &str = "python -m causica.run_experiment Ecoli1_5 --model_type rhino \
        -dc configs/dataset_config_temporal_causal_dataset.json \
        --model_config configs/rhino/model_config_rhino_ecoli1.json -dv gpu -c";

    #[test]
    fn renders_stock_command_exactly() {
        let commands = build_commands(&LaunchConfig::default()).unwrap();
        assert_eq!(commands[0].run_name, "Ecoli1_5");
        assert_eq!(commands[0].program, "python");
        assert_eq!(commands[0].command_line(), ECOLI1_5);
    }

    #[test]
    fn command_count_is_tasks_times_nine() {
        let config = LaunchConfig::default();
        let commands = build_commands(&config).unwrap();
        assert_eq!(commands.len(), 5 * 9);
        assert_eq!(expected_command_count(&config), commands.len());
    }

    #[test]
    fn commands_differ_only_by_run_name() {
        let commands = build_commands(&LaunchConfig::default()).unwrap();
        let skeleton = |c: &CommandRecord| c.command_line().replace(&c.run_name, "<run>");

        let first = skeleton(&commands[0]);
        for command in &commands {
            assert_eq!(command.command_line().matches(&command.run_name).count(), 1);
            assert_eq!(skeleton(command), first);
        }
    }

    #[test]
    fn order_is_task_major() {
        let config = LaunchConfig::default().with_tasks(["Yeast2", "Ecoli2"]);
        let names: Vec<String> = build_commands(&config)
            .unwrap()
            .into_iter()
            .map(|c| c.run_name)
            .collect();
        assert_eq!(&names[..2], &["Yeast2_5", "Yeast2_10"]);
        assert_eq!(names[8], "Yeast2_43");
        assert_eq!(names[9], "Ecoli2_5");
        assert_eq!(names[17], "Ecoli2_43");
    }

    #[test]
    fn continue_flag_is_optional() {
        let mut template = CommandTemplate::default();
        template.continue_run = false;
        let record = CommandRecord::render(&template, "A_5");
        assert_eq!(record.args.last().map(String::as_str), Some("gpu"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = LaunchConfig::default().with_concurrency(0);
        match build_commands(&config) {
            Err(SwError::Config(ConfigError::ZeroConcurrency)) => (),
            other => panic!("expected zero concurrency error, got {other:?}"),
        }
    }
}
