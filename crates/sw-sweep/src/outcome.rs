//! Per-run outcome records and the sweep-level report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::CommandRecord;

/// Unique sweep identifier.
pub type SweepId = Uuid;

/// How a single run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Succeeded,
    /// Non-zero exit. `exit_code` is `None` when the process was killed by a
    /// signal.
    Failed { exit_code: Option<i32> },
    /// The command never ran (missing program, unwritable log file, ...).
    SpawnFailed { message: String },
}

impl RunStatus {
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => Self::Succeeded,
            other => Self::Failed { exit_code: other },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Result of one command, in admission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Position in the command list.
    pub index: usize,
    pub run_name: String,
    pub command: String,
    pub status: RunStatus,
    /// Slot that ran the command.
    pub slot: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunOutcome {
    pub fn new(
        index: usize,
        slot: usize,
        command: &CommandRecord,
        status: RunStatus,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            index,
            run_name: command.run_name.clone(),
            command: command.command_line(),
            status,
            slot,
            started_at,
            finished_at,
            duration_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// What the caller does with failed runs once the sweep has drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FailurePolicy {
    /// Failures are logged and otherwise ignored; the batch always succeeds.
    #[default]
    Ignore,
    /// The batch fails if any run failed.
    FailOnAny,
}

/// Aggregate record of a sweep launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub id: SweepId,
    pub concurrency: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Ordered by `index`.
    pub outcomes: Vec<RunOutcome>,
}

impl SweepReport {
    pub fn new(concurrency: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            concurrency,
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
        }
    }

    /// Attach outcomes, sorted into admission order, and stamp the finish
    /// time.
    pub fn finish(&mut self, mut outcomes: Vec<RunOutcome>) {
        outcomes.sort_by_key(|o| o.index);
        self.outcomes = outcomes;
        self.finished_at = Some(Utc::now());
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Whether the batch as a whole counts as failed under `policy`.
    pub fn violates(&self, policy: FailurePolicy) -> bool {
        match policy {
            FailurePolicy::Ignore => false,
            FailurePolicy::FailOnAny => !self.is_success(),
        }
    }
}
