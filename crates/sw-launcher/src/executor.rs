//! Bounded-concurrency executor.
//!
//! A fixed number of slots share one queue of pending commands. A free slot
//! pops the next command in list order, runs it to completion, records the
//! outcome and goes back to the queue. Nothing is retried and a failed run
//! never stops the sweep; the executor returns once every slot has drained.

use chrono::Utc;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use sw_sweep::{CommandRecord, RunOutcome, RunStatus, SweepReport};
use sw_types::{ConfigError, ExecutionError, SwResult};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::runner::CommandRunner;

type PendingQueue = Mutex<VecDeque<(usize, CommandRecord)>>;

/// Runs commands with at most `concurrency` in flight.
#[derive(Debug, Clone, Copy)]
pub struct BoundedExecutor {
    concurrency: usize,
}

impl BoundedExecutor {
    pub fn new(concurrency: usize) -> SwResult<Self> {
        if concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency.into());
        }
        Ok(Self { concurrency })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run every command and wait for all of them to exit.
    ///
    /// Individual failures (non-zero exit, spawn errors) are recorded in the
    /// report. The only error returned is a slot worker that panicked, and
    /// even then the remaining slots are drained first.
    pub async fn run(
        &self,
        commands: Vec<CommandRecord>,
        runner: Arc<dyn CommandRunner>,
    ) -> SwResult<SweepReport> {
        let mut report = SweepReport::new(self.concurrency);
        let total = commands.len();
        let slots = self.concurrency.min(total);

        info!(
            sweep_id = %report.id,
            commands = total,
            slots,
            runner = runner.name(),
            "sweep started"
        );

        let queue: Arc<PendingQueue> =
            Arc::new(Mutex::new(commands.into_iter().enumerate().collect()));

        let mut workers = JoinSet::new();
        for slot in 0..slots {
            let queue = Arc::clone(&queue);
            let runner = Arc::clone(&runner);
            workers.spawn(run_slot(slot, queue, runner));
        }

        let mut outcomes = Vec::with_capacity(total);
        let mut panicked = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(mut finished) => outcomes.append(&mut finished),
                Err(e) => {
                    error!(error = %e, "slot worker aborted");
                    if panicked.is_none() {
                        panicked = Some(e.to_string());
                    }
                }
            }
        }

        if let Some(message) = panicked {
            return Err(ExecutionError::WorkerPanicked { message }.into());
        }

        report.finish(outcomes);
        info!(
            sweep_id = %report.id,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "sweep finished"
        );
        Ok(report)
    }
}

fn next_pending(queue: &PendingQueue) -> Option<(usize, CommandRecord)> {
    queue.lock().pop_front()
}

/// Slot loop: IDLE -> RUNNING on dequeue, back to IDLE on exit, until the
/// queue is empty.
async fn run_slot(
    slot: usize,
    queue: Arc<PendingQueue>,
    runner: Arc<dyn CommandRunner>,
) -> Vec<RunOutcome> {
    let mut outcomes = Vec::new();

    while let Some((index, command)) = next_pending(&queue) {
        debug!(slot, index, run_name = %command.run_name, "slot running");

        let started_at = Utc::now();
        let status = match runner.run(&command).await {
            Ok(exit) => RunStatus::from_exit_code(exit.code),
            Err(e) => RunStatus::SpawnFailed {
                message: e.to_string(),
            },
        };
        let outcome = RunOutcome::new(index, slot, &command, status, started_at, Utc::now());

        match &outcome.status {
            RunStatus::Succeeded => info!(
                slot,
                run_name = %outcome.run_name,
                duration_ms = outcome.duration_ms,
                "run finished"
            ),
            RunStatus::Failed { exit_code } => warn!(
                slot,
                run_name = %outcome.run_name,
                exit_code = ?exit_code,
                duration_ms = outcome.duration_ms,
                "run failed"
            ),
            RunStatus::SpawnFailed { message } => warn!(
                slot,
                run_name = %outcome.run_name,
                error = %message,
                "run could not start"
            ),
        }

        outcomes.push(outcome);
    }

    debug!(slot, runs = outcomes.len(), "slot drained");
    outcomes
}
