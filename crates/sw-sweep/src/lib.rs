//! # sw-sweep
//!
//! Sweep enumeration and command rendering for the experiment launcher.
//!
//! Expands the configured task set and N range into an ordered list of
//! [`CommandRecord`]s, and defines the per-run outcome and sweep report types
//! the executor fills in.

mod command;
mod outcome;
mod sweep;

pub use command::{build_commands, expected_command_count, CommandRecord};
pub use outcome::{FailurePolicy, RunOutcome, RunStatus, SweepId, SweepReport};
pub use sweep::{enumerate_points, sweep_values, SweepPoint};
