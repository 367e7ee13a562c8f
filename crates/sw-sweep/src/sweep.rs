//! Sweep enumeration: expands a [`SweepRange`] into concrete N values and
//! crosses them with the task set.

use serde::{Deserialize, Serialize};
use sw_types::SweepRange;

/// One (task, N) pair of the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SweepPoint {
    pub task: String,
    pub n: i64,
}

impl SweepPoint {
    pub fn new(task: impl Into<String>, n: i64) -> Self {
        Self {
            task: task.into(),
            n,
        }
    }

    /// Run name passed as the runner's first argument, e.g. `Ecoli1_5`.
    pub fn run_name(&self, separator: &str) -> String {
        format!("{}{}{}", self.task, separator, self.n)
    }
}

/// Concrete N values for a range: the stride from `start` to `end`
/// inclusive, followed by the extra values. Sorted and de-duplicated.
///
/// An invalid range (non-positive step, `start > end`) yields only the
/// extras; [`SweepRange::validate`] is the place that rejects it.
pub fn sweep_values(range: &SweepRange) -> Vec<i64> {
    let mut values: Vec<i64> = if range.step > 0 && range.start <= range.end {
        let mut stride = Vec::new();
        let mut n = range.start;
        while n <= range.end {
            stride.push(n);
            n = match n.checked_add(range.step) {
                Some(next) => next,
                None => break,
            };
        }
        stride
    } else {
        Vec::new()
    };

    values.extend(range.extra.iter().copied());
    values.sort_unstable();
    values.dedup();
    values
}

/// Cross product of tasks and sweep values, task-major and N-minor.
pub fn enumerate_points(tasks: &[String], range: &SweepRange) -> Vec<SweepPoint> {
    let values = sweep_values(range);

    let mut points = Vec::with_capacity(tasks.len() * values.len());
    for task in tasks {
        for n in &values {
            points.push(SweepPoint::new(task.as_str(), *n));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_range_keeps_boundary_value() {
        let values = sweep_values(&SweepRange::default());
        assert_eq!(values, vec![5, 10, 15, 20, 25, 30, 35, 40, 43]);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn extra_on_stride_is_not_repeated() {
        let range = SweepRange::new(5, 40, 5).with_extra(20).with_extra(43);
        assert_eq!(sweep_values(&range).len(), 9);
    }

    #[test]
    fn extra_below_start_sorts_first() {
        let range = SweepRange::new(10, 20, 10).with_extra(1);
        assert_eq!(sweep_values(&range), vec![1, 10, 20]);
    }

    #[test]
    fn stride_stops_at_inclusive_end() {
        assert_eq!(sweep_values(&SweepRange::new(0, 9, 4)), vec![0, 4, 8]);
        assert_eq!(sweep_values(&SweepRange::new(7, 7, 3)), vec![7]);
    }

    #[test]
    fn invalid_range_yields_only_extras() {
        let range = SweepRange::new(5, 40, 0).with_extra(43);
        assert_eq!(sweep_values(&range), vec![43]);
    }

    #[test]
    fn points_are_task_major() {
        let tasks = vec!["A".to_string(), "B".to_string()];
        let points = enumerate_points(&tasks, &SweepRange::default());

        assert_eq!(points.len(), 18);
        assert!(points[..9].iter().all(|p| p.task == "A"));
        assert!(points[9..].iter().all(|p| p.task == "B"));
        assert_eq!(points[8], SweepPoint::new("A", 43));
        assert_eq!(points[9], SweepPoint::new("B", 5));
    }

    #[test]
    fn run_name_uses_separator() {
        let point = SweepPoint::new("Ecoli1", 5);
        assert_eq!(point.run_name("_"), "Ecoli1_5");
        assert_eq!(point.run_name("-n"), "Ecoli1-n5");
    }
}
