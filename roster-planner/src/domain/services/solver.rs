use std::fmt;
use std::time::{Duration, Instant};

use selen::prelude::*;

/// Outcome taxonomy of one solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Search finished within the time limit with a best solution.
    Optimal,
    /// The time limit cut the search short but an incumbent exists.
    Feasible,
    /// The search space was exhausted without any solution.
    Infeasible,
    /// The time limit was hit before any solution was found.
    Unknown,
    /// The solver rejected the model itself.
    ModelInvalid,
}

impl SolveStatus {
    pub fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Optimal => "OPTIMAL",
            Self::Feasible => "FEASIBLE",
            Self::Infeasible => "INFEASIBLE",
            Self::Unknown => "UNKNOWN",
            Self::ModelInvalid => "MODEL_INVALID",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub solution: Option<Solution>,
    pub wall_time: Duration,
}

/// Drives a single optimization run.
///
/// The model's own timeout (set at construction) bounds the search; the
/// driver walks the improving-solution iterator and keeps the last incumbent,
/// so a run cut short by the limit still yields its best solution.
#[derive(Debug, Clone, Copy)]
pub struct SolverDriver {
    time_limit: Duration,
}

impl SolverDriver {
    pub fn new(time_limit: Duration) -> Self {
        Self { time_limit }
    }

    pub fn solve(&self, model: Model, objective: VarId) -> SolveOutcome {
        tracing::info!(
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            time_limit_seconds = self.time_limit.as_secs_f64(),
            "starting solver"
        );

        if let Err(reason) = model.validate() {
            tracing::warn!(%reason, "solver rejected the model");
            return SolveOutcome {
                status: SolveStatus::ModelInvalid,
                solution: None,
                wall_time: Duration::ZERO,
            };
        }

        let started = Instant::now();
        let mut incumbent = None;
        for solution in model.maximize_and_iterate(objective) {
            incumbent = Some(solution);
        }
        let wall_time = started.elapsed();
        let timed_out = wall_time >= self.time_limit.mul_f64(0.95);

        let status = match (&incumbent, timed_out) {
            (Some(_), false) => SolveStatus::Optimal,
            (Some(_), true) => SolveStatus::Feasible,
            (None, false) => SolveStatus::Infeasible,
            (None, true) => SolveStatus::Unknown,
        };

        tracing::info!(status = %status, wall_seconds = wall_time.as_secs_f64(), "solver finished");
        SolveOutcome {
            status,
            solution: incumbent,
            wall_time,
        }
    }
}
