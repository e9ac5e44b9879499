use selen::prelude::*;

use crate::domain::plan_inputs::PlanInputs;
use crate::domain::services::constraints::ConstraintCompiler;
use crate::domain::services::objective::build_objective;
use crate::domain::services::results::{PlanReport, ResultCollector};
use crate::domain::services::solver::{SolveStatus, SolverDriver};
use crate::domain::services::variables::VariablePool;
use crate::domain::violations::ViolationLedger;

/// Outcome of one planning run.
#[derive(Debug)]
pub enum PlanOutcome {
    Solved {
        status: SolveStatus,
        report: PlanReport,
    },
    Unsolved {
        status: SolveStatus,
    },
}

/// The monthly planning pipeline: build variables, compile constraints,
/// assemble the objective, solve once, collect results. `PlanInputs` is never
/// mutated; a run is a pure function of its inputs plus solver search order.
#[derive(Debug, Default)]
pub struct MonthlyPlanner;

impl MonthlyPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(&self, inputs: &PlanInputs) -> PlanOutcome {
        let config = SolverConfig::default()
            .with_timeout_ms(inputs.time_limit().as_millis().max(1) as u64);
        let mut model = Model::with_config(config);

        let pool = VariablePool::build(&mut model, inputs);
        tracing::info!(
            days = inputs.days.len(),
            sites = inputs.sites.len(),
            shifts = inputs.shifts.len(),
            employees = inputs.employees.len(),
            assignment_vars = pool.assignment_count(),
            "model variables created"
        );

        let mut ledger = ViolationLedger::default();
        ConstraintCompiler::new(inputs, &pool).compile(&mut model, &mut ledger);
        let objective = build_objective(&mut model, inputs, &pool, &ledger);

        let driver = SolverDriver::new(inputs.time_limit());
        let outcome = driver.solve(model, objective);

        match outcome.solution {
            Some(solution) if outcome.status.has_solution() => {
                let report =
                    ResultCollector::new(inputs, &pool, &ledger).collect(&solution, objective);
                PlanOutcome::Solved {
                    status: outcome.status,
                    report,
                }
            }
            _ => PlanOutcome::Unsolved {
                status: outcome.status,
            },
        }
    }
}
