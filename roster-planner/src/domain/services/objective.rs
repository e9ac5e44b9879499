use selen::prelude::*;

use crate::domain::entities::{Employee, EmployeeConstraint};
use crate::domain::plan_inputs::PlanInputs;
use crate::domain::services::variables::VariablePool;
use crate::domain::violations::ViolationLedger;

/// Integer priority of an employee, computed from the shape of their personal
/// constraints. Weekly hour caps do not count. Hard rules weigh 2, soft rules
/// 1; exclusion-style rules (temporal, hour-range, site) add 1 more. The
/// score biases the objective toward assigning constrained employees first.
pub fn priority_score(employee: &Employee) -> i64 {
    let mut score = 0;
    for constraint in &employee.constraints {
        if matches!(constraint, EmployeeConstraint::WeeklyHourLimit { .. }) {
            continue;
        }
        score += if constraint.is_soft() { 1 } else { 2 };
        if matches!(
            constraint,
            EmployeeConstraint::TemporalExclusion { .. }
                | EmployeeConstraint::HourRangeExclusion { .. }
                | EmployeeConstraint::SiteRestriction { .. }
        ) {
            score += 1;
        }
    }
    score
}

struct Term {
    var: VarId,
    coefficient: i64,
}

/// Builds the weighted objective and returns the variable to maximize:
///
/// `w_T*T + w_P*sum(T_e*P_e) - w_var*Var - w_viol*V - w_def_sun*D_sun - w_def_other*D_other`
///
/// The variance term linearizes each `(T_e - mean)^2` through an auxiliary
/// signed difference variable and the solver's multiplication equality. The
/// mean is the precomputed integer `total demand / employee count`; any
/// constant center preserves the load-balancing behavior.
///
/// The objective variable's domain runs from the exact value of the empty
/// roster (always feasible: every deficit open, every total zero) up to the
/// value of full coverage at the highest per-employee weight. Keeping the
/// domain this tight matters: the solver rejects oversized integer domains.
pub fn build_objective(
    model: &mut Model,
    inputs: &PlanInputs,
    pool: &VariablePool,
    ledger: &ViolationLedger,
) -> VarId {
    let weights = &inputs.weights;
    let mut terms: Vec<Term> = Vec::new();

    let employee_count = inputs.employees.len() as i64;
    let demand = inputs.total_staffing_demand();
    let mean = if employee_count > 0 {
        demand / employee_count
    } else {
        0
    };

    // Exact objective value of the all-zeros roster, and an upper bound on
    // the value of any roster.
    let mut empty_roster_value = 0i64;
    let mut ceiling = 0i64;

    let best_total_coefficient = inputs
        .employees
        .iter()
        .map(|e| weights.assigned_shifts + weights.employee_priority * priority_score(e))
        .max()
        .unwrap_or(0)
        .max(0);
    // Slot capacities bound the grand total of assignments by the demand.
    ceiling += best_total_coefficient * demand;

    for (e_idx, employee) in inputs.employees.iter().enumerate() {
        let vars: Vec<VarId> = pool
            .employee_assignments(e_idx)
            .map(|(_, var)| var)
            .collect();
        let max_shifts = vars.len() as i64;

        // T_e: total shifts of the employee.
        let total = model.int(0, max_shifts as i32);
        let mut eq_vars = vars;
        eq_vars.push(total);
        let mut coefficients = vec![1; eq_vars.len() - 1];
        coefficients.push(-1);
        model.int_lin_eq(&coefficients, &eq_vars, 0);

        terms.push(Term {
            var: total,
            coefficient: weights.assigned_shifts
                + weights.employee_priority * priority_score(employee),
        });

        if weights.variance != 0 {
            let bound = max_shifts.max(mean).max(1);
            let difference = model.int(-(bound as i32), bound as i32);
            // difference = T_e - mean
            model.int_lin_eq(&[1, -1], &[difference, total], -(mean as i32));
            let squared = model.mul(difference, difference);
            terms.push(Term {
                var: squared,
                coefficient: -weights.variance,
            });
            // An empty roster leaves difference = -mean for everyone.
            empty_roster_value -= weights.variance * mean * mean;
            if weights.variance < 0 {
                ceiling += -weights.variance * bound * bound;
            }
        }
    }

    for violation in ledger.penalized_vars() {
        let coefficient = -(weights.soft_violations * violation.penalty);
        if coefficient == 0 {
            continue;
        }
        terms.push(Term {
            var: violation.var,
            coefficient,
        });
        // An empty roster violates nothing; only perverse negative weights
        // can push the objective above the coverage ceiling.
        if coefficient > 0 {
            ceiling += coefficient * violation.max_value;
        }
    }

    for ((_, _, t_idx), deficit) in pool.deficits() {
        let weight = if inputs.shifts[t_idx].when.is_sunday() {
            weights.sunday_deficit
        } else {
            weights.other_days_deficit
        };
        if weight == 0 {
            continue;
        }
        terms.push(Term {
            var: deficit.var,
            coefficient: -weight,
        });
        empty_roster_value -= weight * deficit.required;
        if weight < 0 {
            ceiling += -weight * deficit.required;
        }
    }

    let lower = empty_roster_value.clamp(i32::MIN as i64, i32::MAX as i64);
    let upper = ceiling.max(lower).clamp(i32::MIN as i64, i32::MAX as i64);
    let objective = model.int(lower as i32, upper as i32);

    let mut vars: Vec<VarId> = terms.iter().map(|t| t.var).collect();
    let mut coefficients: Vec<i32> = terms.iter().map(|t| t.coefficient as i32).collect();
    vars.push(objective);
    coefficients.push(-1);
    model.int_lin_eq(&coefficients, &vars, 0);

    tracing::debug!(
        terms = terms.len(),
        mean,
        lower,
        upper,
        "objective assembled"
    );
    objective
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ShiftClass;

    fn employee_with(constraints: Vec<EmployeeConstraint>) -> Employee {
        Employee {
            id: 1,
            name: "A".to_string(),
            certifications: vec![],
            max_weekly_hours: 0.0,
            constraints,
        }
    }

    #[test]
    fn test_priority_score_is_zero_without_constraints() {
        assert_eq!(priority_score(&employee_with(vec![])), 0);
    }

    #[test]
    fn test_priority_score_weighs_hard_exclusions_highest() {
        // Hard temporal exclusion: 2 (hard) + 1 (exclusion family) = 3.
        let hard = employee_with(vec![EmployeeConstraint::TemporalExclusion {
            when: vec![ShiftClass::new("Sunday")],
            days: vec![],
            soft: false,
            penalty: 0,
        }]);
        assert_eq!(priority_score(&hard), 3);

        // Soft version: 1 + 1 = 2.
        let soft = employee_with(vec![EmployeeConstraint::TemporalExclusion {
            when: vec![ShiftClass::new("Sunday")],
            days: vec![],
            soft: true,
            penalty: 5,
        }]);
        assert_eq!(priority_score(&soft), 2);
    }

    #[test]
    fn test_priority_score_ignores_weekly_hour_caps() {
        let employee = employee_with(vec![EmployeeConstraint::WeeklyHourLimit {
            max_hours: Some(36.0),
            soft: false,
            penalty: 0,
        }]);
        assert_eq!(priority_score(&employee), 0);
    }

    #[test]
    fn test_priority_score_plain_rules_count_without_bonus() {
        // Hard daily limit: 2, no exclusion bonus.
        let employee = employee_with(vec![EmployeeConstraint::DailyShiftLimit {
            max_shifts: 1,
            soft: false,
            penalty: 0,
        }]);
        assert_eq!(priority_score(&employee), 2);
    }
}
