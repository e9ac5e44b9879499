use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{NaiveDate, Weekday};
use selen::prelude::*;
use shared::UNASSIGNED_EMPLOYEE;

use crate::domain::plan_inputs::PlanInputs;
use crate::domain::services::variables::VariablePool;
use crate::domain::violations::{ViolationKind, ViolationLedger, ViolationScope};

/// One row of the detail roster. Placeholder rows carry the
/// `NOT ASSIGNED` employee name and an empty violation summary.
#[derive(Debug, Clone)]
pub struct AssignmentRow {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub shift: String,
    pub site: String,
    pub employee: String,
    pub violation_summary: String,
}

impl AssignmentRow {
    pub fn is_placeholder(&self) -> bool {
        self.employee == UNASSIGNED_EMPLOYEE
    }
}

/// A slot whose staffing target was not fully met.
#[derive(Debug, Clone)]
pub struct UnderstaffedSlot {
    pub date: NaiveDate,
    pub shift: String,
    pub site: String,
    pub required: i64,
    pub assigned: i64,
}

impl fmt::Display for UnderstaffedSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} (required: {}, assigned: {})",
            self.date, self.shift, self.site, self.required, self.assigned
        )
    }
}

/// Per-employee workload summary.
#[derive(Debug, Clone, Default)]
pub struct EmployeeTotals {
    pub shifts: i64,
    pub hours: f64,
    /// Hours per ISO week of the month.
    pub weekly_hours: BTreeMap<u32, f64>,
}

/// One reported soft violation: a ledger bucket whose accumulated penalty is
/// strictly positive.
#[derive(Debug, Clone)]
pub struct ViolationEntry {
    pub kind: ViolationKind,
    pub employee_id: u32,
    pub employee: String,
    /// Count of violating assignments, or the overflow amount for aggregate
    /// constraints (centi-hours for weekly caps).
    pub count: i64,
    pub penalty: i64,
    pub scope: ViolationScope,
}

impl ViolationEntry {
    pub fn summary(&self) -> String {
        format!(
            "Employee {} violated {}. Count/overflow: {}, total penalty: {}",
            self.employee, self.kind, self.count, self.penalty
        )
    }

    pub fn description(&self) -> String {
        format!("{}. Details: {}", self.summary(), self.scope.describe())
    }
}

/// The solved roster, ready for reporting.
#[derive(Debug)]
pub struct PlanReport {
    pub assignments: Vec<AssignmentRow>,
    pub understaffed: Vec<UnderstaffedSlot>,
    pub employee_totals: BTreeMap<String, EmployeeTotals>,
    /// employee -> date -> "shift (site)" labels.
    pub pivot: BTreeMap<String, BTreeMap<NaiveDate, Vec<String>>>,
    pub violations: Vec<ViolationEntry>,
    pub assigned_count: i64,
    pub required_total: i64,
    pub sunday_deficit: i64,
    pub other_deficit: i64,
    pub objective_value: Option<i64>,
}

impl PlanReport {
    pub fn completion_percent(&self) -> Option<f64> {
        (self.required_total > 0)
            .then(|| self.assigned_count as f64 / self.required_total as f64 * 100.0)
    }

    pub fn total_penalty(&self) -> i64 {
        self.violations.iter().map(|v| v.penalty).sum()
    }
}

/// Reads the solver's value oracle back into a `PlanReport`.
pub struct ResultCollector<'a> {
    inputs: &'a PlanInputs,
    pool: &'a VariablePool,
    ledger: &'a ViolationLedger,
}

impl<'a> ResultCollector<'a> {
    pub fn new(inputs: &'a PlanInputs, pool: &'a VariablePool, ledger: &'a ViolationLedger) -> Self {
        Self {
            inputs,
            pool,
            ledger,
        }
    }

    pub fn collect(&self, solution: &Solution, objective: VarId) -> PlanReport {
        let employee_names: HashMap<u32, &str> = self
            .inputs
            .employees
            .iter()
            .map(|e| (e.id, e.name.as_str()))
            .collect();

        let mut assignments = Vec::new();
        let mut employee_totals: BTreeMap<String, EmployeeTotals> = self
            .inputs
            .employees
            .iter()
            .map(|e| (e.name.clone(), EmployeeTotals::default()))
            .collect();
        let mut pivot: BTreeMap<String, BTreeMap<NaiveDate, Vec<String>>> = BTreeMap::new();

        for ((e_idx, d_idx, s_idx, t_idx), var) in self.pool.assignments() {
            if value_of(solution, var) != 1 {
                continue;
            }
            let employee = &self.inputs.employees[e_idx];
            let day = &self.inputs.days[d_idx];
            let shift = &self.inputs.shifts[t_idx];
            let site = &self.inputs.sites[s_idx];

            assignments.push(AssignmentRow {
                date: day.date,
                weekday: day.weekday,
                shift: shift.name.clone(),
                site: site.name.clone(),
                employee: employee.name.clone(),
                violation_summary: String::new(),
            });

            let totals = employee_totals.entry(employee.name.clone()).or_default();
            let hours = shift.duration_centi_hours() as f64 / 100.0;
            totals.shifts += 1;
            totals.hours += hours;
            *totals.weekly_hours.entry(day.iso_week).or_insert(0.0) += hours;

            pivot
                .entry(employee.name.clone())
                .or_default()
                .entry(day.date)
                .or_default()
                .push(format!("{} ({})", shift.name, site.name));
        }

        // Coverage: recount each slot and materialize the shortfall.
        let mut understaffed = Vec::new();
        let mut assigned_count = 0;
        let mut required_total = 0;
        let mut sunday_deficit = 0;
        let mut other_deficit = 0;
        for ((d_idx, s_idx, t_idx), slot) in self.pool.deficits() {
            let day = &self.inputs.days[d_idx];
            let shift = &self.inputs.shifts[t_idx];
            let site = &self.inputs.sites[s_idx];
            let assigned = self
                .pool
                .slot_assignments((d_idx, s_idx, t_idx))
                .iter()
                .filter(|&&var| value_of(solution, var) == 1)
                .count() as i64;

            assigned_count += assigned;
            required_total += slot.required;
            if assigned < slot.required {
                let shortfall = slot.required - assigned;
                if shift.when.is_sunday() {
                    sunday_deficit += shortfall;
                } else {
                    other_deficit += shortfall;
                }
                understaffed.push(UnderstaffedSlot {
                    date: day.date,
                    shift: shift.name.clone(),
                    site: site.name.clone(),
                    required: slot.required,
                    assigned,
                });
                for _ in 0..shortfall {
                    assignments.push(AssignmentRow {
                        date: day.date,
                        weekday: day.weekday,
                        shift: shift.name.clone(),
                        site: site.name.clone(),
                        employee: UNASSIGNED_EMPLOYEE.to_string(),
                        violation_summary: String::new(),
                    });
                }
            }
        }

        // Soft violations with strictly positive accumulated penalty.
        let mut violations = Vec::new();
        for (key, penalized) in self.ledger.iter() {
            let mut count = 0;
            let mut penalty = 0;
            for entry in penalized {
                let value = value_of(solution, entry.var);
                if value > 0 {
                    count += value;
                    penalty += value * entry.penalty;
                }
            }
            if penalty > 0 {
                let employee = employee_names
                    .get(&key.employee_id)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| format!("ID {}", key.employee_id));
                violations.push(ViolationEntry {
                    kind: key.kind,
                    employee_id: key.employee_id,
                    employee,
                    count,
                    penalty,
                    scope: key.scope.clone(),
                });
            }
        }

        // Annotate real rows with the violations that concern them.
        for row in &mut assignments {
            if row.is_placeholder() {
                continue;
            }
            let summaries: Vec<String> = violations
                .iter()
                .filter(|v| {
                    v.employee == row.employee
                        && v.scope.covers_assignment(row.date, &row.shift, &row.site)
                })
                .map(ViolationEntry::summary)
                .collect();
            row.violation_summary = summaries.join("; ");
        }

        assignments.sort_by(|a, b| {
            (a.date, &a.site, &a.shift, &a.employee).cmp(&(b.date, &b.site, &b.shift, &b.employee))
        });

        PlanReport {
            assignments,
            understaffed,
            employee_totals,
            pivot,
            violations,
            assigned_count,
            required_total,
            sunday_deficit,
            other_deficit,
            objective_value: solution.try_get_int(objective).ok().map(i64::from),
        }
    }
}

/// Value-oracle read; failures are swallowed per variable so one bad read
/// never loses the rest of the report.
fn value_of(solution: &Solution, var: VarId) -> i64 {
    match solution.try_get_int(var) {
        Ok(value) => i64::from(value),
        Err(_) => {
            tracing::debug!("value oracle failed for a variable; treating it as 0");
            0
        }
    }
}
