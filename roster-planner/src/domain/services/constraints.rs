use chrono::Weekday;
use selen::prelude::*;
use shared::ShiftClass;

use crate::domain::calendar;
use crate::domain::entities::{Employee, EmployeeConstraint};
use crate::domain::plan_inputs::PlanInputs;
use crate::domain::services::variables::VariablePool;
use crate::domain::violations::{ViolationKey, ViolationKind, ViolationLedger, ViolationScope};

/// Weekly soft-overflow bound: 50 hours in centi-hours.
const MAX_WEEKLY_OVERFLOW_CENTI_HOURS: i64 = 5000;

/// Translates every rule of the plan into solver constraints.
///
/// Hard rules force assignment variables to zero (or cap linear sums); soft
/// rules create penalized indicator variables recorded in the violation
/// ledger. The temporal-class gating itself needs no constraints: disallowed
/// combinations have no variable at all.
pub struct ConstraintCompiler<'a> {
    inputs: &'a PlanInputs,
    pool: &'a VariablePool,
}

impl<'a> ConstraintCompiler<'a> {
    pub fn new(inputs: &'a PlanInputs, pool: &'a VariablePool) -> Self {
        Self { inputs, pool }
    }

    pub fn compile(&self, model: &mut Model, ledger: &mut ViolationLedger) {
        self.apply_slot_capacity(model);
        self.apply_certifications(model);
        self.apply_unavailability(model);
        self.apply_individual_constraints(model, ledger);
        self.apply_weekly_hour_caps(model, ledger);
        self.apply_sunday_alternation(model, ledger);
        tracing::debug!("constraints compiled");
    }

    /// Hard: at most `required` employees per slot.
    fn apply_slot_capacity(&self, model: &mut Model) {
        for (slot, deficit) in self.pool.deficits() {
            let vars = self.pool.slot_assignments(slot);
            let coefficients = vec![1; vars.len()];
            model.int_lin_le(&coefficients, &vars, deficit.required as i32);
        }
    }

    /// Hard: employees lacking a shift's required certification never take it.
    fn apply_certifications(&self, model: &mut Model) {
        for ((e_idx, _, _, t_idx), var) in self.pool.assignments() {
            let shift = &self.inputs.shifts[t_idx];
            if let Some(certification) = &shift.required_certification {
                if !self.inputs.employees[e_idx].has_certification(certification) {
                    force_zero(model, var);
                }
            }
        }
    }

    /// Hard: no assignments on days the employee declared unavailable.
    fn apply_unavailability(&self, model: &mut Model) {
        for ((e_idx, d_idx, _, _), var) in self.pool.assignments() {
            let employee = &self.inputs.employees[e_idx];
            let date = self.inputs.days[d_idx].date;
            if self.inputs.is_unavailable(employee, date) {
                force_zero(model, var);
            }
        }
    }

    fn apply_individual_constraints(&self, model: &mut Model, ledger: &mut ViolationLedger) {
        for (e_idx, employee) in self.inputs.employees.iter().enumerate() {
            for constraint in &employee.constraints {
                self.apply_employee_constraint(model, ledger, e_idx, employee, constraint);
            }
        }
    }

    /// The single dispatch over the constraint variant.
    fn apply_employee_constraint(
        &self,
        model: &mut Model,
        ledger: &mut ViolationLedger,
        e_idx: usize,
        employee: &Employee,
        constraint: &EmployeeConstraint,
    ) {
        match constraint {
            EmployeeConstraint::TemporalExclusion {
                when,
                days,
                soft,
                penalty,
            } => {
                let day_filter = parse_day_filter(days);
                for ((_, d_idx, s_idx, t_idx), var) in self.pool.employee_assignments(e_idx) {
                    let day = &self.inputs.days[d_idx];
                    let shift = &self.inputs.shifts[t_idx];
                    let day_matches = day_filter.contains(&day.weekday);
                    let class_matches = when.contains(&shift.when);
                    let matched = match (!day_filter.is_empty(), !when.is_empty()) {
                        (true, true) => day_matches && class_matches,
                        (true, false) => day_matches,
                        (false, true) => class_matches,
                        (false, false) => false,
                    };
                    if matched {
                        self.exclude_assignment(
                            model,
                            ledger,
                            ViolationKind::TemporalExclusion,
                            employee.id,
                            (d_idx, s_idx, t_idx),
                            var,
                            *soft,
                            *penalty,
                        );
                    }
                }
            }

            EmployeeConstraint::HourRangeExclusion {
                day,
                after_hour,
                until_hour,
                soft,
                penalty,
            } => {
                let weekday = day.as_deref().and_then(parse_weekday_or_warn);
                for ((_, d_idx, s_idx, t_idx), var) in self.pool.employee_assignments(e_idx) {
                    if let Some(weekday) = weekday {
                        if self.inputs.days[d_idx].weekday != weekday {
                            continue;
                        }
                    }
                    let start = self.inputs.shifts[t_idx].start_hour;
                    let after_matches = after_hour.is_some_and(|h| start >= h);
                    let until_matches = until_hour.is_some_and(|h| start < h);
                    if after_matches || until_matches {
                        self.exclude_assignment(
                            model,
                            ledger,
                            ViolationKind::HourRangeExclusion,
                            employee.id,
                            (d_idx, s_idx, t_idx),
                            var,
                            *soft,
                            *penalty,
                        );
                    }
                }
            }

            EmployeeConstraint::SiteRestriction {
                sites,
                soft,
                penalty,
            } => {
                for ((_, d_idx, s_idx, t_idx), var) in self.pool.employee_assignments(e_idx) {
                    let site_name = &self.inputs.sites[s_idx].name;
                    if !sites.contains(site_name) {
                        self.exclude_assignment(
                            model,
                            ledger,
                            ViolationKind::SiteRestriction,
                            employee.id,
                            (d_idx, s_idx, t_idx),
                            var,
                            *soft,
                            *penalty,
                        );
                    }
                }
            }

            EmployeeConstraint::FrequencyLimit {
                when,
                day,
                limit,
                period,
                soft,
                penalty,
            } => {
                let Some(limit) = *limit else {
                    tracing::warn!(
                        employee = %employee.name,
                        "frequency limit without a limit value; skipping the constraint"
                    );
                    return;
                };
                let weekday = day.as_deref().and_then(parse_weekday_or_warn);
                let vars: Vec<VarId> = self
                    .pool
                    .employee_assignments(e_idx)
                    .filter(|((_, d_idx, _, t_idx), _)| {
                        let class_ok = when
                            .as_ref()
                            .is_none_or(|class| self.inputs.shifts[*t_idx].when == *class);
                        let day_ok = weekday
                            .is_none_or(|weekday| self.inputs.days[*d_idx].weekday == weekday);
                        class_ok && day_ok
                    })
                    .map(|(_, var)| var)
                    .collect();
                if vars.is_empty() {
                    return;
                }
                if *soft {
                    // The count can exceed the limit by at most the number of
                    // matched variables; a tight bound lets propagation pin
                    // the overflow exactly.
                    let max_overflow = (vars.len() as i64 - limit).max(0);
                    if max_overflow == 0 {
                        return;
                    }
                    let overflow = model.int(0, max_overflow as i32);
                    let mut all = vars.clone();
                    all.push(overflow);
                    let mut coefficients = vec![1; vars.len()];
                    coefficients.push(-1);
                    // count - overflow <= limit, i.e. overflow >= count - limit
                    model.int_lin_le(&coefficients, &all, limit as i32);
                    ledger.record(
                        ViolationKey {
                            kind: ViolationKind::FrequencyLimit,
                            employee_id: employee.id,
                            scope: ViolationScope::Frequency {
                                period: period.clone(),
                                when: when.clone(),
                                day: day.clone(),
                            },
                        },
                        overflow,
                        *penalty,
                        max_overflow,
                    );
                } else {
                    let coefficients = vec![1; vars.len()];
                    model.int_lin_le(&coefficients, &vars, limit as i32);
                }
            }

            EmployeeConstraint::ShiftDependency {
                if_when,
                not_next_when,
                days_after,
                soft,
                penalty,
            } => {
                let day_count = self.inputs.days.len();
                for d_idx in 0..day_count.saturating_sub(*days_after) {
                    let mut vars = self.class_vars_on_day(e_idx, d_idx, if_when);
                    vars.extend(self.class_vars_on_day(e_idx, d_idx + days_after, not_next_when));
                    if vars.is_empty() {
                        continue;
                    }
                    if *soft {
                        let indicator = model.bool();
                        let mut all = vars.clone();
                        all.push(indicator);
                        let mut coefficients = vec![1; vars.len()];
                        coefficients.push(-1);
                        model.int_lin_le(&coefficients, &all, 1);
                        ledger.record(
                            ViolationKey {
                                kind: ViolationKind::ShiftDependency,
                                employee_id: employee.id,
                                scope: ViolationScope::Dependency {
                                    date: self.inputs.days[d_idx].date,
                                    if_when: if_when.clone(),
                                    not_next_when: not_next_when.clone(),
                                },
                            },
                            indicator,
                            *penalty,
                            1,
                        );
                    } else {
                        let coefficients = vec![1; vars.len()];
                        model.int_lin_le(&coefficients, &vars, 1);
                    }
                }
            }

            EmployeeConstraint::AdjacentShifts {
                max_shifts_per_day,
                soft,
                penalty,
            } => self.apply_daily_cap(
                model,
                ledger,
                ViolationKind::AdjacentShifts,
                e_idx,
                employee,
                *max_shifts_per_day,
                *soft,
                *penalty,
            ),

            EmployeeConstraint::DailyShiftLimit {
                max_shifts,
                soft,
                penalty,
            } => self.apply_daily_cap(
                model,
                ledger,
                ViolationKind::DailyShiftLimit,
                e_idx,
                employee,
                *max_shifts,
                *soft,
                *penalty,
            ),

            EmployeeConstraint::TemporalAlternation {
                when1,
                when2,
                starting_week,
                soft,
                penalty,
            } => {
                for (d_idx, day) in self.inputs.days.iter().enumerate() {
                    let offset = day.iso_week as i64 - starting_week;
                    let blocked = if offset.rem_euclid(2) == 0 { when2 } else { when1 };
                    for ((_, _, s_idx, t_idx), var) in self.pool.employee_day_assignments(e_idx, d_idx)
                    {
                        if self.inputs.shifts[t_idx].when == *blocked {
                            self.exclude_assignment(
                                model,
                                ledger,
                                ViolationKind::TemporalAlternation,
                                employee.id,
                                (d_idx, s_idx, t_idx),
                                var,
                                *soft,
                                *penalty,
                            );
                        }
                    }
                }
            }

            // Weekly caps are compiled per employee in apply_weekly_hour_caps,
            // merging the constraint with the employee record.
            EmployeeConstraint::WeeklyHourLimit { .. } => {}
        }
    }

    fn apply_daily_cap(
        &self,
        model: &mut Model,
        ledger: &mut ViolationLedger,
        kind: ViolationKind,
        e_idx: usize,
        employee: &Employee,
        max_shifts: i64,
        soft: bool,
        penalty: i64,
    ) {
        for (d_idx, day) in self.inputs.days.iter().enumerate() {
            let vars: Vec<VarId> = self
                .pool
                .employee_day_assignments(e_idx, d_idx)
                .map(|(_, var)| var)
                .collect();
            if vars.is_empty() {
                continue;
            }
            if soft {
                let max_overflow = (vars.len() as i64 - max_shifts).max(0);
                if max_overflow == 0 {
                    continue;
                }
                let overflow = model.int(0, max_overflow as i32);
                let mut all = vars.clone();
                all.push(overflow);
                let mut coefficients = vec![1; vars.len()];
                coefficients.push(-1);
                model.int_lin_le(&coefficients, &all, max_shifts as i32);
                ledger.record(
                    ViolationKey {
                        kind,
                        employee_id: employee.id,
                        scope: ViolationScope::Day { date: day.date },
                    },
                    overflow,
                    penalty,
                    max_overflow,
                );
            } else {
                let coefficients = vec![1; vars.len()];
                model.int_lin_le(&coefficients, &vars, max_shifts as i32);
            }
        }
    }

    /// Weekly hour cap per employee and ISO week, in centi-hours.
    fn apply_weekly_hour_caps(&self, model: &mut Model, ledger: &mut ViolationLedger) {
        let weeks = self.inputs.iso_weeks();
        for (e_idx, employee) in self.inputs.employees.iter().enumerate() {
            let policy = employee.weekly_hour_policy();
            let cap_centi_hours = (policy.max_hours * 100.0).round() as i64;
            if cap_centi_hours <= 0 {
                continue;
            }
            for &week in &weeks {
                let mut vars = Vec::new();
                let mut coefficients = Vec::new();
                for ((_, d_idx, _, t_idx), var) in self.pool.employee_assignments(e_idx) {
                    if self.inputs.days[d_idx].iso_week == week {
                        vars.push(var);
                        coefficients.push(self.inputs.shifts[t_idx].duration_centi_hours() as i32);
                    }
                }
                if vars.is_empty() {
                    continue;
                }
                if policy.soft {
                    // Overflow cannot exceed the week's total assignable hours
                    // minus the cap, and never the 50-hour ceiling.
                    let week_centi_hours: i64 = coefficients.iter().map(|&c| c as i64).sum();
                    let max_overflow = (week_centi_hours - cap_centi_hours)
                        .clamp(0, MAX_WEEKLY_OVERFLOW_CENTI_HOURS);
                    if max_overflow == 0 {
                        continue;
                    }
                    let overflow = model.int(0, max_overflow as i32);
                    vars.push(overflow);
                    coefficients.push(-1);
                    model.int_lin_le(&coefficients, &vars, cap_centi_hours as i32);
                    ledger.record(
                        ViolationKey {
                            kind: ViolationKind::WeeklyHourLimit,
                            employee_id: employee.id,
                            scope: ViolationScope::Week { iso_week: week },
                        },
                        overflow,
                        policy.penalty,
                        max_overflow,
                    );
                } else {
                    model.int_lin_le(&coefficients, &vars, cap_centi_hours as i32);
                }
            }
        }
    }

    /// Global biweekly Sunday alternation. Employees with a hard personal
    /// Sunday exclusion are skipped entirely: the personal rule wins.
    fn apply_sunday_alternation(&self, model: &mut Model, ledger: &mut ViolationLedger) {
        let policy = &self.inputs.sunday_alternation;
        if !policy.active {
            return;
        }
        for shift_name in &policy.shifts {
            if !self.inputs.shifts.iter().any(|s| &s.name == shift_name) {
                tracing::warn!(
                    shift = %shift_name,
                    "Sunday alternation references a shift not in the catalog"
                );
            }
        }
        for (e_idx, employee) in self.inputs.employees.iter().enumerate() {
            if employee.has_hard_sunday_exclusion() {
                tracing::debug!(
                    employee = %employee.name,
                    "hard personal Sunday exclusion; skipping Sunday alternation"
                );
                continue;
            }
            for (d_idx, day) in self.inputs.days.iter().enumerate() {
                if !day.is_sunday() {
                    continue;
                }
                let blocked_week = (day.iso_week as i64 - policy.starting_week).rem_euclid(2) == 1;
                if !blocked_week {
                    continue;
                }
                for ((_, _, s_idx, t_idx), var) in self.pool.employee_day_assignments(e_idx, d_idx) {
                    if !policy.shifts.contains(&self.inputs.shifts[t_idx].name) {
                        continue;
                    }
                    if policy.soft {
                        let indicator = model.bool();
                        model.new(var.le(indicator));
                        ledger.record(
                            ViolationKey {
                                kind: ViolationKind::SundayAlternation,
                                employee_id: employee.id,
                                scope: self.assignment_scope(d_idx, s_idx, t_idx),
                            },
                            indicator,
                            policy.penalty,
                            1,
                        );
                    } else {
                        force_zero(model, var);
                    }
                }
            }
        }
    }

    /// One employee's variables on a day whose shifts belong to a class.
    fn class_vars_on_day(&self, e_idx: usize, d_idx: usize, class: &ShiftClass) -> Vec<VarId> {
        self.pool
            .employee_day_assignments(e_idx, d_idx)
            .filter(|((_, _, _, t_idx), _)| self.inputs.shifts[*t_idx].when == *class)
            .map(|(_, var)| var)
            .collect()
    }

    /// Hard-forbid or soft-penalize one (employee, day, site, shift) tuple.
    #[allow(clippy::too_many_arguments)]
    fn exclude_assignment(
        &self,
        model: &mut Model,
        ledger: &mut ViolationLedger,
        kind: ViolationKind,
        employee_id: u32,
        slot: (usize, usize, usize),
        var: VarId,
        soft: bool,
        penalty: i64,
    ) {
        let (d_idx, s_idx, t_idx) = slot;
        if soft {
            let indicator = model.bool();
            model.new(var.le(indicator));
            ledger.record(
                ViolationKey {
                    kind,
                    employee_id,
                    scope: self.assignment_scope(d_idx, s_idx, t_idx),
                },
                indicator,
                penalty,
                1,
            );
        } else {
            force_zero(model, var);
        }
    }

    fn assignment_scope(&self, d_idx: usize, s_idx: usize, t_idx: usize) -> ViolationScope {
        ViolationScope::Assignment {
            date: self.inputs.days[d_idx].date,
            shift: self.inputs.shifts[t_idx].name.clone(),
            site: self.inputs.sites[s_idx].name.clone(),
        }
    }
}

fn force_zero(model: &mut Model, var: VarId) {
    model.new(var.eq(int(0)));
}

fn parse_day_filter(days: &[String]) -> Vec<Weekday> {
    days.iter()
        .filter_map(|name| parse_weekday_or_warn(name))
        .collect()
}

fn parse_weekday_or_warn(name: &str) -> Option<Weekday> {
    let parsed = calendar::parse_weekday(name);
    if parsed.is_none() {
        tracing::warn!(day = %name, "unrecognized weekday name in a constraint filter");
    }
    parsed
}
