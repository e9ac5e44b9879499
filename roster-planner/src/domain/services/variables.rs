use std::collections::BTreeMap;

use selen::prelude::*;

use crate::domain::plan_inputs::PlanInputs;

/// `(employee, day, site, shift)` indices of one assignment variable.
pub type AssignmentKey = (usize, usize, usize, usize);

/// `(day, site, shift)` indices of one staffing slot.
pub type SlotKey = (usize, usize, usize);

#[derive(Debug, Clone, Copy)]
pub struct SlotDeficit {
    pub var: VarId,
    pub required: i64,
}

/// The decision variables of the model.
///
/// An assignment variable exists only for legal combinations: the shift must
/// be offered by the site, the shift's temporal class must match the day
/// (Sunday class on Sundays, anything else on non-Sundays), and the slot must
/// have a positive staffing target. Illegal combinations simply have no
/// variable; constraint compilation skips them.
///
/// BTreeMaps keep iteration order deterministic, so the model is built the
/// same way on every run with the same inputs.
#[derive(Debug)]
pub struct VariablePool {
    assignments: BTreeMap<AssignmentKey, VarId>,
    deficits: BTreeMap<SlotKey, SlotDeficit>,
    employee_count: usize,
}

impl VariablePool {
    pub fn build(model: &mut Model, inputs: &PlanInputs) -> Self {
        let employee_count = inputs.employees.len();
        let mut assignments = BTreeMap::new();
        let mut deficits = BTreeMap::new();

        for (d_idx, day) in inputs.days.iter().enumerate() {
            for s_idx in 0..inputs.sites.len() {
                for &t_idx in &inputs.site_shifts[s_idx] {
                    let shift = &inputs.shifts[t_idx];
                    if !inputs.slot_allowed(day, shift) {
                        continue;
                    }
                    let required = inputs.required_staff(&shift.name);
                    if required <= 0 {
                        continue;
                    }

                    let mut slot_vars = Vec::with_capacity(employee_count);
                    for e_idx in 0..employee_count {
                        let var = model.bool();
                        assignments.insert((e_idx, d_idx, s_idx, t_idx), var);
                        slot_vars.push(var);
                    }

                    // deficit + sum(x) = required
                    let deficit = model.int(0, required as i32);
                    let mut vars = vec![deficit];
                    vars.extend(slot_vars);
                    let coefficients = vec![1; vars.len()];
                    model.int_lin_eq(&coefficients, &vars, required as i32);
                    deficits.insert((d_idx, s_idx, t_idx), SlotDeficit { var: deficit, required });
                }
            }
        }

        tracing::debug!(
            assignment_vars = assignments.len(),
            deficit_vars = deficits.len(),
            "model variables created"
        );

        Self {
            assignments,
            deficits,
            employee_count,
        }
    }

    pub fn assignment(&self, key: AssignmentKey) -> Option<VarId> {
        self.assignments.get(&key).copied()
    }

    pub fn assignments(&self) -> impl Iterator<Item = (AssignmentKey, VarId)> + '_ {
        self.assignments.iter().map(|(key, var)| (*key, *var))
    }

    /// All assignment variables of one employee, in (day, site, shift) order.
    pub fn employee_assignments(
        &self,
        e_idx: usize,
    ) -> impl Iterator<Item = (AssignmentKey, VarId)> + '_ {
        self.assignments
            .range((e_idx, 0, 0, 0)..(e_idx + 1, 0, 0, 0))
            .map(|(key, var)| (*key, *var))
    }

    /// One employee's assignment variables on one day.
    pub fn employee_day_assignments(
        &self,
        e_idx: usize,
        d_idx: usize,
    ) -> impl Iterator<Item = (AssignmentKey, VarId)> + '_ {
        self.assignments
            .range((e_idx, d_idx, 0, 0)..(e_idx, d_idx + 1, 0, 0))
            .map(|(key, var)| (*key, *var))
    }

    /// Every employee's variable for one slot.
    pub fn slot_assignments(&self, slot: SlotKey) -> Vec<VarId> {
        let (d_idx, s_idx, t_idx) = slot;
        (0..self.employee_count)
            .filter_map(|e_idx| self.assignment((e_idx, d_idx, s_idx, t_idx)))
            .collect()
    }

    pub fn deficits(&self) -> impl Iterator<Item = (SlotKey, SlotDeficit)> + '_ {
        self.deficits.iter().map(|(key, slot)| (*key, *slot))
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}
