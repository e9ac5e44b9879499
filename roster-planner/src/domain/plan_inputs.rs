use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

use chrono::NaiveDate;
use shared::{normalize_name, PlanError, PlanResult};

use crate::domain::calendar;
use crate::domain::entities::{
    Day, Employee, ObjectiveWeights, Shift, Site, SolverSettings, SundayAlternationPolicy,
};
use crate::infrastructure::config::Settings;

/// Everything the planner needs, resolved and immutable. Constructed once
/// from the configuration document and the unavailability table; the model
/// builder, solver and result collector only ever read it.
#[derive(Debug)]
pub struct PlanInputs {
    pub year: i32,
    pub month: u32,
    pub days: Vec<Day>,
    pub shifts: Vec<Shift>,
    pub sites: Vec<Site>,
    /// Per site, the indices into `shifts` of the shifts it offers.
    pub site_shifts: Vec<Vec<usize>>,
    pub employees: Vec<Employee>,
    pub staff_per_shift: HashMap<String, i64>,
    pub sunday_alternation: SundayAlternationPolicy,
    pub weights: ObjectiveWeights,
    pub solver: SolverSettings,
    unavailability: HashMap<String, BTreeSet<NaiveDate>>,
}

impl PlanInputs {
    pub fn from_settings(
        settings: Settings,
        unavailability: HashMap<String, BTreeSet<NaiveDate>>,
    ) -> PlanResult<Self> {
        let days = calendar::days_of_month(settings.year, settings.month)?
            .into_iter()
            .map(Day::new)
            .collect::<Vec<_>>();

        if settings.employees.is_empty() {
            return Err(PlanError::InvalidInput(
                "no employees configured; nothing to plan".to_string(),
            ));
        }

        let shifts = settings.shifts;
        let mut site_shifts = Vec::with_capacity(settings.sites.len());
        for site in &settings.sites {
            let mut indices = Vec::with_capacity(site.available_shifts.len());
            for shift_name in &site.available_shifts {
                match shifts.iter().position(|s| &s.name == shift_name) {
                    Some(idx) if !indices.contains(&idx) => indices.push(idx),
                    Some(_) => {}
                    None => tracing::warn!(
                        site = %site.name,
                        shift = %shift_name,
                        "site references a shift not in the catalog; skipping it"
                    ),
                }
            }
            site_shifts.push(indices);
        }

        let mut employees = settings.employees;
        for employee in &mut employees {
            employee.name = normalize_name(&employee.name);
        }

        for shift_name in settings.global_constraints.staff_per_shift.keys() {
            if !shifts.iter().any(|s| &s.name == shift_name) {
                tracing::warn!(
                    shift = %shift_name,
                    "staffing target references a shift not in the catalog"
                );
            }
        }

        let known_names: HashSet<&str> = employees.iter().map(|e| e.name.as_str()).collect();
        let mut resolved_unavailability: HashMap<String, BTreeSet<NaiveDate>> = HashMap::new();
        for (raw_name, dates) in unavailability {
            let name = normalize_name(&raw_name);
            if known_names.contains(name.as_str()) {
                resolved_unavailability
                    .entry(name)
                    .or_default()
                    .extend(dates);
            } else {
                tracing::warn!(
                    name = %name,
                    "unavailability rows for a name matching no employee; ignoring them"
                );
            }
        }

        Ok(Self {
            year: settings.year,
            month: settings.month,
            days,
            shifts,
            sites: settings.sites,
            site_shifts,
            employees,
            staff_per_shift: settings.global_constraints.staff_per_shift,
            sunday_alternation: settings.global_constraints.sunday_alternation,
            weights: settings.objective_weights,
            solver: settings.solver,
            unavailability: resolved_unavailability,
        })
    }

    /// Staffing target for a shift; shifts absent from the table require one
    /// person per slot.
    pub fn required_staff(&self, shift_name: &str) -> i64 {
        self.staff_per_shift.get(shift_name).copied().unwrap_or(1)
    }

    /// The structural temporal-class filter: Sunday-class shifts exist only
    /// on Sundays, every other class only on non-Sundays.
    pub fn slot_allowed(&self, day: &Day, shift: &Shift) -> bool {
        shift.when.is_sunday() == day.is_sunday()
    }

    pub fn is_unavailable(&self, employee: &Employee, date: NaiveDate) -> bool {
        self.unavailability
            .get(&employee.name)
            .is_some_and(|dates| dates.contains(&date))
    }

    /// Sorted, distinct ISO weeks touched by the planning month.
    pub fn iso_weeks(&self) -> Vec<u32> {
        let weeks: BTreeSet<u32> = self.days.iter().map(|d| d.iso_week).collect();
        weeks.into_iter().collect()
    }

    /// Total staffing demand over all legal slots: the upper bound on the
    /// number of assignments the solver can make.
    pub fn total_staffing_demand(&self) -> i64 {
        let mut demand = 0;
        for day in &self.days {
            for (s_idx, _) in self.sites.iter().enumerate() {
                for &t_idx in &self.site_shifts[s_idx] {
                    let shift = &self.shifts[t_idx];
                    if self.slot_allowed(day, shift) {
                        let required = self.required_staff(&shift.name);
                        if required > 0 {
                            demand += required;
                        }
                    }
                }
            }
        }
        demand
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.solver.time_limit_seconds.max(0.0))
    }
}
