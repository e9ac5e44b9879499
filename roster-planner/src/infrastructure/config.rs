use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::{PlanError, PlanResult};

use crate::domain::entities::{
    Employee, ObjectiveWeights, Shift, Site, SolverSettings, SundayAlternationPolicy,
};

/// The configuration document (`config2.json`). Everything beyond the month,
/// the catalogs and the employees is optional with production defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub year: i32,
    pub month: u32,
    pub sites: Vec<Site>,
    pub shifts: Vec<Shift>,
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub global_constraints: GlobalConstraints,
    #[serde(default)]
    pub objective_weights: ObjectiveWeights,
    #[serde(default)]
    pub solver: SolverSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConstraints {
    /// Staffing target per shift name; missing shifts default to 1.
    #[serde(default)]
    pub staff_per_shift: HashMap<String, i64>,
    #[serde(default)]
    pub sunday_alternation: SundayAlternationPolicy,
}

impl Settings {
    /// Load and deserialize the configuration. Failures here are fatal for
    /// the process: a broken config document is an operator error.
    pub fn load(path: &Path) -> PlanResult<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            PlanError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            PlanError::Config(format!("malformed configuration {}: {}", path.display(), err))
        })
    }
}
