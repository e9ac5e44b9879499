use serde::{Deserialize, Serialize};

/// Global biweekly Sunday alternation policy: on odd week offsets from
/// `starting_week`, the listed Sunday shifts are blocked for every employee
/// not already covered by a hard personal Sunday exclusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SundayAlternationPolicy {
    #[serde(default)]
    pub active: bool,
    #[serde(default = "default_starting_week")]
    pub starting_week: i64,
    #[serde(default)]
    pub soft: bool,
    #[serde(default)]
    pub penalty: i64,
    #[serde(default)]
    pub shifts: Vec<String>,
}

impl Default for SundayAlternationPolicy {
    fn default() -> Self {
        Self {
            active: false,
            starting_week: 1,
            soft: false,
            penalty: 0,
            shifts: Vec::new(),
        }
    }
}

/// Objective weights. Defaults are the tuned production values; any of them
/// can be overridden from the configuration document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    #[serde(default = "default_assigned_shifts")]
    pub assigned_shifts: i64,
    #[serde(default = "default_employee_priority")]
    pub employee_priority: i64,
    #[serde(default = "default_variance")]
    pub variance: i64,
    #[serde(default = "default_soft_violations")]
    pub soft_violations: i64,
    #[serde(default = "default_sunday_deficit")]
    pub sunday_deficit: i64,
    #[serde(default = "default_other_days_deficit")]
    pub other_days_deficit: i64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            assigned_shifts: default_assigned_shifts(),
            employee_priority: default_employee_priority(),
            variance: default_variance(),
            soft_violations: default_soft_violations(),
            sunday_deficit: default_sunday_deficit(),
            other_days_deficit: default_other_days_deficit(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverSettings {
    #[serde(default = "default_time_limit")]
    pub time_limit_seconds: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_seconds: default_time_limit(),
        }
    }
}

fn default_starting_week() -> i64 {
    1
}

fn default_assigned_shifts() -> i64 {
    1000
}

fn default_employee_priority() -> i64 {
    500
}

fn default_variance() -> i64 {
    1
}

fn default_soft_violations() -> i64 {
    10
}

fn default_sunday_deficit() -> i64 {
    2500
}

fn default_other_days_deficit() -> i64 {
    1500
}

fn default_time_limit() -> f64 {
    60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_weights_default_values() {
        let weights: ObjectiveWeights = serde_json::from_str("{}").unwrap();
        assert_eq!(weights.assigned_shifts, 1000);
        assert_eq!(weights.employee_priority, 500);
        assert_eq!(weights.variance, 1);
        assert_eq!(weights.soft_violations, 10);
        assert_eq!(weights.sunday_deficit, 2500);
        assert_eq!(weights.other_days_deficit, 1500);
    }

    #[test]
    fn test_objective_weights_partial_override() {
        let weights: ObjectiveWeights =
            serde_json::from_str(r#"{"soft_violations": 0, "variance": 5}"#).unwrap();
        assert_eq!(weights.soft_violations, 0);
        assert_eq!(weights.variance, 5);
        assert_eq!(weights.assigned_shifts, 1000);
    }

    #[test]
    fn test_solver_settings_default_time_limit() {
        let solver: SolverSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(solver.time_limit_seconds, 60.0);
    }
}
