use serde::{Deserialize, Deserializer, Serialize};
use shared::ShiftClass;

/// An employee from the catalog. The name is normalized (trimmed, uppercased)
/// when `PlanInputs` is built; every later lookup uses the normalized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub max_weekly_hours: f64,
    #[serde(default)]
    pub constraints: Vec<EmployeeConstraint>,
}

/// Effective weekly hour cap for one employee. An explicit
/// `weekly_hour_limit` constraint wins over the bare employee record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyHourPolicy {
    pub max_hours: f64,
    pub soft: bool,
    pub penalty: i64,
}

impl Employee {
    pub fn has_certification(&self, certification: &str) -> bool {
        self.certifications.iter().any(|c| c == certification)
    }

    /// Whether a hard personal temporal exclusion covers the Sunday class.
    /// Such employees are skipped entirely by the global Sunday alternation.
    pub fn has_hard_sunday_exclusion(&self) -> bool {
        self.constraints.iter().any(|c| match c {
            EmployeeConstraint::TemporalExclusion { when, soft, .. } => {
                !soft && when.iter().any(ShiftClass::is_sunday)
            }
            _ => false,
        })
    }

    pub fn weekly_hour_policy(&self) -> WeeklyHourPolicy {
        let explicit = self.constraints.iter().find_map(|c| match c {
            EmployeeConstraint::WeeklyHourLimit {
                max_hours,
                soft,
                penalty,
            } => Some(WeeklyHourPolicy {
                max_hours: max_hours.unwrap_or(self.max_weekly_hours),
                soft: *soft,
                penalty: *penalty,
            }),
            _ => None,
        });
        explicit.unwrap_or(WeeklyHourPolicy {
            max_hours: self.max_weekly_hours,
            soft: false,
            penalty: 0,
        })
    }
}

/// One personal scheduling rule. Each variant either hard-forbids assignments
/// or, when `soft`, creates penalized violation indicators in the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmployeeConstraint {
    /// Exclude shifts matched by a temporal-class filter and/or a weekday
    /// filter. With both filters present a shift must match both; with one,
    /// that filter alone decides; with neither, nothing matches.
    TemporalExclusion {
        #[serde(default)]
        when: Vec<ShiftClass>,
        #[serde(default, deserialize_with = "string_or_seq")]
        days: Vec<String>,
        #[serde(default)]
        soft: bool,
        #[serde(default)]
        penalty: i64,
    },
    /// Exclude shifts by start hour, optionally on a single weekday.
    /// `after_hour` matches `start_hour >= after_hour`; `until_hour` matches
    /// `start_hour < until_hour`; either filter matching excludes the shift.
    HourRangeExclusion {
        #[serde(default)]
        day: Option<String>,
        #[serde(default)]
        after_hour: Option<i32>,
        #[serde(default)]
        until_hour: Option<i32>,
        #[serde(default)]
        soft: bool,
        #[serde(default)]
        penalty: i64,
    },
    /// Only the listed sites are allowed; everything else is excluded.
    SiteRestriction {
        #[serde(default)]
        sites: Vec<String>,
        #[serde(default)]
        soft: bool,
        #[serde(default)]
        penalty: i64,
    },
    /// Cap the number of assignments to shifts matching the filters over the
    /// whole month. `period` is a label carried into the report.
    FrequencyLimit {
        #[serde(default)]
        when: Option<ShiftClass>,
        #[serde(default)]
        day: Option<String>,
        #[serde(default)]
        limit: Option<i64>,
        #[serde(default)]
        period: Option<String>,
        #[serde(default)]
        soft: bool,
        #[serde(default)]
        penalty: i64,
    },
    /// After a day with a shift of class `if_when`, forbid shifts of class
    /// `not_next_when` `days_after` days later.
    ShiftDependency {
        if_when: ShiftClass,
        not_next_when: ShiftClass,
        #[serde(default = "default_one_usize")]
        days_after: usize,
        #[serde(default)]
        soft: bool,
        #[serde(default)]
        penalty: i64,
    },
    /// Cap total assignments per day.
    AdjacentShifts {
        #[serde(default = "default_one")]
        max_shifts_per_day: i64,
        #[serde(default)]
        soft: bool,
        #[serde(default)]
        penalty: i64,
    },
    /// Cap total assignments per day.
    DailyShiftLimit {
        #[serde(default = "default_one")]
        max_shifts: i64,
        #[serde(default)]
        soft: bool,
        #[serde(default)]
        penalty: i64,
    },
    /// Biweekly alternation between two temporal classes: on even week
    /// offsets from `starting_week` the `when2` class is blocked, on odd
    /// offsets the `when1` class.
    TemporalAlternation {
        when1: ShiftClass,
        when2: ShiftClass,
        #[serde(default = "default_one")]
        starting_week: i64,
        #[serde(default)]
        soft: bool,
        #[serde(default)]
        penalty: i64,
    },
    /// Weekly hour cap override; `max_hours` falls back to the employee
    /// record when absent.
    WeeklyHourLimit {
        #[serde(default)]
        max_hours: Option<f64>,
        #[serde(default)]
        soft: bool,
        #[serde(default)]
        penalty: i64,
    },
}

impl EmployeeConstraint {
    pub fn is_soft(&self) -> bool {
        match self {
            Self::TemporalExclusion { soft, .. }
            | Self::HourRangeExclusion { soft, .. }
            | Self::SiteRestriction { soft, .. }
            | Self::FrequencyLimit { soft, .. }
            | Self::ShiftDependency { soft, .. }
            | Self::AdjacentShifts { soft, .. }
            | Self::DailyShiftLimit { soft, .. }
            | Self::TemporalAlternation { soft, .. }
            | Self::WeeklyHourLimit { soft, .. } => *soft,
        }
    }
}

fn default_one() -> i64 {
    1
}

fn default_one_usize() -> usize {
    1
}

/// Accept both `"days": "sunday"` and `"days": ["saturday", "sunday"]`.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(day)) => vec![day],
        Some(OneOrMany::Many(days)) => days,
    })
}
