use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use selen::prelude::VarId;
use shared::ShiftClass;

/// Family of a soft-constraint violation, one per constraint family that can
/// produce penalized indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViolationKind {
    TemporalExclusion,
    HourRangeExclusion,
    SiteRestriction,
    FrequencyLimit,
    ShiftDependency,
    AdjacentShifts,
    DailyShiftLimit,
    TemporalAlternation,
    WeeklyHourLimit,
    SundayAlternation,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TemporalExclusion => "temporal-exclusion",
            Self::HourRangeExclusion => "hour-range-exclusion",
            Self::SiteRestriction => "site-restriction",
            Self::FrequencyLimit => "frequency-limit",
            Self::ShiftDependency => "shift-dependency",
            Self::AdjacentShifts => "adjacent-shifts",
            Self::DailyShiftLimit => "daily-shift-limit",
            Self::TemporalAlternation => "temporal-alternation",
            Self::WeeklyHourLimit => "weekly-hour-limit",
            Self::SundayAlternation => "sunday-alternation",
        };
        f.write_str(name)
    }
}

/// Structured context of a violation key. Carrying the scope as data (rather
/// than re-parsing report prose) is what lets assignment rows be annotated by
/// exact matching.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ViolationScope {
    /// One (day, shift, site) assignment of the employee.
    Assignment {
        date: NaiveDate,
        shift: String,
        site: String,
    },
    /// All assignments of the employee on one day.
    Day { date: NaiveDate },
    /// A dependency window starting at `date`.
    Dependency {
        date: NaiveDate,
        if_when: ShiftClass,
        not_next_when: ShiftClass,
    },
    /// A month-wide frequency cap.
    Frequency {
        period: Option<String>,
        when: Option<ShiftClass>,
        day: Option<String>,
    },
    /// One ISO week of the month.
    Week { iso_week: u32 },
}

impl ViolationScope {
    /// Whether a violation with this scope concerns the given assignment.
    /// Month- and week-wide scopes never pin down a single assignment.
    pub fn covers_assignment(&self, date: NaiveDate, shift: &str, site: &str) -> bool {
        match self {
            Self::Assignment {
                date: scope_date,
                shift: scope_shift,
                site: scope_site,
            } => *scope_date == date && scope_shift == shift && scope_site == site,
            Self::Day { date: scope_date } | Self::Dependency { date: scope_date, .. } => {
                *scope_date == date
            }
            Self::Frequency { .. } | Self::Week { .. } => false,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Assignment { date, shift, site } => {
                format!("Day: {}, Shift: {}, Site: {}", date, shift, site)
            }
            Self::Day { date } => format!("Day: {}", date),
            Self::Dependency {
                date,
                if_when,
                not_next_when,
            } => format!(
                "Start day: {}, If class: {}, Blocked class: {}",
                date, if_when, not_next_when
            ),
            Self::Frequency { period, when, day } => format!(
                "Period: {}, When: {}, Day: {}",
                period.as_deref().unwrap_or("-"),
                when.as_ref().map(ShiftClass::as_str).unwrap_or("-"),
                day.as_deref().unwrap_or("-")
            ),
            Self::Week { iso_week } => format!("ISO week: {}", iso_week),
        }
    }
}

/// Key of one violation bucket: `(kind, employee, scope)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ViolationKey {
    pub kind: ViolationKind,
    pub employee_id: u32,
    pub scope: ViolationScope,
}

/// A violation indicator variable with its penalty weight and domain maximum
/// (1 for boolean indicators, the overflow bound for integer ones).
#[derive(Debug, Clone, Copy)]
pub struct PenalizedVar {
    pub var: VarId,
    pub penalty: i64,
    pub max_value: i64,
}

/// All soft-violation indicators created while compiling constraints, grouped
/// by key. A BTreeMap keeps report order deterministic.
#[derive(Debug, Default)]
pub struct ViolationLedger {
    entries: BTreeMap<ViolationKey, Vec<PenalizedVar>>,
}

impl ViolationLedger {
    pub fn record(&mut self, key: ViolationKey, var: VarId, penalty: i64, max_value: i64) {
        self.entries.entry(key).or_default().push(PenalizedVar {
            var,
            penalty,
            max_value,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ViolationKey, &[PenalizedVar])> {
        self.entries.iter().map(|(key, vars)| (key, vars.as_slice()))
    }

    /// Every indicator with its penalty, for the objective's penalty term.
    pub fn penalized_vars(&self) -> impl Iterator<Item = PenalizedVar> + '_ {
        self.entries.values().flatten().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
