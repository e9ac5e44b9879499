use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Placeholder employee name used for unfilled staffing slots in reports.
pub const UNASSIGNED_EMPLOYEE: &str = "NOT ASSIGNED";

/// Canonical form of an employee name: trimmed and uppercased.
///
/// Normalization happens once at load time; every later lookup (unavailability
/// rows, violation reports) goes through the normalized form.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Semantic tag describing when a shift is legal (`Weekday`, `Sunday`,
/// `Morning`, ...). The set of classes is open: it comes from the
/// configuration document. Comparisons are case-insensitive; the original
/// casing is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftClass(String);

impl ShiftClass {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the Sunday class, the one temporal class with
    /// structural meaning: Sunday-class shifts exist only on Sundays and
    /// vice versa.
    pub fn is_sunday(&self) -> bool {
        self.0.eq_ignore_ascii_case("sunday")
    }
}

impl fmt::Display for ShiftClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq for ShiftClass {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for ShiftClass {}

impl PartialOrd for ShiftClass {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ShiftClass {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.to_lowercase().cmp(&other.0.to_lowercase())
    }
}

impl Hash for ShiftClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_lowercase().hash(state);
    }
}

impl From<&str> for ShiftClass {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}
