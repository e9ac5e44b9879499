use serde::{Deserialize, Serialize};
use shared::ShiftClass;

/// A shift type from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub name: String,
    /// Duration in hours, two decimal places (e.g. 7.5).
    pub duration_hours: f64,
    /// Start hour of the day, 0-23; 0 when the configuration leaves it out.
    #[serde(default)]
    pub start_hour: i32,
    /// Temporal class gating where/when the shift is legal.
    pub when: ShiftClass,
    #[serde(default)]
    pub required_certification: Option<String>,
}

impl Shift {
    /// Duration in centi-hours. The model is integer-only, so hours are
    /// carried as `duration * 100` and converted back only in reporting.
    pub fn duration_centi_hours(&self) -> i64 {
        (self.duration_hours * 100.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_is_carried_as_centi_hours() {
        let shift = Shift {
            name: "M".to_string(),
            duration_hours: 7.5,
            start_hour: 8,
            when: ShiftClass::new("Weekday"),
            required_certification: None,
        };
        assert_eq!(shift.duration_centi_hours(), 750);
    }

    #[test]
    fn test_shift_deserializes_with_defaults() {
        let shift: Shift = serde_json::from_str(
            r#"{"name": "N", "duration_hours": 8.0, "when": "Sunday"}"#,
        )
        .unwrap();
        assert_eq!(shift.start_hour, 0);
        assert!(shift.required_certification.is_none());
        assert!(shift.when.is_sunday());
        assert_eq!(shift.duration_centi_hours(), 800);
    }
}
