use chrono::{Datelike, NaiveDate, Weekday};
use shared::{PlanError, PlanResult};

/// All dates of the given month, in ascending calendar order.
pub fn days_of_month(year: i32, month: u32) -> PlanResult<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        PlanError::InvalidInput(format!("invalid planning month: {}-{}", year, month))
    })?;

    let mut days = Vec::with_capacity(31);
    let mut day = first;
    while day.month() == month {
        days.push(day);
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    Ok(days)
}

/// ISO-8601 week-of-year index of a date.
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Localized (Italian) weekday name, used in reports.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Lunedì",
        Weekday::Tue => "Martedì",
        Weekday::Wed => "Mercoledì",
        Weekday::Thu => "Giovedì",
        Weekday::Fri => "Venerdì",
        Weekday::Sat => "Sabato",
        Weekday::Sun => "Domenica",
    }
}

/// Parse a weekday name from a constraint filter. Accepts English and Italian
/// names, case-insensitively.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.trim().to_lowercase().as_str() {
        "monday" | "lunedì" | "lunedi" => Some(Weekday::Mon),
        "tuesday" | "martedì" | "martedi" => Some(Weekday::Tue),
        "wednesday" | "mercoledì" | "mercoledi" => Some(Weekday::Wed),
        "thursday" | "giovedì" | "giovedi" => Some(Weekday::Thu),
        "friday" | "venerdì" | "venerdi" => Some(Weekday::Fri),
        "saturday" | "sabato" => Some(Weekday::Sat),
        "sunday" | "domenica" => Some(Weekday::Sun),
        _ => None,
    }
}
