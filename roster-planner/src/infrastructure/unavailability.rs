use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use chrono::{Days, NaiveDate, NaiveDateTime};
use shared::normalize_name;

/// Sheet holding the unavailability rows.
const SHEET_NAME: &str = "Foglio1";

/// Day 0 of the spreadsheet serial date system.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Read the per-employee unavailability table.
///
/// Column A holds the employee name, column B the date; the first row is a
/// header. Every problem here is non-fatal: a missing file, a missing sheet or
/// an unreadable row degrades to a warning and the planner proceeds with
/// whatever was readable.
pub fn load_unavailability(path: &Path) -> HashMap<String, BTreeSet<NaiveDate>> {
    let mut unavailability: HashMap<String, BTreeSet<NaiveDate>> = HashMap::new();

    let book = match umya_spreadsheet::reader::xlsx::read(path) {
        Ok(book) => book,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "unavailability file not readable; proceeding with an empty table"
            );
            return unavailability;
        }
    };

    let Some(sheet) = book.get_sheet_by_name(SHEET_NAME) else {
        tracing::warn!(
            path = %path.display(),
            sheet = SHEET_NAME,
            "unavailability sheet not found; proceeding with an empty table"
        );
        return unavailability;
    };

    let highest_row = sheet.get_highest_row();
    let mut loaded = 0;
    for row in 2..=highest_row {
        let name_raw = sheet.get_value((1, row));
        let date_raw = sheet.get_value((2, row));
        if name_raw.trim().is_empty() {
            tracing::warn!(row, "unavailability row without an employee name; skipped");
            continue;
        }
        if date_raw.trim().is_empty() {
            tracing::warn!(row, name = %name_raw, "unavailability row without a date; skipped");
            continue;
        }
        match parse_cell_date(&date_raw) {
            Some(date) => {
                unavailability
                    .entry(normalize_name(&name_raw))
                    .or_default()
                    .insert(date);
                loaded += 1;
            }
            None => {
                tracing::warn!(
                    row,
                    name = %name_raw,
                    value = %date_raw,
                    "unrecognized date encoding in unavailability row; skipped"
                );
            }
        }
    }

    if loaded > 0 {
        tracing::info!(
            rows = loaded,
            employees = unavailability.len(),
            "unavailability table loaded"
        );
    } else {
        tracing::info!(path = %path.display(), "no usable unavailability rows found");
    }
    unavailability
}

/// Parse one date cell. Accepted encodings: `YYYY-MM-DD`, `DD/MM/YYYY`, a
/// serialized datetime, or a spreadsheet serial number.
pub(crate) fn parse_cell_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%d/%m/%Y") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }
    if let Ok(serial) = value.parse::<f64>() {
        return from_serial(serial);
    }
    None
}

fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..200_000.0).contains(&serial) {
        return None;
    }
    let (year, month, day) = EXCEL_EPOCH;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|epoch| epoch.checked_add_days(Days::new(serial.trunc() as u64)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_iso_dates_parse() {
        assert_eq!(parse_cell_date("2025-03-10"), Some(date(2025, 3, 10)));
        assert_eq!(parse_cell_date(" 2025-03-10 "), Some(date(2025, 3, 10)));
    }

    #[test]
    fn test_day_first_dates_parse() {
        assert_eq!(parse_cell_date("10/03/2025"), Some(date(2025, 3, 10)));
    }

    #[test]
    fn test_datetime_cells_parse() {
        assert_eq!(
            parse_cell_date("2025-03-10 00:00:00"),
            Some(date(2025, 3, 10))
        );
        assert_eq!(
            parse_cell_date("2025-03-10T00:00:00"),
            Some(date(2025, 3, 10))
        );
    }

    #[test]
    fn test_serial_numbers_parse() {
        // Serial 45000 in the 1900 date system is 2023-03-15.
        assert_eq!(parse_cell_date("45000"), Some(date(2023, 3, 15)));
        assert_eq!(parse_cell_date("45000.5"), Some(date(2023, 3, 15)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(parse_cell_date("next tuesday"), None);
        assert_eq!(parse_cell_date("03-10-2025"), None);
        assert_eq!(parse_cell_date(""), None);
        assert_eq!(parse_cell_date("-5"), None);
    }

    #[test]
    fn test_missing_file_yields_empty_table() {
        let table = load_unavailability(Path::new("/nonexistent/indisponibilita.xlsx"));
        assert!(table.is_empty());
    }
}
