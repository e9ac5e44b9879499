use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, XlsxError};
use shared::{PlanError, PlanResult};

use crate::domain::calendar;
use crate::domain::plan_inputs::PlanInputs;
use crate::domain::services::results::PlanReport;

/// Writes the multi-sheet roster workbook, versioned within the output
/// directory: `piano_turni_{year}_{month}_v{n}.xlsx` with `n` one past the
/// highest existing suffix.
pub struct ReportWriter {
    directory: PathBuf,
}

impl ReportWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn write(&self, inputs: &PlanInputs, report: &PlanReport) -> PlanResult<PathBuf> {
        let path = self.next_report_path(inputs.year, inputs.month);
        write_workbook(&path, inputs, report).map_err(|err| PlanError::Report(err.to_string()))?;
        tracing::info!(path = %path.display(), "roster report saved");
        Ok(path)
    }

    fn next_report_path(&self, year: i32, month: u32) -> PathBuf {
        let base = format!("piano_turni_{}_{}", year, month);
        let version = next_version(&self.directory, &base);
        self.directory.join(format!("{}_v{}.xlsx", base, version))
    }
}

fn write_workbook(path: &Path, inputs: &PlanInputs, report: &PlanReport) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();

    // Detail sheet: one row per assignment, placeholders included.
    let detail = workbook.add_worksheet();
    detail.set_name("Piano Turni Dettaglio")?;
    let headers = [
        "Data",
        "Giorno",
        "Turno",
        "Cantiere",
        "Dipendente Assegnato",
        "Violazioni Dipendente (Riepilogo)",
    ];
    for (col, header) in headers.iter().enumerate() {
        detail.write_string(0, col as u16, *header)?;
    }
    for (idx, row) in report.assignments.iter().enumerate() {
        let excel_row = idx as u32 + 1;
        detail.write_string(excel_row, 0, row.date.format("%d/%m/%Y").to_string())?;
        detail.write_string(excel_row, 1, calendar::weekday_name(row.weekday))?;
        detail.write_string(excel_row, 2, row.shift.as_str())?;
        detail.write_string(excel_row, 3, row.site.as_str())?;
        detail.write_string(excel_row, 4, row.employee.as_str())?;
        detail.write_string(excel_row, 5, row.violation_summary.as_str())?;
    }
    detail.autofit();

    if !report.violations.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Riepilogo Violazioni Soft")?;
        sheet.write_string(0, 0, "Descrizione Violazione Soft Dettagliata")?;
        for (idx, violation) in report.violations.iter().enumerate() {
            sheet.write_string(idx as u32 + 1, 0, violation.description())?;
        }
        sheet.autofit();
    }

    if !report.understaffed.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Turni Non Coperti")?;
        sheet.write_string(0, 0, "Descrizione Turno Non Coperto")?;
        for (idx, slot) in report.understaffed.iter().enumerate() {
            sheet.write_string(idx as u32 + 1, 0, slot.to_string())?;
        }
        sheet.autofit();
    }

    // Employee x day pivot: dates on the first header row, localized weekday
    // names on the second.
    let pivot = workbook.add_worksheet();
    pivot.set_name("Piano Turni Pivot Dipendenti")?;
    pivot.write_string(0, 0, "Dipendente")?;
    for (idx, day) in inputs.days.iter().enumerate() {
        let col = idx as u16 + 1;
        pivot.write_string(0, col, day.date.format("%d/%m/%Y").to_string())?;
        pivot.write_string(1, col, calendar::weekday_name(day.weekday))?;
    }
    for (row_idx, employee) in report.employee_totals.keys().enumerate() {
        let excel_row = row_idx as u32 + 2;
        pivot.write_string(excel_row, 0, employee.as_str())?;
        for (idx, day) in inputs.days.iter().enumerate() {
            let labels = report
                .pivot
                .get(employee)
                .and_then(|by_day| by_day.get(&day.date));
            if let Some(labels) = labels {
                let mut sorted = labels.clone();
                sorted.sort();
                pivot.write_string(excel_row, idx as u16 + 1, sorted.join("\n"))?;
            }
        }
    }
    pivot.autofit();

    // Per-employee totals with one column per ISO week.
    let summary = workbook.add_worksheet();
    summary.set_name("Riepilogo Turni e Ore")?;
    let weeks = inputs.iso_weeks();
    summary.write_string(0, 0, "Dipendente")?;
    summary.write_string(0, 1, "Turni Totali")?;
    summary.write_string(0, 2, "Ore Totali")?;
    for (idx, week) in weeks.iter().enumerate() {
        summary.write_string(0, idx as u16 + 3, format!("Sett. {} Ore", week))?;
    }
    for (row_idx, (employee, totals)) in report.employee_totals.iter().enumerate() {
        let excel_row = row_idx as u32 + 1;
        summary.write_string(excel_row, 0, employee.as_str())?;
        summary.write_number(excel_row, 1, totals.shifts as f64)?;
        summary.write_number(excel_row, 2, totals.hours)?;
        for (idx, week) in weeks.iter().enumerate() {
            let hours = totals.weekly_hours.get(week).copied().unwrap_or(0.0);
            summary.write_number(excel_row, idx as u16 + 3, hours)?;
        }
    }
    summary.autofit();

    workbook.save(path)
}

/// Next free version suffix for `{base}_v{n}.xlsx` files in `directory`.
pub(crate) fn next_version(directory: &Path, base: &str) -> u32 {
    let mut highest = 0;
    if let Ok(entries) = std::fs::read_dir(directory) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            if let Some(version) = parse_version(&name.to_string_lossy(), base) {
                highest = highest.max(version);
            }
        }
    }
    highest + 1
}

pub(crate) fn parse_version(file_name: &str, base: &str) -> Option<u32> {
    file_name
        .strip_prefix(base)?
        .strip_prefix("_v")?
        .strip_suffix(".xlsx")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_accepts_matching_names() {
        assert_eq!(parse_version("piano_turni_2025_3_v7.xlsx", "piano_turni_2025_3"), Some(7));
        assert_eq!(parse_version("piano_turni_2025_3_v1.xlsx", "piano_turni_2025_3"), Some(1));
    }

    #[test]
    fn test_parse_version_rejects_other_names() {
        let base = "piano_turni_2025_3";
        assert_eq!(parse_version("piano_turni_2025_33_v2.xlsx", base), None);
        assert_eq!(parse_version("piano_turni_2025_3_v2.csv", base), None);
        assert_eq!(parse_version("piano_turni_2025_3.xlsx", base), None);
        assert_eq!(parse_version("piano_turni_2025_3_vx.xlsx", base), None);
    }

    #[test]
    fn test_next_version_scans_the_directory() {
        let dir = std::env::temp_dir().join("roster-planner-version-test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        assert_eq!(next_version(&dir, "piano_turni_2025_3"), 1);

        std::fs::write(dir.join("piano_turni_2025_3_v1.xlsx"), b"x").unwrap();
        std::fs::write(dir.join("piano_turni_2025_3_v4.xlsx"), b"x").unwrap();
        std::fs::write(dir.join("piano_turni_2025_4_v9.xlsx"), b"x").unwrap();
        assert_eq!(next_version(&dir, "piano_turni_2025_3"), 5);
        assert_eq!(next_version(&dir, "piano_turni_2025_4"), 10);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
