use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster_planner::domain::plan_inputs::PlanInputs;
use roster_planner::domain::planner::{MonthlyPlanner, PlanOutcome};
use roster_planner::domain::services::results::PlanReport;
use roster_planner::domain::services::solver::SolveStatus;
use roster_planner::infrastructure::config::Settings;
use roster_planner::infrastructure::report::ReportWriter;
use roster_planner::infrastructure::unavailability::load_unavailability;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_planner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting roster planner...");

    let base_dir = executable_dir();
    let config_path = base_dir.join("config2.json");
    let settings = Settings::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    tracing::info!("Configuration loaded from {}", config_path.display());

    let unavailability = load_unavailability(&base_dir.join("indisponibilita_dipendenti.xlsx"));
    let inputs = PlanInputs::from_settings(settings, unavailability)?;

    match MonthlyPlanner::new().plan(&inputs) {
        PlanOutcome::Solved { status, report } => {
            log_summary(status, &report);
            let path = ReportWriter::new(&base_dir).write(&inputs, &report)?;
            tracing::info!("Roster saved to {}", path.display());
        }
        PlanOutcome::Unsolved { status } => {
            // Not an error for the process: the operator reads the status and
            // adjusts the configuration.
            tracing::warn!("No roster produced; solver status: {}", status);
        }
    }

    Ok(())
}

/// Inputs and the report live next to the executable; fall back to the
/// working directory when the executable path is unavailable.
fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn log_summary(status: SolveStatus, report: &PlanReport) {
    tracing::info!("--- Plan summary ---");
    tracing::info!("Solver status: {}", status);
    if let Some(objective) = report.objective_value {
        tracing::info!("Objective value: {}", objective);
    }
    tracing::info!("Total soft-violation penalty: {}", report.total_penalty());
    tracing::info!("Sunday slot deficit: {}", report.sunday_deficit);
    tracing::info!("Other-day slot deficit: {}", report.other_deficit);
    if let Some(percent) = report.completion_percent() {
        tracing::info!(
            "Slot completion: {:.2}% ({}/{})",
            percent,
            report.assigned_count,
            report.required_total
        );
    }
    for violation in &report.violations {
        tracing::info!("Soft violation: {}", violation.description());
    }
    for slot in &report.understaffed {
        tracing::info!("Understaffed: {}", slot);
    }
    for (employee, totals) in &report.employee_totals {
        tracing::info!(
            "{}: {} shifts, {:.2} hours",
            employee,
            totals.shifts,
            totals.hours
        );
    }
}
