use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model build error: {0}")]
    ModelBuild(String),

    #[error("Report error: {0}")]
    Report(String),
}

pub type PlanResult<T> = Result<T, PlanError>;
