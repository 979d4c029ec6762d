// Pipeline errors - recoverable failures surfaced by the public API
use crate::domain::chart::ChartId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("chart `{0}` is not registered with the render state")]
    UnknownChart(ChartId),

    #[error("invalid chart configuration: {0}")]
    InvalidConfig(String),

    #[error("tick scheduler is already running")]
    AlreadyRunning,

    #[error("tick scheduler must be started from within a tokio runtime")]
    NoRuntime,

    #[error("tick task terminated abnormally: {0}")]
    TickTaskFailed(String),
}
