use indicatif::style::TemplateError;
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Configuration error: {0}")]
    Config(#[from] configuration::ConfigError),

    #[error("Market data error: {0}")]
    Data(#[from] market_data::DataError),

    #[error("Backtest execution failed within optimizer: {0}")]
    Backtest(#[from] backtester::error::BacktestError),

    #[error("Parameter generation failed: {0}")]
    ParameterGeneration(String),

    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] JsonError),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<TemplateError> for OptimizerError {
    fn from(error: TemplateError) -> Self {
        OptimizerError::ProgressBarTemplate(error.to_string())
    }
}
