use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("No completed backtest runs to analyze")]
    NoRunsFound,

    #[error("Invalid scoring weights: {0}")]
    InvalidWeights(String),
}
