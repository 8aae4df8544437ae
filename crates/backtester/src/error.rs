use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Strategy execution error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Risk management error: {0}")]
    Risk(#[from] risk::RiskError),

    #[error("Execution simulation error: {0}")]
    Executor(#[from] executor::ExecutorError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),

    #[error("No candles were supplied for the backtest.")]
    DataUnavailable,

    #[error("The backtest needs at least {required} candles, got {available}.")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Candle timestamps must be strictly increasing (violated at index {index}).")]
    UnorderedCandles { index: usize },
}

impl From<indicatif::style::TemplateError> for BacktestError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        BacktestError::ProgressBarTemplate(error.to_string())
    }
}
