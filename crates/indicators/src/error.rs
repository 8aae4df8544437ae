use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("Invalid period for {indicator}: {period}")]
    InvalidPeriod { indicator: &'static str, period: usize },

    #[error("Input series have different lengths: {0}")]
    LengthMismatch(String),
}

impl From<ta::errors::TaError> for IndicatorError {
    fn from(_: ta::errors::TaError) -> Self {
        IndicatorError::InvalidPeriod { indicator: "ta", period: 0 }
    }
}

pub(crate) fn check_period(indicator: &'static str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod { indicator, period });
    }
    Ok(())
}

pub(crate) fn check_lengths(lengths: &[usize]) -> Result<(), IndicatorError> {
    if lengths.windows(2).any(|w| w[0] != w[1]) {
        return Err(IndicatorError::LengthMismatch(format!("{:?}", lengths)));
    }
    Ok(())
}
