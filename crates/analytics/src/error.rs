use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid input for metric calculation: {0}")]
    InvalidInput(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
