use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Not enough cash available to execute trade. Required: {required}, Available: {available}")]
    InsufficientCash { required: String, available: String },

    #[error("No open position to {0}")]
    PositionNotFound(&'static str),

    #[error("A position is already open")]
    PositionAlreadyOpen,

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Execution side {0} does not match the requested portfolio operation")]
    SideMismatch(String),
}
