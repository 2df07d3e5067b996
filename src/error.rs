use crate::domain::form::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("no session credential available")]
    Unauthorized,
}

pub type Result<T> = std::result::Result<T, PaymentError>;
