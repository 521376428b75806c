use thiserror::Error;

pub type Result<T, E = PaymentError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Delivery(String),
}

impl PaymentError {
    /// Stable machine-readable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::Validation(_) => "validation_error",
            PaymentError::NotFound(_) => "not_found",
            PaymentError::Delivery(_) => "delivery_failed",
        }
    }
}
