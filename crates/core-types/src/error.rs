use crate::enums::ErrorKind;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid average range: max ({max}) must be greater than or equal to min ({min})")]
    InvalidRange { min: Decimal, max: Decimal },
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidRange { .. } => ErrorKind::Validation,
        }
    }
}
