use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    InvalidLatitude(f64),
    InvalidLongitude(f64),
    InvalidSpan { latitude: f64, longitude: f64 },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidLatitude(value) => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            ModelError::InvalidLongitude(value) => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
            ModelError::InvalidSpan {
                latitude,
                longitude,
            } => write!(
                f,
                "region span must be positive and finite (got {latitude} x {longitude})"
            ),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
