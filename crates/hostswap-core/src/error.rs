use crate::rules::validation::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("{0}")]
    Invalid(ValidationErrors),
    #[error("not signed in")]
    NotSignedIn,
    #[error("not allowed to act for another user")]
    NotOwner,
    #[error("profile incomplete, missing: {}", .0.join(", "))]
    IncompleteProfile(Vec<&'static str>),
    #[error("unsupported country code: {0}")]
    UnsupportedCountry(String),
    #[error("invalid distance unit: {0}")]
    InvalidDistanceUnit(String),
    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),
    #[error("invalid search radius: {0}")]
    InvalidRadius(f64),
    #[error("invalid timestamp")]
    InvalidTimestamp,
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::Invalid(errors)
    }
}
