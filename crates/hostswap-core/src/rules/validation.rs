use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Phone,
    Email,
    FirstName,
    Uid,
    SessionToken,
    StartDate,
    EndDate,
    Zipcode,
    Title,
    Coordinates,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Phone => "Phone",
            Field::Email => "Email",
            Field::FirstName => "First name",
            Field::Uid => "Uid",
            Field::SessionToken => "Session token",
            Field::StartDate => "Start date",
            Field::EndDate => "End date",
            Field::Zipcode => "Zipcode",
            Field::Title => "Title",
            Field::Coordinates => "Coordinates",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Blank,
    Invalid,
    Taken,
    TooShort,
    TooLong,
    DateInPast,
    BeforeStart,
    ChangedAfterConfirmation,
    UnknownZipCode,
}

/// One failed rule. `field` is `None` for errors on the record as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: Option<Field>,
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn full_message(&self) -> String {
        match self.field {
            Some(field) => format!("{} {}", field.label(), self.message),
            None => self.message.clone(),
        }
    }
}

/// Errors accumulated while validating a record. Nothing here aborts early;
/// callers decide whether to persist once every rule has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: Field, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: Some(field),
            kind,
            message: message.into(),
        });
    }

    pub fn add_base(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: None,
            kind,
            message: message.into(),
        });
    }

    pub fn blank(&mut self, field: Field) {
        self.add(field, ErrorKind::Blank, "can't be blank");
    }

    pub fn invalid(&mut self, field: Field) {
        self.add(field, ErrorKind::Invalid, "is invalid");
    }

    pub fn taken(&mut self, field: Field) {
        self.add(field, ErrorKind::Taken, "has already been taken");
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn on(&self, field: Field) -> impl Iterator<Item = &ValidationError> {
        self.errors
            .iter()
            .filter(move |error| error.field == Some(field))
    }

    pub fn base(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(|error| error.field.is_none())
    }

    pub fn has(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|error| error.kind == kind)
    }

    pub fn has_on(&self, field: Field, kind: ErrorKind) -> bool {
        self.on(field).any(|error| error.kind == kind)
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(ValidationError::full_message).collect()
    }

    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Invalid(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {}", self.full_messages().join(", "))
    }
}
