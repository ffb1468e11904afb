use anyhow::Error;
use hostswap_config::ConfigError;
use hostswap_core::domain::GeocodeError;
use hostswap_core::time::TimeParseError;
use hostswap_core::CoreError;
use hostswap_store::error::{StoreError, StoreErrorKind};
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;
pub const EXIT_UNAUTHORIZED: u8 = 4;

pub const NOT_FOUND_MESSAGE: &str = "Not found, perhaps it was deleted.";

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

/// Lookup misses get one generic message; the detail is only shown with
/// `--verbose`.
pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else if exit_code_value(err) == EXIT_NOT_FOUND {
        eprintln!("error: {}", NOT_FOUND_MESSAGE);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    ExitCode::from(exit_code_value(err))
}

fn exit_code_value(err: &Error) -> u8 {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
            };
        }
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return store_exit_code(store_err);
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return config_exit_code(config_err);
        }
        if let Some(core_err) = cause.downcast_ref::<CoreError>() {
            return core_exit_code(core_err);
        }
        if let Some(geocode_err) = cause.downcast_ref::<GeocodeError>() {
            return geocode_exit_code(geocode_err);
        }
        if let Some(_parse_err) = cause.downcast_ref::<TimeParseError>() {
            return EXIT_INVALID_INPUT;
        }
    }
    EXIT_FAILURE
}

fn core_exit_code(err: &CoreError) -> u8 {
    match err {
        CoreError::NotSignedIn | CoreError::NotOwner | CoreError::IncompleteProfile(_) => {
            EXIT_UNAUTHORIZED
        }
        _ => EXIT_INVALID_INPUT,
    }
}

fn store_exit_code(err: &StoreError) -> u8 {
    match err.kind() {
        StoreErrorKind::NotFound => EXIT_NOT_FOUND,
        StoreErrorKind::Core => match err {
            StoreError::Core(core_err) => core_exit_code(core_err),
            _ => EXIT_INVALID_INPUT,
        },
        StoreErrorKind::InvalidId | StoreErrorKind::InvalidDataPath => EXIT_INVALID_INPUT,
        StoreErrorKind::MissingHomeDir
        | StoreErrorKind::InvalidDate
        | StoreErrorKind::Migration
        | StoreErrorKind::Sql
        | StoreErrorKind::Io => EXIT_FAILURE,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        _ => EXIT_INVALID_INPUT,
    }
}

fn geocode_exit_code(err: &GeocodeError) -> u8 {
    match err {
        GeocodeError::Config(_) => EXIT_INVALID_INPUT,
        GeocodeError::Transport(_) | GeocodeError::Timeout | GeocodeError::Parse(_) => {
            EXIT_FAILURE
        }
    }
}
