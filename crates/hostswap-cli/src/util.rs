use anyhow::{anyhow, Context as _, Result};
use chrono::NaiveDate;
use hostswap_core::domain::{HostingId, UserId, VisitId};
use hostswap_core::time::parse_date;
use std::str::FromStr;

pub fn parse_user_id(raw: &str) -> Result<UserId> {
    parse_id(raw, "user")
}

pub fn parse_visit_id(raw: &str) -> Result<VisitId> {
    parse_id(raw, "visit")
}

pub fn parse_hosting_id(raw: &str) -> Result<HostingId> {
    parse_id(raw, "hosting")
}

fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{} id cannot be empty", what));
    }
    T::from_str(trimmed).map_err(|_| anyhow!("invalid {} id", what))
}

/// Dates on the command line are `YYYY-MM-DD`.
pub fn parse_date_arg(raw: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    raw.map(|value| parse_date(value).with_context(|| format!("--{}", flag)))
        .transpose()
}

/// An empty flag value clears the field.
pub fn normalize_optional_value(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
