use crate::error::CoreError;
use crate::rules::validation::{ErrorKind, Field, ValidationErrors};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

pub fn local_today(now_utc: i64, local_offset: FixedOffset) -> Result<NaiveDate, CoreError> {
    let now = DateTime::<Utc>::from_timestamp(now_utc, 0).ok_or(CoreError::InvalidTimestamp)?;
    Ok(now.with_timezone(&local_offset).date_naive())
}

/// Checks presence and ordering of a date range. With `today` set, the start
/// must not fall before it.
pub fn validate_date_range(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    today: Option<NaiveDate>,
    errors: &mut ValidationErrors,
) {
    match (start_date, today) {
        (None, _) => errors.blank(Field::StartDate),
        (Some(start), Some(today)) if start < today => {
            errors.add(Field::StartDate, ErrorKind::DateInPast, "cannot be in the past")
        }
        _ => {}
    }

    match (start_date, end_date) {
        (_, None) => errors.blank(Field::EndDate),
        (Some(start), Some(end)) if end < start => errors.add(
            Field::EndDate,
            ErrorKind::BeforeStart,
            format!("must be on or after {}", start.format("%Y-%m-%d")),
        ),
        _ => {}
    }
}
