pub mod hostings;
pub mod users;
pub mod visits;

pub use hostings::HostingsRepo;
pub use users::{IdentityAssertion, UserNew, UserUpdate, UsersRepo};
pub use visits::{VisitRules, VisitsRepo};

use crate::error::{Result, StoreError};
use chrono::NaiveDate;
use std::str::FromStr;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn date_from_sql(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| StoreError::InvalidDate(raw.to_string()))
}

pub(crate) fn id_from_sql<T: FromStr>(raw: String) -> Result<T> {
    T::from_str(&raw).map_err(|_| StoreError::InvalidId(raw))
}
