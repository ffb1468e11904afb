use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use hostswap_config::AppConfig;
use hostswap_core::domain::{Geocoder, User};
use hostswap_core::rules::{local_today, require_complete_profile, require_current_user};
use hostswap_core::time::now_utc;
use hostswap_store::Store;
use serde::Serialize;
use std::io::{self, Write};
use tracing::debug;

pub mod completions;
pub mod hostings;
pub mod users;
pub mod visits;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
    pub session: Option<&'a str>,
}

impl Context<'_> {
    /// The user holding the `--session` token.
    pub fn current_user(&self) -> Result<User> {
        let user = match self.session {
            Some(token) => self.store.users().find_by_session_token(token)?,
            None => None,
        };
        Ok(require_current_user(user)?)
    }

    /// Signed in and allowed to book: phone, first name and confirmed email.
    pub fn booking_user(&self) -> Result<User> {
        let user = self.current_user()?;
        require_complete_profile(&user)?;
        Ok(user)
    }

    pub fn today(&self) -> Result<NaiveDate> {
        Ok(local_today(now_utc(), self.config.local_offset())?)
    }

    pub fn geocoder(&self) -> Result<Box<dyn Geocoder>> {
        let geocoder =
            hostswap_geocode::from_config(self.config).with_context(|| "build geocoder")?;
        debug!(backend = geocoder.backend_name(), "geocoder ready");
        Ok(geocoder)
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
