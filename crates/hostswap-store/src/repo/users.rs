use crate::error::{Result, StoreError};
use crate::repo::id_from_sql;
use hostswap_core::domain::{generate_secure_token, User, UserId};
use hostswap_core::rules::{Field, ValidationErrors};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

const USER_COLUMNS: &str = "id, provider, uid, email, first_name, phone, session_token, confirm_token, email_confirmed, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct UserNew {
    pub provider: Option<String>,
    pub uid: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    /// Raw phone input; stored normalized.
    pub phone: Option<String>,
    pub email_confirmed: bool,
}

/// `Some(None)` clears a field, `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<Option<String>>,
    pub first_name: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub email_confirmed: Option<bool>,
}

/// What an external identity provider tells us about a user signing in.
#[derive(Debug, Clone)]
pub struct IdentityAssertion {
    pub provider: String,
    pub uid: String,
    pub email: Option<String>,
}

pub struct UsersRepo<'a> {
    conn: &'a Connection,
}

impl<'a> UsersRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: UserNew) -> Result<User> {
        let mut user = User {
            id: UserId::new(),
            provider: input.provider,
            uid: input.uid.trim().to_string(),
            email: None,
            first_name: None,
            phone: None,
            session_token: String::new(),
            confirm_token: None,
            email_confirmed: input.email_confirmed,
            created_at: now_utc,
            updated_at: now_utc,
        };
        user.set_email(input.email.as_deref());
        user.set_first_name(input.first_name.as_deref());
        if let Some(raw) = input.phone.as_deref() {
            user.set_phone(raw);
        }
        user.ensure_session_token();
        user.ensure_confirm_token();

        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            create_inner(&tx, &user)?;
            tx.commit()?;
        } else {
            create_inner(self.conn, &user)?;
        }
        debug!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub fn create_from_identity(&self, now_utc: i64, identity: IdentityAssertion) -> Result<User> {
        self.create(
            now_utc,
            UserNew {
                provider: Some(identity.provider),
                uid: identity.uid,
                email: identity.email,
                ..Default::default()
            },
        )
    }

    /// Returns the user already linked to the identity, creating one on first
    /// sign-in.
    pub fn sign_in_with_identity(&self, now_utc: i64, identity: IdentityAssertion) -> Result<User> {
        if let Some(user) = self.find_by_uid(&identity.uid)? {
            return Ok(user);
        }
        self.create_from_identity(now_utc, identity)
    }

    pub fn get(&self, id: UserId) -> Result<Option<User>> {
        self.find_one("id", &id.to_string())
    }

    pub fn find_by_uid(&self, uid: &str) -> Result<Option<User>> {
        self.find_one("uid", uid.trim())
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one("email", &hostswap_core::domain::normalize_email(email))
    }

    pub fn find_by_session_token(&self, token: &str) -> Result<Option<User>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        self.find_one("session_token", token)
    }

    pub fn list(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC, id ASC;",
            USER_COLUMNS
        ))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(user_from_row(row)?);
        }
        Ok(users)
    }

    pub fn update(&self, now_utc: i64, id: UserId, update: UserUpdate) -> Result<User> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let user = update_inner(&tx, now_utc, id, update)?;
            tx.commit()?;
            Ok(user)
        } else {
            update_inner(self.conn, now_utc, id, update)
        }
    }

    /// Marks the email confirmed without running validations.
    pub fn activate_email(&self, now_utc: i64, id: UserId) -> Result<User> {
        let updated = self.conn.execute(
            "UPDATE users SET email_confirmed = 1, updated_at = ?1 WHERE id = ?2;",
            params![now_utc, id.to_string()],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        debug!(user_id = %id, "email confirmed");
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Confirms whichever user holds `confirm_token`.
    pub fn activate_email_by_token(&self, now_utc: i64, confirm_token: &str) -> Result<User> {
        let user = self
            .find_one("confirm_token", confirm_token.trim())?
            .ok_or_else(|| StoreError::NotFound("confirmation token".to_string()))?;
        self.activate_email(now_utc, user.id)
    }

    /// Replaces the session token, invalidating the previous session.
    pub fn reset_session_token(&self, now_utc: i64, id: UserId) -> Result<String> {
        let token = generate_secure_token();
        let updated = self.conn.execute(
            "UPDATE users SET session_token = ?1, updated_at = ?2 WHERE id = ?3;",
            params![token, now_utc, id.to_string()],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(token)
    }

    /// Returns `false` when no user held the token.
    pub fn sign_out(&self, now_utc: i64, session_token: &str) -> Result<bool> {
        match self.find_by_session_token(session_token)? {
            Some(user) => {
                self.reset_session_token(now_utc, user.id)?;
                debug!(user_id = %user.id, "signed out");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes the user along with their visits and hostings.
    pub fn delete(&self, id: UserId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn find_one(&self, column: &str, value: &str) -> Result<Option<User>> {
        find_one(self.conn, column, value)
    }
}

fn find_one(conn: &Connection, column: &str, value: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?1;", USER_COLUMNS, column);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([value])?;
    if let Some(row) = rows.next()? {
        Ok(Some(user_from_row(row)?))
    } else {
        Ok(None)
    }
}

fn create_inner(conn: &Connection, user: &User) -> Result<()> {
    let mut errors = user.errors();
    errors.extend(uniqueness_errors(conn, user)?);
    errors.into_result()?;

    conn.execute(
        "INSERT INTO users (id, provider, uid, email, first_name, phone, session_token, confirm_token, email_confirmed, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
        params![
            user.id.to_string(),
            user.provider,
            user.uid,
            user.email,
            user.first_name,
            user.phone,
            user.session_token,
            user.confirm_token,
            user.email_confirmed,
            user.created_at,
            user.updated_at,
        ],
    )?;
    Ok(())
}

fn update_inner(conn: &Connection, now_utc: i64, id: UserId, update: UserUpdate) -> Result<User> {
    let previous = find_one(conn, "id", &id.to_string())?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

    let mut user = previous.clone();
    if let Some(email) = update.email {
        user.set_email(email.as_deref());
    }
    if let Some(first_name) = update.first_name {
        user.set_first_name(first_name.as_deref());
    }
    if let Some(phone) = update.phone {
        match phone {
            Some(raw) => user.set_phone(&raw),
            None => user.clear_phone(),
        }
    }
    if let Some(confirmed) = update.email_confirmed {
        user.email_confirmed = confirmed;
    }
    user.updated_at = now_utc;

    let mut errors = user.change_errors(&previous);
    errors.extend(uniqueness_errors(conn, &user)?);
    errors.into_result()?;

    conn.execute(
        "UPDATE users SET email = ?1, first_name = ?2, phone = ?3, email_confirmed = ?4, updated_at = ?5 WHERE id = ?6;",
        params![
            user.email,
            user.first_name,
            user.phone,
            user.email_confirmed,
            user.updated_at,
            user.id.to_string(),
        ],
    )?;
    debug!(user_id = %user.id, "user updated");
    Ok(user)
}

fn uniqueness_errors(conn: &Connection, user: &User) -> Result<ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let checks = [
        (Field::Email, "email", user.email.as_deref()),
        (Field::Uid, "uid", Some(user.uid.as_str())),
        (Field::SessionToken, "session_token", Some(user.session_token.as_str())),
    ];

    for (field, column, value) in checks {
        let Some(value) = value.filter(|value| !value.is_empty()) else {
            continue;
        };
        let sql = format!(
            "SELECT 1 FROM users WHERE {} = ?1 AND id != ?2 LIMIT 1;",
            column
        );
        let taken: Option<i64> = conn
            .query_row(&sql, params![value, user.id.to_string()], |row| row.get(0))
            .optional()?;
        if taken.is_some() {
            errors.taken(field);
        }
    }
    Ok(errors)
}

fn user_from_row(row: &rusqlite::Row<'_>) -> Result<User> {
    Ok(User {
        id: id_from_sql(row.get(0)?)?,
        provider: row.get(1)?,
        uid: row.get(2)?,
        email: row.get(3)?,
        first_name: row.get(4)?,
        phone: row.get(5)?,
        session_token: row.get(6)?,
        confirm_token: row.get(7)?,
        email_confirmed: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
