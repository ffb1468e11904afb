use crate::domain::email::{is_valid_email, normalize_email};
use crate::domain::ids::UserId;
use crate::domain::phone::{normalize_phone, validate_phone_length};
use crate::domain::token::generate_secure_token;
use crate::error::CoreError;
use crate::rules::validation::{ErrorKind, Field, ValidationErrors};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub provider: Option<String>,
    pub uid: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub phone: Option<String>,
    pub session_token: String,
    pub confirm_token: Option<String>,
    pub email_confirmed: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Stores the canonical form of `raw`; never the raw value.
    pub fn set_phone(&mut self, raw: &str) {
        self.phone = Some(normalize_phone(raw));
    }

    pub fn clear_phone(&mut self) {
        self.phone = None;
    }

    pub fn set_email(&mut self, raw: Option<&str>) {
        self.email = raw.map(normalize_email);
    }

    pub fn set_first_name(&mut self, raw: Option<&str>) {
        self.first_name = raw.map(|value| value.trim().to_string());
    }

    pub fn ensure_session_token(&mut self) {
        if self.session_token.trim().is_empty() {
            self.session_token = generate_secure_token();
        }
    }

    pub fn ensure_confirm_token(&mut self) {
        if self.confirm_token.is_none() {
            self.confirm_token = Some(generate_secure_token());
        }
    }

    /// Record-level rules. Uniqueness is checked by the store.
    pub fn errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        validate_phone_length(self.phone.as_deref(), &mut errors);

        if let Some(first_name) = self.first_name.as_deref() {
            if first_name.trim().is_empty() {
                errors.blank(Field::FirstName);
            }
        }

        if let Some(email) = self.email.as_deref() {
            if email.trim().is_empty() {
                errors.blank(Field::Email);
            }
            if !is_valid_email(email) {
                errors.invalid(Field::Email);
            }
        }

        if self.uid.trim().is_empty() {
            errors.blank(Field::Uid);
        }
        if self.session_token.trim().is_empty() {
            errors.blank(Field::SessionToken);
        }

        errors
    }

    /// Rules for saving `self` over the stored `previous` version. A confirmed
    /// email is frozen unless the same change also flips the confirmation.
    pub fn change_errors(&self, previous: &User) -> ValidationErrors {
        let mut errors = self.errors();
        let email_changed = self.email != previous.email;
        let confirmation_changed = self.email_confirmed != previous.email_confirmed;
        if email_changed && self.email_confirmed && !confirmation_changed {
            errors.add(
                Field::Email,
                ErrorKind::ChangedAfterConfirmation,
                "cannot be changed after being confirmed",
            );
        }
        errors
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.errors().into_result()
    }

    pub fn missing_profile_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.phone.is_none() {
            missing.push("phone");
        }
        if self.first_name.is_none() {
            missing.push("first name");
        }
        if !self.email_confirmed {
            missing.push("confirmed email");
        }
        missing
    }

    pub fn is_profile_complete(&self) -> bool {
        self.missing_profile_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::User;
    use crate::domain::ids::UserId;
    use crate::rules::validation::{ErrorKind, Field};

    fn user() -> User {
        let mut user = User {
            id: UserId::new(),
            provider: Some("facebook".to_string()),
            uid: "fb-1001".to_string(),
            email: None,
            first_name: None,
            phone: None,
            session_token: String::new(),
            confirm_token: None,
            email_confirmed: false,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        };
        user.ensure_session_token();
        user.set_phone("2345678901");
        user
    }

    #[test]
    fn valid_user_has_no_errors() {
        assert!(user().validate().is_ok());
    }

    #[test]
    fn blank_present_fields_are_rejected_but_missing_ones_are_fine() {
        let mut user = user();
        user.set_first_name(Some("   "));
        user.set_email(Some(""));
        assert_eq!(
            user.errors().full_messages(),
            vec![
                "First name can't be blank".to_string(),
                "Email can't be blank".to_string(),
                "Email is invalid".to_string(),
            ]
        );

        user.set_first_name(None);
        user.set_email(None);
        assert!(user.errors().is_empty());
    }

    #[test]
    fn uid_is_required() {
        let mut user = user();
        user.uid = String::new();
        assert_eq!(
            user.errors().full_messages(),
            vec!["Uid can't be blank".to_string()]
        );
    }

    #[test]
    fn confirmed_email_cannot_change() {
        let mut previous = user();
        previous.set_email(Some("ada@example.com"));
        previous.email_confirmed = true;

        let mut next = previous.clone();
        next.set_email(Some("test@example.com"));
        assert!(next
            .change_errors(&previous)
            .has_on(Field::Email, ErrorKind::ChangedAfterConfirmation));

        let mut unchanged = previous.clone();
        unchanged.set_first_name(Some("Ada"));
        assert!(unchanged.change_errors(&previous).is_empty());
    }

    #[test]
    fn email_may_change_alongside_confirmation() {
        let mut previous = user();
        previous.set_email(Some("ada@example.com"));

        let mut next = previous.clone();
        next.set_email(Some("ada@lovelace.dev"));
        next.email_confirmed = true;
        assert!(next.change_errors(&previous).is_empty());
    }

    #[test]
    fn profile_completeness_lists_missing_fields() {
        let mut user = user();
        user.clear_phone();
        assert_eq!(
            user.missing_profile_fields(),
            vec!["phone", "first name", "confirmed email"]
        );
        user.set_phone("404-555-1212");
        user.set_first_name(Some("Ada"));
        user.email_confirmed = true;
        assert!(user.is_profile_complete());
    }
}
