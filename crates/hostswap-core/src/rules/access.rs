use crate::domain::ids::UserId;
use crate::domain::user::User;
use crate::error::CoreError;

pub fn require_current_user(current: Option<User>) -> Result<User, CoreError> {
    current.ok_or(CoreError::NotSignedIn)
}

/// A signed-in user may only act on their own records.
pub fn require_owner(current: &User, owner_id: UserId) -> Result<(), CoreError> {
    require_owner_id(current.id, owner_id)
}

pub fn require_owner_id(current_id: UserId, owner_id: UserId) -> Result<(), CoreError> {
    if current_id == owner_id {
        Ok(())
    } else {
        Err(CoreError::NotOwner)
    }
}

/// Phone, first name and a confirmed email are needed before booking.
pub fn require_complete_profile(user: &User) -> Result<(), CoreError> {
    let missing = user.missing_profile_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::IncompleteProfile(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::{require_complete_profile, require_current_user, require_owner};
    use crate::domain::ids::UserId;
    use crate::domain::user::User;
    use crate::error::CoreError;

    fn user() -> User {
        User {
            id: UserId::new(),
            provider: None,
            uid: "uid-1".to_string(),
            email: Some("ada@example.com".to_string()),
            first_name: Some("Ada".to_string()),
            phone: Some("404-555-1212".to_string()),
            session_token: "token".to_string(),
            confirm_token: None,
            email_confirmed: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn missing_user_is_not_signed_in() {
        assert_eq!(require_current_user(None).unwrap_err(), CoreError::NotSignedIn);
        assert!(require_current_user(Some(user())).is_ok());
    }

    #[test]
    fn other_users_records_are_refused() {
        let user = user();
        assert!(require_owner(&user, user.id).is_ok());
        assert_eq!(
            require_owner(&user, UserId::new()).unwrap_err(),
            CoreError::NotOwner
        );
    }

    #[test]
    fn unconfirmed_email_blocks_profile() {
        let mut user = user();
        assert!(require_complete_profile(&user).is_ok());
        user.email_confirmed = false;
        let err = require_complete_profile(&user).unwrap_err();
        assert_eq!(err.to_string(), "profile incomplete, missing: confirmed email");
    }
}
