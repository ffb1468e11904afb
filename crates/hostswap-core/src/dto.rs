use crate::domain::{Hosting, HostingId, User, UserId, Visit, VisitId};
use crate::rules::HostingMatch;
use serde::{Deserialize, Serialize};

/// Public view of a user; tokens are never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: UserId,
    pub provider: Option<String>,
    pub uid: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub phone: Option<String>,
    pub email_confirmed: bool,
    pub profile_complete: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            provider: user.provider.clone(),
            uid: user.uid.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            phone: user.phone.clone(),
            email_confirmed: user.email_confirmed,
            profile_complete: user.is_profile_complete(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitDto {
    pub id: VisitId,
    pub user_id: UserId,
    pub start_date: String,
    pub end_date: String,
    pub dates: String,
    pub zipcode: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub deleted: bool,
}

impl From<&Visit> for VisitDto {
    fn from(visit: &Visit) -> Self {
        Self {
            id: visit.id,
            user_id: visit.user_id,
            start_date: visit.start_date.format("%Y-%m-%d").to_string(),
            end_date: visit.end_date.format("%Y-%m-%d").to_string(),
            dates: visit.date_range_label(),
            zipcode: visit.zipcode.clone(),
            city: visit.city.clone(),
            state: visit.state.clone(),
            latitude: visit.latitude,
            longitude: visit.longitude,
            deleted: visit.is_deleted(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostingDto {
    pub id: HostingId,
    pub host_id: UserId,
    pub title: String,
    pub zipcode: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: String,
    pub end_date: String,
}

impl From<&Hosting> for HostingDto {
    fn from(hosting: &Hosting) -> Self {
        Self {
            id: hosting.id,
            host_id: hosting.host_id,
            title: hosting.title.clone(),
            zipcode: hosting.zipcode.clone(),
            city: hosting.city.clone(),
            state: hosting.state.clone(),
            latitude: hosting.latitude,
            longitude: hosting.longitude,
            start_date: hosting.start_date.format("%Y-%m-%d").to_string(),
            end_date: hosting.end_date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostingMatchDto {
    #[serde(flatten)]
    pub hosting: HostingDto,
    pub distance: f64,
    pub unit: String,
}

impl HostingMatchDto {
    pub fn new(found: &HostingMatch, unit: &str) -> Self {
        Self {
            hosting: HostingDto::from(&found.hosting),
            distance: (found.distance * 100.0).round() / 100.0,
            unit: unit.to_string(),
        }
    }
}

/// Returned on sign-in. The token is what later commands pass as `--session`.
/// The confirmation token stands in for the confirmation mail and is only
/// present while an email awaits confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDto {
    pub user: UserDto,
    pub session_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_token: Option<String>,
}

impl From<&User> for SessionDto {
    fn from(user: &User) -> Self {
        let awaiting_confirmation = user.email.is_some() && !user.email_confirmed;
        Self {
            user: UserDto::from(user),
            session_token: user.session_token.clone(),
            confirm_token: user
                .confirm_token
                .clone()
                .filter(|_| awaiting_confirmation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HostingMatchDto, SessionDto, UserDto};
    use crate::domain::{Hosting, HostingId, User, UserId};
    use crate::rules::HostingMatch;
    use chrono::NaiveDate;

    fn user() -> User {
        User {
            id: UserId::new(),
            provider: None,
            uid: "uid-1".to_string(),
            email: None,
            first_name: Some("Ada".to_string()),
            phone: None,
            session_token: "secret-token".to_string(),
            confirm_token: Some("confirm".to_string()),
            email_confirmed: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn user_dto_omits_tokens() {
        let json = serde_json::to_value(UserDto::from(&user())).unwrap();
        assert!(json.get("session_token").is_none());
        assert!(json.get("confirm_token").is_none());
        assert_eq!(json["profile_complete"], false);

        let session = serde_json::to_value(SessionDto::from(&user())).unwrap();
        assert_eq!(session["session_token"], "secret-token");
        assert!(session.get("confirm_token").is_none());

        let mut pending = user();
        pending.email = Some("ada@example.com".to_string());
        let session = serde_json::to_value(SessionDto::from(&pending)).unwrap();
        assert_eq!(session["confirm_token"], "confirm");
    }

    #[test]
    fn match_dto_rounds_distance() {
        let date = NaiveDate::from_ymd_opt(2030, 3, 1).unwrap();
        let found = HostingMatch {
            hosting: Hosting {
                id: HostingId::new(),
                host_id: UserId::new(),
                title: "Casa".to_string(),
                zipcode: None,
                city: None,
                state: None,
                latitude: 40.0,
                longitude: -3.0,
                start_date: date,
                end_date: date,
                created_at: 0,
                updated_at: 0,
            },
            distance: 12.3456,
        };
        let json = serde_json::to_value(HostingMatchDto::new(&found, "km")).unwrap();
        assert_eq!(json["distance"], 12.35);
        assert_eq!(json["title"], "Casa");
        assert_eq!(json["unit"], "km");
    }
}
