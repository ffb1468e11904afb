use crate::domain::geo::GeoPoint;
use crate::domain::ids::{UserId, VisitId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub user_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub zipcode: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

impl Visit {
    pub fn coordinates(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// `MM/DD/YY - MM/DD/YY`
    pub fn date_range_label(&self) -> String {
        format!(
            "{} - {}",
            self.start_date.format("%m/%d/%y"),
            self.end_date.format("%m/%d/%y")
        )
    }
}

/// Raw input for a new visit, before validation and geocoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitDraft {
    pub user_id: UserId,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub zipcode: Option<String>,
}
