use crate::domain::geo::GeoPoint;
use crate::domain::ids::{HostingId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hosting {
    pub id: HostingId,
    pub host_id: UserId,
    pub title: String,
    pub zipcode: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Hosting {
    pub fn coordinates(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Inclusive on both ends: a hosting ending the day a visit starts overlaps.
    pub fn overlaps(&self, start_date: NaiveDate, end_date: NaiveDate) -> bool {
        self.start_date <= end_date && self.end_date >= start_date
    }
}

/// Raw input for a new hosting. When `location` is absent the zip code is
/// geocoded instead.
#[derive(Debug, Clone, PartialEq)]
pub struct HostingDraft {
    pub host_id: UserId,
    pub title: String,
    pub zipcode: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<GeoPoint>,
}

#[cfg(test)]
mod tests {
    use super::Hosting;
    use crate::domain::ids::{HostingId, UserId};
    use chrono::NaiveDate;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, month, day).unwrap()
    }

    #[test]
    fn overlap_is_inclusive() {
        let hosting = Hosting {
            id: HostingId::new(),
            host_id: UserId::new(),
            title: "Flat in Lavapies".to_string(),
            zipcode: Some("28012".to_string()),
            city: Some("Madrid".to_string()),
            state: None,
            latitude: 40.4086,
            longitude: -3.7002,
            start_date: date(7, 10),
            end_date: date(7, 20),
            created_at: 0,
            updated_at: 0,
        };
        assert!(hosting.overlaps(date(7, 1), date(7, 10)));
        assert!(hosting.overlaps(date(7, 20), date(7, 25)));
        assert!(hosting.overlaps(date(7, 12), date(7, 14)));
        assert!(!hosting.overlaps(date(7, 1), date(7, 9)));
        assert!(!hosting.overlaps(date(7, 21), date(7, 30)));
    }
}
