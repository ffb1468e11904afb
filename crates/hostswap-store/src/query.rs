use crate::repo::date_to_sql;
use chrono::NaiveDate;
use hostswap_core::domain::{BoundingBox, UserId};
use rusqlite::types::Value;

pub(crate) const VISIT_COLUMNS: &str = "id, user_id, start_date, end_date, zipcode, city, state, latitude, longitude, created_at, updated_at, deleted_at";
pub(crate) const HOSTING_COLUMNS: &str = "id, host_id, title, zipcode, city, state, latitude, longitude, start_date, end_date, created_at, updated_at";

pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Visit listing. Soft-deleted rows are skipped unless `include_deleted`.
#[derive(Debug, Default, Clone)]
pub struct VisitQuery {
    pub user_id: Option<UserId>,
    pub include_deleted: bool,
    pub ending_on_or_after: Option<NaiveDate>,
}

impl VisitQuery {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn to_sql(&self) -> SqlQuery {
        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if !self.include_deleted {
            clauses.push("deleted_at IS NULL");
        }
        if let Some(user_id) = self.user_id {
            clauses.push("user_id = ?");
            params.push(Value::from(user_id.to_string()));
        }
        if let Some(date) = self.ending_on_or_after {
            clauses.push("end_date >= ?");
            params.push(Value::from(date_to_sql(date)));
        }

        let mut sql = format!("SELECT {} FROM visits", VISIT_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY start_date ASC, created_at ASC, id ASC;");

        SqlQuery { sql, params }
    }
}

/// Coarse proximity prefilter: rows inside a bounding box, optionally
/// overlapping a date range. Exact distance and ordering happen afterwards.
#[derive(Debug, Clone)]
pub struct ProximityQuery {
    pub bbox: BoundingBox,
    pub overlapping: Option<(NaiveDate, NaiveDate)>,
    pub exclude_host: Option<UserId>,
}

impl ProximityQuery {
    pub fn to_sql(&self) -> SqlQuery {
        let mut clauses: Vec<&str> = vec![
            "latitude BETWEEN ? AND ?",
            if self.bbox.crosses_antimeridian() {
                "(longitude >= ? OR longitude <= ?)"
            } else {
                "longitude BETWEEN ? AND ?"
            },
        ];
        let mut params: Vec<Value> = vec![
            Value::from(self.bbox.min_lat),
            Value::from(self.bbox.max_lat),
            Value::from(self.bbox.min_lon),
            Value::from(self.bbox.max_lon),
        ];

        if let Some((start, end)) = self.overlapping {
            clauses.push("start_date <= ?");
            params.push(Value::from(date_to_sql(end)));
            clauses.push("end_date >= ?");
            params.push(Value::from(date_to_sql(start)));
        }

        if let Some(host) = self.exclude_host {
            clauses.push("host_id != ?");
            params.push(Value::from(host.to_string()));
        }

        let sql = format!(
            "SELECT {} FROM hostings WHERE {};",
            HOSTING_COLUMNS,
            clauses.join(" AND ")
        );
        SqlQuery { sql, params }
    }
}

#[cfg(test)]
mod tests {
    use super::{ProximityQuery, VisitQuery};
    use chrono::NaiveDate;
    use hostswap_core::domain::{bounding_box, DistanceUnit, GeoPoint, UserId};

    #[test]
    fn visit_query_hides_deleted_by_default() {
        let query = VisitQuery::default().to_sql();
        assert!(query.sql.contains("deleted_at IS NULL"));
        assert!(query.params.is_empty());

        let query = VisitQuery {
            include_deleted: true,
            ..VisitQuery::for_user(UserId::new())
        }
        .to_sql();
        assert!(!query.sql.contains("deleted_at IS NULL"));
        assert_eq!(query.params.len(), 1);
    }

    #[test]
    fn proximity_query_binds_dates_in_overlap_order() {
        let start = NaiveDate::from_ymd_opt(2030, 5, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2030, 5, 15).unwrap();
        let query = ProximityQuery {
            bbox: bounding_box(GeoPoint::new(40.0, -3.0), 75.0, DistanceUnit::Kilometers),
            overlapping: Some((start, end)),
            exclude_host: Some(UserId::new()),
        }
        .to_sql();
        assert!(query.sql.contains("start_date <= ? AND end_date >= ?"));
        assert!(query.sql.contains("host_id != ?"));
        assert!(query.sql.contains("longitude BETWEEN ? AND ?"));
        assert_eq!(query.params.len(), 7);
        assert_eq!(
            query.params[4],
            rusqlite::types::Value::Text("2030-05-15".to_string())
        );
    }

    #[test]
    fn proximity_query_wraps_longitude_across_antimeridian() {
        let query = ProximityQuery {
            bbox: bounding_box(GeoPoint::new(-17.0, 179.9), 75.0, DistanceUnit::Kilometers),
            overlapping: None,
            exclude_host: None,
        }
        .to_sql();
        assert!(query.sql.contains("(longitude >= ? OR longitude <= ?)"));
        assert_eq!(query.params.len(), 4);
    }
}
