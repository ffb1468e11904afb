use crate::error::{Result, StoreError};
use crate::query::{ProximityQuery, HOSTING_COLUMNS};
use crate::repo::{date_from_sql, date_to_sql, id_from_sql};
use chrono::NaiveDate;
use hostswap_core::domain::{
    bounding_box, haversine_distance, normalize_zipcode, CountryCode, DistanceUnit, GeoPoint,
    GeoResult, Geocoder, Hosting, HostingDraft, HostingId, UserId, Visit,
};
use hostswap_core::rules::{
    apply_geocode, lookup_zipcode, require_owner_id, select_available_hostings,
    validate_hosting_draft, GeocodeOutcome, HostingMatch, MatchPolicy, ValidationErrors,
};
use hostswap_core::CoreError;
use rusqlite::{params, params_from_iter, Connection};
use tracing::{debug, warn};

pub struct HostingsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> HostingsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Stores a hosting. Without explicit coordinates the zip code is geocoded.
    pub fn create(
        &self,
        now_utc: i64,
        draft: HostingDraft,
        country: CountryCode,
        geocoder: &dyn Geocoder,
    ) -> Result<Hosting> {
        let errors = validate_hosting_draft(&draft, country);
        let zipcode = draft.zipcode.as_deref().map(normalize_zipcode);
        let (start_date, end_date) = match (draft.start_date, draft.end_date) {
            (Some(start), Some(end)) if errors.is_empty() => (start, end),
            _ => return Err(CoreError::Invalid(errors).into()),
        };

        let place = match (draft.location, zipcode.as_deref()) {
            (Some(point), _) => GeoResult {
                city: None,
                state: None,
                latitude: point.latitude,
                longitude: point.longitude,
            },
            (None, zip) => {
                let outcome = match zip {
                    Some(zip) => lookup_zipcode(geocoder, zip),
                    None => GeocodeOutcome::NoResults,
                };
                if let GeocodeOutcome::Unavailable(err) = &outcome {
                    warn!(
                        backend = geocoder.backend_name(),
                        error = %err,
                        "geocoder unavailable, treating as no results"
                    );
                }
                let mut errors = ValidationErrors::default();
                match apply_geocode(zip, &outcome, &mut errors) {
                    Some(place) => place,
                    None => return Err(CoreError::Invalid(errors).into()),
                }
            }
        };

        let hosting = Hosting {
            id: HostingId::new(),
            host_id: draft.host_id,
            title: draft.title.trim().to_string(),
            zipcode,
            city: place.city,
            state: place.state,
            latitude: place.latitude,
            longitude: place.longitude,
            start_date,
            end_date,
            created_at: now_utc,
            updated_at: now_utc,
        };

        let inserted = self.conn.execute(
            "INSERT INTO hostings (id, host_id, title, zipcode, city, state, latitude, longitude, start_date, end_date, created_at, updated_at)
             SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12
             WHERE EXISTS (SELECT 1 FROM users WHERE id = ?2);",
            params![
                hosting.id.to_string(),
                hosting.host_id.to_string(),
                hosting.title,
                hosting.zipcode,
                hosting.city,
                hosting.state,
                hosting.latitude,
                hosting.longitude,
                date_to_sql(hosting.start_date),
                date_to_sql(hosting.end_date),
                hosting.created_at,
                hosting.updated_at,
            ],
        )?;
        if inserted == 0 {
            return Err(StoreError::NotFound(hosting.host_id.to_string()));
        }
        debug!(hosting_id = %hosting.id, host_id = %hosting.host_id, "hosting created");
        Ok(hosting)
    }

    pub fn get(&self, id: HostingId) -> Result<Option<Hosting>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM hostings WHERE id = ?1;",
            HOSTING_COLUMNS
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(hosting_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list(&self, host_id: Option<UserId>) -> Result<Vec<Hosting>> {
        let (sql, params) = match host_id {
            Some(host) => (
                format!(
                    "SELECT {} FROM hostings WHERE host_id = ?1 ORDER BY start_date ASC, id ASC;",
                    HOSTING_COLUMNS
                ),
                vec![host.to_string()],
            ),
            None => (
                format!(
                    "SELECT {} FROM hostings ORDER BY start_date ASC, id ASC;",
                    HOSTING_COLUMNS
                ),
                Vec::new(),
            ),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params))?;
        let mut hostings = Vec::new();
        while let Some(row) = rows.next()? {
            hostings.push(hosting_from_row(row)?);
        }
        Ok(hostings)
    }

    pub fn delete(&self, id: HostingId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM hostings WHERE id = ?1;", [id.to_string()])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Hostings within `radius` of `origin`, closest first, optionally limited
    /// to those overlapping a date range.
    pub fn nearby(
        &self,
        origin: GeoPoint,
        radius: f64,
        unit: DistanceUnit,
        overlapping: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<HostingMatch>> {
        let candidates = self.candidates(&ProximityQuery {
            bbox: bounding_box(origin, radius, unit),
            overlapping,
            exclude_host: None,
        })?;

        let mut matches: Vec<HostingMatch> = candidates
            .into_iter()
            .filter_map(|hosting| {
                let distance = haversine_distance(origin, hosting.coordinates(), unit);
                (distance <= radius).then_some(HostingMatch { hosting, distance })
            })
            .collect();
        matches.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.hosting.id.cmp(&b.hosting.id))
        });
        Ok(matches)
    }

    /// Candidate hostings for a visit, on behalf of `requesting_user`, who
    /// must own the visit.
    pub fn available_for_visit(
        &self,
        visit: &Visit,
        requesting_user: UserId,
        policy: &MatchPolicy,
    ) -> Result<Vec<HostingMatch>> {
        require_owner_id(requesting_user, visit.user_id)?;
        let Some(origin) = visit.coordinates() else {
            return Ok(Vec::new());
        };

        let candidates = self.candidates(&ProximityQuery {
            bbox: bounding_box(origin, policy.radius, policy.unit),
            overlapping: Some((visit.start_date, visit.end_date)),
            exclude_host: policy.exclude_own_hostings.then_some(visit.user_id),
        })?;
        let matches = select_available_hostings(visit, candidates, policy);
        debug!(visit_id = %visit.id, count = matches.len(), "hostings matched");
        Ok(matches)
    }

    fn candidates(&self, query: &ProximityQuery) -> Result<Vec<Hosting>> {
        let sql = query.to_sql();
        let mut stmt = self.conn.prepare(&sql.sql)?;
        let mut rows = stmt.query(params_from_iter(sql.params))?;
        let mut hostings = Vec::new();
        while let Some(row) = rows.next()? {
            hostings.push(hosting_from_row(row)?);
        }
        Ok(hostings)
    }
}

fn hosting_from_row(row: &rusqlite::Row<'_>) -> Result<Hosting> {
    let start_raw: String = row.get(8)?;
    let end_raw: String = row.get(9)?;
    Ok(Hosting {
        id: id_from_sql(row.get(0)?)?,
        host_id: id_from_sql(row.get(1)?)?,
        title: row.get(2)?,
        zipcode: row.get(3)?,
        city: row.get(4)?,
        state: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
        start_date: date_from_sql(&start_raw)?,
        end_date: date_from_sql(&end_raw)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
