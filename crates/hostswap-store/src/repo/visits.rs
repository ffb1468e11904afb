use crate::error::{Result, StoreError};
use crate::query::{VisitQuery, VISIT_COLUMNS};
use crate::repo::{date_from_sql, date_to_sql, id_from_sql};
use chrono::NaiveDate;
use hostswap_core::domain::{normalize_zipcode, CountryCode, Geocoder, Visit, VisitDraft, VisitId};
use hostswap_core::rules::{
    apply_geocode, lookup_zipcode, validate_visit_draft, GeocodeOutcome, ValidationErrors,
};
use hostswap_core::CoreError;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::{debug, warn};

/// Inputs the visit rules depend on besides the draft itself.
#[derive(Debug, Clone, Copy)]
pub struct VisitRules {
    pub today: NaiveDate,
    pub country: CountryCode,
}

pub struct VisitsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> VisitsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Validates the draft, geocodes its zip code and stores it.
    ///
    /// The geocoder is only called once dates and zip format pass. A geocoder
    /// failure is logged and reported as an unknown zip code.
    pub fn create(
        &self,
        now_utc: i64,
        draft: VisitDraft,
        rules: &VisitRules,
        geocoder: &dyn Geocoder,
    ) -> Result<Visit> {
        let owner: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM users WHERE id = ?1;",
                [draft.user_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if owner.is_none() {
            return Err(StoreError::NotFound(draft.user_id.to_string()));
        }

        let errors = validate_visit_draft(&draft, rules.today, rules.country);
        let zipcode = draft.zipcode.as_deref().map(normalize_zipcode);
        let (start_date, end_date, zipcode) = match (draft.start_date, draft.end_date, zipcode) {
            (Some(start), Some(end), Some(zipcode)) if errors.is_empty() => (start, end, zipcode),
            _ => return Err(CoreError::Invalid(errors).into()),
        };

        let outcome = lookup_zipcode(geocoder, &zipcode);
        match &outcome {
            GeocodeOutcome::Found(place) => debug!(
                zipcode = %zipcode,
                city = place.city.as_deref().unwrap_or(""),
                "zip code resolved"
            ),
            GeocodeOutcome::NoResults => debug!(zipcode = %zipcode, "zip code not found"),
            GeocodeOutcome::Unavailable(err) => warn!(
                zipcode = %zipcode,
                backend = geocoder.backend_name(),
                error = %err,
                "geocoder unavailable, treating as no results"
            ),
        }

        let mut errors = ValidationErrors::default();
        let Some(place) = apply_geocode(Some(&zipcode), &outcome, &mut errors) else {
            return Err(CoreError::Invalid(errors).into());
        };

        let visit = Visit {
            id: VisitId::new(),
            user_id: draft.user_id,
            start_date,
            end_date,
            zipcode,
            city: place.city,
            state: place.state,
            latitude: Some(place.latitude),
            longitude: Some(place.longitude),
            created_at: now_utc,
            updated_at: now_utc,
            deleted_at: None,
        };

        self.conn.execute(
            "INSERT INTO visits (id, user_id, start_date, end_date, zipcode, city, state, latitude, longitude, created_at, updated_at, deleted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL);",
            params![
                visit.id.to_string(),
                visit.user_id.to_string(),
                date_to_sql(visit.start_date),
                date_to_sql(visit.end_date),
                visit.zipcode,
                visit.city,
                visit.state,
                visit.latitude,
                visit.longitude,
                visit.created_at,
                visit.updated_at,
            ],
        )?;
        debug!(visit_id = %visit.id, user_id = %visit.user_id, "visit created");
        Ok(visit)
    }

    pub fn get(&self, id: VisitId, include_deleted: bool) -> Result<Option<Visit>> {
        let mut sql = format!("SELECT {} FROM visits WHERE id = ?1", VISIT_COLUMNS);
        if !include_deleted {
            sql.push_str(" AND deleted_at IS NULL");
        }
        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(visit_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list(&self, query: &VisitQuery) -> Result<Vec<Visit>> {
        let sql = query.to_sql();
        let mut stmt = self.conn.prepare(&sql.sql)?;
        let mut rows = stmt.query(params_from_iter(sql.params))?;
        let mut visits = Vec::new();
        while let Some(row) = rows.next()? {
            visits.push(visit_from_row(row)?);
        }
        Ok(visits)
    }

    /// Hides the visit from default queries; the row is kept.
    pub fn soft_delete(&self, now_utc: i64, id: VisitId) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE visits SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL;",
            params![now_utc, id.to_string()],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        debug!(visit_id = %id, "visit soft-deleted");
        Ok(())
    }

    pub fn restore(&self, now_utc: i64, id: VisitId) -> Result<Visit> {
        let updated = self.conn.execute(
            "UPDATE visits SET deleted_at = NULL, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NOT NULL;",
            params![now_utc, id.to_string()],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.get(id, false)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

fn visit_from_row(row: &rusqlite::Row<'_>) -> Result<Visit> {
    let start_raw: String = row.get(2)?;
    let end_raw: String = row.get(3)?;
    Ok(Visit {
        id: id_from_sql(row.get(0)?)?,
        user_id: id_from_sql(row.get(1)?)?,
        start_date: date_from_sql(&start_raw)?,
        end_date: date_from_sql(&end_raw)?,
        zipcode: row.get(4)?,
        city: row.get(5)?,
        state: row.get(6)?,
        latitude: row.get(7)?,
        longitude: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        deleted_at: row.get(11)?,
    })
}
