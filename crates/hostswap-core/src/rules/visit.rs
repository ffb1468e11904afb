use crate::domain::geo::{GeoResult, GeocodeError, Geocoder};
use crate::domain::visit::VisitDraft;
use crate::domain::zipcode::{normalize_zipcode, validate_zipcode, CountryCode};
use crate::rules::dates::validate_date_range;
use crate::rules::validation::{ErrorKind, ValidationErrors};
use chrono::NaiveDate;

pub const UNKNOWN_ZIP_CODE: &str = "Unknown Zip Code";

/// Structural checks for a new visit: dates and zip code format. Geocoding
/// only runs once these pass.
pub fn validate_visit_draft(
    draft: &VisitDraft,
    today: NaiveDate,
    country: CountryCode,
) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    validate_date_range(draft.start_date, draft.end_date, Some(today), &mut errors);
    let zipcode = draft.zipcode.as_deref().map(normalize_zipcode);
    validate_zipcode(zipcode.as_deref(), country, &mut errors);
    errors
}

#[derive(Debug)]
pub enum GeocodeOutcome {
    Found(GeoResult),
    NoResults,
    Unavailable(GeocodeError),
}

impl GeocodeOutcome {
    pub fn place(&self) -> Option<&GeoResult> {
        match self {
            GeocodeOutcome::Found(place) => Some(place),
            GeocodeOutcome::NoResults | GeocodeOutcome::Unavailable(_) => None,
        }
    }
}

/// Takes the first result. Errors are kept in the outcome so callers can log
/// them; they are otherwise treated like an empty result.
pub fn lookup_zipcode(geocoder: &dyn Geocoder, zipcode: &str) -> GeocodeOutcome {
    match geocoder.geocode(zipcode) {
        Ok(results) => match results.into_iter().next() {
            Some(place) => GeocodeOutcome::Found(place),
            None => GeocodeOutcome::NoResults,
        },
        Err(err) => GeocodeOutcome::Unavailable(err),
    }
}

/// Returns the place to copy onto the record, or records a base error when
/// a present zip code resolved to nothing.
pub fn apply_geocode(
    zipcode: Option<&str>,
    outcome: &GeocodeOutcome,
    errors: &mut ValidationErrors,
) -> Option<GeoResult> {
    match outcome.place() {
        Some(place) => Some(place.clone()),
        None => {
            if zipcode.is_some() {
                errors.add_base(ErrorKind::UnknownZipCode, UNKNOWN_ZIP_CODE);
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_geocode, lookup_zipcode, validate_visit_draft, GeocodeOutcome};
    use crate::domain::geo::{GeoResult, GeocodeError, Geocoder};
    use crate::domain::ids::UserId;
    use crate::domain::visit::VisitDraft;
    use crate::domain::zipcode::CountryCode;
    use crate::rules::validation::{ErrorKind, Field, ValidationErrors};
    use chrono::NaiveDate;

    struct FixedGeocoder(Result<Vec<GeoResult>, ()>);

    impl Geocoder for FixedGeocoder {
        fn backend_name(&self) -> &'static str {
            "fixed"
        }

        fn geocode(&self, _zipcode: &str) -> Result<Vec<GeoResult>, GeocodeError> {
            self.0.clone().map_err(|_| GeocodeError::Timeout)
        }
    }

    fn madrid() -> GeoResult {
        GeoResult {
            city: Some("Madrid".to_string()),
            state: Some("Comunidad de Madrid".to_string()),
            latitude: 40.4169,
            longitude: -3.7035,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 3, day).unwrap()
    }

    fn draft(start: u32, end: u32, zipcode: Option<&str>) -> VisitDraft {
        VisitDraft {
            user_id: UserId::new(),
            start_date: Some(date(start)),
            end_date: Some(date(end)),
            zipcode: zipcode.map(str::to_string),
        }
    }

    #[test]
    fn valid_draft_passes_structural_checks() {
        let errors = validate_visit_draft(&draft(10, 12, Some(" 28013 ")), date(10), CountryCode::Es);
        assert!(errors.is_empty());
    }

    #[test]
    fn structural_errors_accumulate() {
        let errors = validate_visit_draft(&draft(9, 8, Some("99999")), date(10), CountryCode::Es);
        assert!(errors.has_on(Field::StartDate, ErrorKind::DateInPast));
        assert!(errors.has_on(Field::EndDate, ErrorKind::BeforeStart));
        assert!(errors.has_on(Field::Zipcode, ErrorKind::Invalid));
    }

    #[test]
    fn first_geocoder_result_wins() {
        let mut second = madrid();
        second.city = Some("Elsewhere".to_string());
        let geocoder = FixedGeocoder(Ok(vec![madrid(), second]));
        let outcome = lookup_zipcode(&geocoder, "28013");
        let mut errors = ValidationErrors::default();
        let place = apply_geocode(Some("28013"), &outcome, &mut errors).expect("place");
        assert_eq!(place.city.as_deref(), Some("Madrid"));
        assert!(errors.is_empty());
    }

    #[test]
    fn no_results_is_unknown_zip_code() {
        let outcome = lookup_zipcode(&FixedGeocoder(Ok(Vec::new())), "28013");
        assert!(matches!(outcome, GeocodeOutcome::NoResults));
        let mut errors = ValidationErrors::default();
        assert!(apply_geocode(Some("28013"), &outcome, &mut errors).is_none());
        assert_eq!(errors.base().count(), 1);
        assert_eq!(errors.full_messages(), vec!["Unknown Zip Code".to_string()]);
    }

    #[test]
    fn unavailable_geocoder_is_treated_as_no_results() {
        let outcome = lookup_zipcode(&FixedGeocoder(Err(())), "28013");
        assert!(matches!(outcome, GeocodeOutcome::Unavailable(GeocodeError::Timeout)));
        let mut errors = ValidationErrors::default();
        apply_geocode(Some("28013"), &outcome, &mut errors);
        assert!(errors.has(ErrorKind::UnknownZipCode));
    }

    #[test]
    fn missing_zipcode_does_not_add_base_error() {
        let mut errors = ValidationErrors::default();
        apply_geocode(None, &GeocodeOutcome::NoResults, &mut errors);
        assert!(errors.is_empty());
    }
}
