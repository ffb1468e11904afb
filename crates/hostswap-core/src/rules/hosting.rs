use crate::domain::hosting::HostingDraft;
use crate::domain::zipcode::{normalize_zipcode, validate_zipcode, CountryCode};
use crate::rules::dates::validate_date_range;
use crate::rules::validation::{Field, ValidationErrors};

/// Hostings need a title and an ordered date range. The zip code is only
/// checked when it is the source of the location.
pub fn validate_hosting_draft(draft: &HostingDraft, country: CountryCode) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    if draft.title.trim().is_empty() {
        errors.blank(Field::Title);
    }

    validate_date_range(draft.start_date, draft.end_date, None, &mut errors);

    match draft.location {
        Some(point) if !point.is_valid() => errors.invalid(Field::Coordinates),
        Some(_) => {}
        None => {
            let zipcode = draft.zipcode.as_deref().map(normalize_zipcode);
            validate_zipcode(zipcode.as_deref(), country, &mut errors);
        }
    }
    errors
}
