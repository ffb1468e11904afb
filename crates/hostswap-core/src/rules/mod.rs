pub mod access;
pub mod dates;
pub mod hosting;
pub mod matching;
pub mod validation;
pub mod visit;

pub use access::{
    require_complete_profile, require_current_user, require_owner, require_owner_id,
};
pub use dates::{local_today, validate_date_range};
pub use hosting::validate_hosting_draft;
pub use matching::{select_available_hostings, HostingMatch, MatchPolicy, DEFAULT_SEARCH_RADIUS};
pub use validation::{ErrorKind, Field, ValidationError, ValidationErrors};
pub use visit::{
    apply_geocode, lookup_zipcode, validate_visit_draft, GeocodeOutcome, UNKNOWN_ZIP_CODE,
};
