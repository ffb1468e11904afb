pub mod domain;
pub mod dto;
pub mod error;
pub mod rules;
pub mod time;

pub use domain::{
    bounding_box, generate_secure_token, haversine_distance, normalize_email, normalize_phone,
    normalize_zipcode, BoundingBox, CountryCode, DistanceUnit, Environment, GeoPoint, GeoResult,
    GeocodeError, Geocoder, Hosting, HostingDraft, HostingId, User, UserId, Visit, VisitDraft,
    VisitId,
};
pub use dto::{HostingDto, HostingMatchDto, SessionDto, UserDto, VisitDto};
pub use error::CoreError;
pub use rules::{
    select_available_hostings, GeocodeOutcome, HostingMatch, MatchPolicy, ValidationError,
    ValidationErrors,
};
