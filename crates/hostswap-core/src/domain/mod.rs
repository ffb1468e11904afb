pub mod email;
pub mod environment;
pub mod geo;
pub mod hosting;
pub mod ids;
pub mod phone;
pub mod token;
pub mod user;
pub mod visit;
pub mod zipcode;

pub use email::{is_valid_email, normalize_email};
pub use environment::Environment;
pub use geo::{
    bounding_box, haversine_distance, BoundingBox, DistanceUnit, GeoPoint, GeoResult,
    GeocodeError, Geocoder,
};
pub use hosting::{Hosting, HostingDraft};
pub use ids::{HostingId, UserId, VisitId};
pub use phone::{
    format_phone_digits, normalize_phone, MAX_DOMESTIC_PHONE_NUMBER,
    MAX_INTERNATIONAL_PHONE_NUMBER,
};
pub use token::generate_secure_token;
pub use user::User;
pub use visit::{Visit, VisitDraft};
pub use zipcode::{normalize_zipcode, CountryCode};
