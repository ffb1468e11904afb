use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const EARTH_RADIUS_MI: f64 = 3956.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "mi")]
    Miles,
}

impl DistanceUnit {
    pub fn earth_radius(self) -> f64 {
        match self {
            DistanceUnit::Kilometers => EARTH_RADIUS_KM,
            DistanceUnit::Miles => EARTH_RADIUS_MI,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Ok(DistanceUnit::Kilometers),
            "mi" | "miles" => Ok(DistanceUnit::Miles),
            _ => Err(CoreError::InvalidDistanceUnit(s.to_string())),
        }
    }
}

/// Great-circle distance between two points.
pub fn haversine_distance(from: GeoPoint, to: GeoPoint, unit: DistanceUnit) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    unit.earth_radius() * c
}

/// Lat/lon rectangle enclosing every point within `radius` of a center.
/// Used to prefilter rows before computing exact distances.
///
/// When the box crosses the 180th meridian `min_lon > max_lon` and the
/// longitude range wraps: `[min_lon, 180]` plus `[-180, max_lon]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn crosses_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        if !(self.min_lat..=self.max_lat).contains(&point.latitude) {
            return false;
        }
        if self.crosses_antimeridian() {
            point.longitude >= self.min_lon || point.longitude <= self.max_lon
        } else {
            (self.min_lon..=self.max_lon).contains(&point.longitude)
        }
    }
}

pub fn bounding_box(center: GeoPoint, radius: f64, unit: DistanceUnit) -> BoundingBox {
    let angular = (radius / unit.earth_radius()).to_degrees();
    let min_lat = (center.latitude - angular).max(-90.0);
    let max_lat = (center.latitude + angular).min(90.0);

    let cos_lat = center.latitude.to_radians().cos();
    let lon_delta = if cos_lat.abs() < 1e-9 || max_lat >= 90.0 || min_lat <= -90.0 {
        180.0
    } else {
        (angular / cos_lat).min(180.0)
    };

    let (min_lon, max_lon) = if lon_delta >= 180.0 {
        (-180.0, 180.0)
    } else {
        (
            wrap_longitude(center.longitude - lon_delta),
            wrap_longitude(center.longitude + lon_delta),
        )
    };

    BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

fn wrap_longitude(longitude: f64) -> f64 {
    if longitude < -180.0 {
        longitude + 360.0
    } else if longitude > 180.0 {
        longitude - 360.0
    } else {
        longitude
    }
}

/// One match returned by a geocoder for a zip code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoResult {
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoResult {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Transport(String),
    #[error("geocoder timed out")]
    Timeout,
    #[error("geocoder response could not be parsed: {0}")]
    Parse(String),
    #[error("geocoder misconfigured: {0}")]
    Config(String),
}

/// Resolves a zip code to places. An empty list means "not found".
pub trait Geocoder {
    fn backend_name(&self) -> &'static str;
    fn geocode(&self, zipcode: &str) -> Result<Vec<GeoResult>, GeocodeError>;
}

#[cfg(test)]
mod tests {
    use super::{bounding_box, haversine_distance, DistanceUnit, GeoPoint};

    const MADRID: GeoPoint = GeoPoint {
        latitude: 40.4169,
        longitude: -3.7035,
    };
    const TOLEDO: GeoPoint = GeoPoint {
        latitude: 39.8628,
        longitude: -4.0273,
    };

    #[test]
    fn haversine_matches_known_distance() {
        let km = haversine_distance(MADRID, TOLEDO, DistanceUnit::Kilometers);
        assert!((km - 67.8).abs() < 1.5, "got {km}");
        let mi = haversine_distance(MADRID, TOLEDO, DistanceUnit::Miles);
        assert!(mi < km);
        assert_eq!(haversine_distance(MADRID, MADRID, DistanceUnit::Kilometers), 0.0);
    }

    #[test]
    fn bounding_box_contains_points_within_radius() {
        let bbox = bounding_box(MADRID, 75.0, DistanceUnit::Kilometers);
        assert!(bbox.contains(TOLEDO));
        assert!(!bbox.contains(GeoPoint::new(41.3874, 2.1686)));
    }

    #[test]
    fn bounding_box_clamps_near_poles() {
        let bbox = bounding_box(GeoPoint::new(89.9, 0.0), 100.0, DistanceUnit::Kilometers);
        assert_eq!(bbox.max_lat, 90.0);
        assert_eq!(bbox.min_lon, -180.0);
        assert_eq!(bbox.max_lon, 180.0);
    }

    #[test]
    fn bounding_box_wraps_across_antimeridian() {
        let center = GeoPoint::new(-17.0, 179.9);
        let across = GeoPoint::new(-17.0, -179.9);
        assert!(haversine_distance(center, across, DistanceUnit::Kilometers) < 75.0);

        let bbox = bounding_box(center, 75.0, DistanceUnit::Kilometers);
        assert!(bbox.crosses_antimeridian());
        assert!(bbox.contains(across));
        assert!(bbox.contains(center));
        assert!(!bbox.contains(GeoPoint::new(-17.0, 0.0)));

        let bbox = bounding_box(MADRID, 75.0, DistanceUnit::Kilometers);
        assert!(!bbox.crosses_antimeridian());
    }

    #[test]
    fn distance_units_parse() {
        assert_eq!("mi".parse::<DistanceUnit>().unwrap(), DistanceUnit::Miles);
        assert_eq!("KM".parse::<DistanceUnit>().unwrap(), DistanceUnit::Kilometers);
        assert!("parsecs".parse::<DistanceUnit>().is_err());
    }
}
