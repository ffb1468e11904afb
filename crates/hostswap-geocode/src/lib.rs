pub mod nominatim;
pub mod static_map;

pub use nominatim::NominatimGeocoder;
pub use static_map::StaticGeocoder;

use hostswap_config::{AppConfig, GeocoderBackend};
use hostswap_core::domain::{GeocodeError, Geocoder};
use std::time::Duration;

/// Builds the geocoder selected in the configuration.
pub fn from_config(config: &AppConfig) -> Result<Box<dyn Geocoder>, GeocodeError> {
    let geocoder = &config.geocoder;
    match geocoder.backend {
        GeocoderBackend::Static => Ok(Box::new(StaticGeocoder::from_places(&geocoder.places))),
        GeocoderBackend::Nominatim => Ok(Box::new(NominatimGeocoder::new(
            &geocoder.base_url,
            geocoder.user_agent.clone(),
            Duration::from_secs(geocoder.timeout_secs),
            config.country_code,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::from_config;
    use hostswap_config::{AppConfig, PlaceConfig};

    #[test]
    fn static_backend_serves_configured_places() {
        let mut config = AppConfig::default();
        config.geocoder.places.push(PlaceConfig {
            zipcode: "28013".to_string(),
            city: Some("Madrid".to_string()),
            state: None,
            latitude: 40.4169,
            longitude: -3.7035,
        });

        let geocoder = from_config(&config).expect("geocoder");
        assert_eq!(geocoder.backend_name(), "static");
        let results = geocoder.geocode("28013").expect("geocode");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].city.as_deref(), Some("Madrid"));
        assert!(geocoder.geocode("41001").expect("geocode").is_empty());
    }
}
