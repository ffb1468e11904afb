use hostswap_config::PlaceConfig;
use hostswap_core::domain::{normalize_zipcode, GeoResult, GeocodeError, Geocoder};
use std::collections::HashMap;

/// Answers from a fixed table of zip codes. Used for tests and offline setups.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, GeoResult>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_places(places: &[PlaceConfig]) -> Self {
        let mut geocoder = Self::new();
        for place in places {
            geocoder.insert(&place.zipcode, place.to_result());
        }
        geocoder
    }

    pub fn insert(&mut self, zipcode: &str, place: GeoResult) {
        self.places.insert(normalize_zipcode(zipcode), place);
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl Geocoder for StaticGeocoder {
    fn backend_name(&self) -> &'static str {
        "static"
    }

    fn geocode(&self, zipcode: &str) -> Result<Vec<GeoResult>, GeocodeError> {
        Ok(self
            .places
            .get(&normalize_zipcode(zipcode))
            .cloned()
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::StaticGeocoder;
    use hostswap_core::domain::{GeoResult, Geocoder};

    #[test]
    fn lookups_ignore_case_and_padding() {
        let mut geocoder = StaticGeocoder::new();
        geocoder.insert(
            "sw1a 1aa",
            GeoResult {
                city: Some("London".to_string()),
                state: None,
                latitude: 51.501,
                longitude: -0.1416,
            },
        );

        assert_eq!(geocoder.len(), 1);
        let results = geocoder.geocode(" SW1A 1AA ").expect("geocode");
        assert_eq!(results[0].city.as_deref(), Some("London"));
        assert!(geocoder.geocode("EC1A 1BB").expect("geocode").is_empty());
    }
}
