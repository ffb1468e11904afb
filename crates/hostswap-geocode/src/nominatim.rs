use hostswap_core::domain::{GeoResult, GeocodeError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    address: Address,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
}

impl Address {
    fn locality(self) -> Option<String> {
        self.city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
    }
}

/// Parses a `/search?format=jsonv2` response body.
pub fn parse_search_response(body: &str) -> Result<Vec<GeoResult>, GeocodeError> {
    let hits: Vec<SearchHit> =
        serde_json::from_str(body).map_err(|err| GeocodeError::Parse(err.to_string()))?;

    hits.into_iter()
        .map(|hit| {
            let latitude = parse_coordinate(&hit.lat)?;
            let longitude = parse_coordinate(&hit.lon)?;
            let state = hit.address.state.clone();
            Ok(GeoResult {
                city: hit.address.locality(),
                state,
                latitude,
                longitude,
            })
        })
        .collect()
}

fn parse_coordinate(raw: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| GeocodeError::Parse(format!("invalid coordinate: {raw}")))
}

#[cfg(feature = "nominatim")]
mod imp {
    use super::parse_search_response;
    use hostswap_core::domain::{CountryCode, GeoResult, GeocodeError, Geocoder};
    use reqwest::blocking::Client;
    use std::time::Duration;
    use tracing::debug;
    use url::Url;

    const MAX_RESULTS: usize = 5;

    /// Looks zip codes up against a Nominatim search endpoint.
    #[derive(Debug, Clone)]
    pub struct NominatimGeocoder {
        client: Client,
        base_url: Url,
        country: CountryCode,
    }

    impl NominatimGeocoder {
        pub fn new(
            base_url: &str,
            user_agent: Option<String>,
            timeout: Duration,
            country: CountryCode,
        ) -> Result<Self, GeocodeError> {
            let base_url =
                Url::parse(base_url).map_err(|err| GeocodeError::Config(err.to_string()))?;
            if !matches!(base_url.scheme(), "http" | "https") {
                return Err(GeocodeError::Config(
                    "geocoder url must use http or https".to_string(),
                ));
            }
            let client = Client::builder()
                .user_agent(user_agent.unwrap_or_else(|| "hostswap".to_string()))
                .timeout(timeout)
                .connect_timeout(timeout)
                .build()
                .map_err(|err| GeocodeError::Config(err.to_string()))?;
            Ok(Self {
                client,
                base_url,
                country,
            })
        }

        pub fn search_url(&self, zipcode: &str) -> Url {
            search_url(&self.base_url, zipcode, self.country)
        }
    }

    pub fn search_url(base_url: &Url, zipcode: &str, country: CountryCode) -> Url {
        let mut url = base_url.clone();
        let path = format!("{}/search", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut()
            .append_pair("postalcode", zipcode)
            .append_pair("countrycodes", &country.as_str().to_ascii_lowercase())
            .append_pair("format", "jsonv2")
            .append_pair("addressdetails", "1")
            .append_pair("limit", &MAX_RESULTS.to_string());
        url
    }

    fn transport_error(err: reqwest::Error) -> GeocodeError {
        if err.is_timeout() {
            GeocodeError::Timeout
        } else {
            GeocodeError::Transport(err.to_string())
        }
    }

    impl Geocoder for NominatimGeocoder {
        fn backend_name(&self) -> &'static str {
            "nominatim"
        }

        fn geocode(&self, zipcode: &str) -> Result<Vec<GeoResult>, GeocodeError> {
            let url = self.search_url(zipcode);
            debug!(url = %url, "geocoding zip code");
            let body = self
                .client
                .get(url)
                .header("Accept", "application/json")
                .send()
                .and_then(|response| response.error_for_status())
                .and_then(|response| response.text())
                .map_err(transport_error)?;
            parse_search_response(&body)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::search_url;
        use hostswap_core::domain::CountryCode;
        use url::Url;

        #[test]
        fn search_url_keeps_base_path() {
            let base = Url::parse("https://geo.example.com/nominatim/").expect("url");
            let url = search_url(&base, "28013", CountryCode::Es);
            assert_eq!(url.path(), "/nominatim/search");
            let query = url.query().unwrap_or_default();
            assert!(query.contains("postalcode=28013"));
            assert!(query.contains("countrycodes=es"));
            assert!(query.contains("format=jsonv2"));
        }
    }
}

#[cfg(not(feature = "nominatim"))]
mod imp {
    use hostswap_core::domain::{CountryCode, GeoResult, GeocodeError, Geocoder};
    use std::time::Duration;

    #[derive(Debug, Clone)]
    pub struct NominatimGeocoder {
        _private: (),
    }

    impl NominatimGeocoder {
        pub fn new(
            _base_url: &str,
            _user_agent: Option<String>,
            _timeout: Duration,
            _country: CountryCode,
        ) -> Result<Self, GeocodeError> {
            Err(GeocodeError::Config(
                "nominatim geocoding requires the nominatim feature".to_string(),
            ))
        }
    }

    impl Geocoder for NominatimGeocoder {
        fn backend_name(&self) -> &'static str {
            "nominatim"
        }

        fn geocode(&self, _zipcode: &str) -> Result<Vec<GeoResult>, GeocodeError> {
            Err(GeocodeError::Config(
                "nominatim geocoding requires the nominatim feature".to_string(),
            ))
        }
    }
}

pub use imp::NominatimGeocoder;
