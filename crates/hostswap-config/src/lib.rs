use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use hostswap_core::domain::{CountryCode, DistanceUnit, Environment, GeoResult};
use hostswap_core::rules::{MatchPolicy, DEFAULT_SEARCH_RADIUS};
use hostswap_core::time::{local_offset, offset_from_minutes};
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "hostswap";
const CONFIG_FILENAME: &str = "config.toml";

pub const ENV_VAR: &str = "HOSTSWAP_ENV";
pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 5;
pub const MAX_GEOCODER_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 2000;
pub const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub country_code: CountryCode,
    pub timezone_offset_minutes: Option<i32>,
    pub matching: MatchingConfig,
    pub geocoder: GeocoderConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingConfig {
    pub radius: f64,
    pub unit: DistanceUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageConfig {
    pub busy_timeout_ms: u64,
}

impl StorageConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub backend: GeocoderBackend,
    pub timeout_secs: u64,
    pub base_url: String,
    pub user_agent: Option<String>,
    pub places: Vec<PlaceConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderBackend {
    Static,
    Nominatim,
}

/// A fixed zip code entry served by the static geocoder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceConfig {
    pub zipcode: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl PlaceConfig {
    pub fn to_result(&self) -> GeoResult {
        GeoResult {
            city: self.city.clone(),
            state: self.state.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            country_code: CountryCode::Es,
            timezone_offset_minutes: None,
            matching: MatchingConfig {
                radius: DEFAULT_SEARCH_RADIUS,
                unit: DistanceUnit::Kilometers,
            },
            geocoder: GeocoderConfig {
                backend: GeocoderBackend::Static,
                timeout_secs: DEFAULT_GEOCODER_TIMEOUT_SECS,
                base_url: DEFAULT_NOMINATIM_URL.to_string(),
                user_agent: None,
                places: Vec::new(),
            },
            storage: StorageConfig {
                busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            },
        }
    }
}

impl AppConfig {
    pub fn match_policy(&self) -> Result<MatchPolicy> {
        MatchPolicy::new(self.matching.radius, self.matching.unit, self.environment)
            .map_err(|_| ConfigError::InvalidRadius(self.matching.radius))
    }

    /// Offset used to decide what "today" is. Falls back to the system zone.
    pub fn local_offset(&self) -> FixedOffset {
        self.timezone_offset_minutes
            .and_then(|minutes| offset_from_minutes(minutes).ok())
            .unwrap_or_else(local_offset)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),
    #[error("unsupported country_code: {0}")]
    InvalidCountryCode(String),
    #[error("invalid timezone_offset_minutes value: {0}")]
    InvalidTimezoneOffset(i32),
    #[error("invalid matching.radius value: {0}")]
    InvalidRadius(f64),
    #[error("invalid matching.unit value: {0}")]
    InvalidUnit(String),
    #[error("invalid storage.busy_timeout_ms value: {0}")]
    InvalidBusyTimeout(u64),
    #[error("invalid geocoder.timeout_secs value: {0}")]
    InvalidGeocoderTimeout(u64),
    #[error("invalid geocoder field {field}: {message}")]
    InvalidGeocoderField { field: &'static str, message: String },
    #[error("duplicate geocoder place for zipcode: {0}")]
    DuplicatePlace(String),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    environment: Option<String>,
    country_code: Option<String>,
    timezone_offset_minutes: Option<i32>,
    matching: Option<MatchingFile>,
    geocoder: Option<GeocoderFile>,
    storage: Option<StorageFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorageFile {
    busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MatchingFile {
    radius: Option<f64>,
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeocoderFile {
    backend: Option<GeocoderBackend>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
    user_agent: Option<String>,
    #[serde(default)]
    places: Vec<PlaceConfig>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return with_env_override(None),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return with_env_override(None),
        Err(err) => return Err(err),
    };
    with_env_override(load_at_path(&path, required)?)
}

fn with_env_override(config: Option<AppConfig>) -> Result<AppConfig> {
    let config = config.unwrap_or_default();
    apply_env_override(config, env::var(ENV_VAR).ok())
}

/// `HOSTSWAP_ENV` wins over the file's `environment`.
pub fn apply_env_override(mut config: AppConfig, value: Option<String>) -> Result<AppConfig> {
    if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
        config.environment =
            Environment::from_str(&value).map_err(|_| ConfigError::InvalidEnvironment(value))?;
    }
    Ok(config)
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(environment) = parsed.environment {
        config.environment = Environment::from_str(&environment)
            .map_err(|_| ConfigError::InvalidEnvironment(environment))?;
    }

    if let Some(country) = parsed.country_code {
        config.country_code =
            CountryCode::from_str(&country).map_err(|_| ConfigError::InvalidCountryCode(country))?;
    }

    if let Some(minutes) = parsed.timezone_offset_minutes {
        offset_from_minutes(minutes).map_err(|_| ConfigError::InvalidTimezoneOffset(minutes))?;
        config.timezone_offset_minutes = Some(minutes);
    }

    if let Some(matching) = parsed.matching {
        if let Some(radius) = matching.radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ConfigError::InvalidRadius(radius));
            }
            config.matching.radius = radius;
        }
        if let Some(unit) = matching.unit {
            config.matching.unit =
                DistanceUnit::from_str(&unit).map_err(|_| ConfigError::InvalidUnit(unit))?;
        }
    }

    if let Some(geocoder) = parsed.geocoder {
        merge_geocoder(&mut config.geocoder, geocoder)?;
    }

    if let Some(timeout) = parsed.storage.and_then(|storage| storage.busy_timeout_ms) {
        if timeout == 0 || timeout > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::InvalidBusyTimeout(timeout));
        }
        config.storage.busy_timeout_ms = timeout;
    }

    Ok(config)
}

fn merge_geocoder(config: &mut GeocoderConfig, parsed: GeocoderFile) -> Result<()> {
    if let Some(backend) = parsed.backend {
        config.backend = backend;
    }

    if let Some(timeout) = parsed.timeout_secs {
        if timeout == 0 || timeout > MAX_GEOCODER_TIMEOUT_SECS {
            return Err(ConfigError::InvalidGeocoderTimeout(timeout));
        }
        config.timeout_secs = timeout;
    }

    if let Some(base_url) = parsed.base_url {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !trimmed.starts_with("https://") && !trimmed.starts_with("http://") {
            return Err(ConfigError::InvalidGeocoderField {
                field: "base_url",
                message: "must be an http(s) url".to_string(),
            });
        }
        config.base_url = trimmed.to_string();
    }

    if let Some(user_agent) = parsed.user_agent {
        let trimmed = user_agent.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidGeocoderField {
                field: "user_agent",
                message: "cannot be empty".to_string(),
            });
        }
        config.user_agent = Some(trimmed.to_string());
    }

    let mut places: Vec<PlaceConfig> = Vec::with_capacity(parsed.places.len());
    for mut place in parsed.places {
        place.zipcode = hostswap_core::domain::normalize_zipcode(&place.zipcode);
        if place.zipcode.is_empty() {
            return Err(ConfigError::InvalidGeocoderField {
                field: "places.zipcode",
                message: "cannot be empty".to_string(),
            });
        }
        if !place.to_result().point().is_valid() {
            return Err(ConfigError::InvalidGeocoderField {
                field: "places.latitude/longitude",
                message: format!("out of range for {}", place.zipcode),
            });
        }
        if places.iter().any(|existing| existing.zipcode == place.zipcode) {
            return Err(ConfigError::DuplicatePlace(place.zipcode));
        }
        places.push(place);
    }
    config.places = places;

    Ok(())
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
