use crate::domain::model::{Coordinate, CLICK_ZOOM, DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "holiday-map.toml";
pub const API_KEY_ENV: &str = "CALENDARIFIC_API_KEY";
pub const BIND_ENV: &str = "HOLIDAY_MAP_BIND";

const MAX_ZOOM: u8 = 18;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub geocoding: GeocodingConfig,
    pub holidays: HolidaysConfig,
    pub map: MapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Sessions untouched for this long are dropped.
    pub session_idle_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
            session_idle_seconds: 1800,
        }
    }
}

impl ServerConfig {
    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub endpoint: String,
    /// Nominatim's usage policy rejects anonymous or generic clients.
    pub user_agent: String,
    pub language: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/reverse".to_string(),
            user_agent: format!(
                "holiday-map/{} (reverse geocoding client)",
                env!("CARGO_PKG_VERSION")
            ),
            language: "en".to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidaysConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Default for HolidaysConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://calendarific.com/api/v2/holidays".to_string(),
            api_key: None,
            timeout_seconds: None,
        }
    }
}

// keeps the key out of `--verbose` config dumps
impl std::fmt::Debug for HolidaysConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HolidaysConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_zoom: u8,
    pub click_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_latitude: DEFAULT_CENTER.latitude,
            default_longitude: DEFAULT_CENTER.longitude,
            default_zoom: DEFAULT_ZOOM,
            click_zoom: CLICK_ZOOM,
        }
    }
}

impl MapConfig {
    pub fn default_center(&self) -> Result<Coordinate> {
        Coordinate::new(self.default_latitude, self.default_longitude)
    }
}

impl AppConfig {
    /// Reads and parses a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Loads an explicit config file, or `holiday-map.toml` from the working
    /// directory when it exists, or the built-in defaults. Environment
    /// overrides are applied on top in every case.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                Self::from_file(path)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::info!("📁 Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Expands `${VAR}` references from the environment. Unset variables are
    /// left as written so validation can name them.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.holidays.api_key = Some(key);
        }
        if let Some(bind) = lookup(BIND_ENV).filter(|b| !b.trim().is_empty()) {
            self.server.bind = bind;
        }
    }

    /// The Calendarific key, or a configuration error when it is missing or
    /// still an unresolved `${...}` placeholder.
    pub fn api_key(&self) -> Result<&str> {
        let key = validate_required_field("holidays.api_key", &self.holidays.api_key)?;
        if key.trim().is_empty() || ENV_VAR_PATTERN.is_match(key) {
            return Err(AppError::MissingConfigError {
                field: "holidays.api_key".to_string(),
            });
        }
        Ok(key)
    }

    pub fn validate_config(&self) -> Result<()> {
        self.api_key()?;

        validate_url("geocoding.endpoint", &self.geocoding.endpoint)?;
        validate_url("holidays.endpoint", &self.holidays.endpoint)?;
        validate_non_empty_string("geocoding.user_agent", &self.geocoding.user_agent)?;
        validate_non_empty_string("geocoding.language", &self.geocoding.language)?;
        validate_non_empty_string("server.bind", &self.server.bind)?;
        validate_range(
            "server.session_idle_seconds",
            self.server.session_idle_seconds,
            1,
            7 * 24 * 3600,
        )?;

        validate_range("map.default_latitude", self.map.default_latitude, -90.0, 90.0)?;
        validate_range("map.default_longitude", self.map.default_longitude, -180.0, 180.0)?;
        validate_range("map.default_zoom", self.map.default_zoom, 0, MAX_ZOOM)?;
        validate_range("map.click_zoom", self.map.click_zoom, 0, MAX_ZOOM)?;

        for (field, timeout) in [
            ("geocoding.timeout_seconds", self.geocoding.timeout_seconds),
            ("holidays.timeout_seconds", self.holidays.timeout_seconds),
        ] {
            if let Some(secs) = timeout {
                validate_range(field, secs, 1, 300)?;
            }
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
