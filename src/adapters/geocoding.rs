use crate::adapters::http::{build_client, parse_json, read_success_body};
use crate::config::toml_config::GeocodingConfig;
use crate::domain::model::{Coordinate, CountryResolution};
use crate::domain::ports::Geocoder;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "Nominatim";

/// Reverse geocoding against a Nominatim `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    endpoint: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    country_code: Option<String>,
    country: Option<String>,
}

impl NominatimClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config.user_agent, config.timeout_seconds)?,
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
        })
    }

    fn parse_resolution(coordinate: Coordinate, body: &str) -> Result<CountryResolution> {
        let json = parse_json(SERVICE, body)?;
        // open ocean comes back as {"error": "Unable to geocode"}
        let parsed: ReverseResponse =
            serde_json::from_value(json).map_err(|e| AppError::MalformedResponse {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let unknown = || AppError::UnknownLocation {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        };

        let address = parsed.address.ok_or_else(unknown)?;
        let code = address
            .country_code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .ok_or_else(unknown)?;
        let display_name = address
            .country
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| code.clone());

        Ok(CountryResolution { code, display_name })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn resolve_country(&self, coordinate: Coordinate) -> Result<CountryResolution> {
        tracing::debug!(
            "Reverse geocoding ({}, {}) via {}",
            coordinate.latitude,
            coordinate.longitude,
            self.endpoint
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("format", "json".to_string()),
                ("accept-language", self.language.clone()),
            ])
            .send()
            .await
            .map_err(|source| AppError::NetworkError {
                service: SERVICE,
                source,
            })?;

        let body = read_success_body(SERVICE, response, nominatim_error_message).await?;
        let resolution = Self::parse_resolution(coordinate, &body)?;

        tracing::info!(
            "📍 ({:.4}, {:.4}) resolved to {} ({})",
            coordinate.latitude,
            coordinate.longitude,
            resolution.display_name,
            resolution.code
        );
        Ok(resolution)
    }
}

fn nominatim_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    match json.get("error")? {
        serde_json::Value::String(message) => Some(message.clone()),
        serde_json::Value::Object(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    }
}
