use crate::adapters::http::{build_client, parse_json, read_success_body};
use crate::config::toml_config::HolidaysConfig;
use crate::domain::model::HolidayRecord;
use crate::domain::ports::HolidayProvider;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "Calendarific";

/// Calendarific `/api/v2/holidays` client.
#[derive(Clone)]
pub struct CalendarificClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for CalendarificClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarificClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RawHoliday {
    date: RawDate,
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDate {
    iso: String,
}

impl From<RawHoliday> for HolidayRecord {
    fn from(raw: RawHoliday) -> Self {
        HolidayRecord {
            iso_date: raw.date.iso,
            name: raw.name,
            description: raw.description.unwrap_or_default(),
        }
    }
}

impl CalendarificClient {
    pub fn new(config: &HolidaysConfig, api_key: &str, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent, config.timeout_seconds)?,
            endpoint: config.endpoint.clone(),
            api_key: api_key.to_string(),
        })
    }

    fn parse_holidays(body: &str) -> Result<Vec<HolidayRecord>> {
        let json = parse_json(SERVICE, body)?;

        let holidays = json.pointer("/response/holidays").cloned().ok_or_else(|| {
            tracing::debug!("Calendarific body without response.holidays: {}", body);
            AppError::MalformedResponse {
                service: SERVICE,
                message: "missing response.holidays".to_string(),
            }
        })?;

        let raw: Vec<RawHoliday> =
            serde_json::from_value(holidays).map_err(|e| AppError::MalformedResponse {
                service: SERVICE,
                message: format!("unreadable holiday entry: {}", e),
            })?;

        Ok(raw.into_iter().map(HolidayRecord::from).collect())
    }
}

#[async_trait]
impl HolidayProvider for CalendarificClient {
    async fn fetch_holidays(&self, country_code: &str, year: i32) -> Result<Vec<HolidayRecord>> {
        // the query string carries the key, so only log the pieces
        tracing::debug!(
            "Fetching holidays for {} {} from {}",
            country_code,
            year,
            self.endpoint
        );

        let year_param = year.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("country", country_code),
                ("year", year_param.as_str()),
            ])
            .send()
            .await
            .map_err(|source| AppError::NetworkError {
                service: SERVICE,
                source: source.without_url(),
            })?;

        let body = read_success_body(SERVICE, response, calendarific_error_message).await?;
        let holidays = Self::parse_holidays(&body)?;

        tracing::info!(
            "📅 {} holidays for {} in {}",
            holidays.len(),
            country_code,
            year
        );
        Ok(holidays)
    }
}

/// Calendarific reports failures in `meta.error_detail`; older payloads
/// used `response.error`.
fn calendarific_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["/meta/error_detail", "/response/error"]
        .iter()
        .find_map(|pointer| json.pointer(pointer).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_holidays_unwraps_iso_date_and_keeps_order() {
        let body = r#"{
            "meta": {"code": 200},
            "response": {"holidays": [
                {"name": "New Year's Day", "description": "First day of the year", "date": {"iso": "2025-01-01", "datetime": {"year": 2025}}},
                {"name": "Seollal", "description": "Korean New Year", "date": {"iso": "2025-01-29"}},
                {"name": "Independence Movement Day", "date": {"iso": "2025-03-01"}}
            ]}
        }"#;

        let holidays = CalendarificClient::parse_holidays(body).unwrap();

        assert_eq!(holidays.len(), 3);
        assert_eq!(holidays[0].iso_date, "2025-01-01");
        assert_eq!(holidays[1].name, "Seollal");
        assert_eq!(holidays[2].description, "");
    }

    #[test]
    fn test_parse_holidays_empty_list_is_not_an_error() {
        let body = r#"{"meta": {"code": 200}, "response": {"holidays": []}}"#;
        assert!(CalendarificClient::parse_holidays(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_holidays_missing_field_is_malformed() {
        for body in [
            r#"{"meta": {"code": 200}, "response": []}"#,
            r#"{"meta": {"code": 200}}"#,
            r#"{"response": {"holidays": [{"name": "No date"}]}}"#,
        ] {
            let err = CalendarificClient::parse_holidays(body).unwrap_err();
            assert!(matches!(err, AppError::MalformedResponse { .. }), "{}", body);
        }
    }

    #[test]
    fn test_calendarific_error_message() {
        let meta = r#"{"meta": {"code": 401, "error_type": "auth failed", "error_detail": "Missing or invalid api credentials."}, "response": []}"#;
        assert_eq!(
            calendarific_error_message(meta),
            Some("Missing or invalid api credentials.".to_string())
        );

        let legacy = r#"{"response": {"error": "Invalid country"}}"#;
        assert_eq!(
            calendarific_error_message(legacy),
            Some("Invalid country".to_string())
        );

        assert_eq!(calendarific_error_message("Unauthorized"), None);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client =
            CalendarificClient::new(&HolidaysConfig::default(), "top-secret", "holiday-map-test")
                .unwrap();
        assert!(!format!("{:?}", client).contains("top-secret"));
    }
}
