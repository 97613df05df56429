// Application wiring: turns a validated config into live clients and a controller.

use crate::adapters::{CalendarificClient, NominatimClient};
use crate::config::toml_config::AppConfig;
use crate::core::controller::InteractionController;
use crate::core::session::SessionStore;
use crate::utils::error::Result;
use chrono::Datelike;

pub type LiveController = InteractionController<NominatimClient, CalendarificClient>;

/// Builds the controller with the real Nominatim and Calendarific clients.
/// Fails when the holiday API key is not configured.
pub fn build_controller(config: &AppConfig) -> Result<LiveController> {
    let api_key = config.api_key()?;
    let geocoder = NominatimClient::new(&config.geocoding)?;
    let holidays =
        CalendarificClient::new(&config.holidays, api_key, &config.geocoding.user_agent)?;

    Ok(InteractionController::new(geocoder, holidays).with_click_zoom(config.map.click_zoom))
}

pub fn build_session_store(config: &AppConfig) -> Result<SessionStore> {
    Ok(
        SessionStore::new(config.map.default_center()?, config.map.default_zoom)
            .with_idle_ttl(config.server.session_idle_ttl()),
    )
}

/// Calendar year at invocation time, in the server's local time zone.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::AppError;

    #[test]
    fn test_build_controller_requires_api_key() {
        let config = AppConfig::default();
        assert!(matches!(
            build_controller(&config),
            Err(AppError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_build_controller_with_key() {
        let mut config = AppConfig::default();
        config.holidays.api_key = Some("key".to_string());
        assert!(build_controller(&config).is_ok());
        assert!(build_session_store(&config).is_ok());
    }

    #[test]
    fn test_current_year_is_plausible() {
        assert!(current_year() >= 2024);
    }
}
