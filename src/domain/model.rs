use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Map center used when a session starts (Seoul).
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    latitude: 37.5665,
    longitude: 126.9780,
};
pub const DEFAULT_ZOOM: u8 = 4;
pub const CLICK_ZOOM: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate from a map click.
    ///
    /// Latitudes outside [-90, 90] are rejected. Longitudes are wrapped into
    /// [-180, 180] because the map widget keeps counting past the antimeridian
    /// once the user pans around the globe.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(AppError::InvalidCoordinate {
                message: format!("({}, {}) is not a finite position", latitude, longitude),
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::InvalidCoordinate {
                message: format!("latitude {} is outside [-90, 90]", latitude),
            });
        }

        Ok(Self {
            latitude,
            longitude: wrap_longitude(longitude),
        })
    }
}

fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        return longitude;
    }
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps 180 to -180; keep the sign the caller was heading towards
    if wrapped == -180.0 && longitude > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryResolution {
    /// Upper-case ISO-3166 alpha-2 code, e.g. "KR".
    pub code: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRecord {
    pub iso_date: String,
    pub name: String,
    pub description: String,
}

/// Where a session is in the click → geocode → holidays flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Idle,
    LocationSelected,
    CountryResolved { country: CountryResolution },
    CountryUnresolved,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub center: Coordinate,
    pub zoom: u8,
    pub clicked_location: Option<Coordinate>,
    pub status: InteractionState,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM)
    }
}

impl SessionState {
    pub fn new(center: Coordinate, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            clicked_location: None,
            status: InteractionState::Idle,
        }
    }

    pub fn country(&self) -> Option<&CountryResolution> {
        match &self.status {
            InteractionState::CountryResolved { country } => Some(country),
            _ => None,
        }
    }

    pub fn country_code(&self) -> Option<&str> {
        self.country().map(|c| c.code.as_str())
    }

    pub fn country_name(&self) -> Option<&str> {
        self.country().map(|c| c.display_name.as_str())
    }

    /// Records a click: moves the map there, zooms in and forgets any
    /// previously resolved country until the geocoder answers again.
    pub fn select_location(&mut self, location: Coordinate, zoom: u8) {
        self.clicked_location = Some(location);
        self.center = location;
        self.zoom = zoom;
        self.status = InteractionState::LocationSelected;
    }

    pub fn resolve_country(&mut self, country: CountryResolution) {
        self.status = InteractionState::CountryResolved { country };
    }

    pub fn mark_unresolved(&mut self) {
        self.status = InteractionState::CountryUnresolved;
    }
}
