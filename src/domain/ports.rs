use crate::domain::model::{Coordinate, CountryResolution, HolidayRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Reverse geocoding: map position to the country that contains it.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve_country(&self, coordinate: Coordinate) -> Result<CountryResolution>;
}

/// Public holidays of one country for one calendar year, in upstream order.
#[async_trait]
pub trait HolidayProvider: Send + Sync {
    async fn fetch_holidays(&self, country_code: &str, year: i32) -> Result<Vec<HolidayRecord>>;
}
