pub mod controller;
pub mod session;
pub mod view;

pub use crate::domain::model::{Coordinate, CountryResolution, HolidayRecord, SessionState};
pub use crate::domain::ports::{Geocoder, HolidayProvider};
pub use crate::utils::error::Result;
