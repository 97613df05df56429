// Adapters layer: concrete HTTP clients behind the domain ports.

pub mod geocoding;
pub mod holidays;
pub mod http;

pub use geocoding::NominatimClient;
pub use holidays::CalendarificClient;
