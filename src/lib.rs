pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
pub mod web;

#[cfg(feature = "cli")]
pub use config::{CliArgs, Command};

pub use adapters::{CalendarificClient, NominatimClient};
pub use config::AppConfig;
pub use crate::core::{controller::InteractionController, session::SessionStore, view::PageView};
pub use utils::error::{AppError, Result};
