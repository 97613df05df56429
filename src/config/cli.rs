use crate::config::toml_config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "holiday-map")]
#[command(about = "Click a country on a world map and see its public holidays")]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults to ./holiday-map.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the interactive map page
    Serve {
        /// Address to listen on, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Resolve one position and print that country's holidays
    Lookup {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Holiday year, defaults to the current year
        #[arg(long)]
        year: Option<i32>,
    },
}

impl CliArgs {
    /// Command line values win over file and environment settings.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Command::Serve { bind: Some(bind) } = &self.command {
            tracing::info!("🔧 Bind address overridden to: {}", bind);
            config.server.bind = bind.clone();
        }
    }
}
