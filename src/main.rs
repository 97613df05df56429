use clap::Parser;
use holiday_map::app::{build_controller, build_session_store, current_year};
use holiday_map::core::session::SessionStore;
use holiday_map::domain::model::Coordinate;
use holiday_map::utils::error::AppError;
use holiday_map::utils::{logger, validation::Validate};
use holiday_map::web::{serve, AppState};
use holiday_map::{AppConfig, CliArgs, Command};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting holiday-map");

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => exit_on_config_error(e),
    };
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    let controller = match build_controller(&config) {
        Ok(controller) => controller,
        Err(e) => exit_on_config_error(e),
    };

    match &args.command {
        Command::Serve { .. } => {
            let sessions: SessionStore = match build_session_store(&config) {
                Ok(sessions) => sessions,
                Err(e) => exit_on_config_error(e),
            };
            let state = Arc::new(AppState::new(controller, sessions));
            serve(state, &config.server.bind).await?;
        }
        Command::Lookup { lat, lon, year } => {
            let click = match Coordinate::new(*lat, *lon) {
                Ok(click) => click,
                Err(e) => {
                    eprintln!("❌ {}", e.user_friendly_message());
                    std::process::exit(2);
                }
            };
            let year = year.unwrap_or_else(current_year);

            let state = match build_session_store(&config) {
                Ok(sessions) => sessions.initial_state(),
                Err(e) => exit_on_config_error(e),
            };
            let (_, view) = controller.interact(state, Some(click), year).await;
            print!("{}", view.render_text());
        }
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> holiday_map::Result<AppConfig> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");
    Ok(config)
}

/// Missing or invalid configuration stops the program before anything is served.
fn exit_on_config_error(e: AppError) -> ! {
    tracing::error!(
        "❌ Configuration validation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}
