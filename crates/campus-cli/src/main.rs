//! campus - command-line client for the campus management platform.
//!
//! Signs in against the campus REST API, keeps the access/refresh token
//! pair in the configured store and renders courses, grades, attendance,
//! meals, wallet, events and room data as plain text.

mod commands;
mod navigator;
mod settings;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use campus_core::auth::open_token_store;
use campus_core::{ApiClient, ApiError, Language, TokenStorage};

use navigator::CliNavigator;
use settings::LoadedConfig;

/// Set to a directory to also write daily-rotated log files there
const LOG_DIR_ENV: &str = "CAMPUS_LOG_DIR";

#[derive(Parser)]
#[command(name = "campus")]
#[command(version)]
#[command(about = "Campus management platform client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (overrides CAMPUS_API_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Where tokens are kept: file, keyring or memory
    #[arg(long, global = true, value_name = "STORE")]
    store: Option<TokenStorage>,

    /// Message language: en or tr
    #[arg(long, global = true, value_name = "LANG")]
    lang: Option<Language>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session tokens
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Sign out and forget the stored tokens
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List courses, or the sections of one course
    Courses {
        #[arg(long, value_name = "COURSE")]
        sections: Option<String>,
    },
    /// Enroll in a course section
    Enroll { section: String },
    /// Show grades and GPA
    Grades,
    /// Show attendance, or check in to a session
    Attendance {
        #[arg(long, value_name = "SESSION", requires_all = ["lat", "lon"])]
        check_in: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Show meal menus for a day (default: all upcoming)
    Meals {
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    /// Reserve a meal from a menu
    ReserveMeal { menu: String },
    /// Show wallet balance and transactions, or top up
    Wallet {
        #[arg(long, value_name = "AMOUNT")]
        top_up: Option<f64>,
    },
    /// List campus events, or register for one
    Events {
        #[arg(long, value_name = "EVENT")]
        register: Option<String>,
    },
    /// List classrooms and your room reservations
    Rooms,
    /// Profile, courses, wallet and events at a glance
    Dashboard,
    /// Authenticated GET of any API path, printed as JSON
    Get { path: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "campus.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let cli = Cli::parse();
    let settings = LoadedConfig::load();
    let lang = cli.lang.unwrap_or(settings.config.language);

    if let Err(e) = run(cli, settings, lang).await {
        debug!(error = ?e, "Command failed");
        let message = match e.downcast_ref::<ApiError>() {
            Some(api_error) => api_error.user_message(lang),
            None => format!("{:#}", e),
        };
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mut settings: LoadedConfig, lang: Language) -> Result<()> {
    let config = &settings.config;
    let base_url = cli
        .api_url
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| config.api_base_url());
    let storage = cli.store.unwrap_or(config.token_storage);
    let tokens = open_token_store(storage, config.cache_dir()?);
    let client = ApiClient::new(&base_url, tokens, Arc::new(CliNavigator::new(lang)))?;
    info!(base_url = %base_url, storage = %storage, "campus starting");

    match cli.command {
        Commands::Login { email } => commands::login(&client, &mut settings, email).await,
        Commands::Logout => commands::logout(&client).await,
        Commands::Whoami => commands::whoami(&client).await,
        Commands::Courses { sections } => commands::courses(&client, sections).await,
        Commands::Enroll { section } => commands::enroll(&client, &section).await,
        Commands::Grades => commands::grades(&client).await,
        Commands::Attendance { check_in, lat, lon } => {
            let check_in = match (check_in, lat, lon) {
                (Some(session), Some(lat), Some(lon)) => Some((session, lat, lon)),
                _ => None,
            };
            commands::attendance(&client, check_in).await
        }
        Commands::Meals { date } => commands::meals(&client, date).await,
        Commands::ReserveMeal { menu } => commands::reserve_meal(&client, &menu).await,
        Commands::Wallet { top_up } => commands::wallet(&client, top_up).await,
        Commands::Events { register } => commands::events(&client, register).await,
        Commands::Rooms => commands::rooms(&client).await,
        Commands::Dashboard => commands::dashboard(&client).await,
        Commands::Get { path } => commands::raw_get(&client, &path).await,
    }
}
