//! Ubicasure CLI - command-line front end for the Ubicasure client.
//!
//! Drives the same services a mobile screen binds to: sign-in, the nearby
//! station directory, panic alerts, and chats with stations.

mod commands;

use clap::{Parser, Subcommand};
use tracing::info;

use ub_core::config::AppConfig;
use ub_core::error::UbResult;
use ub_core::logging;
use ub_services::AppContext;

/// Ubicasure - emergency services locator.
#[derive(Parser)]
#[command(
    name = "ubicasure",
    version,
    about = "Ubicasure emergency services client",
    long_about = "Find nearby fire and police stations, send panic alerts with your\n\
                  position, and chat with stations from the terminal."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password.
    Login {
        /// Account email (prompted when omitted).
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Sign out and forget the stored identity.
    Logout {
        /// Also wipe every locally stored preference.
        #[arg(long)]
        purge: bool,
    },
    /// Show the signed-in identity.
    Whoami,
    /// Create an account and register its profile.
    Register,
    /// Mail a password reset link.
    ResetPassword {
        /// Account email (prompted when omitted).
        email: Option<String>,
    },
    /// List fire and police stations near a position.
    Stations {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Send a panic alert with a position.
    Alert {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// List, open and delete chats.
    Chats {
        #[command(subcommand)]
        action: commands::chats::ChatsAction,
    },
    /// Send and watch messages.
    Messages {
        #[command(subcommand)]
        action: commands::messages::MessagesAction,
    },
}

#[tokio::main]
async fn main() -> UbResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from_file(std::path::Path::new(path))?,
        None => AppConfig::load_default()?,
    };

    // Initialize logging
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let log_dir = config.effective_log_dir()?;
    let _guard = logging::init_logging(&log_level, &log_dir, config.logging.json_output)?;

    info!("Ubicasure CLI v{}", ub_core::constants::APP_VERSION);

    let mut ctx = AppContext::from_config(config)?;
    ctx.init()?;

    // Dispatch to command handlers
    let result = match cli.command {
        Commands::Login { email } => commands::session::login(&ctx, email, cli.format).await,
        Commands::Logout { purge } => commands::session::logout(&ctx, purge, cli.format).await,
        Commands::Whoami => commands::session::whoami(&ctx, cli.format),
        Commands::Register => commands::session::register(&ctx, cli.format).await,
        Commands::ResetPassword { email } => {
            commands::session::reset_password(&ctx, email, cli.format).await
        }
        Commands::Stations { lat, lon } => {
            commands::stations::run(&ctx, lat, lon, cli.format).await
        }
        Commands::Alert { lat, lon } => commands::alert::run(&ctx, lat, lon, cli.format).await,
        Commands::Chats { action } => commands::chats::run(&ctx, action, cli.format).await,
        Commands::Messages { action } => {
            commands::messages::run(&ctx, action, cli.format).await
        }
    };

    ctx.shutdown();
    result
}
