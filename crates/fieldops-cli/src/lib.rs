//! FieldOps command-line interface.
//!
//! The CLI is the "app shell" around the session stack: it loads the config,
//! builds a [`fieldops_session::SessionContext`], and exposes the login,
//! logout, and bootstrap flows as subcommands.

pub mod commands;

use std::path::Path;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fieldops_core::error::ConfigError;
use fieldops_core::Config;

/// FieldOps - field-service dashboard client
#[derive(Parser)]
#[command(name = "fieldops")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "FIELDOPS_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Sign in to the dashboard API
    Login(commands::login::LoginArgs),

    /// Sign out and clear local session state
    Logout,

    /// Show the authenticated user (bootstraps the session if needed)
    Whoami(commands::whoami::WhoamiArgs),

    /// Run the app-shell session bootstrap and report the outcome
    Status,

    /// Inspect or clear remembered credentials
    Credentials(commands::credentials::CredentialsArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config, cli.verbose);
    tracing::debug!(api = %config.api.base_url, "configuration loaded");

    match cli.command {
        Commands::Login(args) => commands::login::run(args, &config).await,
        Commands::Logout => commands::logout::run(&config).await,
        Commands::Whoami(args) => commands::whoami::run(args, &config).await,
        Commands::Status => commands::status::run(&config).await,
        Commands::Credentials(args) => commands::credentials::run(args, &config).await,
        Commands::Config(args) => commands::config::run(args, &config).await,
        Commands::Version => {
            println!("fieldops {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load and validate the config; a missing default file means defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => match Config::load_default() {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Config::default(),
            Err(e) => return Err(e.into()),
        },
    };
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &Config, verbose: u8) {
    let directive = match verbose {
        0 => format!("fieldops={}", config.logging.level),
        1 => "fieldops=debug".to_string(),
        _ => "fieldops=trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| directive.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
