use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_subscriber::prelude::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_log::LogTracer;
use tracing::subscriber as tracing_subscriber_global;
use anyhow::{Result, Context};
use spotify_pkce_login as lib;
use lib::api::browser::{BrowserNavigator, PrintNavigator};
use lib::api::pkce::create_code_challenge;
use lib::api::spotify_auth;
use lib::api::Navigator;
use lib::config::Config;
use lib::store::{KeyValueStore, SqliteStore};

#[derive(Parser)]
#[command(name = "spotify-pkce-login", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Spotify authorization flow (stores a verifier, opens the authorize URL)
    Login {
        /// Print the authorization URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Print the S256 code challenge for a verifier
    Challenge {
        verifier: String,
    },
    /// Inspect or discard the pending code verifier
    Verifier {
        #[command(subcommand)]
        sub: VerifierCommands,
    },
    /// Validate config and exit
    ConfigValidate,
}

impl Commands {
    /// Only subcommands touching the store or the browser set up logging,
    /// so the pure ones run without a writable log_dir.
    fn needs_logging(&self) -> bool {
        matches!(self, Commands::Login { .. } | Commands::Verifier { .. })
    }
}

#[derive(Subcommand)]
enum VerifierCommands {
    /// Show whether a verifier is pending and when it was stored
    Show {
        /// Also print the verifier itself
        #[arg(long)]
        reveal: bool,
    },
    /// Remove the pending verifier
    Clear,
}

/// Explicit --config wins; otherwise use the per-user config file when it
/// exists, and fall back to defaults + environment.
fn resolve_config_path(explicit: &Option<PathBuf>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.clone());
    }
    dirs::config_dir()
        .map(|d| d.join("spotify-pkce-login").join("config.toml"))
        .filter(|p| p.exists())
}

fn init_logging(cfg: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let _ = LogTracer::init();
    std::fs::create_dir_all(&cfg.log_dir)
        .with_context(|| format!("creating log dir {}", cfg.log_dir.display()))?;
    let file_appender: RollingFileAppender = tracing_appender::rolling::daily(&cfg.log_dir, "spotify-pkce-login.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer);

    // LogTracer above already bridges `log` records.
    tracing_subscriber_global::set_global_default(subscriber)
        .context("failed to set global tracing subscriber")?;
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = resolve_config_path(&cli.config);

    let cfg = Config::load(config_path.as_deref()).with_context(|| match &config_path {
        Some(p) => format!("loading config from {}", p.display()),
        None => "loading config from environment".to_string(),
    })?;

    if let Commands::Login { .. } = cli.command {
        cfg.validate().context("invalid config")?;
    }
    let _guard = if cli.command.needs_logging() {
        Some(init_logging(&cfg)?)
    } else {
        None
    };

    match cli.command {
        Commands::Login { no_browser } => {
            let store = SqliteStore::open(cfg.db_path.clone())
                .with_context(|| format!("opening store {}", cfg.db_path.display()))?;
            let navigator: Box<dyn Navigator> = if no_browser {
                Box::new(PrintNavigator::new())
            } else {
                Box::new(BrowserNavigator::new())
            };
            spotify_auth::begin_authorization(&cfg, &store, navigator.as_ref()).await?;
            println!(
                "Code verifier saved to {}. Finish the login in your browser.",
                store.path().display()
            );
        }
        Commands::Challenge { verifier } => {
            println!("{}", create_code_challenge(&verifier));
        }
        Commands::Verifier { sub } => {
            let store = SqliteStore::open(cfg.db_path.clone())
                .with_context(|| format!("opening store {}", cfg.db_path.display()))?;
            match sub {
                VerifierCommands::Show { reveal } => {
                    match store.entry(spotify_auth::CODE_VERIFIER_KEY).await? {
                        Some(entry) => {
                            let stored_at = chrono::DateTime::<chrono::Utc>::from_timestamp(entry.updated_at, 0)
                                .map(|t| t.to_rfc3339())
                                .unwrap_or_else(|| entry.updated_at.to_string());
                            let expired = entry.is_older_than(cfg.verifier_max_age_secs, chrono::Utc::now().timestamp());
                            println!(
                                "pending verifier stored at {}{}",
                                stored_at,
                                if expired { " (expired)" } else { "" }
                            );
                            let verifier = entry.value;
                            println!("challenge: {}", create_code_challenge(&verifier));
                            if reveal {
                                println!("verifier: {}", verifier);
                            }
                        }
                        None => println!("no pending verifier"),
                    }
                }
                VerifierCommands::Clear => {
                    if spotify_auth::discard_verifier(&store).await? {
                        println!("Removed pending verifier.");
                    } else {
                        println!("No pending verifier.");
                    }
                }
            }
        }
        Commands::ConfigValidate => {
            match cfg.validate() {
                Ok(_) => println!("OK"),
                Err(e) => {
                    eprintln!("Config validation failed: {}", e);
                    std::process::exit(2);
                }
            }
        }
    }

    Ok(())
}
