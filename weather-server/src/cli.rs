use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use weather_core::Config;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather map backend")]
pub struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset, e.g. "debug".
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        /// Listen address, overrides `server.bind`.
        #[arg(long)]
        bind: Option<String>,

        /// SQLite file for the request log, overrides `database.path`.
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Write a config file with default values.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command.unwrap_or(Command::Serve { bind: None, database: None }) {
            Command::InitConfig { force } => {
                if config_path.exists() && !force {
                    bail!(
                        "Config file already exists: {}\nHint: pass --force to overwrite it.",
                        config_path.display()
                    );
                }
                Config::default().save_to(&config_path)?;
                println!("Wrote default config to {}", config_path.display());
            }
            Command::Serve { bind, database } => {
                let mut config = Config::load_from(&config_path)?;
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                if let Some(database) = database {
                    config.database.path = database;
                }

                init_tracing(self.log_level.as_deref().unwrap_or(&config.log_level));
                info!(config = %config_path.display(), "Starting weather server");

                let state = weather_server::build_state(&config)?;
                let listener = tokio::net::TcpListener::bind(&config.server.bind)
                    .await
                    .with_context(|| format!("Failed to bind {}", config.server.bind))?;

                weather_server::serve(listener, state, shutdown_signal()).await?;
            }
        }

        Ok(())
    }
}

fn init_tracing(level: &str) {
    // A bare level applies to our crates only; anything else is a full filter directive.
    let fallback = if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("weather_server={level},weather_core={level}")
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
