use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Common CLI arguments shared by every command
#[derive(Parser, Debug, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Only log warnings and errors"
    )]
    pub quiet: bool,
}

/// Subcommands that inspect the configuration instead of talking to the backend
#[derive(Subcommand, Debug, Clone)]
pub enum CommonCommands {
    /// Show current configuration and exit
    Config {
        #[arg(long, help = "Show configuration in JSON format")]
        json: bool,
    },
    /// Validate configuration and exit
    Validate,
    /// Show version information and exit
    Version,
}

/// Utility functions for CLI operations
pub mod utils {
    use super::*;
    use crate::config::Configuration;
    use anyhow::{Context, Result};
    use tracing_subscriber::EnvFilter;

    /// Log level implied by `-v` / `-q`.
    pub fn log_level(args: &CommonArgs) -> &'static str {
        if args.quiet {
            "warn"
        } else if args.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Initialize logging based on CLI arguments. `RUST_LOG` wins when set.
    pub fn init_logging(args: &CommonArgs) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level(args)));

        // Rendered output owns stdout
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Load configuration with optional override from CLI
    pub fn load_config(config_path: Option<&PathBuf>) -> Result<Configuration> {
        match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Configuration::load_from_path(path).context("Failed to load configuration")
            }
            None => Configuration::load().context("Failed to load configuration"),
        }
    }

    /// Display configuration in human-readable or JSON format
    pub fn display_config(config: &Configuration, json: bool) -> Result<()> {
        if json {
            let json = serde_json::to_string_pretty(&redacted(config))
                .context("Failed to serialize configuration to JSON")?;
            println!("{json}");
        } else {
            println!("cloudpeek configuration:");
            println!("========================");
            println!("Project ID: {}", config.project.id);
            match (&config.project.credentials, &config.project.access_token) {
                (_, Some(_)) => println!("Credentials: access token (redacted)"),
                (Some(path), None) => println!("Credentials: {}", path.display()),
                (None, None) => println!("Credentials: none"),
            }
            println!("Request timeout: {:?}", config.http.timeout);

            if config.metrics.types.is_empty() {
                println!("Metrics: none configured");
            } else {
                println!("Metrics: {}", config.metrics.types.join(", "));
            }
            println!("Metrics lookback: {:?}", config.metrics.lookback);
            if let Some(subject) = &config.metrics.subject {
                println!("Metrics subject: {subject}");
            }

            println!("Log name: {}", config.logs.name);
            println!(
                "Logs: last {} entries within {:?}",
                config.logs.limit, config.logs.lookback
            );
            println!("Traces: last {}", config.traces.limit);
        }
        Ok(())
    }

    fn redacted(config: &Configuration) -> Configuration {
        let mut config = config.clone();
        if config.project.access_token.is_some() {
            config.project.access_token = Some("<redacted>".to_string());
        }
        config
    }

    /// Validate configuration and report any issues
    pub fn validate_config(config: &Configuration) -> Result<()> {
        log::info!("Validating configuration...");

        if config.project.id.is_empty() {
            anyhow::bail!("Project ID cannot be empty (set project.id or PROJECT_ID)");
        }

        if config.project.credentials.is_none() && config.project.access_token.is_none() {
            anyhow::bail!(
                "No credentials configured (set project.credentials, PROJECT_CREDENTIALS or project.access_token)"
            );
        }

        if config.logs.limit == 0 {
            anyhow::bail!("logs.limit must be greater than zero");
        }

        if config.traces.limit == 0 {
            anyhow::bail!("traces.limit must be greater than zero");
        }

        if config.logs.lookback.is_zero() || config.metrics.lookback.is_zero() {
            anyhow::bail!("Lookback windows must be greater than zero");
        }

        if config.traces.lookback.is_some_and(|d| d.is_zero()) {
            anyhow::bail!("traces.lookback must be greater than zero when set");
        }

        log::info!("Configuration validation passed");
        Ok(())
    }

    /// Run a configuration-only command
    pub fn handle_common_command(command: &CommonCommands, config: &Configuration) -> Result<()> {
        match command {
            CommonCommands::Config { json } => display_config(config, *json),
            CommonCommands::Validate => validate_config(config),
            CommonCommands::Version => {
                println!("{}", version_info());
                Ok(())
            }
        }
    }

    /// Standard version information
    pub fn version_info() -> String {
        format!(
            "cloudpeek {} ({})",
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_RUST_VERSION")
        )
    }
}
