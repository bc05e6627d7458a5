mod review;
mod status;

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tally_config::{AppConfig, CONFIG_LOCATIONS};

#[derive(Debug, Parser)]
#[command(
    name = "tally",
    version,
    about = "Review and categorize staged ledger transactions"
)]
struct Cli {
    /// Config file to use instead of ./tally.toml or ./.tally.toml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Staging server URL, e.g. http://127.0.0.1:8472.
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Review pending transactions interactively (default).
    Review,
    /// Print the pending queue and exit.
    Status,
    /// Print the effective configuration as TOML.
    Config {
        /// Write it to PATH instead of stdout.
        #[arg(long, value_name = "PATH")]
        write: Option<PathBuf>,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    if let Some(path) = cli.config.as_deref() {
        if !path.exists() {
            bail!("config file not found: {}", path.display());
        }
    }
    let path = AppConfig::locate(cli.config.as_deref(), &cwd)
        .unwrap_or_else(|| cwd.join(CONFIG_LOCATIONS[0]));
    let mut config = AppConfig::load_from(&path)?;
    if let Some(server) = cli.server.as_ref() {
        config.server.base_url = server.clone();
    }
    Ok(config)
}

/// Interactive sessions own the terminal, so their logs go to a daily file.
fn init_tracing(config: &AppConfig, to_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level));

    if !to_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return Ok(None);
    }

    let log_dir = PathBuf::from(&config.telemetry.log_dir);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(&log_dir, "tally.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let command = cli.command.unwrap_or(Commands::Review);
    let _log_guard = init_tracing(&config, matches!(command, Commands::Review))?;

    match command {
        Commands::Review => review::run_review(&config).await,
        Commands::Status => status::run_status(&config).await,
        Commands::Config { write: Some(path) } => {
            config.save_to(&path)?;
            println!("wrote {}", path.display());
            Ok(())
        }
        Commands::Config { write: None } => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tally", "status", "--server", "http://10.0.0.2:9000"]);
        assert!(matches!(cli.command, Some(Commands::Status)));
        assert_eq!(cli.server.as_deref(), Some("http://10.0.0.2:9000"));
    }

    #[test]
    fn defaults_to_review() {
        let cli = Cli::parse_from(["tally"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_write_takes_a_path() {
        let cli = Cli::parse_from(["tally", "config", "--write", "out/tally.toml"]);
        match cli.command {
            Some(Commands::Config { write: Some(path) }) => {
                assert_eq!(path, PathBuf::from("out/tally.toml"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let cli = Cli::parse_from(["tally", "--config", "/nonexistent/tally.toml", "config"]);
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
