//! Mochi MCP - stdio server exposing the Mochi flashcard API

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mochi_core::client::MochiClient;
use mochi_core::config::MochiConfig;
use mochi_core::mcp::{McpServer, StdioTransport};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mochi-mcp")]
#[command(about = "MCP server for the Mochi flashcard API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Mochi API token
    #[arg(long, env = "MOCHI_API_KEY", hide_env_values = true)]
    token: Option<String>,

    /// Override the Mochi API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Read configuration from this TOML file instead of the default locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `mochi_core=trace` (defaults to RUST_LOG, then info)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Version information
    Version,
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<MochiConfig> {
    let mut config = match &cli.config {
        Some(path) => MochiConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MochiConfig::load()?,
    };

    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(token) = &cli.token {
        config = config.with_token(token.as_str());
    }

    config.validate()?;
    Ok(config)
}

async fn serve(config: MochiConfig) -> Result<()> {
    let client = MochiClient::from_config(&config)?;
    tracing::info!(base_url = %client.base_url(), "Starting Mochi MCP server");

    let server = McpServer::from_config(&config, Arc::new(client));
    server.run(StdioTransport::new()).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Version) = cli.command {
        println!("mochi-mcp {}", env!("CARGO_PKG_VERSION"));
        println!("mochi-core {}", mochi_core::VERSION);
        return Ok(());
    }

    init_tracing(cli.log_level.as_deref());

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if config.token().is_none() {
        tracing::error!("No Mochi API token: pass --token or set MOCHI_API_KEY");
        std::process::exit(1);
    }

    serve(config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "mochi-mcp",
            "--token",
            "abc",
            "--base-url",
            "http://localhost:8080/api/",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.token.as_deref(), Some("abc"));
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8080/api/"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_version_subcommand() {
        let cli = Cli::try_parse_from(["mochi-mcp", "version"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Version)));
    }

    #[test]
    fn test_config_flag_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mochi.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://file.example/api/\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "mochi-mcp",
            "--config",
            path.to_str().unwrap(),
            "--token",
            "t",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.api.base_url, "http://file.example/api/");
        assert_eq!(config.token(), Some("t"));
    }
}
