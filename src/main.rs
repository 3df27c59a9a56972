//! Airtable MCP server - main entry point
//!
//! Runs the stdio server by default so MCP clients can exec the binary
//! directly; `config` is available for checking a deployment before wiring
//! it into a client.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use airtable_mcp::airtable::{AirtableClient, AirtableConfig};
use airtable_mcp::config::{ConfigError, ServerConfig};
use airtable_mcp::error::ServerError;
use airtable_mcp::logging::init_default_logging;
use airtable_mcp::server::McpServer;
use airtable_mcp::tools::{register_airtable_tools, ToolRegistry};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

/// Airtable MCP server
#[derive(Parser)]
#[command(name = "airtable-mcp")]
#[command(about = "Airtable MCP server speaking JSON-RPC 2.0 over stdio")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP requests on stdin/stdout (the default)
    Serve,
    /// Validate configuration and the credential environment
    Config {
        /// Show the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging();

    info!("Starting airtable-mcp v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Config { show } => handle_config_command(&config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }

    info!("Shutdown complete");
}

fn load_configuration(config_path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            ServerConfig::load_from_file(path)
        }
        None => {
            // Try default locations; a missing file just means defaults
            let default_paths = ["airtable-mcp.toml", "config/airtable-mcp.toml"];

            for path_str in default_paths {
                let path = Path::new(path_str);
                if path.exists() {
                    info!("Loading configuration from: {}", path.display());
                    return ServerConfig::load_from_file(path);
                }
            }

            Ok(ServerConfig::default())
        }
    }
}

async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    // Resolve the credential before anything else; without it there is no
    // point announcing tools
    let api_key = config.api_key()?;

    let client = AirtableClient::new(AirtableConfig {
        api_key,
        base_url: config.airtable.base_url.clone(),
        timeout: Duration::from_secs(config.airtable.timeout_secs),
    })?;

    let mut registry = ToolRegistry::new();
    register_airtable_tools(&mut registry, Arc::new(client));

    let server = McpServer::new(registry);
    info!(
        tools = server.tool_count(),
        "Airtable MCP server listening on stdio"
    );

    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

    tokio::select! {
        result = server.serve_stdio() => {
            info!("stdin closed");
            result
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
            Ok(())
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
            Ok(())
        }
    }
}

fn handle_config_command(config: &ServerConfig, show: bool) -> Result<(), ServerError> {
    if show {
        println!("{}", toml::to_string_pretty(config).map_err(ConfigError::from)?);
    }

    // The key itself is only resolved, never printed
    config.api_key()?;
    info!(
        env_var = %config.airtable.api_key_env,
        "Configuration valid, credential resolved"
    );
    Ok(())
}
