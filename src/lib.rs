//! Airtable MCP Server
//!
//! Exposes Airtable base, table, and record operations as tools over the
//! Model Context Protocol, speaking newline-delimited JSON-RPC 2.0 on
//! stdin/stdout.
//!
//! # Overview
//!
//! - `airtable`: authenticated request gateway to the Airtable REST API
//! - `tools`: tool trait, registry with schema validation, and the five
//!   Airtable tools
//! - `server`: JSON-RPC dispatch and the stdio serve loop
//! - `config`, `logging`, `error`: runtime wiring
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use airtable_mcp::airtable::{AirtableClient, AirtableConfig};
//! use airtable_mcp::server::McpServer;
//! use airtable_mcp::tools::{register_airtable_tools, ToolRegistry};
//!
//! # async fn run() -> Result<(), airtable_mcp::ServerError> {
//! let client = AirtableClient::new(AirtableConfig {
//!     api_key: "pat-example".to_string(),
//!     ..Default::default()
//! })?;
//!
//! let mut registry = ToolRegistry::new();
//! register_airtable_tools(&mut registry, Arc::new(client));
//!
//! McpServer::new(registry).serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

pub mod airtable;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod tools;

pub use airtable::{AirtableClient, AirtableConfig, AirtableError, ApiFailure};
pub use config::{ConfigError, ServerConfig};
pub use error::{sanitize_error_message, ServerError};
pub use server::McpServer;
pub use tools::{
    register_airtable_tools, Tool, ToolDescription, ToolError, ToolOutput, ToolRegistry,
};
