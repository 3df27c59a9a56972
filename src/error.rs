//! Server-level error types
//!
//! Each layer has its own error enum (`ConfigError`, `AirtableError`,
//! `ToolError`); this module ties them together for the entry point and the
//! serve loop, and provides log sanitization for messages that might carry
//! a credential.

use thiserror::Error;

/// Top-level error for server startup and the serve loop
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Airtable client error: {0}")]
    Airtable(#[from] crate::airtable::AirtableError),

    #[error("Transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Sanitize a message before it is logged.
///
/// Applies to diagnostics only; the text returned to MCP clients is never
/// rewritten.
pub fn sanitize_error_message(message: &str) -> String {
    // Redact bearer credentials in echoed headers or URLs
    let mut sanitized = regex::Regex::new(r"(?i)bearer\s+\S+")
        .unwrap()
        .replace_all(message, "Bearer ***")
        .to_string();

    // Redact common secret patterns
    sanitized = regex::Regex::new(r"(?i)(password|token|key|secret)[=:]\s*\S+")
        .unwrap()
        .replace_all(&sanitized, "${1}=***")
        .to_string();

    // Truncate very long messages - ensure total length is <= 500
    if sanitized.len() > 500 {
        let truncate_suffix = "...[truncated]";
        let mut cut = 500 - truncate_suffix.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str(truncate_suffix);
    }

    sanitized
}
