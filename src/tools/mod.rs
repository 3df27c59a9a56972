//! Tool system for the Airtable MCP server
//!
//! Each tool declares a name, a description, and a JSON Schema for its
//! input. The registry validates arguments against that schema before the
//! handler runs, so malformed shapes are rejected without touching the
//! network.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::airtable::{AirtableClient, AirtableError};

pub mod bases;
pub mod records;
pub mod tables;

pub use bases::ListBasesTool;
pub use records::{CreateRecordTool, ListRecordsTool, UpdateRecordTool};
pub use tables::ListTablesTool;

/// A named, schema-declared operation exposed over MCP
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the name, description, and input schema used for discovery
    fn describe(&self) -> ToolDescription;

    /// Run the tool. Arguments are validated against the declared schema
    /// before this is called.
    async fn execute(&self, arguments: &Value) -> Result<ToolOutput, ToolError>;
}

/// Tool metadata surfaced through `tools/list`
#[derive(Debug, Clone)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A single text payload produced by a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Tool system errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Parameter validation failed: {0}")]
    ValidationError(String),
    #[error("Schema error: {0}")]
    SchemaError(String),
    #[error("Invalid JSON in fields_json: {0}")]
    InvalidFieldsJson(String),
    #[error("Unexpected Airtable response: {0}")]
    UnexpectedResponse(String),
    #[error("{0}")]
    Airtable(#[from] AirtableError),
}

/// Registry of available tools, listed in registration order
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool descriptions in registration order
    pub fn descriptions(&self) -> Vec<ToolDescription> {
        self.tools.iter().map(|tool| tool.describe()).collect()
    }

    /// Validate arguments against the tool's declared schema, then execute
    pub async fn execute_tool(
        &self,
        name: &str,
        arguments: &Value,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .find(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let description = tool.describe();
        validate_arguments(&description.input_schema, arguments)?;

        tool.execute(arguments).await
    }

    fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.describe().name == name)
            .map(|tool| tool.as_ref())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate arguments against a declared JSON schema
fn validate_arguments(schema: &Value, arguments: &Value) -> Result<(), ToolError> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| ToolError::SchemaError(format!("Schema compilation error: {e}")))?;

    validator.validate(arguments).map_err(|errors| {
        let error_messages: Vec<String> = errors
            .map(|e| format!("At '{}': {}", e.instance_path, e))
            .collect();
        ToolError::ValidationError(error_messages.join("; "))
    })
}

/// Register the Airtable tool set in its discovery order
pub fn register_airtable_tools(registry: &mut ToolRegistry, client: Arc<AirtableClient>) {
    registry.register(Box::new(ListBasesTool::new(client.clone())));
    registry.register(Box::new(ListTablesTool::new(client.clone())));
    registry.register(Box::new(ListRecordsTool::new(client.clone())));
    registry.register(Box::new(CreateRecordTool::new(client.clone())));
    registry.register(Box::new(UpdateRecordTool::new(client)));
}

/// Render a JSON value with two-space indentation
pub(crate) fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn describe(&self) -> ToolDescription {
            ToolDescription {
                name: "echo".to_string(),
                description: "Echoes its input back".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "text": { "type": "string" }
                    },
                    "required": ["text"],
                    "additionalProperties": false
                }),
            }
        }

        async fn execute(&self, arguments: &Value) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text(
                arguments["text"].as_str().unwrap_or_default(),
            ))
        }
    }

    struct NoopTool;

    #[async_trait]
    impl Tool for NoopTool {
        fn describe(&self) -> ToolDescription {
            ToolDescription {
                name: "noop".to_string(),
                description: "Does nothing".to_string(),
                input_schema: json!({ "type": "object" }),
            }
        }

        async fn execute(&self, _arguments: &Value) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text(""))
        }
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.descriptions().len(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let result = registry.execute_tool("missing", &json!({})).await;
        assert!(matches!(result, Err(ToolError::UnknownTool(_))));
    }

    #[tokio::test]
    async fn test_execute_with_valid_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let output = registry
            .execute_tool("echo", &json!({"text": "hello"}))
            .await
            .unwrap();
        assert_eq!(output.text, "hello");
    }

    #[tokio::test]
    async fn test_missing_required_argument_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let result = registry.execute_tool("echo", &json!({})).await;
        match result {
            Err(ToolError::ValidationError(message)) => {
                assert!(message.contains("text"));
            }
            other => panic!("Expected ValidationError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_argument_type_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let result = registry.execute_tool("echo", &json!({"text": 42})).await;
        assert!(matches!(result, Err(ToolError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_unknown_argument_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let result = registry
            .execute_tool("echo", &json!({"text": "hi", "extra": true}))
            .await;
        assert!(matches!(result, Err(ToolError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_descriptions_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(NoopTool));
        registry.register(Box::new(EchoTool));

        let names: Vec<String> = registry
            .descriptions()
            .into_iter()
            .map(|description| description.name)
            .collect();
        assert_eq!(names, vec!["noop", "echo"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_validate_arguments_rejects_bad_schema() {
        let result = validate_arguments(&json!({"type": 42}), &json!({}));
        assert!(matches!(result, Err(ToolError::SchemaError(_))));
    }

    #[test]
    fn test_pretty_json_two_space_indent() {
        let rendered = pretty_json(&json!({"name": "Test"}));
        assert_eq!(rendered, "{\n  \"name\": \"Test\"\n}");
    }

    #[test]
    fn test_invalid_fields_json_message_prefix() {
        let error = ToolError::InvalidFieldsJson("expected value at line 1".to_string());
        assert!(error
            .to_string()
            .starts_with("Invalid JSON in fields_json:"));
    }
}
