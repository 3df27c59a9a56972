//! Table listing tool
//!
//! Lists the tables of one base, via the metadata API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use crate::airtable::AirtableClient;
use crate::tools::{pretty_json, Tool, ToolDescription, ToolError, ToolOutput};

/// Lists all tables in a base
pub struct ListTablesTool {
    client: Arc<AirtableClient>,
}

impl ListTablesTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListTablesTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "list_tables".to_string(),
            description: "List all tables in a specific Airtable base".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "base_id": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The base ID (starts with 'app')"
                    }
                },
                "required": ["base_id"],
                "additionalProperties": false
            }),
        }
    }

    async fn execute(&self, arguments: &Value) -> Result<ToolOutput, ToolError> {
        // Arguments are schema-validated before execute runs
        let base_id = arguments["base_id"].as_str().unwrap();

        let data = self
            .client
            .request(Method::GET, &format!("/meta/bases/{base_id}/tables"), None)
            .await?;

        let tables = data.get("tables").cloned().ok_or_else(|| {
            ToolError::UnexpectedResponse("missing 'tables' in response".to_string())
        })?;

        Ok(ToolOutput::text(pretty_json(&tables)))
    }
}
