//! Base listing tool
//!
//! Lists every Airtable base the configured credential can reach, via the
//! metadata API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use crate::airtable::AirtableClient;
use crate::tools::{pretty_json, Tool, ToolDescription, ToolError, ToolOutput};

/// Lists all bases accessible to the configured account
pub struct ListBasesTool {
    client: Arc<AirtableClient>,
}

impl ListBasesTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListBasesTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "list_bases".to_string(),
            description: "List all Airtable bases accessible to your account".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "placeholder": {
                        "type": "string",
                        "description": "Unused; some clients require at least one declared property"
                    }
                },
                "additionalProperties": false
            }),
        }
    }

    async fn execute(&self, _arguments: &Value) -> Result<ToolOutput, ToolError> {
        let data = self.client.request(Method::GET, "/meta/bases", None).await?;

        let bases = data.get("bases").cloned().ok_or_else(|| {
            ToolError::UnexpectedResponse("missing 'bases' in response".to_string())
        })?;

        Ok(ToolOutput::text(pretty_json(&bases)))
    }
}
