//! Record tools
//!
//! Listing, creating, and partially updating records in one table. Table
//! names are percent-encoded as path segments; create and update parse the
//! caller's `fields_json` string before any network call is made.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use url::Url;

use crate::airtable::AirtableClient;
use crate::tools::{pretty_json, Tool, ToolDescription, ToolError, ToolOutput};

/// Build `/{base_id}/{table}` with the table name percent-encoded (pure function)
fn records_path(base_id: &str, table_name: &str) -> String {
    format!("/{base_id}/{}", encode_table_segment(table_name))
}

/// Percent-encode a table name for use as a single path segment.
///
/// Spaces, slashes, percent signs, and query delimiters must not appear raw
/// in the request path; Url handles the full escaping rules.
fn encode_table_segment(table_name: &str) -> String {
    let mut url = Url::parse("https://airtable.invalid").expect("literal URL parses");
    url.path_segments_mut()
        .expect("https URLs can be a base")
        .pop_if_empty()
        .push(table_name);
    url.path()[1..].to_string()
}

/// Parse a caller-supplied JSON string into a field map
fn parse_fields(fields_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(fields_json).map_err(|e| ToolError::InvalidFieldsJson(e.to_string()))
}

/// Read a count as `u64` from either JSON number representation.
///
/// Integer-typed schema fields admit numbers with a zero fractional part,
/// so a validated count can arrive as `5.0`, which serde_json stores as a
/// float.
fn integral_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|count| count.fract() == 0.0 && *count >= 0.0)
            .map(|count| count as u64)
    })
}

/// Lists records from a table, optionally capped at `max_records`
pub struct ListRecordsTool {
    client: Arc<AirtableClient>,
}

impl ListRecordsTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListRecordsTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "list_records".to_string(),
            description: "List records from a specific table in a base".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "base_id": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The base ID (starts with 'app')"
                    },
                    "table_name": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Name of the table"
                    },
                    "max_records": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Maximum number of records to return"
                    }
                },
                "required": ["base_id", "table_name"],
                "additionalProperties": false
            }),
        }
    }

    async fn execute(&self, arguments: &Value) -> Result<ToolOutput, ToolError> {
        // Arguments are schema-validated before execute runs
        let base_id = arguments["base_id"].as_str().unwrap();
        let table_name = arguments["table_name"].as_str().unwrap();
        let max_records = arguments.get("max_records").and_then(integral_count);

        let mut path = records_path(base_id, table_name);
        if let Some(max_records) = max_records {
            path.push_str(&format!("?maxRecords={max_records}"));
        }

        let data = self.client.request(Method::GET, &path, None).await?;

        let records = data.get("records").cloned().ok_or_else(|| {
            ToolError::UnexpectedResponse("missing 'records' in response".to_string())
        })?;

        Ok(ToolOutput::text(pretty_json(&records)))
    }
}

/// Creates one record from a JSON-encoded field map
pub struct CreateRecordTool {
    client: Arc<AirtableClient>,
}

impl CreateRecordTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CreateRecordTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "create_record".to_string(),
            description: "Create a new record in a table".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "base_id": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The base ID (starts with 'app')"
                    },
                    "table_name": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Name of the table"
                    },
                    "fields_json": {
                        "type": "string",
                        "description": "Record fields as a JSON string, e.g. {\"Name\": \"Test\"}"
                    }
                },
                "required": ["base_id", "table_name", "fields_json"],
                "additionalProperties": false
            }),
        }
    }

    async fn execute(&self, arguments: &Value) -> Result<ToolOutput, ToolError> {
        // Arguments are schema-validated before execute runs
        let base_id = arguments["base_id"].as_str().unwrap();
        let table_name = arguments["table_name"].as_str().unwrap();
        let fields_json = arguments["fields_json"].as_str().unwrap();

        // Parse before any network call; malformed input never leaves the process
        let fields = parse_fields(fields_json)?;

        let body = json!({ "records": [{ "fields": fields }] });
        let data = self
            .client
            .request(Method::POST, &records_path(base_id, table_name), Some(&body))
            .await?;

        let record = data
            .get("records")
            .and_then(|records| records.get(0))
            .cloned()
            .ok_or_else(|| {
                ToolError::UnexpectedResponse("missing 'records[0]' in response".to_string())
            })?;

        Ok(ToolOutput::text(pretty_json(&record)))
    }
}

/// Applies a partial update to one record
pub struct UpdateRecordTool {
    client: Arc<AirtableClient>,
}

impl UpdateRecordTool {
    pub fn new(client: Arc<AirtableClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for UpdateRecordTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "update_record".to_string(),
            description: "Update fields of an existing record; unlisted fields are left unchanged"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "base_id": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The base ID (starts with 'app')"
                    },
                    "table_name": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Name of the table"
                    },
                    "record_id": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The record ID (starts with 'rec')"
                    },
                    "fields_json": {
                        "type": "string",
                        "description": "Fields to update as a JSON string, e.g. {\"Done\": true}"
                    }
                },
                "required": ["base_id", "table_name", "record_id", "fields_json"],
                "additionalProperties": false
            }),
        }
    }

    async fn execute(&self, arguments: &Value) -> Result<ToolOutput, ToolError> {
        // Arguments are schema-validated before execute runs
        let base_id = arguments["base_id"].as_str().unwrap();
        let table_name = arguments["table_name"].as_str().unwrap();
        let record_id = arguments["record_id"].as_str().unwrap();
        let fields_json = arguments["fields_json"].as_str().unwrap();

        // Parse before any network call; malformed input never leaves the process
        let fields = parse_fields(fields_json)?;

        let body = json!({ "fields": fields });
        let path = format!("{}/{record_id}", records_path(base_id, table_name));
        let data = self.client.request(Method::PATCH, &path, Some(&body)).await?;

        Ok(ToolOutput::text(pretty_json(&data)))
    }
}
