//! Airtable REST API integration
//!
//! A single authenticated request gateway; the tools in [`crate::tools`]
//! build paths and bodies and hand them to it.

pub mod client;

pub use client::{AirtableClient, AirtableConfig, AirtableError, ApiFailure};
