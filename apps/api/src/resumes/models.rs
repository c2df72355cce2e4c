use serde::{Deserialize, Serialize};

use crate::extraction::ParseResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    /// `Key: value` listing, one field per paragraph.
    Text,
}

#[derive(Debug, Default, Deserialize)]
pub struct ParseQuery {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize)]
pub struct ParseTextRequest {
    pub text: String,
    pub required_skills: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct BatchError {
    pub code: String,
    pub message: String,
}

/// Outcome for one uploaded file; exactly one of `result` and `error` is set.
#[derive(Debug, Serialize)]
pub struct BatchItem {
    pub filename: String,
    pub result: Option<ParseResult>,
    pub error: Option<BatchError>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub items: Vec<BatchItem>,
}
