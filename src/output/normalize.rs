//! Result normalization
//!
//! The engine hands back an opaque JSON payload. Normalization adopts it into
//! typed records, failing the whole batch on the first malformed candidate.

use crate::request::ExtractionRequest;
use crate::GleanError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One extracted item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Required, never blank
    pub title: String,
    /// Free-form date text as found on the page
    pub date: Option<String>,
}

/// The persisted result of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedArtifact {
    /// Source URL
    pub url: String,
    /// The instruction given to the model
    pub instruction: String,
    /// When extraction succeeded
    pub timestamp: DateTime<Utc>,
    /// Extracted records, in engine order
    pub results: Vec<ExtractedRecord>,
}

impl ScrapedArtifact {
    /// Returns the number of records
    pub fn record_count(&self) -> usize {
        self.results.len()
    }
}

/// Validates a raw payload and wraps it into a [`ScrapedArtifact`]
///
/// # Record Contract
///
/// - The payload is a JSON array
/// - Every element is an object
/// - `title` is a string that is not blank
/// - `date`, when present, is a string or `null`
/// - Other fields are ignored
///
/// The artifact timestamp is taken here, after the payload is accepted.
///
/// # Returns
///
/// * `Ok(ScrapedArtifact)` - Every candidate satisfied the contract
/// * `Err(GleanError::SchemaViolation)` - The first violation found
pub fn normalize(payload: &str, request: &ExtractionRequest) -> Result<ScrapedArtifact, GleanError> {
    let value: Value = serde_json::from_str(payload).map_err(|e| GleanError::SchemaViolation {
        index: None,
        reason: format!("payload is not valid JSON: {}", e),
    })?;

    let candidates = match value {
        Value::Array(candidates) => candidates,
        other => {
            return Err(GleanError::SchemaViolation {
                index: None,
                reason: format!("expected an array of records, got {}", type_name(&other)),
            })
        }
    };

    let results = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            adopt_record(candidate).map_err(|reason| GleanError::SchemaViolation {
                index: Some(index),
                reason,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScrapedArtifact {
        url: request.url().to_string(),
        instruction: request.instruction().to_string(),
        timestamp: Utc::now(),
        results,
    })
}

fn adopt_record(candidate: &Value) -> Result<ExtractedRecord, String> {
    let Value::Object(fields) = candidate else {
        return Err(format!("expected an object, got {}", type_name(candidate)));
    };

    Ok(ExtractedRecord {
        title: title_field(fields)?,
        date: date_field(fields)?,
    })
}

fn title_field(fields: &Map<String, Value>) -> Result<String, String> {
    match fields.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => Ok(title.clone()),
        Some(Value::String(_)) => Err("title is empty".to_string()),
        Some(other) => Err(format!("title must be a string, got {}", type_name(other))),
        None => Err("title is missing".to_string()),
    }
}

fn date_field(fields: &Map<String, Value>) -> Result<Option<String>, String> {
    match fields.get("date") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(date)) => Ok(Some(date.clone())),
        Some(other) => Err(format!(
            "date must be a string or null, got {}",
            type_name(other)
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
