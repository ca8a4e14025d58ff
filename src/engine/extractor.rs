//! LLM-backed extraction engine
//!
//! Renders the page through the given session, converts it to the requested
//! input format, splits it into chunks and asks the model to extract records
//! from each chunk in turn. The per-chunk arrays are concatenated in chunk
//! order into a single JSON payload.

use crate::config::EngineConfig;
use crate::engine::llm::{OllamaClient, Sampling};
use crate::engine::{
    chunk_content, prepare_content, BrowserSession, EngineError, EngineOutput, ExtractionEngine,
    TokenUsage,
};
use crate::request::ExtractionRequest;
use serde_json::{json, Value};

const SYSTEM_PROMPT: &str = "You extract structured data from web page content. \
Reply with a JSON array of objects that match the given schema and nothing else. \
Reply with [] when the content holds no matching items.";

/// JSON schema of the records the model must produce
///
/// Every item carries a `title` and a `date`.
pub fn record_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "date": { "type": "string" }
            },
            "required": ["title", "date"]
        }
    })
}

/// The default [`ExtractionEngine`], talking to an Ollama-compatible runtime
#[derive(Debug, Clone)]
pub struct LlmExtractionEngine {
    llm: OllamaClient,
    schema: Value,
}

impl LlmExtractionEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            llm: OllamaClient::new(config)?,
            schema: record_schema(),
        })
    }
}

impl ExtractionEngine for LlmExtractionEngine {
    async fn fetch_and_extract<S: BrowserSession>(
        &self,
        session: &mut S,
        request: &ExtractionRequest,
    ) -> Result<EngineOutput, EngineError> {
        let page = session.render(request.url()).await?;
        let content = prepare_content(&page.html, request.input_format());
        let chunks = chunk_content(
            &content,
            request.chunk_token_threshold() as usize,
            request.overlap_rate(),
        );

        tracing::info!(
            "Extracting from {} ({} chars of {}, {} chunk(s))",
            page.url,
            content.len(),
            request.input_format(),
            chunks.len()
        );

        let sampling = Sampling {
            temperature: request.temperature(),
            max_tokens: request.max_tokens(),
        };

        let mut items = Vec::new();
        let mut usage = TokenUsage::default();

        for (index, chunk) in chunks.iter().enumerate() {
            let prompt = build_prompt(request.instruction(), &self.schema, chunk, index, chunks.len());
            let completion = self
                .llm
                .chat(request.model(), SYSTEM_PROMPT, &prompt, &self.schema, sampling)
                .await?;
            usage += completion.usage;

            let extracted = parse_model_output(&completion.content)?;
            tracing::debug!(
                "Chunk {}/{} yielded {} item(s)",
                index + 1,
                chunks.len(),
                extracted.len()
            );
            items.extend(extracted);
        }

        let payload = serde_json::to_string(&items)
            .map_err(|e| EngineError::MalformedOutput(e.to_string()))?;

        Ok(EngineOutput {
            payload,
            usage: Some(usage),
        })
    }
}

fn build_prompt(instruction: &str, schema: &Value, chunk: &str, index: usize, total: usize) -> String {
    let mut prompt = String::with_capacity(chunk.len() + instruction.len() + 256);
    prompt.push_str("Instruction: ");
    prompt.push_str(instruction);
    prompt.push_str("\n\nSchema:\n");
    prompt.push_str(&schema.to_string());
    prompt.push_str(&format!(
        "\n\nContent (part {} of {}):\n<content>\n",
        index + 1,
        total
    ));
    prompt.push_str(chunk);
    prompt.push_str("\n</content>");
    prompt
}

/// Parses a model reply into candidate records
///
/// Reasoning blocks (`<think>...</think>`) and Markdown code fences are
/// removed first. Then:
/// - an array is taken as-is
/// - an object holding exactly one array field contributes that array
/// - any other object is a single candidate
///
/// # Example
///
/// ```
/// use glean::engine::parse_model_output;
///
/// let reply = "<think>looking...</think>\n```json\n{\"posts\": [{\"title\": \"A\"}]}\n```";
/// let items = parse_model_output(reply).unwrap();
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0]["title"], "A");
/// ```
pub fn parse_model_output(reply: &str) -> Result<Vec<Value>, EngineError> {
    let cleaned = strip_code_fence(&strip_reasoning(reply));

    let value: Value = serde_json::from_str(&cleaned).map_err(|e| {
        EngineError::MalformedOutput(format!("{} in reply: {}", e, preview(&cleaned)))
    })?;

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::Array(items)) = map.values().next() {
                    return Ok(items.clone());
                }
            }
            Ok(vec![Value::Object(map)])
        }
        other => Err(EngineError::MalformedOutput(format!(
            "expected a JSON array or object, got: {}",
            preview(&other.to_string())
        ))),
    }
}

/// Removes `<think>...</think>` blocks; a dangling `</think>` drops everything before it
fn strip_reasoning(reply: &str) -> String {
    let mut text = reply.to_string();

    while let Some(start) = text.find("<think>") {
        match text[start..].find("</think>") {
            Some(len) => text.replace_range(start..start + len + "</think>".len(), ""),
            None => text.truncate(start),
        }
    }

    if let Some(end) = text.find("</think>") {
        text.replace_range(..end + "</think>".len(), "");
    }

    text.trim().to_string()
}

fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);

    // Drop the info string (e.g. "json"); a one-line fence has no newline
    let body = match rest.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with(['[', '{']) => body,
        _ => rest.trim_start().strip_prefix("json").unwrap_or(rest),
    };
    body.trim().to_string()
}

fn preview(text: &str) -> String {
    const MAX: usize = 200;
    if text.chars().count() > MAX {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    } else {
        text.to_string()
    }
}
