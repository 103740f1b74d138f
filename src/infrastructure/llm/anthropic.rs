use serde_json::{json, Value};

use crate::{domain::DomainError, settings::LlmSettings};

pub(super) const API_VERSION: &str = "2023-06-01";

pub(super) fn endpoint(settings: &LlmSettings) -> String {
    format!("{}/messages", settings.api_base)
}

pub(super) fn request_body(settings: &LlmSettings, prompt: &str, system: Option<&str>) -> Value {
    let mut body = json!({
        "model": settings.model,
        "messages": [{ "role": "user", "content": prompt }],
        "temperature": settings.temperature,
        "max_tokens": settings.max_tokens,
    });
    if let Some(system) = system {
        body["system"] = json!(system);
    }
    body
}

pub(super) fn parse_reply(reply: &Value) -> Result<String, DomainError> {
    reply
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DomainError::llm("no response from anthropic"))
}
