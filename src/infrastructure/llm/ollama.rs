use serde_json::{json, Value};

use crate::{domain::DomainError, settings::LlmSettings};

pub(super) fn endpoint(settings: &LlmSettings) -> String {
    format!("{}/api/generate", settings.api_base)
}

pub(super) fn request_body(settings: &LlmSettings, prompt: &str, system: Option<&str>) -> Value {
    let mut body = json!({
        "model": settings.model,
        "prompt": prompt,
        "stream": false,
        "options": { "temperature": settings.temperature },
    });
    if let Some(system) = system {
        body["system"] = json!(system);
    }
    body
}

pub(super) fn parse_reply(reply: &Value) -> Result<String, DomainError> {
    reply
        .get("response")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DomainError::llm("no response from ollama"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LlmSettings;

    #[test]
    fn body_carries_options_and_optional_system() {
        let settings = LlmSettings::from_lookup(|_| None).unwrap();
        let body = request_body(&settings, "hello", Some("be brief"));
        assert_eq!(body["model"], "gemma3:27b-it-qat");
        assert_eq!(body["stream"], false);
        assert_eq!(body["system"], "be brief");
        assert!(body["options"]["temperature"].is_number());

        let body = request_body(&settings, "hello", None);
        assert!(body.get("system").is_none());
        assert_eq!(endpoint(&settings), "http://localhost:11434/api/generate");
    }

    #[test]
    fn reply_without_response_field_is_an_error() {
        assert_eq!(parse_reply(&json!({"response": "hi"})).unwrap(), "hi");
        assert!(parse_reply(&json!({"done": true})).is_err());
    }
}
