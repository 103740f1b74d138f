use serde_json::{json, Value};

use crate::{domain::DomainError, settings::LlmSettings};

pub(super) fn endpoint(settings: &LlmSettings) -> String {
    format!("{}/chat/completions", settings.api_base)
}

pub(super) fn request_body(settings: &LlmSettings, prompt: &str, system: Option<&str>) -> Value {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": prompt }));

    json!({
        "model": settings.model,
        "messages": messages,
        "temperature": settings.temperature,
        "max_tokens": settings.max_tokens,
    })
}

pub(super) fn parse_reply(reply: &Value) -> Result<String, DomainError> {
    reply
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DomainError::llm("no response from openai"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_message_comes_first() {
        let settings = LlmSettings::from_lookup(|key| match key {
            "LLM_PROVIDER" => Some("openai".into()),
            "OPENAI_API_KEY" => Some("sk".into()),
            _ => None,
        })
        .unwrap();

        let body = request_body(&settings, "question", Some("system"));
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "question");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(endpoint(&settings), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn reads_first_choice() {
        let reply = json!({"choices": [{"message": {"role": "assistant", "content": "done"}}]});
        assert_eq!(parse_reply(&reply).unwrap(), "done");
        assert!(parse_reply(&json!({"choices": []})).is_err());
    }
}
