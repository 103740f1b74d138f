//! Blocking HTTP connector for the supported language model providers.
//!
//! Every provider receives the same composed prompt: the instruction followed
//! by the supporting review texts, truncated when they grow too large.

mod anthropic;
mod ollama;
mod openai;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    application::services::LanguageModel,
    domain::DomainError,
    settings::{LlmProvider, LlmSettings},
};

/// Upper bound, in characters, for the context appended to a prompt.
pub const MAX_CONTEXT_CHARS: usize = 10_000;

/// Appends the context texts to `prompt`, one per line.
pub fn compose_prompt(prompt: &str, context: &[String]) -> String {
    if context.is_empty() {
        return prompt.to_string();
    }

    let joined = context.join("\n");
    if joined.chars().count() > MAX_CONTEXT_CHARS {
        let truncated: String = joined.chars().take(MAX_CONTEXT_CHARS).collect();
        format!("{prompt}\n\nRelevant context (truncated):\n{truncated}")
    } else {
        format!("{prompt}\n\nRelevant context:\n{joined}")
    }
}

pub struct LlmConnector {
    settings: LlmSettings,
    agent: ureq::Agent,
}

impl LlmConnector {
    pub fn new(settings: LlmSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(settings.timeout)
            .build();

        Self { settings, agent }
    }

    pub fn from_env() -> Result<Self, DomainError> {
        LlmSettings::from_env().map(Self::new)
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    fn post_json(&self, url: &str, body: Value) -> Result<Value, DomainError> {
        let mut request = self
            .agent
            .post(url)
            .set("Content-Type", "application/json");

        match self.settings.provider {
            LlmProvider::Ollama => {}
            LlmProvider::OpenAi => {
                let key = self.settings.api_key.as_deref().unwrap_or_default();
                request = request.set("Authorization", &format!("Bearer {key}"));
            }
            LlmProvider::Anthropic => {
                let key = self.settings.api_key.as_deref().unwrap_or_default();
                request = request
                    .set("x-api-key", key)
                    .set("anthropic-version", anthropic::API_VERSION);
            }
        }

        let response = request
            .send_json(body)
            .map_err(|err| handle_http_error(self.settings.provider, err))?;

        response.into_json::<Value>().map_err(|err| {
            DomainError::llm(format!(
                "failed to parse {} response: {err}",
                self.settings.provider
            ))
        })
    }
}

impl LanguageModel for LlmConnector {
    fn complete(
        &self,
        prompt: &str,
        context: &[String],
        system: Option<&str>,
    ) -> Result<String, DomainError> {
        let full_prompt = compose_prompt(prompt, context);
        let settings = &self.settings;

        debug!(
            provider = %settings.provider,
            model = %settings.model,
            prompt_chars = full_prompt.len(),
            context_items = context.len(),
            "calling language model"
        );

        let result = match settings.provider {
            LlmProvider::Ollama => self
                .post_json(
                    &ollama::endpoint(settings),
                    ollama::request_body(settings, &full_prompt, system),
                )
                .and_then(|reply| ollama::parse_reply(&reply)),
            LlmProvider::OpenAi => self
                .post_json(
                    &openai::endpoint(settings),
                    openai::request_body(settings, &full_prompt, system),
                )
                .and_then(|reply| openai::parse_reply(&reply)),
            LlmProvider::Anthropic => self
                .post_json(
                    &anthropic::endpoint(settings),
                    anthropic::request_body(settings, &full_prompt, system),
                )
                .and_then(|reply| anthropic::parse_reply(&reply)),
        };

        if let Err(err) = &result {
            warn!(provider = %settings.provider, error = %err, "language model call failed");
        }
        result
    }
}

/// Error payload shapes returned by the providers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProviderError {
    Nested { error: ProviderErrorBody },
    Flat { error: String },
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

fn handle_http_error(provider: LlmProvider, error: ureq::Error) -> DomainError {
    match error {
        ureq::Error::Status(code, response) => match response.into_json::<ProviderError>() {
            Ok(ProviderError::Nested { error }) => {
                DomainError::llm(format!("{provider} HTTP {code}: {}", error.message))
            }
            Ok(ProviderError::Flat { error }) => {
                DomainError::llm(format!("{provider} HTTP {code}: {error}"))
            }
            Err(_) => DomainError::llm(format!("{provider} HTTP error: {code}")),
        },
        ureq::Error::Transport(transport) => {
            DomainError::llm(format!("{provider} transport error: {transport}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    fn ollama_settings(base: String) -> LlmSettings {
        LlmSettings::from_lookup(move |key| match key {
            "OLLAMA_API_BASE" => Some(base.clone()),
            "LLM_TIMEOUT_SECS" => Some("5".into()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn context_is_appended_after_prompt() {
        assert_eq!(compose_prompt("Analyze", &[]), "Analyze");
        assert_eq!(
            compose_prompt("Analyze", &["a".to_string(), "b".to_string()]),
            "Analyze\n\nRelevant context:\na\nb"
        );
    }

    #[test]
    fn oversized_context_is_truncated_by_characters() {
        let context = vec!["é".repeat(MAX_CONTEXT_CHARS + 50)];
        let prompt = compose_prompt("P", &context);
        let (head, tail) = prompt
            .split_once("Relevant context (truncated):\n")
            .unwrap();
        assert_eq!(head, "P\n\n");
        assert_eq!(tail.chars().count(), MAX_CONTEXT_CHARS);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn ollama_round_trip_against_local_server() {
        let app = Router::new()
            .route(
                "/api/generate",
                post(|Json(body): Json<Value>| async move {
                    let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
                    Json(json!({ "response": format!("echo: {prompt}") }))
                }),
            )
            .route(
                "/fail/api/generate",
                post(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "model not loaded" })),
                    )
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let ok = tokio::task::spawn_blocking(move || {
            let connector = LlmConnector::new(ollama_settings(format!("http://{addr}")));
            connector.complete("Hi", &["ctx".to_string()], Some("sys"))
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(ok, "echo: Hi\n\nRelevant context:\nctx");

        let err = tokio::task::spawn_blocking(move || {
            let connector = LlmConnector::new(ollama_settings(format!("http://{addr}/fail")));
            connector.complete("Hi", &[], None)
        })
        .await
        .unwrap()
        .unwrap_err();
        assert!(matches!(err, DomainError::Llm(ref msg) if msg.contains("model not loaded")));
    }

    #[test]
    fn unreachable_server_is_an_llm_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let connector = LlmConnector::new(ollama_settings(format!("http://127.0.0.1:{port}")));
        let err = connector.complete("Hi", &[], None).unwrap_err();
        assert!(matches!(err, DomainError::Llm(_)));
    }
}
