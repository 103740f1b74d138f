//! Helpers for pulling structured data and display text out of model replies.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn json_object_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("valid json span pattern"))
}

fn trailing_fenced_json() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n```json[\s\S]*```\s*$").expect("valid fenced json pattern"))
}

fn trailing_raw_json() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\{[\s\S]*\}\s*$").expect("valid raw json pattern"))
}

/// Parses the outermost `{...}` span of a reply. Falls back to the whole reply
/// and finally to an empty object.
pub fn extract_json(response: &str) -> Value {
    let parsed = match json_object_span().find(response) {
        Some(span) => serde_json::from_str::<Value>(span.as_str()).ok(),
        None => serde_json::from_str::<Value>(response.trim()).ok(),
    };

    parsed.unwrap_or_else(|| Value::Object(Default::default()))
}

/// Strips trailing JSON (fenced or raw) so only the human-readable part remains.
pub fn format_output(response: &str) -> String {
    let without_fenced = trailing_fenced_json().replace(response, "");
    let without_raw = trailing_raw_json().replace(&without_fenced, "");
    without_raw.trim().to_string()
}
