//! Turning a free-form user input into a question, an audience and a category.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::domain::{AnalysisKind, QuestionInfo};

use super::parsing::extract_json;

const EXTRACTION_PROMPT: &str = r#"
From the following user input, extract:
1. The main question or information request
2. The product, audience, or subject they're asking about

User input: "{user_input}"

Respond in JSON format:
{
    "question": "The core question/request",
    "audience": "The product or audience being asked about (or null if unclear)"
}
"#;

const CLASSIFICATION_PROMPT: &str = r#"
Classify the following question into exactly one of these categories:
- demographics (questions about age, gender, location, income, education)
- interests (questions about preferences, activities, pastimes)
- keywords (questions about key phrases, features, aspects mentioned)
- usage (questions about how customers use products, usage patterns)
- satisfaction (questions about customer satisfaction, sentiment)
- purchase (questions about buying patterns, purchase timing)
- personality (questions about personality traits)
- lifestyle (questions about lifestyle patterns)
- values (questions about values, priorities)

Question: "{question}"

Respond with just one word - the category name.
"#;

pub fn extraction_prompt(user_input: &str) -> String {
    EXTRACTION_PROMPT.replace("{user_input}", user_input)
}

pub fn classification_prompt(question: &str) -> String {
    CLASSIFICATION_PROMPT.replace("{question}", question)
}

/// Reads the extraction reply, falling back to pattern matching on the raw
/// input when the reply is unusable or names no audience.
pub fn parse_question_info(user_input: &str, reply: &str) -> QuestionInfo {
    let parsed = extract_json(reply);
    let Some(object) = parsed.as_object().filter(|map| !map.is_empty()) else {
        return fallback_question_info(user_input);
    };

    let question = object
        .get("question")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(user_input)
        .to_string();

    let audience = object
        .get("audience")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case("null"))
        .map(str::to_string)
        .or_else(|| extract_audience_fallback(user_input));

    QuestionInfo { question, audience }
}

pub fn fallback_question_info(user_input: &str) -> QuestionInfo {
    QuestionInfo {
        question: user_input.to_string(),
        audience: extract_audience_fallback(user_input),
    }
}

pub fn classify_reply(reply: &str) -> AnalysisKind {
    AnalysisKind::from_label(reply)
}

fn audience_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?i)(?:about|for|of|who (?:use|buy|purchase)|regarding) ([^?.,]+)")
                .expect("valid subject pattern"),
            Regex::new(r"(?i)([^?.,]+) (?:users|customers|buyers|audience)")
                .expect("valid group pattern"),
            Regex::new(r"(?i)people (?:who|that) (?:use|buy|like) ([^?.,]+)")
                .expect("valid people pattern"),
        ]
    })
}

fn filler_words() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:the|my|your|their|our)\b").expect("valid filler pattern"))
}

/// Pattern-based audience extraction used when the model gives no audience.
pub fn extract_audience_fallback(text: &str) -> Option<String> {
    for pattern in audience_patterns() {
        let Some(captures) = pattern.captures(text) else {
            continue;
        };
        let Some(group) = captures.get(1) else {
            continue;
        };

        let stripped = filler_words().replace_all(group.as_str().trim(), "");
        let audience = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        if !audience.is_empty() {
            return Some(audience);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_finds_subject_after_preposition() {
        assert_eq!(
            extract_audience_fallback("What are the demographics of remote control car buyers?"),
            Some("remote control car buyers".into())
        );
    }

    #[test]
    fn fallback_strips_filler_words() {
        assert_eq!(
            extract_audience_fallback("Tell me about the yoga mats."),
            Some("yoga mats".into())
        );
    }

    #[test]
    fn fallback_uses_group_suffix_pattern() {
        assert_eq!(
            extract_audience_fallback("Espresso machine customers"),
            Some("Espresso machine".into())
        );
    }

    #[test]
    fn fallback_uses_people_pattern() {
        assert_eq!(
            extract_audience_fallback("people that like hiking boots"),
            Some("hiking boots".into())
        );
    }

    #[test]
    fn fallback_returns_none_without_subject() {
        assert_eq!(extract_audience_fallback("hello there"), None);
    }

    #[test]
    fn parses_model_json_reply() {
        let info = parse_question_info(
            "who buys drones?",
            r#"{"question": "Who buys drones?", "audience": "drones"}"#,
        );
        assert_eq!(info.question, "Who buys drones?");
        assert_eq!(info.audience.as_deref(), Some("drones"));
    }

    #[test]
    fn null_audience_triggers_fallback() {
        let info = parse_question_info(
            "What do customers think about standing desks?",
            r#"{"question": "What do customers think?", "audience": null}"#,
        );
        assert_eq!(info.question, "What do customers think?");
        assert_eq!(info.audience.as_deref(), Some("standing desks"));
    }

    #[test]
    fn unparseable_reply_falls_back_to_raw_input() {
        let info = parse_question_info("Interests of gamers?", "I am not sure.");
        assert_eq!(info.question, "Interests of gamers?");
        assert_eq!(info.audience.as_deref(), Some("gamers"));
    }

    #[test]
    fn prompts_embed_inputs() {
        assert!(extraction_prompt("who buys kayaks").contains("\"who buys kayaks\""));
        assert!(classification_prompt("why?").contains("Question: \"why?\""));
    }
}
