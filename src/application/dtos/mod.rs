use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::recommendation::split_recommendations;
use crate::domain::{AnalysisKind, ProgressStep, QuestionOutcome};

/// Question submitted from the browser page or the console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Response envelope for a processed question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AskResponse {
    ClarificationNeeded {
        message: String,
    },
    Complete {
        audience: String,
        agent_type: AnalysisKind,
        formatted_output: String,
        main_output: String,
        recommendations: Vec<String>,
        structured_data: serde_json::Value,
        steps: Vec<ProgressStep>,
    },
}

impl From<QuestionOutcome> for AskResponse {
    fn from(value: QuestionOutcome) -> Self {
        match value {
            QuestionOutcome::ClarificationNeeded { message } => {
                AskResponse::ClarificationNeeded { message }
            }
            QuestionOutcome::Answered(report) => {
                let (main_output, recommendations) =
                    split_recommendations(&report.formatted_output);
                AskResponse::Complete {
                    audience: report.audience,
                    agent_type: report.kind,
                    main_output,
                    recommendations,
                    formatted_output: report.formatted_output,
                    structured_data: report.structured_data,
                    steps: report.steps,
                }
            }
        }
    }
}

/// DTO bridging raw similarity search requests and the application layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Result row returned from semantic retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultDto {
    pub id: Uuid,
    pub text: String,
    pub score: f32,
    pub created_at: DateTime<Utc>,
}

/// Response envelope for search operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResultDto>,
}

/// Health/readiness report for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatusResponse {
    pub ok: bool,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_entries: usize,
    pub csv_rows: usize,
    pub csv_path: String,
    pub vector_db_path: String,
    pub embedding_model: String,
    pub embedding_dimensions: Option<usize>,
    pub version: String,
    pub uptime_seconds: u64,
}

const fn default_limit() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisReport, Recommendations};

    #[test]
    fn clarification_serializes_with_status_tag() {
        let response = AskResponse::from(QuestionOutcome::ClarificationNeeded {
            message: "which product?".into(),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "clarification_needed");
        assert_eq!(json["message"], "which product?");
    }

    #[test]
    fn answered_outcome_splits_recommendations() {
        let report = AnalysisReport {
            kind: AnalysisKind::Interests,
            question: "what do they like?".into(),
            audience: "drones".into(),
            structured_data: serde_json::json!({"interests": {}}),
            formatted_output: "Interests summary\n\n📋 **Recommendations**:\nIntro\n\n• Run ads\n- Sponsor races\n"
                .into(),
            raw_response: String::new(),
            recommendations: Some(Recommendations {
                introduction: "Intro".into(),
                items: vec!["• Run ads".into(), "- Sponsor races".into()],
            }),
            steps: Vec::new(),
        };

        match AskResponse::from(QuestionOutcome::Answered(Box::new(report))) {
            AskResponse::Complete {
                main_output,
                recommendations,
                agent_type,
                ..
            } => {
                assert_eq!(main_output, "Interests summary");
                assert_eq!(recommendations, vec!["Run ads", "Sponsor races"]);
                assert_eq!(agent_type, AnalysisKind::Interests);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn search_request_limit_defaults() {
        let request: SearchRequest = serde_json::from_str(r#"{"query":"drone"}"#).unwrap();
        assert_eq!(request.limit, 10);
    }
}
