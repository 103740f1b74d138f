use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

/// A single review text stored in the vector store with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub id: Uuid,
    pub text: String,
    pub embedding: EntryEmbedding,
    pub created_at: DateTime<Utc>,
}

impl ReviewEntry {
    pub fn new(text: impl Into<String>, embedding: EntryEmbedding) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// Vector representation of a review text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryEmbedding {
    pub model: String,
    pub vector: Vec<f32>,
}

impl EntryEmbedding {
    pub fn new(model: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            model: model.into(),
            vector,
        }
    }

    pub fn dims(&self) -> usize {
        self.vector.len()
    }
}

/// Segmentation category a question is routed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    #[default]
    Demographics,
    Interests,
    Keywords,
    Usage,
    Satisfaction,
    Purchase,
    Personality,
    Lifestyle,
    Values,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 9] = [
        AnalysisKind::Demographics,
        AnalysisKind::Interests,
        AnalysisKind::Keywords,
        AnalysisKind::Usage,
        AnalysisKind::Satisfaction,
        AnalysisKind::Purchase,
        AnalysisKind::Personality,
        AnalysisKind::Lifestyle,
        AnalysisKind::Values,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Demographics => "demographics",
            AnalysisKind::Interests => "interests",
            AnalysisKind::Keywords => "keywords",
            AnalysisKind::Usage => "usage",
            AnalysisKind::Satisfaction => "satisfaction",
            AnalysisKind::Purchase => "purchase",
            AnalysisKind::Personality => "personality",
            AnalysisKind::Lifestyle => "lifestyle",
            AnalysisKind::Values => "values",
        }
    }

    /// Status line shown while the analysis for this kind is running.
    pub fn progress_label(&self) -> &'static str {
        match self {
            AnalysisKind::Demographics => "Analyzing demographics",
            AnalysisKind::Interests => "Analyzing interests",
            AnalysisKind::Keywords => "Analyzing keywords",
            AnalysisKind::Usage => "Analyzing usage behaviors",
            AnalysisKind::Satisfaction => "Analyzing satisfaction",
            AnalysisKind::Purchase => "Analyzing purchase patterns",
            AnalysisKind::Personality => "Analyzing personality traits",
            AnalysisKind::Lifestyle => "Analyzing lifestyle patterns",
            AnalysisKind::Values => "Analyzing core values",
        }
    }

    /// Maps a free-form classifier reply onto a kind, falling back to demographics.
    pub fn from_label(label: &str) -> Self {
        let cleaned = label
            .trim()
            .trim_matches(|c: char| !c.is_ascii_alphabetic())
            .to_ascii_lowercase();
        cleaned.parse().unwrap_or_default()
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown analysis kind `{s}`")))
    }
}

/// Core question and audience pulled out of a free-form user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionInfo {
    pub question: String,
    pub audience: Option<String>,
}

/// Introduction plus bullet items appended to an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub introduction: String,
    pub items: Vec<String>,
}

/// One status transition recorded while a question is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStep {
    pub agent: String,
    pub subject: Option<String>,
    pub status: String,
}

/// Full result of an analysis run, including recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub kind: AnalysisKind,
    pub question: String,
    pub audience: String,
    pub structured_data: serde_json::Value,
    pub formatted_output: String,
    pub raw_response: String,
    pub recommendations: Option<Recommendations>,
    pub steps: Vec<ProgressStep>,
}

/// What the pipeline produced for a single question.
#[derive(Debug, Clone)]
pub enum QuestionOutcome {
    ClarificationNeeded { message: String },
    Answered(Box<AnalysisReport>),
}
