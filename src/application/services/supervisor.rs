use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{
    AnalysisKind, AnalysisReport, DomainError, QuestionInfo, QuestionOutcome, Recommendations,
};

use super::{
    parsing::{extract_json, format_output},
    progress::ProgressTracker,
    prompts, question, recommendation, ReviewService,
};

const MAX_QUESTION_CHARS: usize = 2_000;

pub const CLARIFICATION_MESSAGE: &str = "I need to know what product or audience you're interested in learning about. Could you please clarify?";

/// Text-completion backend (Ollama, OpenAI, Anthropic, or a test double).
pub trait LanguageModel: Send + Sync {
    /// Completes `prompt`; `context` holds supporting texts appended by the backend.
    fn complete(
        &self,
        prompt: &str,
        context: &[String],
        system: Option<&str>,
    ) -> Result<String, DomainError>;
}

/// Keyword-searchable tabular data rendered as review texts.
pub trait TabularSource: Send + Sync {
    fn search(&self, query: &str) -> Vec<String>;

    fn row_count(&self) -> usize;
}

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub vector_limit: usize,
    pub max_context_items: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            vector_limit: 50,
            max_context_items: 100,
        }
    }
}

/// Routes a question to the matching analysis and enriches the result with
/// recommendations.
pub struct SupervisorService {
    reviews: Arc<ReviewService>,
    tabular: Arc<dyn TabularSource>,
    llm: Arc<dyn LanguageModel>,
    config: SupervisorConfig,
}

impl SupervisorService {
    pub fn new(
        reviews: Arc<ReviewService>,
        tabular: Arc<dyn TabularSource>,
        llm: Arc<dyn LanguageModel>,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            reviews,
            tabular,
            llm,
            config,
        }
    }

    pub fn process_question(&self, input: &str) -> Result<QuestionOutcome, DomainError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DomainError::validation("question cannot be empty"));
        }
        if input.chars().count() > MAX_QUESTION_CHARS {
            return Err(DomainError::limit(format!(
                "question cannot exceed {MAX_QUESTION_CHARS} characters"
            )));
        }

        let tracker = ProgressTracker::new();
        tracker.update_status("supervisor", None, "Analyzing user request");

        let info = self.extract_question_info(input);
        let Some(audience) = info.audience else {
            tracker.update_status("supervisor", None, "Clarification needed");
            return Ok(QuestionOutcome::ClarificationNeeded {
                message: CLARIFICATION_MESSAGE.to_string(),
            });
        };

        let kind = self.determine_analysis_kind(&info.question);
        tracker.update_status("supervisor", None, &format!("Routing to {kind} agent"));
        tracker.update_status(kind.as_str(), None, "Running analysis");

        let mut report = self.analyze(kind, &info.question, &audience, &tracker)?;

        tracker.update_status("recommendation", None, "Adding recommendations");
        self.enhance(&mut report)?;

        tracker.update_status("supervisor", None, "Complete");
        report.steps = tracker.finish();

        Ok(QuestionOutcome::Answered(Box::new(report)))
    }

    pub fn extract_question_info(&self, input: &str) -> QuestionInfo {
        match self
            .llm
            .complete(&question::extraction_prompt(input), &[], None)
        {
            Ok(reply) => question::parse_question_info(input, &reply),
            Err(err) => {
                warn!(error = %err, "question extraction failed, using pattern fallback");
                question::fallback_question_info(input)
            }
        }
    }

    pub fn determine_analysis_kind(&self, question_text: &str) -> AnalysisKind {
        match self
            .llm
            .complete(&question::classification_prompt(question_text), &[], None)
        {
            Ok(reply) => question::classify_reply(&reply),
            Err(err) => {
                warn!(error = %err, "question classification failed, defaulting");
                AnalysisKind::default()
            }
        }
    }

    /// Vector hits first, then CSV keyword hits, de-duplicated and capped.
    pub fn relevant_data(&self, audience: &str) -> Result<Vec<String>, DomainError> {
        let vector_results = self
            .reviews
            .search_texts(audience, self.config.vector_limit)?;
        let tabular_results = self.tabular.search(audience);
        debug!(
            vector = vector_results.len(),
            tabular = tabular_results.len(),
            "retrieved supporting reviews"
        );

        let mut seen = HashSet::new();
        Ok(vector_results
            .into_iter()
            .chain(tabular_results)
            .filter(|text| seen.insert(text.clone()))
            .take(self.config.max_context_items)
            .collect())
    }

    pub fn analyze(
        &self,
        kind: AnalysisKind,
        question_text: &str,
        audience: &str,
        tracker: &ProgressTracker,
    ) -> Result<AnalysisReport, DomainError> {
        let agent = kind.as_str();

        tracker.update_status(agent, Some(audience), "Retrieving data");
        let relevant = self.relevant_data(audience)?;

        tracker.update_status(agent, Some(audience), kind.progress_label());
        let prompt = prompts::analysis_prompt(kind, audience);
        let response = self.llm.complete(&prompt, &relevant, None)?;

        tracker.update_status(agent, Some(audience), "Formatting results");
        Ok(AnalysisReport {
            kind,
            question: question_text.to_string(),
            audience: audience.to_string(),
            structured_data: extract_json(&response),
            formatted_output: format_output(&response),
            raw_response: response,
            recommendations: None,
            steps: Vec::new(),
        })
    }

    fn enhance(&self, report: &mut AnalysisReport) -> Result<(), DomainError> {
        let introduction = recommendation::introduction(report.kind);
        let prompt = recommendation::recommendation_prompt(
            report.kind,
            &report.audience,
            &report.structured_data,
        );
        let reply = self.llm.complete(&prompt, &[], None)?;
        let items = recommendation::extract_bullets(&reply);

        report.formatted_output =
            recommendation::append_section(&report.formatted_output, introduction, &items);
        report.recommendations = Some(Recommendations {
            introduction: introduction.to_string(),
            items,
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::ServiceConfig;
    use crate::infrastructure::{SimpleEmbedEngine, SledVectorStore};
    use parking_lot::Mutex;

    struct StaticSource(Vec<String>);

    impl TabularSource for StaticSource {
        fn search(&self, query: &str) -> Vec<String> {
            self.0
                .iter()
                .filter(|row| row.to_lowercase().contains(&query.to_lowercase()))
                .cloned()
                .collect()
        }

        fn row_count(&self) -> usize {
            self.0.len()
        }
    }

    /// Answers by prompt shape and remembers every context it was given.
    #[derive(Default)]
    struct ScriptedModel {
        audience: Option<&'static str>,
        category: &'static str,
        fail_extraction: bool,
        contexts: Mutex<Vec<Vec<String>>>,
    }

    impl LanguageModel for ScriptedModel {
        fn complete(
            &self,
            prompt: &str,
            context: &[String],
            _system: Option<&str>,
        ) -> Result<String, DomainError> {
            self.contexts.lock().push(context.to_vec());
            if prompt.contains("From the following user input") {
                if self.fail_extraction {
                    return Err(DomainError::llm("connection refused"));
                }
                return Ok(match self.audience {
                    Some(audience) => format!(
                        r#"{{"question": "Who buys them?", "audience": "{audience}"}}"#
                    ),
                    None => r#"{"question": "Who?", "audience": null}"#.to_string(),
                });
            }
            if prompt.contains("Classify the following question") {
                return Ok(self.category.to_string());
            }
            if prompt.contains("provide 3-5 concrete") {
                return Ok("• Target commuters\n• Partner with bike shops".to_string());
            }
            Ok("🚲 Usage Analysis\n{\"behavior\": {\"usage_summary\": \"daily\"}}".to_string())
        }
    }

    fn supervisor(dir: &std::path::Path, model: Arc<ScriptedModel>) -> SupervisorService {
        let embedder = Arc::new(SimpleEmbedEngine::new("test/hash", 64));
        let store = Arc::new(SledVectorStore::open(dir).unwrap());
        let reviews = Arc::new(ReviewService::new(
            embedder,
            store,
            ServiceConfig::with_model("test/hash"),
        ));
        reviews
            .ingest_texts(&[
                "Reviewer: Ann | Review: my e-bikes commute is faster".to_string(),
                "Reviewer: Bob | Review: blender is loud".to_string(),
            ])
            .unwrap();
        let source = Arc::new(StaticSource(vec![
            "Reviewer: Cy | Review: e-bikes for errands".to_string(),
            "Reviewer: Ann | Review: my e-bikes commute is faster".to_string(),
        ]));
        SupervisorService::new(reviews, source, model, SupervisorConfig::default())
    }

    #[test]
    fn answered_question_carries_analysis_and_recommendations() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel {
            audience: Some("e-bikes"),
            category: "usage",
            ..Default::default()
        });
        let supervisor = supervisor(dir.path(), Arc::clone(&model));

        let outcome = supervisor
            .process_question("How do people use e-bikes?")
            .unwrap();
        let QuestionOutcome::Answered(report) = outcome else {
            panic!("expected an answer");
        };

        assert_eq!(report.kind, AnalysisKind::Usage);
        assert_eq!(report.audience, "e-bikes");
        assert_eq!(report.structured_data["behavior"]["usage_summary"], "daily");
        assert!(report.formatted_output.starts_with("🚲 Usage Analysis"));
        assert!(report
            .formatted_output
            .contains("📋 **Recommendations**:\nI just got info from the usage behavior agent"));
        assert_eq!(
            report.recommendations.as_ref().unwrap().items,
            vec!["• Target commuters", "• Partner with bike shops"]
        );
        let steps: Vec<(&str, Option<&str>, &str)> = report
            .steps
            .iter()
            .map(|step| {
                (
                    step.agent.as_str(),
                    step.subject.as_deref(),
                    step.status.as_str(),
                )
            })
            .collect();
        assert_eq!(
            steps,
            vec![
                ("supervisor", None, "Analyzing user request"),
                ("supervisor", None, "Routing to usage agent"),
                ("usage", None, "Running analysis"),
                ("usage", Some("e-bikes"), "Retrieving data"),
                ("usage", Some("e-bikes"), "Analyzing usage behaviors"),
                ("usage", Some("e-bikes"), "Formatting results"),
                ("recommendation", None, "Adding recommendations"),
                ("supervisor", None, "Complete"),
            ]
        );
    }

    #[test]
    fn analysis_context_is_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel {
            audience: Some("e-bikes"),
            category: "usage",
            ..Default::default()
        });
        let supervisor = supervisor(dir.path(), Arc::clone(&model));

        let data = supervisor.relevant_data("e-bikes").unwrap();
        let ann = "Reviewer: Ann | Review: my e-bikes commute is faster".to_string();
        assert_eq!(data.iter().filter(|text| **text == ann).count(), 1);
        assert!(data.contains(&"Reviewer: Cy | Review: e-bikes for errands".to_string()));
    }

    #[test]
    fn missing_audience_asks_for_clarification() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel {
            category: "usage",
            ..Default::default()
        });
        let supervisor = supervisor(dir.path(), model);

        match supervisor.process_question("hello there").unwrap() {
            QuestionOutcome::ClarificationNeeded { message } => {
                assert_eq!(message, CLARIFICATION_MESSAGE)
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn extraction_failure_uses_pattern_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel {
            fail_extraction: true,
            category: "not-a-category",
            ..Default::default()
        });
        let supervisor = supervisor(dir.path(), model);

        let QuestionOutcome::Answered(report) = supervisor
            .process_question("What is the income of e-bikes buyers?")
            .unwrap()
        else {
            panic!("expected an answer");
        };
        assert_eq!(report.audience, "e-bikes buyers");
        assert_eq!(report.kind, AnalysisKind::Demographics);
    }

    #[test]
    fn empty_and_oversized_questions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor(dir.path(), Arc::new(ScriptedModel::default()));

        assert!(matches!(
            supervisor.process_question("   "),
            Err(DomainError::Validation(_))
        ));
        let long = "a".repeat(MAX_QUESTION_CHARS + 1);
        assert!(matches!(
            supervisor.process_question(&long),
            Err(DomainError::LimitExceeded(_))
        ));
    }
}
