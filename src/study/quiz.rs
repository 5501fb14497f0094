//! Multiple-choice practice questions.

use super::json::{lenient_vec, null_as_default};
use super::{parse_json_object, LanguageModel};
use crate::config::Prompts;
use crate::error::{Resolved, UpstreamFailure};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Number of options every question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A practice quiz.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuizResult {
    /// Questions that do not parse are skipped one by one.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub mcqs: Vec<Mcq>,
}

impl QuizResult {
    /// Placeholder used whenever the model cannot be reached or understood.
    pub fn fallback() -> Self {
        Self { mcqs: Vec::new() }
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mcq {
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    /// Text of the correct option.
    #[serde(default, deserialize_with = "null_as_default")]
    pub correct: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
}

impl Mcq {
    /// Index of the correct option.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o == &self.correct)
    }

    /// Bring a model-written question into shape, or reject it.
    ///
    /// Requires exactly four options. A letter answer ("B") is rewritten to
    /// the option text; an answer matching no option rejects the question.
    fn normalize(mut self) -> Option<Self> {
        if self.question.trim().is_empty() || self.options.len() != OPTIONS_PER_QUESTION {
            return None;
        }

        let answer = self.correct.trim();
        if let Some(option) = self.options.iter().find(|o| o.trim() == answer) {
            self.correct = option.clone();
            return Some(self);
        }

        let letter = answer
            .trim_end_matches([')', '.', ':'])
            .to_ascii_uppercase();
        let index = match letter.as_str() {
            "A" => 0,
            "B" => 1,
            "C" => 2,
            "D" => 3,
            _ => return None,
        };
        self.correct = self.options[index].clone();
        Some(self)
    }
}

/// Asks the model for a fixed number of multiple-choice questions.
pub struct QuizGenerator {
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
    question_count: usize,
}

impl QuizGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
            question_count: 10,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_question_count(mut self, count: usize) -> Self {
        self.question_count = count;
        self
    }

    /// Build the quiz prompt for the given text.
    pub fn prompt(&self, text: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("content".to_string(), text.to_string());
        vars.insert("count".to_string(), self.question_count.to_string());
        self.prompts.render_with_custom(&self.prompts.quiz.user, &vars)
    }

    /// Generate questions, reporting why if the model gave nothing usable.
    pub async fn try_generate(&self, text: &str) -> Result<QuizResult, UpstreamFailure> {
        let response = self.model.complete(&self.prompt(text)).await?;
        let raw: QuizResult = parse_json_object(&response)?;
        let offered = raw.mcqs.len();

        let mcqs: Vec<Mcq> = raw
            .mcqs
            .into_iter()
            .filter_map(Mcq::normalize)
            .take(self.question_count)
            .collect();

        if mcqs.len() < offered {
            debug!("Kept {} of {} generated questions", mcqs.len(), offered);
        }

        Ok(QuizResult { mcqs })
    }

    /// Generate questions. Never fails; any upstream problem yields an
    /// empty quiz.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn generate(&self, text: &str) -> Resolved<QuizResult> {
        let resolved =
            Resolved::or_fallback(self.try_generate(text).await, "Quiz generation", QuizResult::fallback);
        if !resolved.is_fallback() {
            info!("Quiz ready: {} questions", resolved.value.mcqs.len());
        }
        resolved
    }
}
