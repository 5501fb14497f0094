//! Lecture notes, key concepts and doubt points.

use super::json::{lenient_vec, null_as_default};
use super::{parse_json_object, LanguageModel};
use crate::config::Prompts;
use crate::error::{Resolved, UpstreamFailure};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Structured notes produced for a lecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Detailed notes as HTML markup.
    #[serde(default, deserialize_with = "null_as_default")]
    pub detailed_notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revision_notes: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub key_concepts: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub important_questions: Vec<String>,
    /// Malformed entries are skipped rather than failing the analysis.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub doubt_points: Vec<DoubtPoint>,
}

impl AnalysisResult {
    /// Placeholder used whenever the model cannot be reached or understood.
    pub fn fallback() -> Self {
        Self {
            detailed_notes: "Notes not available".to_string(),
            revision_notes: "Revise important points".to_string(),
            key_concepts: Vec::new(),
            important_questions: Vec::new(),
            doubt_points: Vec::new(),
        }
    }
}

/// A concept the model expects learners to struggle with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubtPoint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub concept: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
    /// Share of students expected to be confused, 0-100.
    #[serde(default, deserialize_with = "deserialize_confidence")]
    pub confidence: u8,
}

/// Accepts `75`, `75.4`, `"75"` or `null`; anything out of range is clamped.
fn deserialize_confidence<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Option::<Raw>::deserialize(deserializer)? {
        None => return Ok(0),
        Some(Raw::Number(n)) => n,
        Some(Raw::Text(s)) => s
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(serde::de::Error::custom)?,
    };

    Ok(value.round().clamp(0.0, 100.0) as u8)
}

/// Asks the model for structured notes about a block of lecture text.
pub struct ContentAnalyzer {
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
}

impl ContentAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Build the analysis prompt for the given text.
    pub fn prompt(&self, text: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("content".to_string(), text.to_string());
        self.prompts.render_with_custom(&self.prompts.analysis.user, &vars)
    }

    /// Analyze text, reporting why if the model gave nothing usable.
    pub async fn try_analyze(&self, text: &str) -> Result<AnalysisResult, UpstreamFailure> {
        let response = self.model.complete(&self.prompt(text)).await?;
        parse_json_object(&response)
    }

    /// Analyze text. Never fails; any upstream problem yields
    /// [`AnalysisResult::fallback`].
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn analyze(&self, text: &str) -> Resolved<AnalysisResult> {
        let resolved = Resolved::or_fallback(
            self.try_analyze(text).await,
            "Lecture analysis",
            AnalysisResult::fallback,
        );
        if !resolved.is_fallback() {
            info!(
                "Analysis ready: {} key concepts, {} doubt points",
                resolved.value.key_concepts.len(),
                resolved.value.doubt_points.len()
            );
        }
        resolved
    }
}
