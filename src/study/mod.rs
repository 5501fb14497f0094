//! Study material generation.
//!
//! Turns lecture text into structured notes and a multiple-choice quiz by
//! prompting a language model and parsing the JSON it returns.

mod json;
mod notes;
mod quiz;

pub use json::{extract_json_object, parse_json_object};
pub use notes::{AnalysisResult, ContentAnalyzer, DoubtPoint};
pub use quiz::{Mcq, QuizGenerator, QuizResult};

use crate::config::LlmSettings;
use crate::error::{Result, UpstreamFailure};
use crate::openai::create_client;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::debug;

/// A text-completion service: prompt in, free text out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a single prompt and return the raw reply text.
    async fn complete(&self, prompt: &str) -> std::result::Result<String, UpstreamFailure>;
}

/// Chat completions against an OpenAI-compatible endpoint.
pub struct ChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl ChatModel {
    /// Create a model client from settings. Fails if the API key is missing.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl LanguageModel for ChatModel {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, UpstreamFailure> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(openai_failure)?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(openai_failure)?;

        debug!("Sending {} prompt characters to {}", prompt.len(), self.model);

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(openai_failure)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| UpstreamFailure::NoData("empty response from model".to_string()))
    }
}

fn openai_failure(e: OpenAIError) -> UpstreamFailure {
    match e {
        OpenAIError::Reqwest(e) => e.into(),
        OpenAIError::JSONDeserialize(e) => UpstreamFailure::MalformedResponse(e.to_string()),
        other => UpstreamFailure::Request(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Model double that answers quiz prompts and analysis prompts with
    /// canned replies and remembers what it was asked.
    pub struct ScriptedModel {
        analysis: std::result::Result<String, UpstreamFailure>,
        quiz: std::result::Result<String, UpstreamFailure>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new(
            analysis: std::result::Result<&str, UpstreamFailure>,
            quiz: std::result::Result<&str, UpstreamFailure>,
        ) -> Self {
            Self {
                analysis: analysis.map(str::to_string),
                quiz: quiz.map(str::to_string),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(failure: UpstreamFailure) -> Self {
            Self::new(Err(failure.clone()), Err(failure))
        }

        pub fn recorded(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, prompt: &str) -> std::result::Result<String, UpstreamFailure> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if prompt.contains("\"mcqs\"") {
                self.quiz.clone()
            } else {
                self.analysis.clone()
            }
        }
    }

    pub const ANALYSIS_REPLY: &str = r#"Here are your notes:
{
  "detailed_notes": "<h2>Limits</h2><ul><li>Approaching a value</li></ul>",
  "revision_notes": "Limits describe behaviour near a point",
  "key_concepts": ["Limit", "Continuity"],
  "important_questions": ["What is a limit?"],
  "doubt_points": [
    {"timestamp": "03:15", "concept": "Epsilon-delta", "explanation": "Quantifier order", "confidence": 82}
  ]
}
Good luck!"#;

    pub const QUIZ_REPLY: &str = r#"{"mcqs": [
  {"question": "What is 2 + 2?", "options": ["3", "4", "5", "22"], "correct": "4", "explanation": "Basic addition"},
  {"question": "Capital of France?", "options": ["Paris", "Rome", "Berlin", "Madrid"], "correct": "A", "explanation": "Paris"}
]}"#;
}
