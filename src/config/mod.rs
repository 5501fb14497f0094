//! Configuration module for LectureMind.
//!
//! Handles loading application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnalysisPrompts, Prompts, QuizPrompts};
pub use settings::{LlmSettings, PromptSettings, ServerSettings, Settings, YoutubeSettings};
