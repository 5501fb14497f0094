//! Prompt templates for LectureMind.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder regex is valid"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub analysis: AnalysisPrompts,
    pub quiz: QuizPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompt for lecture notes and doubt points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPrompts {
    pub user: String,
}

impl Default for AnalysisPrompts {
    fn default() -> Self {
        Self {
            user: r#"You are an expert university professor.

Analyze the lecture content below and STRICTLY return VALID JSON only.

CONTENT:
{{content}}

FORMAT:
{
  "detailed_notes": "Detailed structured notes with headings, points and sub-points, formatted as HTML that any browser can render",
  "revision_notes": "Short revision points, one per line",
  "key_concepts": ["Concept 1", "Concept 2"],
  "important_questions": ["Question 1", "Question 2"],
  "doubt_points": [
    {
      "timestamp": "00:10",
      "concept": "Concept Name",
      "explanation": "Why students get confused",
      "confidence": 75
    }
  ]
}"#
            .to_string(),
        }
    }
}

/// Prompt for multiple-choice question generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizPrompts {
    pub user: String,
}

impl Default for QuizPrompts {
    fn default() -> Self {
        Self {
            user: r#"Create exactly {{count}} multiple-choice questions from the content below.
Each question must have exactly 4 options. "correct" must repeat the text of the correct option.
Return ONLY JSON.

{{content}}

FORMAT:
{
  "mcqs": [
    {
      "question": "string",
      "options": ["option 1", "option 2", "option 3", "option 4"],
      "correct": "option 1",
      "explanation": "string"
    }
  ]
}"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = crate::config::Settings::expand_path(dir);

            let analysis_path = custom_path.join("analysis.toml");
            if analysis_path.exists() {
                let content = std::fs::read_to_string(&analysis_path)?;
                prompts.analysis = toml::from_str(&content)?;
            }

            let quiz_path = custom_path.join("quiz.toml");
            if quiz_path.exists() {
                let content = std::fs::read_to_string(&quiz_path)?;
                prompts.quiz = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in one pass over the template, so braces
    /// inside a substituted value are never expanded. Unknown placeholders
    /// are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER_REGEX
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
