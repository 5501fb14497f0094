//! In-memory lecture store.
//!
//! Records live for the lifetime of the process. There is no eviction and
//! nothing is persisted.

use crate::study::{AnalysisResult, QuizResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Where the analyzed text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    /// The video's captions.
    Transcript,
    /// Title and description, used when no captions were available.
    Metadata,
}

impl std::fmt::Display for TextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextSource::Transcript => write!(f, "transcript"),
            TextSource::Metadata => write!(f, "metadata"),
        }
    }
}

/// Pipeline stage that can fall back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Metadata,
    Transcript,
    Analysis,
    Quiz,
}

/// A stage that produced its fallback value, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFallback {
    pub stage: Stage,
    pub reason: String,
}

/// Notes and quiz generated for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LectureRecord {
    pub id: String,
    pub video_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub analysis: AnalysisResult,
    pub mcqs: QuizResult,
    pub text_source: TextSource,
    #[serde(default)]
    pub fallbacks: Vec<StageFallback>,
}

/// Short listing entry for a stored lecture.
#[derive(Debug, Clone, Serialize)]
pub struct LectureSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Lecture records keyed by id.
pub struct LectureStore {
    records: RwLock<HashMap<String, LectureRecord>>,
}

impl LectureStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a record under its id, replacing any record with the same id.
    pub fn put(&self, record: LectureRecord) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(record.id.clone(), record);
    }

    /// Look a record up by id.
    pub fn get(&self, id: &str) -> Option<LectureRecord> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summaries of all records, newest first.
    pub fn list(&self) -> Vec<LectureSummary> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut summaries: Vec<LectureSummary> = records
            .values()
            .map(|r| LectureSummary {
                id: r.id.clone(),
                title: r.title.clone(),
                created_at: r.created_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }
}

impl Default for LectureStore {
    fn default() -> Self {
        Self::new()
    }
}
