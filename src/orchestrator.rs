//! Pipeline orchestrator for LectureMind.
//!
//! Coordinates a lecture from URL to stored notes: video id, metadata and
//! transcript lookups, text source selection, analysis, quiz generation and
//! storage.

use crate::config::{Prompts, Settings};
use crate::error::{LectureMindError, Resolved, Result};
use crate::store::{LectureRecord, LectureStore, Stage, StageFallback, TextSource};
use crate::study::{ChatModel, ContentAnalyzer, LanguageModel, QuizGenerator};
use crate::youtube::{extract_video_id, CaptionClient, MetadataSource, OEmbedClient, TranscriptSource};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// The main orchestrator for the LectureMind pipeline.
pub struct Orchestrator {
    metadata: Arc<dyn MetadataSource>,
    transcripts: Arc<dyn TranscriptSource>,
    analyzer: ContentAnalyzer,
    quiz: QuizGenerator,
    store: Arc<LectureStore>,
}

impl Orchestrator {
    /// Create an orchestrator talking to YouTube and the configured model.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let metadata = Arc::new(OEmbedClient::new(
            &settings.youtube.oembed_url,
            settings.youtube.metadata_timeout(),
        )?);

        let transcripts = Arc::new(CaptionClient::new(
            settings.youtube.transcript_languages.clone(),
            settings.youtube.transcript_timeout(),
        )?);

        let model = Arc::new(ChatModel::from_settings(&settings.llm)?);
        info!("Using model {} at {}", settings.llm.model, settings.llm.api_base);

        Ok(Self::with_components(
            metadata,
            transcripts,
            model,
            prompts,
            settings.llm.quiz_size,
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        metadata: Arc<dyn MetadataSource>,
        transcripts: Arc<dyn TranscriptSource>,
        model: Arc<dyn LanguageModel>,
        prompts: Prompts,
        quiz_size: usize,
    ) -> Self {
        Self {
            metadata,
            transcripts,
            analyzer: ContentAnalyzer::new(model.clone()).with_prompts(prompts.clone()),
            quiz: QuizGenerator::new(model)
                .with_prompts(prompts)
                .with_question_count(quiz_size),
            store: Arc::new(LectureStore::new()),
        }
    }

    /// Get a reference to the lecture store.
    pub fn store(&self) -> Arc<LectureStore> {
        self.store.clone()
    }

    /// Look up a processed lecture.
    pub fn lecture(&self, id: &str) -> Result<LectureRecord> {
        self.store
            .get(id)
            .ok_or_else(|| LectureMindError::LectureNotFound(id.to_string()))
    }

    /// Generate notes and a quiz for a YouTube URL and store the result.
    ///
    /// Only an unrecognizable URL is an error. Every upstream failure is
    /// replaced by its fallback and listed in the record's `fallbacks`.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn process(&self, url: &str) -> Result<LectureRecord> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| LectureMindError::InvalidInput("Invalid YouTube URL".to_string()))?;
        info!("Processing video {}", video_id);

        let mut fallbacks = Vec::new();

        // Metadata and transcript are independent lookups.
        let (metadata, transcript) = tokio::join!(
            self.metadata.fetch(&video_id),
            self.transcripts.fetch(&video_id)
        );
        record_fallback(&mut fallbacks, Stage::Metadata, &metadata);
        record_fallback(&mut fallbacks, Stage::Transcript, &transcript);

        let metadata = metadata.into_value();
        let (text, text_source) = match transcript.into_value() {
            Some(transcript) => (transcript.text(), TextSource::Transcript),
            None => (metadata.as_source_text(), TextSource::Metadata),
        };
        info!(
            "Analyzing {} characters from {} for '{}'",
            text.len(),
            text_source,
            metadata.title
        );

        let (analysis, mcqs) = tokio::join!(self.analyzer.analyze(&text), self.quiz.generate(&text));
        record_fallback(&mut fallbacks, Stage::Analysis, &analysis);
        record_fallback(&mut fallbacks, Stage::Quiz, &mcqs);

        let record = LectureRecord {
            id: Uuid::new_v4().to_string(),
            video_id,
            title: metadata.title,
            created_at: Utc::now(),
            analysis: analysis.into_value(),
            mcqs: mcqs.into_value(),
            text_source,
            fallbacks,
        };

        self.store.put(record.clone());
        info!(
            "Stored lecture {} ({} fallbacks)",
            record.id,
            record.fallbacks.len()
        );

        Ok(record)
    }
}

fn record_fallback<T>(fallbacks: &mut Vec<StageFallback>, stage: Stage, resolved: &Resolved<T>) {
    if let Some(reason) = &resolved.fallback {
        fallbacks.push(StageFallback {
            stage,
            reason: reason.to_string(),
        });
    }
}
