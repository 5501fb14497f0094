//! YouTube lookups: video ids, titles and captions.
//!
//! Metadata and transcripts sit behind traits so the pipeline can run
//! against substitutes.

mod metadata;
mod transcript;

pub use metadata::OEmbedClient;
pub use transcript::{CaptionClient, Transcript, TranscriptSegment};

use crate::error::{Resolved, UpstreamFailure};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// An 11-character id after `v=` or a `/`.
static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("video id regex is valid")
});

/// Extract the video id from a YouTube URL.
///
/// Only the shape of the id is checked; whether the video exists is left to
/// the lookups that follow.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Title and description of a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
}

impl VideoMetadata {
    pub const UNKNOWN_TITLE: &'static str = "Unknown Title";
    pub const NO_DESCRIPTION: &'static str = "Description not available";

    /// Placeholder used when the lookup fails.
    pub fn fallback() -> Self {
        Self {
            title: Self::UNKNOWN_TITLE.to_string(),
            description: Self::NO_DESCRIPTION.to_string(),
        }
    }

    /// Text to analyze when no transcript exists.
    pub fn as_source_text(&self) -> String {
        format!("{}\n{}", self.title, self.description)
    }
}

/// Source of video titles.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Look up metadata, reporting why it failed.
    async fn try_fetch(&self, video_id: &str) -> Result<VideoMetadata, UpstreamFailure>;

    /// Look up metadata. Never fails; falls back to [`VideoMetadata::fallback`].
    async fn fetch(&self, video_id: &str) -> Resolved<VideoMetadata> {
        Resolved::or_fallback(
            self.try_fetch(video_id).await,
            "Video metadata",
            VideoMetadata::fallback,
        )
    }
}

/// Source of timed transcripts.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript, reporting why it failed.
    async fn try_fetch(&self, video_id: &str) -> Result<Transcript, UpstreamFailure>;

    /// Fetch the transcript. Never fails; absent when no usable captions exist.
    async fn fetch(&self, video_id: &str) -> Resolved<Option<Transcript>> {
        let result = match self.try_fetch(video_id).await {
            Ok(transcript) if transcript.text().trim().is_empty() => Err(UpstreamFailure::NoData(
                format!("transcript for {} is empty", video_id),
            )),
            other => other.map(Some),
        };
        Resolved::or_fallback(result, "Transcript", || None)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?start=30"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=a-b_c1234Z9"),
            Some("a-b_c1234Z9".to_string())
        );
    }

    #[test]
    fn test_extract_video_id_no_match() {
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
        // A bare id has no separator in front of it.
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_metadata_source_text() {
        let metadata = VideoMetadata {
            title: "Linear Algebra 1".to_string(),
            description: VideoMetadata::NO_DESCRIPTION.to_string(),
        };
        assert_eq!(
            metadata.as_source_text(),
            "Linear Algebra 1\nDescription not available"
        );
    }

    #[tokio::test]
    async fn test_metadata_fetch_absorbs_failure() {
        let source = FixedMetadata(Err(UpstreamFailure::Timeout));
        let resolved = source.fetch("dQw4w9WgXcQ").await;
        assert_eq!(resolved.value, VideoMetadata::fallback());
        assert_eq!(resolved.fallback, Some(UpstreamFailure::Timeout));
    }

    #[tokio::test]
    async fn test_transcript_fetch_absent_on_failure() {
        let source = FixedTranscript(Err(UpstreamFailure::NoData("captions disabled".into())));
        let resolved = source.fetch("dQw4w9WgXcQ").await;
        assert!(resolved.value.is_none());
        assert!(resolved.is_fallback());
    }

    #[tokio::test]
    async fn test_transcript_fetch_empty_is_absent() {
        let source = FixedTranscript(Ok(vec![]));
        let resolved = source.fetch("dQw4w9WgXcQ").await;
        assert!(resolved.value.is_none());
        assert!(matches!(resolved.fallback, Some(UpstreamFailure::NoData(_))));
    }

    #[tokio::test]
    async fn test_transcript_fetch_joins_text() {
        let source = FixedTranscript(Ok(vec!["hello", "world"]));
        let resolved = source.fetch("dQw4w9WgXcQ").await;
        assert_eq!(resolved.value.unwrap().text(), "hello world");
    }
}
