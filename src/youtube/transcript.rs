//! Caption retrieval through YouTube's InnerTube player API.

use super::{watch_url, TranscriptSource};
use crate::error::{Result, UpstreamFailure};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, instrument};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Client identity sent to the player endpoint. Caption URLs handed to the
/// web client require a proof-of-origin token; the Android client's do not.
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static API_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).expect("api key regex is valid")
});

static API_KEY_FALLBACK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).expect("api key regex is valid")
});

/// A timed transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub language: String,
    pub segments: Vec<TranscriptSegment>,
}

/// One caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl Transcript {
    /// Segment texts in order, separated by single spaces.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    /// `"asr"` for auto-generated tracks.
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Fetches captions by scraping the InnerTube API key from the watch page
/// and asking the player endpoint for caption tracks.
pub struct CaptionClient {
    client: reqwest::Client,
    base_url: String,
    languages: Vec<String>,
}

impl CaptionClient {
    /// Create a client that tries `languages` in order.
    pub fn new(languages: Vec<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: "https://www.youtube.com".to_string(),
            languages,
        })
    }

    /// Point the client at another host (used for the player and watch page).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn fetch_api_key(&self, video_id: &str) -> std::result::Result<String, UpstreamFailure> {
        let page_url = format!("{}/watch?v={}", self.base_url, video_id);
        debug!("Fetching watch page: {}", page_url);

        let html = self
            .client
            .get(&page_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_api_key(&html).ok_or_else(|| {
            UpstreamFailure::MalformedResponse("no InnerTube API key on watch page".to_string())
        })
    }

    async fn fetch_tracks(
        &self,
        video_id: &str,
        api_key: &str,
    ) -> std::result::Result<Vec<CaptionTrack>, UpstreamFailure> {
        let player_url = format!(
            "{}/youtubei/v1/player?key={}&prettyPrint=false",
            self.base_url, api_key
        );

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response: PlayerResponse = self
            .client
            .post(&player_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(status) = &response.playability_status {
            if status.status.as_deref().is_some_and(|s| s != "OK") {
                return Err(UpstreamFailure::NoData(format!(
                    "video {} is not playable: {}",
                    video_id,
                    status.reason.as_deref().unwrap_or("no reason given")
                )));
            }
        }

        let tracks = response
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default();

        if tracks.is_empty() {
            return Err(UpstreamFailure::NoData(format!(
                "captions are disabled for video {}",
                video_id
            )));
        }

        Ok(tracks)
    }
}

#[async_trait]
impl TranscriptSource for CaptionClient {
    #[instrument(skip(self))]
    async fn try_fetch(&self, video_id: &str) -> std::result::Result<Transcript, UpstreamFailure> {
        let api_key = self.fetch_api_key(video_id).await?;
        let tracks = self.fetch_tracks(video_id, &api_key).await?;

        let track = select_track(&tracks, &self.languages).ok_or_else(|| {
            let available: Vec<&str> = tracks.iter().map(|t| t.language_code.as_str()).collect();
            UpstreamFailure::NoData(format!(
                "no transcript in {:?} for {} (available: {:?})",
                self.languages,
                watch_url(video_id),
                available
            ))
        })?;
        debug!("Using caption track: lang={}", track.language_code);

        let xml = self
            .client
            .get(track.base_url.replace("&fmt=srv3", ""))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(Transcript {
            video_id: video_id.to_string(),
            language: track.language_code.clone(),
            segments: parse_caption_xml(&xml)?,
        })
    }
}

/// Pick the first language in preference order that has a track, taking a
/// manually written track over an auto-generated one.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        tracks
            .iter()
            .filter(|t| &t.language_code == lang)
            .min_by_key(|t| t.is_generated())
    })
}

fn extract_api_key(html: &str) -> Option<String> {
    API_KEY_REGEX
        .captures(html)
        .or_else(|| API_KEY_FALLBACK_REGEX.captures(html))
        .map(|caps| caps[1].to_string())
}

fn parse_caption_xml(xml: &str) -> std::result::Result<Vec<TranscriptSegment>, UpstreamFailure> {
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<(f64, f64)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = 0.0;
                let mut duration = 0.0;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                    match attr.key.as_ref() {
                        b"start" => start = value.unwrap_or(0.0),
                        b"dur" => duration = value.unwrap_or(0.0),
                        _ => {}
                    }
                }
                current = Some((start, duration));
            }
            Ok(Event::Text(ref e)) => {
                if let Some((start, duration)) = current.take() {
                    let raw = e.unescape().map_err(|err| {
                        UpstreamFailure::MalformedResponse(format!("caption text: {}", err))
                    })?;
                    let text = html_escape::decode_html_entities(&raw).trim().to_string();
                    if !text.is_empty() {
                        segments.push(TranscriptSegment {
                            text,
                            start,
                            duration,
                        });
                    }
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                current = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(UpstreamFailure::MalformedResponse(format!(
                    "caption XML: {}",
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_app;
    use axum::{
        routing::{get, post},
        Json, Router,
    };

    fn track(lang: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://example.test/{}", lang),
            language_code: lang.to_string(),
            kind: kind.map(str::to_string),
        }
    }

    fn langs() -> Vec<String> {
        vec!["en".to_string(), "hi".to_string()]
    }

    #[test]
    fn test_select_track_priority() {
        let tracks = vec![track("fr", None), track("hi", None), track("en", Some("asr"))];
        assert_eq!(select_track(&tracks, &langs()).unwrap().language_code, "en");

        let tracks = vec![track("fr", None), track("hi", None)];
        assert_eq!(select_track(&tracks, &langs()).unwrap().language_code, "hi");

        let tracks = vec![track("fr", None)];
        assert!(select_track(&tracks, &langs()).is_none());
    }

    #[test]
    fn test_select_track_prefers_manual() {
        let tracks = vec![track("en", Some("asr")), track("en", None)];
        let chosen = select_track(&tracks, &langs()).unwrap();
        assert!(!chosen.is_generated());
    }

    #[test]
    fn test_extract_api_key() {
        let html = r#"ytcfg.set({"INNERTUBE_API_KEY":"AIzaSyTestKey123"});"#;
        assert_eq!(extract_api_key(html), Some("AIzaSyTestKey123".to_string()));

        let html = r#"innertubeApiKey="AIzaSyOther""#;
        assert_eq!(extract_api_key(html), Some("AIzaSyOther".to_string()));

        assert_eq!(extract_api_key("<html></html>"), None);
    }

    #[test]
    fn test_parse_caption_xml() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<transcript>
    <text start="0.21" dur="2.34">Hello world</text>
    <text start="2.55" dur="1.50">it&amp;#39;s a &amp;quot;test&amp;quot;</text>
    <text start="4.05" dur="1.00"></text>
</transcript>"#;

        let segments = parse_caption_xml(xml).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello world");
        assert!((segments[0].start - 0.21).abs() < f64::EPSILON);
        assert_eq!(segments[1].text, "it's a \"test\"");
    }

    #[test]
    fn test_transcript_text_order() {
        let transcript = Transcript {
            video_id: "x".to_string(),
            language: "en".to_string(),
            segments: ["first", "second", "third"]
                .iter()
                .enumerate()
                .map(|(i, t)| TranscriptSegment {
                    text: t.to_string(),
                    start: i as f64,
                    duration: 1.0,
                })
                .collect(),
        };
        assert_eq!(transcript.text(), "first second third");
    }

    fn fake_youtube(player: serde_json::Value) -> Router {
        Router::new()
            .route(
                "/watch",
                get(|| async { r#"<script>ytcfg.set({"INNERTUBE_API_KEY":"test-key"})</script>"# }),
            )
            .route(
                "/youtubei/v1/player",
                post(move || {
                    let player = player.clone();
                    async move { Json(player) }
                }),
            )
            .route(
                "/timedtext",
                get(|| async {
                    r#"<transcript><text start="0" dur="1">intro to</text><text start="1" dur="1">graphs</text></transcript>"#
                }),
            )
    }

    #[tokio::test]
    async fn test_fetch_transcript_end_to_end() {
        // The caption URL must point back at the fake server, so bind first.
        let player_for = |base: &str| {
            serde_json::json!({
                "playabilityStatus": {"status": "OK"},
                "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                    {"baseUrl": format!("{}/timedtext?lang=hi&fmt=srv3", base), "languageCode": "hi"}
                ]}}
            })
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let app = fake_youtube(player_for(&base));
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let client = CaptionClient::new(langs(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(&base);
        let transcript = client.try_fetch("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(transcript.language, "hi");
        assert_eq!(transcript.text(), "intro to graphs");
    }

    #[tokio::test]
    async fn test_no_captions_is_absent() {
        let app = fake_youtube(serde_json::json!({"playabilityStatus": {"status": "OK"}}));
        let base = spawn_app(app).await;

        let client = CaptionClient::new(langs(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(&base);

        let err = client.try_fetch("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, UpstreamFailure::NoData(_)));

        let resolved = client.fetch("dQw4w9WgXcQ").await;
        assert!(resolved.value.is_none());
    }

    #[tokio::test]
    async fn test_unplayable_video_is_absent() {
        let app = fake_youtube(serde_json::json!({
            "playabilityStatus": {"status": "ERROR", "reason": "Video unavailable"}
        }));
        let base = spawn_app(app).await;

        let client = CaptionClient::new(langs(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(&base);
        let resolved = client.fetch("aaaaaaaaaaa").await;
        assert!(resolved.value.is_none());
        assert!(matches!(resolved.fallback, Some(UpstreamFailure::NoData(_))));
    }
}
