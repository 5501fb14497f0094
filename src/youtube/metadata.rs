//! Video titles from the public oEmbed endpoint.

use super::{watch_url, MetadataSource, VideoMetadata};
use crate::error::{LectureMindError, Result, UpstreamFailure};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
}

/// oEmbed lookup client.
///
/// oEmbed carries no description, so the description is always the
/// placeholder text.
pub struct OEmbedClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl OEmbedClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            LectureMindError::Config(format!("Invalid oEmbed URL {}: {}", endpoint, e))
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, endpoint })
    }

    fn request_url(&self, video_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("url", &watch_url(video_id))
            .append_pair("format", "json");
        url
    }
}

#[async_trait]
impl MetadataSource for OEmbedClient {
    #[instrument(skip(self))]
    async fn try_fetch(&self, video_id: &str) -> std::result::Result<VideoMetadata, UpstreamFailure> {
        let url = self.request_url(video_id);
        debug!("Fetching oEmbed metadata: {}", url);

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(UpstreamFailure::Status(response.status().as_u16()));
        }

        let body: OEmbedResponse = response.json().await?;

        Ok(VideoMetadata {
            title: body
                .title
                .unwrap_or_else(|| VideoMetadata::UNKNOWN_TITLE.to_string()),
            description: VideoMetadata::NO_DESCRIPTION.to_string(),
        })
    }
}
