//! Pulling a JSON object out of free-form model output.
//!
//! Models asked for "JSON only" still wrap it in prose or code fences. The
//! slice from the first `{` to the last `}` is taken as the payload. Braces
//! inside string values or several objects in one reply can defeat this; a
//! parse failure is reported rather than guessed around.
//!
//! Inside a well-formed object, field helpers keep whatever is usable:
//! `null` reads as empty and list items of the wrong shape are skipped.

use crate::error::UpstreamFailure;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// Return the text from the first `{` through the last `}`, if any.
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

/// Extract and deserialize the JSON object embedded in a model reply.
pub fn parse_json_object<T: DeserializeOwned>(response: &str) -> Result<T, UpstreamFailure> {
    let json_str = extract_json_object(response).ok_or_else(|| {
        UpstreamFailure::MalformedResponse(format!(
            "no JSON object in response: {}",
            preview(response)
        ))
    })?;

    serde_json::from_str(json_str).map_err(|e| {
        UpstreamFailure::MalformedResponse(format!("{}. Response was: {}", e, preview(response)))
    })
}

/// Field helper: read `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Field helper: read a list, dropping items that do not fit `T`.
/// `null` is an empty list; a non-list value is still an error.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    let offered = items.len();

    let kept: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if kept.len() < offered {
        debug!("Skipped {} malformed list items", offered - kept.len());
    }
    Ok(kept)
}

fn preview(response: &str) -> &str {
    match response.char_indices().nth(200) {
        Some((idx, _)) => &response[..idx],
        None => response,
    }
}
