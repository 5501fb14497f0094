//! OpenAI-compatible client configuration.

use crate::config::LlmSettings;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};

/// Create a chat client for the configured endpoint, reading the API key
/// from the environment.
pub fn create_client(settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = settings.api_key()?;
    create_client_with_key(settings, &api_key)
}

/// Create a chat client with an explicit API key.
///
/// The configured timeout bounds every completion request.
pub fn create_client_with_key(settings: &LlmSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(settings.timeout())
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(&settings.api_base)
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
