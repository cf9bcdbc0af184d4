use std::sync::Arc;

use reqwest::{Client, Url};
use serde_json::Value;

use crate::{
    config::Config,
    error::ApiError,
    events::RunObserver,
    management::TokenManager,
    spotify::{auth::TokenProvider, request::RetryingRequester},
};

/// Entry point for every Web API call made during an export.
///
/// Bundles the HTTP client, the token manager and the retrying requester so
/// the endpoint functions in [`crate::spotify::playlists`] and
/// [`crate::spotify::features`] only deal with URLs and response shapes.
pub struct SpotifyClient {
    api_url: String,
    tokens: TokenManager,
    requester: RetryingRequester,
}

impl SpotifyClient {
    pub fn new(config: &Config, observer: Arc<dyn RunObserver>) -> Self {
        let http = Client::new();
        let provider = TokenProvider::new(
            http.clone(),
            config.token_url.clone(),
            config.credentials.clone(),
        );

        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            tokens: TokenManager::new(provider, config.token_strategy),
            requester: RetryingRequester::new(http, config.retry, observer),
        }
    }

    /// Fetches `url` with a freshly obtained bearer token.
    pub async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        let token = self.tokens.get_valid_token().await?;
        self.requester.get(url, &token).await
    }

    /// Builds an endpoint URL below the API base, percent-encoding every
    /// path segment.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<String, ApiError> {
        let mut url =
            Url::parse(&self.api_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url.to_string())
    }
}
