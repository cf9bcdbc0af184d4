use chrono::Utc;
use reqwest::{Client, StatusCode};

use crate::{
    config::Credentials,
    error::ApiError,
    types::{Token, TokenResponse},
};

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Exchanges client credentials for a bearer token.
///
/// Stateless: every call is a fresh round trip to the token endpoint and
/// nothing is retried. Caching lives in [`crate::management::TokenManager`].
#[derive(Debug, Clone)]
pub struct TokenProvider {
    http: Client,
    token_url: String,
    credentials: Credentials,
}

impl TokenProvider {
    pub fn new(http: Client, token_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            credentials,
        }
    }

    /// Requests a token using the client-credentials grant.
    ///
    /// # Errors
    ///
    /// - [`ApiError::AuthFailure`] when the endpoint answers with anything
    ///   but 200, carrying status and response body
    /// - [`ApiError::Network`] when the endpoint cannot be reached
    /// - [`ApiError::Decode`] when the 200 body has no `access_token`
    pub async fn acquire_token(&self) -> Result<Token, ApiError> {
        let res = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::AuthFailure { status, body });
        }

        let json = res
            .json::<TokenResponse>()
            .await
            .map_err(|e| ApiError::Decode {
                url: self.token_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Token {
            access_token: json.access_token,
            expires_in: json.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
            obtained_at: Utc::now().timestamp() as u64,
        })
    }
}
