use chrono::Utc;
use tokio::sync::Mutex;

use crate::{config::TokenStrategy, error::ApiError, spotify::auth::TokenProvider, types::Token};

/// Seconds before expiry at which a cached token is considered stale.
const EXPIRY_BUFFER: u64 = 240;

/// Hands out bearer tokens according to the configured [`TokenStrategy`].
pub struct TokenManager {
    provider: TokenProvider,
    strategy: TokenStrategy,
    token: Mutex<Option<Token>>,
}

impl TokenManager {
    pub fn new(provider: TokenProvider, strategy: TokenStrategy) -> Self {
        TokenManager {
            provider,
            strategy,
            token: Mutex::new(None),
        }
    }

    /// Returns a token that is valid for the next request.
    ///
    /// With [`TokenStrategy::PerRequest`] every call goes to the token
    /// endpoint. With [`TokenStrategy::Cached`] the last token is reused
    /// until it is about to expire.
    pub async fn get_valid_token(&self) -> Result<String, ApiError> {
        if self.strategy == TokenStrategy::PerRequest {
            return Ok(self.provider.acquire_token().await?.access_token);
        }

        let mut lock = self.token.lock().await;
        if let Some(token) = lock.as_ref() {
            if !Self::is_expired(token) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.provider.acquire_token().await?;
        let access_token = token.access_token.clone();
        *lock = Some(token);
        Ok(access_token)
    }

    fn is_expired(token: &Token) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_BUFFER >= token.obtained_at + token.expires_in
    }
}
