use std::{sync::Arc, time::Duration};

use rand::Rng;
use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use serde_json::Value;
use tokio::time::sleep;

use crate::{
    config::RetryPolicy,
    error::ApiError,
    events::{RunEvent, RunObserver},
};

/// Issues authorized GET requests and retries them while the API answers
/// with 429 Too Many Requests.
///
/// # Rate Limiting
///
/// - 200 returns the parsed JSON body
/// - 429 sleeps and retries; a `Retry-After` header (integer seconds) wins
///   over the exponential estimate `initial_backoff * 2^attempt + jitter`
/// - any other status fails immediately with [`ApiError::RequestFailure`]
/// - after `max_retries` rate limited attempts the request fails with
///   [`ApiError::RetriesExhausted`]
///
/// No ceiling is applied to the delay besides the attempt count.
pub struct RetryingRequester {
    http: Client,
    policy: RetryPolicy,
    observer: Arc<dyn RunObserver>,
}

impl RetryingRequester {
    pub fn new(http: Client, policy: RetryPolicy, observer: Arc<dyn RunObserver>) -> Self {
        Self {
            http,
            policy,
            observer,
        }
    }

    pub async fn get(&self, url: &str, token: &str) -> Result<Value, ApiError> {
        let attempts = self.policy.max_retries.max(1);

        for attempt in 0..attempts {
            let response = self.http.get(url).bearer_auth(token).send().await?;
            let status = response.status();

            if status == StatusCode::OK {
                return response.json::<Value>().await.map_err(|e| ApiError::Decode {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }

            if status != StatusCode::TOO_MANY_REQUESTS {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::RequestFailure {
                    url: url.to_string(),
                    status,
                    body,
                });
            }

            // no point in waiting once the last attempt is spent
            if attempt + 1 == attempts {
                break;
            }

            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let delay = backoff_delay(&self.policy, attempt, retry_after, &mut rand::rng());

            self.observer.on_event(&RunEvent::RateLimited {
                url: url.to_string(),
                attempt,
                delay,
            });
            sleep(delay).await;
        }

        Err(ApiError::RetriesExhausted {
            url: url.to_string(),
            attempts,
        })
    }
}

/// Parses a `Retry-After` value given in whole seconds.
///
/// HTTP-date values are not supported and yield `None`, which makes the
/// caller fall back to exponential backoff.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Computes how long to wait before retrying after the 0-based `attempt`.
///
/// A server supplied `retry_after` is used as is. Otherwise the delay is
/// `initial_backoff * 2^attempt` plus a uniform random jitter in
/// `[0, policy.jitter)`.
pub fn backoff_delay<R: Rng>(
    policy: &RetryPolicy,
    attempt: u32,
    retry_after: Option<Duration>,
    rng: &mut R,
) -> Duration {
    if let Some(delay) = retry_after {
        return delay;
    }

    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    let base = policy.initial_backoff.saturating_mul(factor);

    let jitter = policy.jitter.as_secs_f64();
    if jitter > 0.0 {
        base.saturating_add(Duration::from_secs_f64(rng.random_range(0.0..jitter)))
    } else {
        base
    }
}
