//! Configuration management for the Spotify audio feature exporter.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files and bundles them into a single [`Config`] value. The config
//! is built once at startup and handed by reference to every component, so no
//! part of the crate reads the process environment on its own.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::{Res, error::ConfigError};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Loads environment variables from `.env` files.
///
/// Creates the platform-specific data directory if it doesn't exist and loads
/// variables from a `.env` file located in it under `spafcli/.env`, then from a
/// `.env` file in the working directory. Variables already present in the
/// process environment are never overwritten, and missing files are skipped.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/spafcli/.env`
/// - macOS: `~/Library/Application Support/spafcli/.env`
/// - Windows: `%LOCALAPPDATA%/spafcli/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Res<()> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spafcli/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)?;
    }
    dotenv::dotenv().ok();

    Ok(())
}

/// Client credentials used for the client-credentials grant.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Bounds for the rate-limit retry loop.
///
/// Worst-case wall-clock delay of a single request is roughly the sum of
/// `initial_backoff * 2^k + jitter` for `k` in `0..max_retries - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    /// Upper bound (exclusive) of the random delay added to each backoff.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_secs(1),
            jitter: Duration::from_secs(1),
        }
    }
}

/// How bearer tokens are obtained for outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenStrategy {
    /// Reuse a token until shortly before it expires.
    #[default]
    Cached,
    /// Request a new token before every single request.
    PerRequest,
}

/// What to leave behind when the top-level playlist listing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyOutput {
    /// Create the output file and write the header before listing.
    #[default]
    HeaderOnly,
    /// Only create the output file once the listing succeeded.
    NoFile,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub api_url: String,
    pub token_url: String,
    pub retry: RetryPolicy,
    pub token_strategy: TokenStrategy,
    pub output_dir: PathBuf,
    pub on_enumeration_failure: EmptyOutput,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// Credentials are required; endpoint URLs fall back to the public
    /// Spotify endpoints. Everything else starts from its default and is
    /// usually adjusted by command line flags afterwards.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            credentials: Credentials {
                client_id: spotify_client_id()?,
                client_secret: spotify_client_secret()?,
            },
            api_url: spotify_apiurl(),
            token_url: spotify_apitoken_url(),
            retry: RetryPolicy::default(),
            token_strategy: TokenStrategy::default(),
            output_dir: output_dir()?,
            on_enumeration_failure: EmptyOutput::default(),
        })
    }

    /// Configuration pointing at an arbitrary API host, mostly useful for
    /// talking to a local mock of the Web API.
    pub fn with_base_urls(
        credentials: Credentials,
        api_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            api_url: api_url.into(),
            token_url: token_url.into(),
            retry: RetryPolicy::default(),
            token_strategy: TokenStrategy::default(),
            output_dir: PathBuf::from("."),
            on_enumeration_failure: EmptyOutput::default(),
        }
    }
}

/// Returns the Spotify API client ID from `SPOTIFY_CLIENT_ID`.
pub fn spotify_client_id() -> Result<String, ConfigError> {
    require("SPOTIFY_CLIENT_ID")
}

/// Returns the Spotify API client secret from `SPOTIFY_CLIENT_SECRET`.
///
/// # Security Note
///
/// The client secret should be kept confidential and never exposed in logs
/// or version control.
pub fn spotify_client_secret() -> Result<String, ConfigError> {
    require("SPOTIFY_CLIENT_SECRET")
}

/// Returns the Spotify Web API base URL, e.g. `https://api.spotify.com/v1`.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Returns the token endpoint used for the client-credentials grant.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string())
}

/// Directory the CSV file is written to, from `SPAFCLI_OUTPUT_DIR`.
pub fn output_dir() -> Result<PathBuf, ConfigError> {
    match env::var("SPAFCLI_OUTPUT_DIR") {
        Ok(dir) if dir.trim().is_empty() => Err(ConfigError::InvalidValue {
            name: "SPAFCLI_OUTPUT_DIR",
            value: dir,
        }),
        Ok(dir) => Ok(PathBuf::from(dir)),
        Err(_) => Ok(PathBuf::from(".")),
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
