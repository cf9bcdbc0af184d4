//! # Spotify Integration Module
//!
//! This module is the integration layer between spafcli and the Spotify Web
//! API. It handles token acquisition, authorized requests, rate limiting and
//! pagination, and exposes the handful of catalog endpoints the exporter
//! needs.
//!
//! ## Architecture
//!
//! ```text
//! Export Pipeline
//!          ↓
//! Endpoint functions (playlists, features)
//!          ↓
//! Pagination (follow `next` until exhausted)
//!          ↓
//! SpotifyClient (token per request + retrying requester)
//!     ├── TokenManager → TokenProvider (client credentials)
//!     └── RetryingRequester (429 handling)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - Client-credentials grant against the token endpoint. Stateless,
//!   never retried.
//! - [`request`] - Authorized GET with bounded retry on 429 Too Many Requests.
//!   `Retry-After` is honoured; without it the delay grows exponentially with
//!   a random jitter.
//! - [`paging`] - Generic "follow the `next` link" loop. All-or-nothing: one
//!   failed page fails the whole collection.
//! - [`playlists`] - User playlists, playlist details and playlist tracks.
//! - [`features`] - Audio features of a single track.
//!
//! ## Error Handling
//!
//! All functions return [`crate::error::ApiError`]:
//! - **`AuthFailure`** - the token endpoint refused the credentials
//! - **`RequestFailure`** - any non-200, non-429 answer; never retried
//! - **`RetriesExhausted`** - still rate limited after every allowed attempt
//! - **`Network`** / **`Decode`** - transport errors and unexpected bodies
//!
//! ## API Coverage
//!
//! - `POST /api/token` - Client-credentials token exchange
//! - `GET /users/{user_id}/playlists` - A user's public playlists
//! - `GET /playlists/{playlist_id}` - Playlist name
//! - `GET /playlists/{playlist_id}/tracks` - Playlist items
//! - `GET /audio-features/{track_id}` - Audio features of a track
//!
//! ## Concurrency
//!
//! Every request is awaited before the next one is sent. Rate limit sleeps
//! block the whole export, which is fine because there is nothing else to do
//! meanwhile.

pub mod auth;
mod client;
pub mod features;
pub mod paging;
pub mod playlists;
pub mod request;

pub use client::SpotifyClient;
