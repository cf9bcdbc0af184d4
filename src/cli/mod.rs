//! # CLI Module
//!
//! This module provides the command-line interface layer for spafcli. It
//! wires the configuration, the Spotify client and the export pipeline
//! together and renders progress for the user.
//!
//! ## Commands
//!
//! - [`export`] - Exports audio features for all playlists of a user, or for
//!   an explicit list of playlists, into a CSV file
//!
//! ## Architecture Design
//!
//! ```text
//! CLI Layer (User Interface, progress rendering)
//!     ↓
//! Export Layer (pipeline, CSV sink)
//!     ↓
//! API Layer (Spotify integration)
//!     ↓
//! Network Layer (HTTP Requests)
//! ```
//!
//! The export layer reports progress as events; this layer decides how they
//! look. Long-running work shows a spinner, skipped playlists and tracks are
//! printed as warnings, and a summary table closes every run.
//!
//! ## Usage Patterns
//!
//! ```bash
//! spafcli user wizzler                          # All playlists of a user
//! spafcli playlists 5c27ZSdCgRmdeLgHvKpyhu      # Selected playlists
//! spafcli user wizzler --output features.csv    # Custom output file
//! spafcli user wizzler --max-retries 3          # Fewer rate limit retries
//! ```

mod export;

pub use export::export;
