//! Progress events emitted while an export runs.
//!
//! The client and the pipeline never print anything themselves. They report
//! what they are doing through a [`RunObserver`] and leave rendering to the
//! caller; the command line front end turns these events into spinner
//! updates and colored status lines.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// The user's playlists were listed.
    PlaylistsListed { count: usize },
    PlaylistStarted { id: String, name: String },
    /// A playlist's tracks were fetched completely.
    TracksReady { playlist: String, count: usize },
    RowEmitted { playlist: String, track: String },
    TrackSkipped {
        playlist: String,
        track: String,
        reason: String,
    },
    PlaylistDone { playlist: String, rows: usize },
    /// A playlist contributed nothing because its details or tracks could
    /// not be fetched.
    PlaylistSkipped { playlist: String, reason: String },
    /// The API answered 429 and the request will be retried after `delay`.
    RateLimited {
        url: String,
        attempt: u32,
        delay: Duration,
    },
}

pub trait RunObserver: Send + Sync {
    fn on_event(&self, event: &RunEvent);
}

/// Observer that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl RunObserver for Silent {
    fn on_event(&self, _event: &RunEvent) {}
}
