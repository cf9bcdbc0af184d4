use std::sync::Arc;

use crate::{
    config::EmptyOutput,
    error::ExportError,
    events::{RunEvent, RunObserver},
    export::sink::RowSink,
    spotify::{SpotifyClient, features, playlists},
    types::{OutputRow, Playlist, PlaylistItem},
    utils,
};

/// Which playlists an export covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSource {
    /// Every playlist of the given user, in API order.
    User(String),
    /// The given playlists, in the given order.
    Playlists(Vec<String>),
}

impl RunSource {
    /// Default name of the CSV file for this kind of run.
    pub fn output_file_name(&self) -> String {
        match self {
            RunSource::User(user_id) => format!(
                "spotify_user_{}_audio_features.csv",
                utils::sanitize_file_component(user_id)
            ),
            RunSource::Playlists(_) => "spotify_playlist_tracks_audio_features.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistOutcome {
    /// All tracks were visited; some may still have been skipped.
    Done,
    /// Nothing was exported because the playlist itself was unobtainable.
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistReport {
    pub id: String,
    pub name: String,
    pub tracks: usize,
    pub rows: usize,
    pub skipped_tracks: usize,
    pub outcome: PlaylistOutcome,
}

impl PlaylistReport {
    fn skipped(id: &str, name: &str, reason: String) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            tracks: 0,
            rows: 0,
            skipped_tracks: 0,
            outcome: PlaylistOutcome::Skipped(reason),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub playlists: Vec<PlaylistReport>,
}

impl RunReport {
    pub fn rows(&self) -> usize {
        self.playlists.iter().map(|p| p.rows).sum()
    }
}

/// Drives an export: playlists, then their tracks, then one audio feature
/// request per track, writing each row to the sink as soon as it exists.
///
/// # Failure Handling
///
/// - the user's playlist listing failing aborts the run
/// - a playlist whose details or tracks cannot be fetched is skipped
/// - a track whose features cannot be fetched is skipped; no placeholder
///   row is written
/// - a sink error aborts the run; rows already written stay on disk
pub struct AggregationPipeline<'a> {
    client: &'a SpotifyClient,
    observer: Arc<dyn RunObserver>,
    on_enumeration_failure: EmptyOutput,
}

impl<'a> AggregationPipeline<'a> {
    pub fn new(
        client: &'a SpotifyClient,
        observer: Arc<dyn RunObserver>,
        on_enumeration_failure: EmptyOutput,
    ) -> Self {
        Self {
            client,
            observer,
            on_enumeration_failure,
        }
    }

    pub async fn run<S: RowSink>(
        &self,
        source: &RunSource,
        sink: &mut S,
    ) -> Result<RunReport, ExportError> {
        let report = match source {
            RunSource::User(user_id) => self.run_for_user(user_id, sink).await?,
            RunSource::Playlists(ids) => self.run_for_playlists(ids, sink).await?,
        };

        sink.finish()?;
        Ok(report)
    }

    async fn run_for_user<S: RowSink>(
        &self,
        user_id: &str,
        sink: &mut S,
    ) -> Result<RunReport, ExportError> {
        if self.on_enumeration_failure == EmptyOutput::HeaderOnly {
            sink.begin()?;
        }

        let user_playlists = playlists::get_user_playlists(self.client, user_id).await?;
        self.emit(RunEvent::PlaylistsListed {
            count: user_playlists.len(),
        });

        if self.on_enumeration_failure == EmptyOutput::NoFile {
            sink.begin()?;
        }

        let mut report = RunReport::default();
        for playlist in &user_playlists {
            report
                .playlists
                .push(self.export_playlist(playlist, sink).await?);
        }

        Ok(report)
    }

    async fn run_for_playlists<S: RowSink>(
        &self,
        ids: &[String],
        sink: &mut S,
    ) -> Result<RunReport, ExportError> {
        sink.begin()?;

        let mut report = RunReport::default();
        for id in ids {
            let playlist_report = match playlists::get_playlist(self.client, id).await {
                Ok(playlist) => self.export_playlist(&playlist, sink).await?,
                Err(e) => {
                    let reason = e.to_string();
                    self.emit(RunEvent::PlaylistSkipped {
                        playlist: id.clone(),
                        reason: reason.clone(),
                    });
                    PlaylistReport::skipped(id, id, reason)
                }
            };
            report.playlists.push(playlist_report);
        }

        Ok(report)
    }

    /// Exports a single playlist. Only sink errors are returned; everything
    /// the API refuses ends up in the report instead.
    async fn export_playlist<S: RowSink>(
        &self,
        playlist: &Playlist,
        sink: &mut S,
    ) -> Result<PlaylistReport, ExportError> {
        self.emit(RunEvent::PlaylistStarted {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
        });

        let items = match playlists::get_playlist_tracks(self.client, &playlist.id).await {
            Ok(items) => items,
            Err(e) => {
                let reason = e.to_string();
                self.emit(RunEvent::PlaylistSkipped {
                    playlist: playlist.name.clone(),
                    reason: reason.clone(),
                });
                return Ok(PlaylistReport::skipped(&playlist.id, &playlist.name, reason));
            }
        };

        self.emit(RunEvent::TracksReady {
            playlist: playlist.name.clone(),
            count: items.len(),
        });

        let mut report = PlaylistReport {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
            tracks: items.len(),
            rows: 0,
            skipped_tracks: 0,
            outcome: PlaylistOutcome::Done,
        };

        for item in &items {
            match self.build_row(&playlist.name, item).await {
                Ok(row) => {
                    sink.write_row(&row)?;
                    report.rows += 1;
                    self.emit(RunEvent::RowEmitted {
                        playlist: playlist.name.clone(),
                        track: row.track_name,
                    });
                }
                Err((track, reason)) => {
                    report.skipped_tracks += 1;
                    self.emit(RunEvent::TrackSkipped {
                        playlist: playlist.name.clone(),
                        track,
                        reason,
                    });
                }
            }
        }

        self.emit(RunEvent::PlaylistDone {
            playlist: playlist.name.clone(),
            rows: report.rows,
        });

        Ok(report)
    }

    /// Fetches the features of one playlist item. On failure returns the
    /// track name and the reason it was skipped.
    async fn build_row(
        &self,
        playlist_name: &str,
        item: &PlaylistItem,
    ) -> Result<OutputRow, (String, String)> {
        let Some(track) = &item.track else {
            return Err((
                "<unavailable>".to_string(),
                "track is no longer available".to_string(),
            ));
        };
        let Some(track_id) = &track.id else {
            return Err((track.name.clone(), "local track without id".to_string()));
        };

        match features::get_audio_features(self.client, track_id).await {
            Ok(features) => Ok(OutputRow {
                playlist_name: playlist_name.to_string(),
                track_name: track.name.clone(),
                track_id: track_id.clone(),
                features,
            }),
            Err(e) => Err((track.name.clone(), e.to_string())),
        }
    }

    fn emit(&self, event: RunEvent) {
        self.observer.on_event(&event);
    }
}
