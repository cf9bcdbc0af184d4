use std::{path::PathBuf, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::Config,
    error,
    events::{RunEvent, RunObserver},
    export::{AggregationPipeline, CsvFileSink, RunSource},
    info,
    spotify::SpotifyClient,
    success, utils, warning,
};

/// Renders pipeline events on the terminal.
///
/// Progress goes to a spinner line; anything worth keeping in the scrollback
/// is printed above it with the colored status macros.
struct TerminalObserver {
    pb: ProgressBar,
}

impl RunObserver for TerminalObserver {
    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::PlaylistsListed { count } => {
                self.pb.suspend(|| info!("Found {} playlists", count));
            }
            RunEvent::PlaylistStarted { name, .. } => {
                self.pb.set_message(format!("Fetching tracks of {}...", name));
            }
            RunEvent::TracksReady { playlist, count } => {
                self.pb
                    .set_message(format!("{}: fetching features of {} tracks...", playlist, count));
            }
            RunEvent::RowEmitted { playlist, track } => {
                self.pb.set_message(format!("{}: {}", playlist, track));
            }
            RunEvent::TrackSkipped {
                playlist,
                track,
                reason,
            } => {
                self.pb
                    .suspend(|| warning!("Skipping {} in {}: {}", track, playlist, reason));
            }
            RunEvent::PlaylistDone { playlist, rows } => {
                self.pb
                    .suspend(|| success!("{}: {} rows written", playlist, rows));
            }
            RunEvent::PlaylistSkipped { playlist, reason } => {
                self.pb
                    .suspend(|| warning!("Skipping playlist {}: {}", playlist, reason));
            }
            RunEvent::RateLimited {
                attempt, delay, ..
            } => {
                self.pb.suspend(|| {
                    warning!(
                        "Rate limited, retrying in {:.1}s (attempt {})",
                        delay.as_secs_f64(),
                        attempt + 1
                    )
                });
            }
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// Runs an export and prints a per-playlist summary.
///
/// The CSV file goes to `output` if given, otherwise to the configured
/// output directory under a name derived from `source`. Exits the process
/// if the run fails fatally; rows written up to that point stay in the file.
pub async fn export(config: Config, source: RunSource, output: Option<PathBuf>) {
    let path = output.unwrap_or_else(|| config.output_dir.join(source.output_file_name()));

    let pb = spinner("Starting export...");
    let observer: Arc<dyn RunObserver> = Arc::new(TerminalObserver { pb: pb.clone() });
    let client = SpotifyClient::new(&config, Arc::clone(&observer));
    let pipeline = AggregationPipeline::new(&client, observer, config.on_enumeration_failure);

    let mut sink = CsvFileSink::new(&path);
    match pipeline.run(&source, &mut sink).await {
        Ok(report) => {
            pb.finish_and_clear();

            if !report.playlists.is_empty() {
                let table = Table::new(utils::build_playlist_table_rows(&report));
                println!("{}", table);
            }

            success!(
                "Exported {} rows to {}",
                report.rows(),
                sink.path().display()
            );
        }
        Err(e) => {
            pb.finish_and_clear();
            if sink.is_open() {
                warning!("Rows written so far are kept in {}", sink.path().display());
            }
            error!("Export failed: {}", e);
        }
    }
}
