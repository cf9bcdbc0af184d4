use crate::{
    export::{PlaylistOutcome, RunReport},
    types::PlaylistTableRow,
};

/// Upper-cases the first character, e.g. `danceability` -> `Danceability`.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replaces every character that is awkward in a file name with `_`.
pub fn sanitize_file_component(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('.').is_empty() {
        "unknown".to_string()
    } else {
        sanitized
    }
}

pub fn build_playlist_table_rows(report: &RunReport) -> Vec<PlaylistTableRow> {
    report
        .playlists
        .iter()
        .map(|p| PlaylistTableRow {
            playlist: p.name.clone(),
            tracks: p.tracks,
            rows: p.rows,
            skipped: p.skipped_tracks,
            status: match &p.outcome {
                PlaylistOutcome::Done => "done".to_string(),
                PlaylistOutcome::Skipped(reason) => format!("skipped: {}", truncate(reason, 60)),
            },
        })
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars).collect();
    short.push('…');
    short
}
