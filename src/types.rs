use serde::Deserialize;
use serde_json::{Number, Value};
use tabled::Tabled;

/// Audio features exported for every track, in column order.
pub const FEATURE_NAMES: [&str; 11] = [
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
];

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// One page of a cursor-paginated collection. The API occasionally puts
/// `null` in place of an item, so entries are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<Option<T>>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

/// Envelope around a track inside a playlist. `track` is null for tracks
/// that were removed from the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    /// Null for local files.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Feature values of a single track, ordered like [`FEATURE_NAMES`].
///
/// Values keep the exact number text of the response body (`1.21e-05`
/// stays `1.21e-05`), which relies on serde_json's `arbitrary_precision`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFeatures {
    values: Vec<Number>,
}

impl AudioFeatures {
    /// Picks the exported features out of an audio-features response body.
    ///
    /// Every feature must be present and numeric; a partial feature set is
    /// rejected instead of being padded with placeholders.
    pub fn from_json(body: &Value) -> Result<Self, String> {
        let values = FEATURE_NAMES
            .iter()
            .map(|name| match body.get(name) {
                Some(Value::Number(n)) => Ok(n.clone()),
                Some(other) => Err(format!("feature {name} is not numeric: {other}")),
                None => Err(format!("feature {name} is missing")),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { values })
    }

    pub fn values(&self) -> &[Number] {
        &self.values
    }
}

/// One line of the exported table.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub playlist_name: String,
    pub track_name: String,
    pub track_id: String,
    pub features: AudioFeatures,
}

impl OutputRow {
    pub fn header() -> Vec<String> {
        let mut header = vec![
            "Playlist Name".to_string(),
            "Track Name".to_string(),
            "Track ID".to_string(),
        ];
        header.extend(FEATURE_NAMES.iter().map(|f| crate::utils::capitalize(f)));
        header
    }

    pub fn to_record(&self) -> Vec<String> {
        let mut record = vec![
            self.playlist_name.clone(),
            self.track_name.clone(),
            self.track_id.clone(),
        ];
        record.extend(self.features.values().iter().map(|n| n.to_string()));
        record
    }
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub playlist: String,
    pub tracks: usize,
    pub rows: usize,
    pub skipped: usize,
    pub status: String,
}
