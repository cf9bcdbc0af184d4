use crate::{error::ApiError, spotify::SpotifyClient, types::AudioFeatures};

/// Retrieves the audio features of one track.
///
/// Only the features listed in [`crate::types::FEATURE_NAMES`] are kept.
/// A response lacking any of them is reported as [`ApiError::Decode`].
///
/// # API Endpoint
///
/// `GET /audio-features/{track_id}`
pub async fn get_audio_features(
    client: &SpotifyClient,
    track_id: &str,
) -> Result<AudioFeatures, ApiError> {
    let url = client.endpoint(&["audio-features", track_id], &[])?;
    let json = client.get_json(&url).await?;

    AudioFeatures::from_json(&json).map_err(|reason| ApiError::Decode { url, reason })
}
