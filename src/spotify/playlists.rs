use crate::{
    error::ApiError,
    spotify::{SpotifyClient, paging::fetch_all},
    types::{Playlist, PlaylistItem},
};

/// Page size for `/users/{id}/playlists` (API maximum).
const PLAYLISTS_PAGE_LIMIT: &str = "50";
/// Page size for `/playlists/{id}/tracks` (API maximum).
const TRACKS_PAGE_LIMIT: &str = "100";

/// Retrieves every playlist of a user, following pagination.
///
/// # API Endpoint
///
/// `GET /users/{user_id}/playlists?limit=50`
pub async fn get_user_playlists(
    client: &SpotifyClient,
    user_id: &str,
) -> Result<Vec<Playlist>, ApiError> {
    let url = client.endpoint(
        &["users", user_id, "playlists"],
        &[("limit", PLAYLISTS_PAGE_LIMIT)],
    )?;
    fetch_all(client, &url).await
}

/// Retrieves id and name of a single playlist without listing its tracks.
///
/// # API Endpoint
///
/// `GET /playlists/{playlist_id}?fields=id,name`
pub async fn get_playlist(client: &SpotifyClient, playlist_id: &str) -> Result<Playlist, ApiError> {
    let url = client.endpoint(&["playlists", playlist_id], &[("fields", "id,name")])?;
    let json = client.get_json(&url).await?;

    serde_json::from_value(json).map_err(|e| ApiError::Decode {
        url,
        reason: e.to_string(),
    })
}

/// Retrieves all items of a playlist in playlist order.
///
/// # API Endpoint
///
/// `GET /playlists/{playlist_id}/tracks?limit=100`
pub async fn get_playlist_tracks(
    client: &SpotifyClient,
    playlist_id: &str,
) -> Result<Vec<PlaylistItem>, ApiError> {
    let url = client.endpoint(
        &["playlists", playlist_id, "tracks"],
        &[("limit", TRACKS_PAGE_LIMIT)],
    )?;
    fetch_all(client, &url).await
}
