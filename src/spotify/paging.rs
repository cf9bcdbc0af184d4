use serde::de::DeserializeOwned;

use crate::{error::ApiError, spotify::SpotifyClient, types::Page};

/// Follows the `next` links of a paginated collection until they run out.
///
/// Items are returned in the order the API delivered them and `null` entries
/// are left out. A missing or null `next` ends the collection. If any page
/// cannot be fetched or decoded, the whole collection fails and the items
/// gathered so far are dropped; callers never see a partially filled
/// sequence.
///
/// # Example
///
/// ```
/// let url = client.endpoint(&["users", "wizzler", "playlists"], &[("limit", "50")])?;
/// let playlists: Vec<Playlist> = fetch_all(&client, &url).await?;
/// ```
pub async fn fetch_all<T: DeserializeOwned>(
    client: &SpotifyClient,
    initial_url: &str,
) -> Result<Vec<T>, ApiError> {
    let mut items = Vec::new();
    let mut next = Some(initial_url.to_string());

    while let Some(url) = next {
        let json = client.get_json(&url).await?;
        let page: Page<T> = serde_json::from_value(json).map_err(|e| ApiError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        items.extend(page.items.into_iter().flatten());
        next = page.next;
    }

    Ok(items)
}
