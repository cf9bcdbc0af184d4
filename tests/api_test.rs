mod common;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde_json::json;
use spafcli::{
    config::{Credentials, TokenStrategy},
    error::ApiError,
    events::Silent,
    spotify::{SpotifyClient, features, paging::fetch_all, playlists},
    types::{Playlist, PlaylistItem},
};

use common::{MockCatalog, bind, features as feature_body, item, playlist, spawn, test_config};

fn catalog_with_playlists(count: usize, page_size: usize) -> MockCatalog {
    MockCatalog {
        playlists: (0..count)
            .map(|i| playlist(&format!("pl{}", i), &format!("Playlist {}", i)))
            .collect(),
        playlists_page_size: page_size,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fetch_all_collects_every_page_in_order() {
    let server = catalog_with_playlists(5, 2).start().await;
    let client = SpotifyClient::new(&test_config(&server.base), Arc::new(Silent));

    let result = playlists::get_user_playlists(&client, "alice").await.unwrap();

    let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["pl0", "pl1", "pl2", "pl3", "pl4"]);
    assert_eq!(server.hits.get("playlists"), 3);
}

#[tokio::test]
async fn test_fetch_all_single_page_with_null_next() {
    let server = catalog_with_playlists(3, 10).start().await;
    let client = SpotifyClient::new(&test_config(&server.base), Arc::new(Silent));

    let result = playlists::get_user_playlists(&client, "alice").await.unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(server.hits.get("playlists"), 1);
}

#[tokio::test]
async fn test_fetch_all_page_without_next_field() {
    let server = MockCatalog::default().start().await;
    let (listener, base) = bind().await;
    let router = Router::new().route(
        "/collection",
        get(|| async {
            Json(json!({ "items": [{ "id": "a", "name": "A" }, { "id": "b", "name": "B" }] }))
        }),
    );
    spawn(listener, router);

    // token comes from the catalog server, the collection from the plain router
    let client = SpotifyClient::new(&test_config(&server.base), Arc::new(Silent));
    let result: Vec<Playlist> = fetch_all(&client, &format!("{}/collection", base))
        .await
        .unwrap();

    assert_eq!(
        result,
        vec![
            Playlist {
                id: "a".to_string(),
                name: "A".to_string()
            },
            Playlist {
                id: "b".to_string(),
                name: "B".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_fetch_all_discards_pages_on_failure() {
    let mut catalog = MockCatalog {
        tracks_page_size: 2,
        ..Default::default()
    };
    catalog.tracks.insert(
        "pl".to_string(),
        (0..6)
            .map(|i| item(&format!("t{}", i), &format!("Track {}", i)))
            .collect(),
    );
    catalog.broken_track_pages.insert("pl".to_string(), 2);
    let server = catalog.start().await;
    let client = SpotifyClient::new(&test_config(&server.base), Arc::new(Silent));

    let result: Result<Vec<PlaylistItem>, ApiError> =
        playlists::get_playlist_tracks(&client, "pl").await;

    assert!(matches!(result, Err(ApiError::RequestFailure { .. })));
    assert_eq!(server.hits.get("tracks:pl"), 3);
}

#[tokio::test]
async fn test_playlist_details_by_id() {
    let server = catalog_with_playlists(2, 10).start().await;
    let client = SpotifyClient::new(&test_config(&server.base), Arc::new(Silent));

    let details = playlists::get_playlist(&client, "pl1").await.unwrap();
    assert_eq!(details.name, "Playlist 1");

    let missing = playlists::get_playlist(&client, "nope").await.unwrap_err();
    assert_eq!(missing.status(), Some(reqwest::StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_audio_features_keep_feature_order() {
    let mut catalog = MockCatalog::default();
    catalog.features.insert("t1".to_string(), feature_body(7));
    let server = catalog.start().await;
    let client = SpotifyClient::new(&test_config(&server.base), Arc::new(Silent));

    let result = features::get_audio_features(&client, "t1").await.unwrap();
    let values: Vec<String> = result.values().iter().map(|n| n.to_string()).collect();

    assert_eq!(values.join(","), common::feature_columns(7));
}

#[tokio::test]
async fn test_audio_features_incomplete_body_is_rejected() {
    let mut catalog = MockCatalog::default();
    catalog
        .features
        .insert("t1".to_string(), json!({ "danceability": 0.5, "energy": 0.1 }));
    let server = catalog.start().await;
    let client = SpotifyClient::new(&test_config(&server.base), Arc::new(Silent));

    let err = features::get_audio_features(&client, "t1").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}

#[tokio::test]
async fn test_cached_token_is_reused() {
    let server = catalog_with_playlists(5, 2).start().await;
    let client = SpotifyClient::new(&test_config(&server.base), Arc::new(Silent));

    playlists::get_user_playlists(&client, "alice").await.unwrap();
    playlists::get_playlist(&client, "pl0").await.unwrap();

    assert_eq!(server.hits.get("token"), 1);
}

#[tokio::test]
async fn test_per_request_strategy_fetches_token_every_time() {
    let server = catalog_with_playlists(5, 2).start().await;
    let mut config = test_config(&server.base);
    config.token_strategy = TokenStrategy::PerRequest;
    let client = SpotifyClient::new(&config, Arc::new(Silent));

    playlists::get_user_playlists(&client, "alice").await.unwrap();

    assert_eq!(server.hits.get("playlists"), 3);
    assert_eq!(server.hits.get("token"), 3);
}

#[tokio::test]
async fn test_rejected_credentials_are_auth_failure() {
    let server = catalog_with_playlists(1, 10).start().await;
    let mut config = test_config(&server.base);
    config.credentials = Credentials {
        client_id: "someone-else".to_string(),
        client_secret: "wrong".to_string(),
    };
    let client = SpotifyClient::new(&config, Arc::new(Silent));

    let err = playlists::get_user_playlists(&client, "alice")
        .await
        .unwrap_err();

    match err {
        ApiError::AuthFailure { status, body } => {
            assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
            assert!(body.contains("invalid_client"));
        }
        other => panic!("expected AuthFailure, got {:?}", other),
    }
    assert_eq!(server.hits.get("playlists"), 0);
}

#[tokio::test]
async fn test_fetch_all_drops_null_entries() {
    let mut catalog = catalog_with_playlists(3, 2);
    catalog.playlists.insert(1, serde_json::Value::Null);
    let server = catalog.start().await;
    let client = SpotifyClient::new(&test_config(&server.base), Arc::new(Silent));

    let result = playlists::get_user_playlists(&client, "alice").await.unwrap();

    let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["pl0", "pl1", "pl2"]);
    assert_eq!(server.hits.get("playlists"), 2);
}
