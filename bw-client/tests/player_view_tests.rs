//! Music page: audio and poster loaded through one token

mod helpers;

use bw_client::{BlobStore, ClientError, PlayerView};
use bw_common::api::MusicId;
use helpers::mock_server::Counters;
use helpers::{client_for, logged_in_client, MockConfig, MockServer};

fn library() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![("m1", "Blue in Green", "Miles Davis")]
}

#[tokio::test]
async fn test_load_audio_and_poster() {
    let server = MockServer::start(MockConfig {
        library: library(),
        ..Default::default()
    })
    .await;
    let blobs = BlobStore::new();
    let view = PlayerView::new(logged_in_client(&server).await, blobs.clone());

    let media = view.load(&MusicId::new("m1")).await.unwrap();

    assert_eq!(media.audio.mime(), Some("audio/mpeg"));
    assert_eq!(media.audio.read().unwrap().bytes, b"audio-m1".to_vec());
    assert!(media.audio.url().as_str().starts_with("blob:bluewaves/"));
    let poster = media.poster.unwrap();
    assert_eq!(poster.read().unwrap().bytes, b"art-m1".to_vec());

    assert_eq!(view.token().request_count(), 1);
    assert_eq!(Counters::get(&server.counters().token), 1);
    assert_eq!(blobs.live_count(), 2);
}

#[tokio::test]
async fn test_missing_poster_does_not_block_playback() {
    let server = MockServer::start(MockConfig {
        library: library(),
        missing_cover_art: vec!["m1"],
        ..Default::default()
    })
    .await;
    let view = PlayerView::new(logged_in_client(&server).await, BlobStore::new());

    let media = view.load(&MusicId::new("m1")).await.unwrap();

    assert!(media.poster.is_none());
    assert!(!media.audio.is_empty());
}

#[tokio::test]
async fn test_unauthenticated_load_fetches_nothing() {
    let server = MockServer::start(MockConfig {
        library: library(),
        ..Default::default()
    })
    .await;
    let view = PlayerView::new(client_for(&server), BlobStore::new());

    let err = view.load(&MusicId::new("m1")).await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthenticated { .. }));
    assert_eq!(Counters::get(&server.counters().audio), 0);
    assert_eq!(Counters::get(&server.counters().cover_art_get), 0);
    assert_eq!(view.token().request_count(), 1);
}

#[tokio::test]
async fn test_dropping_view_releases_blobs() {
    let server = MockServer::start(MockConfig {
        library: library(),
        ..Default::default()
    })
    .await;
    let blobs = BlobStore::new();
    let view = PlayerView::new(logged_in_client(&server).await, blobs.clone());

    let media = view.load(&MusicId::new("m1")).await.unwrap();
    assert_eq!(blobs.live_count(), 2);

    drop(view);

    assert!(media.audio.is_released());
    assert!(media.poster.as_ref().unwrap().is_released());
    assert_eq!(blobs.live_count(), 0);
    assert_eq!(blobs.released_count(), 2);
}
