mod common;

use common::*;
use serde_json::json;
use spotify_remote::{
    commands::{self, CommandError, ListBehavior, MAX_ATTEMPTS, PlayAction, ShuffleAction},
    host::InstanceStatus,
    spotify::transport::{Method, RequestBody},
    state::RepeatState,
};

const VOLUME: &str = "/v1/me/player/volume";
const NEXT: &str = "/v1/me/player/next";
const PLAY: &str = "/v1/me/player/play";

async fn volume_after(current: u8, absolute: bool, value: f64) -> Option<String> {
    let session = authorized_session(FakeTransport::new()).await;
    session
        .transport()
        .respond_json(Method::Get, DEVICES, devices(Some(current)));

    commands::change_volume(&session, DEVICE_ID, absolute, value)
        .await
        .unwrap();

    let writes = session.transport().writes();
    assert!(writes.len() <= 1);
    writes.first().map(|w| {
        assert_eq!(w.path, VOLUME);
        assert_eq!(w.query_value("device_id"), Some(DEVICE_ID));
        w.query_value("volume_percent").unwrap().to_string()
    })
}

#[tokio::test]
async fn volume_is_clamped_and_rounded() {
    assert_eq!(volume_after(40, true, 150.0).await.as_deref(), Some("100"));
    assert_eq!(volume_after(40, true, -3.0).await.as_deref(), Some("0"));
    assert_eq!(volume_after(95, false, 10.0).await.as_deref(), Some("100"));
    assert_eq!(volume_after(40, false, -50.0).await.as_deref(), Some("0"));
    assert_eq!(volume_after(40, false, 2.4).await.as_deref(), Some("42"));
    assert_eq!(volume_after(40, true, 63.0).await.as_deref(), Some("63"));
}

#[tokio::test]
async fn nan_volume_makes_no_calls() {
    let session = authorized_session(FakeTransport::new()).await;

    commands::change_volume(&session, DEVICE_ID, false, f64::NAN)
        .await
        .unwrap();

    assert!(session.transport().requests().is_empty());
}

#[tokio::test]
async fn volume_of_unknown_device_is_skipped() {
    let session = authorized_session(FakeTransport::new()).await;
    session
        .transport()
        .respond_json(Method::Get, DEVICES, devices(None));

    commands::change_volume(&session, DEVICE_ID, true, 50.0)
        .await
        .unwrap();

    assert!(session.transport().writes().is_empty());
}

#[tokio::test]
async fn toggle_flips_play_state_each_time() {
    let session = authorized_session(FakeTransport::new()).await;
    session.transport().respond_playback(playback(true));
    session.transport().respond_playback(playback(false));

    commands::change_play_state(&session, DEVICE_ID, PlayAction::Toggle)
        .await
        .unwrap();
    commands::change_play_state(&session, DEVICE_ID, PlayAction::Toggle)
        .await
        .unwrap();

    let paths: Vec<_> = session
        .transport()
        .writes()
        .into_iter()
        .map(|w| w.path)
        .collect();
    assert_eq!(paths, vec!["/v1/me/player/pause", PLAY]);
}

#[tokio::test]
async fn play_while_playing_is_a_no_op() {
    let session = authorized_session(FakeTransport::new()).await;
    session.transport().respond_playback(playback(true));

    commands::change_play_state(&session, DEVICE_ID, PlayAction::Play)
        .await
        .unwrap();

    assert!(session.transport().writes().is_empty());
}

#[tokio::test]
async fn play_without_active_session_starts_playback() {
    let session = authorized_session(FakeTransport::new()).await;

    commands::change_play_state(&session, DEVICE_ID, PlayAction::Play)
        .await
        .unwrap();

    let writes = session.transport().writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].path, PLAY);
}

#[tokio::test]
async fn shuffle_writes_only_when_state_differs() {
    let session = authorized_session(FakeTransport::new()).await;
    session.transport().respond_playback(playback(true));
    session.transport().respond_playback(playback(true));

    commands::change_shuffle_state(&session, DEVICE_ID, ShuffleAction::Off)
        .await
        .unwrap();
    assert!(session.transport().writes().is_empty());

    commands::change_shuffle_state(&session, DEVICE_ID, ShuffleAction::Toggle)
        .await
        .unwrap();
    let writes = session.transport().writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].path, "/v1/me/player/shuffle");
    assert_eq!(writes[0].query_value("state"), Some("true"));
}

#[tokio::test]
async fn repeat_writes_only_when_state_differs() {
    let session = authorized_session(FakeTransport::new()).await;
    session.transport().respond_playback(playback(true));
    session.transport().respond_playback(playback(true));

    commands::change_repeat_state(&session, DEVICE_ID, RepeatState::Off)
        .await
        .unwrap();
    assert!(session.transport().writes().is_empty());

    commands::change_repeat_state(&session, DEVICE_ID, RepeatState::Track)
        .await
        .unwrap();
    let writes = session.transport().writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].query_value("state"), Some("track"));
}

#[tokio::test]
async fn seek_and_transfer_write_directly() {
    let session = authorized_session(FakeTransport::new()).await;

    commands::seek_position(&session, DEVICE_ID, 42000)
        .await
        .unwrap();
    commands::transfer_playback(&session, "other").await.unwrap();

    let writes = session.transport().writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].path, "/v1/me/player/seek");
    assert_eq!(writes[0].query_value("position_ms"), Some("42000"));
    assert_eq!(writes[1].path, PLAYER);
    assert_eq!(
        writes[1].body,
        RequestBody::Json(json!({ "device_ids": ["other"], "play": true }))
    );
}

async fn list_writes(is_playing: bool, uri: &str, behavior: ListBehavior) -> Vec<RequestBody> {
    let session = authorized_session(FakeTransport::new()).await;
    session.transport().respond_playback(playback(is_playing));

    commands::play_specific_list(&session, DEVICE_ID, uri, behavior)
        .await
        .unwrap();

    session
        .transport()
        .writes()
        .into_iter()
        .map(|w| {
            assert_eq!(w.path, PLAY);
            w.body
        })
        .collect()
}

#[tokio::test]
async fn play_specific_list_respects_behavior() {
    let current = "spotify:playlist:pl1";
    let full = RequestBody::Json(json!({ "context_uri": current }));
    let resume = RequestBody::Json(json!({}));

    assert!(list_writes(true, current, ListBehavior::Return).await.is_empty());
    assert!(list_writes(false, current, ListBehavior::Return).await.is_empty());
    assert!(list_writes(true, current, ListBehavior::Resume).await.is_empty());
    assert_eq!(list_writes(false, current, ListBehavior::Resume).await, vec![resume]);
    assert_eq!(list_writes(true, current, ListBehavior::Force).await, vec![full]);

    let other = "spotify:album:al9";
    assert_eq!(
        list_writes(true, other, ListBehavior::Return).await,
        vec![RequestBody::Json(json!({ "context_uri": other }))]
    );
}

#[tokio::test]
async fn play_specific_tracks_sends_uris_and_offset() {
    let session = authorized_session(FakeTransport::new()).await;
    let uris = vec!["spotify:track:a".to_string(), "spotify:track:b".to_string()];

    commands::play_specific_tracks(&session, DEVICE_ID, &uris, 1500)
        .await
        .unwrap();

    let writes = session.transport().writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(
        writes[0].body,
        RequestBody::Json(json!({ "uris": uris, "position_ms": 1500 }))
    );
}

#[tokio::test]
async fn unauthorized_call_is_retried_once_after_refresh() {
    let session = authorized_session(FakeTransport::new()).await;
    session.transport().respond_status(Method::Post, NEXT, 401);
    session.transport().respond_token("token-2", None);

    commands::skip_song(&session, DEVICE_ID).await.unwrap();

    let calls: Vec<_> = session
        .transport()
        .api_requests()
        .into_iter()
        .filter(|r| r.path == NEXT)
        .collect();
    assert_eq!(calls.len(), 2);
    assert_eq!(bearer(&calls[0]), Some("token-1"));
    assert_eq!(bearer(&calls[1]), Some("token-2"));
    assert_eq!(session.access_token().await.as_deref(), Some("token-2"));
}

#[tokio::test]
async fn failed_refresh_stops_retrying() {
    let session = authorized_session(FakeTransport::new()).await;
    session.transport().respond_status(Method::Post, NEXT, 401);
    session.transport().respond_status(Method::Post, TOKEN, 400);

    let result = commands::skip_song(&session, DEVICE_ID).await;

    assert!(matches!(result, Err(CommandError::Api(e)) if e.status_code == 401));
    assert_eq!(session.transport().count(Method::Post, NEXT), 1);
    assert_eq!(session.access_token().await, None);
    assert_eq!(
        session.host().last_status(),
        Some((InstanceStatus::Connecting, None))
    );
}

#[tokio::test]
async fn retries_are_bounded() {
    let session = authorized_session(FakeTransport::new()).await;
    for i in 0..=MAX_ATTEMPTS {
        session.transport().respond_status(Method::Post, NEXT, 401);
        session.transport().respond_token(&format!("token-r{i}"), None);
    }

    let result = commands::skip_song(&session, DEVICE_ID).await;

    assert!(matches!(result, Err(CommandError::Api(e)) if e.status_code == 401));
    assert_eq!(
        session.transport().count(Method::Post, NEXT),
        MAX_ATTEMPTS as usize
    );
    assert_eq!(
        session.transport().count(Method::Post, TOKEN),
        MAX_ATTEMPTS as usize - 1
    );
}

#[tokio::test]
async fn other_errors_fail_immediately() {
    let session = authorized_session(FakeTransport::new()).await;
    session.transport().respond_status(Method::Post, NEXT, 502);

    let result = commands::skip_song(&session, DEVICE_ID).await;

    assert!(matches!(result, Err(CommandError::Api(e)) if e.status_code == 502));
    assert_eq!(session.transport().count(Method::Post, NEXT), 1);
    assert_eq!(session.transport().count(Method::Post, TOKEN), 0);
}

#[tokio::test]
async fn commands_require_an_access_token() {
    let session = session(FakeTransport::new(), config());

    let result = commands::skip_song(&session, DEVICE_ID).await;

    assert!(matches!(result, Err(CommandError::NotAuthorized)));
    assert!(session.transport().requests().is_empty());
}

#[tokio::test]
async fn active_device_is_read_from_device_list() {
    let session = authorized_session(FakeTransport::new()).await;
    session
        .transport()
        .respond_json(Method::Get, DEVICES, devices(Some(40)));

    let active = commands::active_device_id(&session).await.unwrap();

    assert_eq!(active.as_deref(), Some(DEVICE_ID));
}
