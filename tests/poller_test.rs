mod common;

use std::{sync::Arc, time::Duration};

use common::*;
use serde_json::json;
use spotify_remote::{
    feedbacks::FeedbackId,
    host::InstanceStatus,
    poller::{self, PollOutcome, PollQueue},
    spotify::transport::Method,
    variables::{VariableId, VariableValue},
};
use tokio::time::{sleep, timeout};

#[tokio::test]
async fn successful_poll_publishes_full_snapshot_once() {
    let session = authorized_session(FakeTransport::new()).await;
    session.transport().respond_playback(playback(true));
    session.transport().respond_playback(playback(true));

    assert_eq!(poller::poll_playback_state(&session).await, PollOutcome::Updated);
    assert_eq!(poller::poll_playback_state(&session).await, PollOutcome::Updated);

    let updates = session.host().variable_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].len(), VariableId::ALL.len());
    assert_eq!(session.host().feedback_checks(), vec![FeedbackId::ALL.to_vec()]);
    assert_eq!(session.host().last_status(), Some((InstanceStatus::Ok, None)));

    let state = session.playback_state().await.unwrap();
    assert!(state.is_playing);
    assert_eq!(state.current_context.as_deref(), Some("pl1"));
}

#[tokio::test]
async fn no_active_session_keeps_state_unknown() {
    let session = authorized_session(FakeTransport::new()).await;

    assert_eq!(poller::poll_playback_state(&session).await, PollOutcome::Updated);

    assert_eq!(session.playback_state().await, None);
    assert!(session.host().variable_updates().is_empty());
    assert!(session.host().feedback_checks().is_empty());
}

#[tokio::test]
async fn bare_track_becomes_current_context() {
    let session = authorized_session(FakeTransport::new()).await;
    let mut body = playback(true);
    body["context"] = json!(null);
    session.transport().respond_playback(body);

    poller::poll_playback_state(&session).await;

    let state = session.playback_state().await.unwrap();
    assert_eq!(state.current_context.as_deref(), Some("tr1"));
}

#[tokio::test]
async fn failed_poll_clears_state_and_reports_failure() {
    let session = authorized_session(FakeTransport::new()).await;
    session.transport().respond_playback(playback(true));
    session.transport().respond_status(Method::Get, PLAYER, 503);

    poller::poll_playback_state(&session).await;
    assert_eq!(poller::poll_playback_state(&session).await, PollOutcome::Failed);

    assert_eq!(session.playback_state().await, None);
    assert_eq!(
        session.host().last_status(),
        Some((
            InstanceStatus::ConnectionFailure,
            Some("Failed to query Api".to_string())
        ))
    );

    let updates = session.host().variable_updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1][&VariableId::IsPlaying], VariableValue::Bool(false));
    assert_eq!(
        updates[1][&VariableId::DeviceName],
        VariableValue::Text("-".into())
    );
}

#[tokio::test]
async fn expired_token_asks_for_another_poll() {
    let session = authorized_session(FakeTransport::new()).await;
    session.transport().respond_status(Method::Get, PLAYER, 401);
    session.transport().respond_token("token-2", None);

    assert_eq!(poller::poll_playback_state(&session).await, PollOutcome::Retry);

    assert_eq!(
        session.host().statuses(),
        vec![
            (
                InstanceStatus::ConnectionFailure,
                Some("Failed to query Api".to_string())
            ),
            (InstanceStatus::Ok, None),
        ]
    );
    assert!(session.host().variable_updates().is_empty());
}

#[tokio::test]
async fn third_poll_is_dropped_while_one_runs_and_one_waits() {
    let session = Arc::new(authorized_session(FakeTransport::new()).await);
    let gate = session.transport().hold(Method::Get, PLAYER);
    let (queue, _worker) = PollQueue::spawn(Arc::clone(&session));

    assert!(queue.queue_poll());
    timeout(WAIT, gate.entered.notified()).await.unwrap();

    assert!(queue.queue_poll());
    assert!(!queue.queue_poll());
    assert_eq!(session.transport().count(Method::Get, PLAYER), 1);

    gate.release(2);
    timeout(WAIT, gate.entered.notified()).await.unwrap();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(session.transport().count(Method::Get, PLAYER), 2);
    assert!(queue.queue_poll());
}

#[tokio::test]
async fn worker_requeues_after_token_refresh() {
    let session = Arc::new(authorized_session(FakeTransport::new()).await);
    session.transport().respond_status(Method::Get, PLAYER, 401);
    session.transport().respond_token("token-2", None);
    session.transport().respond_playback(playback(false));
    let (queue, _worker) = PollQueue::spawn(Arc::clone(&session));

    assert!(queue.queue_poll());

    wait_until(|| session.host().variable_updates().len() == 1).await;
    assert_eq!(session.transport().count(Method::Get, PLAYER), 2);
    assert_eq!(session.host().last_status(), Some((InstanceStatus::Ok, None)));
}

#[tokio::test]
async fn worker_without_token_sets_up_authentication() {
    let transport = FakeTransport::new();
    transport.respond_token("token-1", None);
    let session = Arc::new(session(transport, config()));
    let (queue, _worker) = PollQueue::spawn(Arc::clone(&session));

    assert!(queue.queue_poll());

    wait_until(|| session.host().last_status() == Some((InstanceStatus::Ok, None))).await;
    assert_eq!(
        session.host().statuses(),
        vec![
            (InstanceStatus::BadConfig, None),
            (InstanceStatus::Connecting, None),
            (InstanceStatus::Ok, None),
        ]
    );
    assert_eq!(session.transport().count(Method::Get, PLAYER), 0);
    assert_eq!(session.access_token().await.as_deref(), Some("token-1"));
}

#[tokio::test]
async fn timer_enqueues_polls() {
    let session = Arc::new(authorized_session(FakeTransport::new()).await);
    let (queue, _worker) = PollQueue::spawn(Arc::clone(&session));

    let timer = poller::spawn_timer(queue, 1);
    assert_eq!(session.transport().count(Method::Get, PLAYER), 0);

    wait_until(|| session.transport().count(Method::Get, PLAYER) >= 1).await;
    timer.abort();
}
