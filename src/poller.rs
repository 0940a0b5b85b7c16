//! Single-flight playback polling.
//!
//! Polls run on one worker task fed by a channel with room for a single
//! pending request. At most one fetch is in flight, at most one waits
//! behind it, and anything beyond that is dropped. The interval timer only
//! enqueues; a slow API therefore never stacks up fetches.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::{
    config::DEFAULT_POLL_INTERVAL,
    diff::{StateDiff, diff_playback_state},
    host::{Host, InstanceStatus},
    session::Session,
    spotify::{player, transport::Transport},
    state::PlaybackState,
};

/// Pending polls that may wait behind the running one.
const QUEUE_CAPACITY: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The snapshot was fetched and applied.
    Updated,
    /// The token was refreshed; another poll has to follow.
    Retry,
    /// The fetch failed for good and the stored state was cleared.
    Failed,
    /// No access token; authentication was set up again instead.
    Unauthorized,
}

/// Handle for enqueuing polls. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PollQueue {
    tx: mpsc::Sender<()>,
}

impl PollQueue {
    /// Starts the worker. It stops once every [`PollQueue`] clone is gone
    /// or the returned handle is aborted.
    pub fn spawn<H, T>(session: Arc<Session<H, T>>) -> (PollQueue, JoinHandle<()>)
    where
        H: Host + 'static,
        T: Transport + 'static,
    {
        let (tx, mut rx) = mpsc::channel(QUEUE_CAPACITY);
        let requeue = tx.downgrade();

        let worker = tokio::spawn(async move {
            while rx.recv().await.is_some() {
                let outcome = run_queued_poll(&session).await;
                if outcome == PollOutcome::Retry {
                    if let Some(tx) = requeue.upgrade() {
                        PollQueue { tx }.queue_poll();
                    }
                }
            }
        });

        (PollQueue { tx }, worker)
    }

    /// Enqueues a poll. Returns `false` when it was dropped because the
    /// queue is full or the worker is gone.
    pub fn queue_poll(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => {
                debug!("queue poll");
                true
            }
            Err(TrySendError::Full(())) => {
                debug!("Poll queue overflow");
                false
            }
            Err(TrySendError::Closed(())) => {
                debug!("poll worker stopped, dropping poll");
                false
            }
        }
    }
}

/// Enqueues a poll every `interval_secs` seconds, the first one after one
/// full interval.
pub fn spawn_timer(queue: PollQueue, interval_secs: i64) -> JoinHandle<()> {
    let secs = if interval_secs > 0 {
        interval_secs
    } else {
        DEFAULT_POLL_INTERVAL
    };
    let period = Duration::from_secs(secs as u64);

    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            queue.queue_poll();
        }
    })
}

async fn run_queued_poll<H: Host, T: Transport>(session: &Session<H, T>) -> PollOutcome {
    if !session.can_poll_or_post().await {
        session.update_status(InstanceStatus::BadConfig, None).await;
        session.setup_or_refresh_authentication(false).await;
        return PollOutcome::Unauthorized;
    }
    poll_playback_state(session).await
}

/// Fetches the playback state once and publishes what changed.
///
/// Failures never escape: a non-recoverable one clears the stored state
/// and leaves a connection failure status behind.
pub async fn poll_playback_state<H: Host, T: Transport>(session: &Session<H, T>) -> PollOutcome {
    let Some(token) = session.access_token().await else {
        return PollOutcome::Unauthorized;
    };

    match player::get_playback_state(session.transport(), &token).await {
        Ok(body) => {
            let state = body.as_ref().map(PlaybackState::from_response);
            diff_and_save_playback_state(session, state).await;
            session.update_status(InstanceStatus::Ok, None).await;
            PollOutcome::Updated
        }
        Err(err) => {
            session
                .update_status(
                    InstanceStatus::ConnectionFailure,
                    Some("Failed to query Api".to_string()),
                )
                .await;

            if session.should_retry(&err).await {
                PollOutcome::Retry
            } else {
                diff_and_save_playback_state(session, None).await;
                PollOutcome::Failed
            }
        }
    }
}

/// Replaces the stored snapshot and sends the host one batched variable
/// update and one batched feedback check, each only when non-empty.
pub async fn diff_and_save_playback_state<H: Host, T: Transport>(
    session: &Session<H, T>,
    state: Option<PlaybackState>,
) -> StateDiff {
    let previous = session.replace_playback_state(state.clone()).await;
    let diff = diff_playback_state(previous.as_ref(), state.as_ref());

    if !diff.variables.is_empty() {
        session
            .host()
            .set_variable_values(diff.variables.clone())
            .await;
    }
    if !diff.feedbacks.is_empty() {
        session
            .host()
            .check_feedbacks(diff.feedbacks.iter().copied().collect())
            .await;
    }

    diff
}
