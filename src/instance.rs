//! Lifecycle of one remote instance as driven by the host.

use std::sync::Arc;

use serde_json::Value;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error};

use crate::{
    actions::{Action, ActionParseError, action_definitions},
    config::ModuleConfig,
    feedbacks::{Feedback, feedback_definitions},
    host::{Host, InstanceStatus},
    poller::{self, PollQueue},
    session::Session,
    spotify::transport::Transport,
    variables::variable_definitions,
};

struct PollTimer {
    interval: i64,
    handle: JoinHandle<()>,
}

/// Owns the session, the poll worker and the interval timer.
///
/// Must be created inside a Tokio runtime: the poll worker is spawned
/// immediately.
pub struct SpotifyInstance<H, T> {
    session: Arc<Session<H, T>>,
    queue: PollQueue,
    worker: JoinHandle<()>,
    timer: Mutex<Option<PollTimer>>,
}

impl<H, T> SpotifyInstance<H, T>
where
    H: Host + 'static,
    T: Transport + 'static,
{
    pub fn new(host: H, transport: T) -> Self {
        Self::with_session(Session::new(host, transport, ModuleConfig::default()))
    }

    pub fn with_session(session: Session<H, T>) -> Self {
        let session = Arc::new(session);
        let (queue, worker) = PollQueue::spawn(Arc::clone(&session));
        Self {
            session,
            queue,
            worker,
            timer: Mutex::new(None),
        }
    }

    pub fn session(&self) -> &Arc<Session<H, T>> {
        &self.session
    }

    pub fn queue(&self) -> &PollQueue {
        &self.queue
    }

    pub async fn init(&self, config: ModuleConfig) {
        self.apply_config(config).await;

        self.session
            .update_status(InstanceStatus::Connecting, None)
            .await;
        self.session.setup_or_refresh_authentication(true).await;

        let interval = self.session.config().await.poll_interval;
        let mut timer = self.timer.lock().await;
        if timer.is_none() {
            *timer = Some(self.start_timer(interval));
        }
        drop(timer);

        let host = self.session.host();
        host.set_action_definitions(action_definitions()).await;
        host.set_feedback_definitions(feedback_definitions()).await;
        host.set_variable_definitions(variable_definitions()).await;
    }

    /// Applies a config edited in the host. Authentication starts over and
    /// the timer is restarted when the poll interval changed.
    pub async fn config_updated(&self, config: ModuleConfig) {
        self.apply_config(config).await;

        self.session.setup_or_refresh_authentication(true).await;

        let interval = self.session.config().await.poll_interval;
        let mut timer = self.timer.lock().await;
        if let Some(current) = timer.as_ref().filter(|t| t.interval != interval) {
            debug!(from = current.interval, to = interval, "restarting poll timer");
            current.handle.abort();
            *timer = Some(self.start_timer(interval));
        }
        drop(timer);

        self.session
            .host()
            .set_action_definitions(action_definitions())
            .await;
    }

    pub async fn destroy(&self) {
        debug!("destroy");

        if let Some(timer) = self.timer.lock().await.take() {
            timer.handle.abort();
        }
    }

    /// Runs an already parsed action and queues a poll afterwards so the
    /// host sees the effect quickly.
    ///
    /// Without an access token nothing happens. Failures are logged and
    /// do not reach the host.
    pub async fn execute_action(&self, action: &Action) {
        if !self.session.can_poll_or_post().await {
            debug!(action = %action.id(), "not authorized, ignoring action");
            return;
        }

        let config = self.session.config().await;
        if let Err(e) = action.run(&self.session, config.device_id()).await {
            error!(action = %action.id(), error = %e, "execute action failed");
        }

        self.queue.queue_poll();
    }

    /// Parses and runs an action invocation coming from the host.
    pub async fn handle_action(
        &self,
        action_id: &str,
        options: &Value,
    ) -> Result<(), ActionParseError> {
        let action = Action::parse(action_id, options)?;
        self.execute_action(&action).await;
        Ok(())
    }

    /// Evaluates a feedback against the latest snapshot.
    pub async fn feedback(&self, feedback: &Feedback) -> bool {
        feedback.evaluate(self.session.playback_state().await.as_ref())
    }

    pub fn queue_poll(&self) -> bool {
        self.queue.queue_poll()
    }

    async fn apply_config(&self, mut config: ModuleConfig) {
        let repaired = config.ensure_required_config_is_defined();
        self.session.set_config(config.clone()).await;
        if repaired {
            self.session.host().save_config(config).await;
        }
    }

    fn start_timer(&self, interval: i64) -> PollTimer {
        PollTimer {
            interval,
            handle: poller::spawn_timer(self.queue.clone(), interval),
        }
    }
}

impl<H, T> Drop for SpotifyInstance<H, T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get_mut().take() {
            timer.handle.abort();
        }
        self.worker.abort();
    }
}
