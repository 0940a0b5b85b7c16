use crate::{error, info, instance::SpotifyInstance, session::Session, success};

use super::ConsoleHost;

/// Runs one instance until Ctrl-C, printing every variable update.
pub async fn run() {
    let store = super::load_config().await;
    let config = store.current().clone();
    let session = Session::new(ConsoleHost::new(store, true), super::transport(), config.clone());
    let instance = SpotifyInstance::with_session(session);

    instance.init(config.clone()).await;
    info!(
        "Polling every {}s. Press Ctrl-C to stop.",
        instance.session().config().await.poll_interval
    );
    instance.queue_poll();

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
    }

    instance.destroy().await;
    success!("Stopped.");
}
