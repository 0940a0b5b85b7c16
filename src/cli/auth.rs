use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Mutex;

use crate::{
    config, error,
    management::TokenManager,
    server::start_api_server,
    spotify::auth::{AUTH_SCOPES, authorize_url},
    success,
    types::AuthCallback,
    utils, warning,
};

const MAX_WAIT: Duration = Duration::from_secs(60);

/// Authorizes the remote through the browser.
///
/// Starts the callback server, opens the authorize URL and waits for the
/// redirect. The code is exchanged right away and the refresh token stored
/// in the config, so `run` can connect without further interaction.
pub async fn auth() {
    let mut store = super::load_config().await;
    let config = store.current().clone();
    if !config.has_client_credentials() {
        error!("Client id, client secret and redirect uri are required. Set them in the .env file");
    }

    let shared_state: Arc<Mutex<Option<AuthCallback>>> = Arc::new(Mutex::new(None));
    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    let state = utils::generate_state();
    let url = match build_url(&config, Some(&state)) {
        Ok(url) => url,
        Err(e) => error!("Failed to build authorize url: {}", e),
    };

    if webbrowser::open(&url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            url
        )
    }

    let Some(callback) = wait_for_callback(shared_state).await else {
        error!("Authorization failed or timed out.");
    };

    if callback.state.as_deref() != Some(state.as_str()) {
        error!("Authorization state mismatch, ignoring callback.");
    }
    let code = callback.code.unwrap_or_default();

    let transport = super::transport();
    let mut tokens = TokenManager::new();
    let refresh_token = match tokens.exchange_code(&transport, &config, &code).await {
        Ok(Some(refresh_token)) => refresh_token,
        Ok(None) => error!("Spotify did not issue a refresh token."),
        Err(e) => error!("Token exchange failed: {}", e),
    };

    let mut updated = config;
    updated.code = None;
    updated.auth_url = None;
    updated.refresh_token = Some(refresh_token);
    store.replace(updated);

    if let Err(e) = store.persist().await {
        error!("Failed to save config to {}: {}", store.path().display(), e);
    }

    success!("Authentication successful!");
}

/// Prints the authorize URL for manual authorization. The code from the
/// redirect goes into the `code` field of the config.
pub async fn auth_url() {
    let store = super::load_config().await;
    let config = store.current();
    if !config.has_client_credentials() {
        error!("Client id, client secret and redirect uri are required. Set them in the .env file");
    }

    match build_url(config, None) {
        Ok(url) => println!("{url}"),
        Err(e) => error!("Failed to build authorize url: {}", e),
    }
}

fn build_url(config: &config::ModuleConfig, state: Option<&str>) -> Result<String, String> {
    authorize_url(
        &config::spotify_accounts_url(),
        config.client_id.as_deref().unwrap_or_default(),
        config.redirect_uri.as_deref().unwrap_or_default(),
        &AUTH_SCOPES,
        state,
    )
}

async fn wait_for_callback(shared_state: Arc<Mutex<Option<AuthCallback>>>) -> Option<AuthCallback> {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for authorization in the browser...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let start = Instant::now();
    while start.elapsed() < MAX_WAIT {
        if let Some(callback) = shared_state.lock().await.take() {
            pb.finish_and_clear();
            return Some(callback);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    pb.finish_and_clear();
    None
}
