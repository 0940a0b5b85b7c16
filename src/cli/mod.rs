//! # CLI Module
//!
//! The console host: every subcommand of the `spotify-remote` binary. The
//! library core only knows the [`crate::host::Host`] port; here it is
//! implemented by [`ConsoleHost`], which prints to the terminal and keeps
//! the config in a JSON file next to the `.env`.
//!
//! ## Commands
//!
//! - [`auth`] - browser based authorization through the local callback
//!   server, stores the refresh token
//! - [`auth_url`] - prints the authorize URL for manual authorization
//! - [`run`] - full instance lifecycle: polls and prints variable updates
//!   until Ctrl-C
//! - [`status`] - one poll, prints every variable
//! - [`devices`] - table of the available Spotify Connect devices
//! - [`action`] - executes a single action by id
//!
//! ## Setup
//!
//! ```bash
//! spotify-remote auth                  # authorize once
//! spotify-remote devices               # pick a device id
//! spotify-remote action switchActiveDevice --options '{"deviceId":"..."}'
//! spotify-remote run                   # follow playback
//! ```

mod action;
mod auth;
mod console;
mod devices;
mod run;
mod status;

pub use action::action;
pub use auth::auth;
pub use auth::auth_url;
pub use console::ConsoleHost;
pub use devices::devices;
pub use run::run;
pub use status::status;

use crate::{
    error,
    management::ConfigManager,
    session::Session,
    spotify::transport::HttpTransport,
};

pub type ConsoleSession = Session<ConsoleHost, HttpTransport>;

/// Loads the stored config with the environment laid over it.
async fn load_config() -> ConfigManager {
    let mut store = match ConfigManager::load().await {
        Ok(store) => store,
        Err(e) => error!("Failed to load config. Err: {}", e),
    };

    let mut config = store.current().clone();
    config.apply_env();
    config.ensure_required_config_is_defined();
    store.replace(config);
    store
}

fn transport() -> HttpTransport {
    match HttpTransport::from_env() {
        Ok(transport) => transport,
        Err(e) => error!("Failed to build HTTP client. Err: {}", e),
    }
}

/// Session for one-shot commands, authenticated or the process exits.
async fn authorized_session(echo: bool) -> ConsoleSession {
    let store = load_config().await;
    let config = store.current().clone();
    let session = Session::new(ConsoleHost::new(store, echo), transport(), config);

    session.setup_or_refresh_authentication(true).await;
    if !session.can_poll_or_post().await {
        error!(
            "Not authorized. Check client id, secret and redirect uri, then run {} auth",
            env!("CARGO_PKG_NAME")
        );
    }

    session
}
