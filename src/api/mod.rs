//! # API Module
//!
//! HTTP handlers of the local server the `auth` command starts while the
//! operator authorizes the remote in the browser.
//!
//! ## Endpoints
//!
//! - `GET /callback` - [`callback`]: the Spotify redirect target. Stores the
//!   `code` and `state` query parameters in the shared slot the `auth`
//!   command polls.
//! - `GET /health` - [`health`]: service name, version and whether a code
//!   has been received.
//!
//! Both handlers share an `Arc<Mutex<Option<AuthCallback>>>` injected as an
//! axum `Extension`.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
