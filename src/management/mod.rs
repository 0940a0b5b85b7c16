//! Stateful managers: the in-memory token holder and the on-disk config
//! store used by the console host.

mod auth;
mod config;

pub use auth::AuthError;
pub use auth::TokenManager;
pub use config::ConfigManager;
