//! # Spotify Integration Module
//!
//! Everything that talks to Spotify over HTTP lives below this module. It is
//! deliberately mechanical: no function here retries, caches or decides
//! whether a call is needed.
//!
//! ## Architecture
//!
//! ```text
//! Instance / Commands / Poller
//!          ↓
//! Spotify Integration Layer
//!     ├── auth       (authorize URL, code grant, refresh grant)
//!     └── player     (playback state, devices, play/pause/volume/...)
//!          ↓
//! transport::Transport (HttpTransport over reqwest, fakes in tests)
//!          ↓
//! Spotify Web API / Accounts service
//! ```
//!
//! ## Transport contract
//!
//! A [`transport::Transport`] takes an [`transport::ApiRequest`] (endpoint,
//! method, path, query, body, authorization) and returns either an
//! [`transport::ApiResponse`] with status, headers and an optional JSON body,
//! or an [`transport::ApiError`] carrying status, headers and a message.
//! Network failures and timeouts (10 seconds per call) are reported with
//! status 500.
//!
//! ## API Coverage
//!
//! - `GET /v1/me/player` - Current playback snapshot
//! - `GET /v1/me/player/devices` - Available Connect devices
//! - `PUT /v1/me/player/play|pause|volume|shuffle|repeat|seek` - Playback writes
//! - `POST /v1/me/player/next|previous` - Track skipping
//! - `PUT /v1/me/player` - Playback transfer
//! - `POST /api/token` - Code exchange and refresh (Basic client auth)

pub mod auth;
pub mod player;
pub mod transport;
