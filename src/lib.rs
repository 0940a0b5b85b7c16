//! Spotify Remote Library
//!
//! Spotify Connect playback control for button-deck hosts. A host (a plugin
//! runtime, or the console binary in this package) invokes actions, renders
//! feedbacks and shows variables; this library maps all of that onto the
//! Spotify Web API and keeps the displayed state current with a
//! single-flight poller.
//!
//! # Modules
//!
//! - `actions` - Action catalog, typed action descriptors and dispatch
//! - `api` - HTTP handlers of the local OAuth callback server
//! - `cli` - Console host and command-line commands
//! - `commands` - Retry-wrapped playback commands
//! - `config` - Persisted module config and environment variables
//! - `diff` - Field-level diff between playback snapshots
//! - `feedbacks` - Feedback catalog and evaluation
//! - `host` - The port through which the library talks to its host
//! - `instance` - Lifecycle hooks: init, config update, destroy
//! - `logging` - Tracing subscriber setup
//! - `management` - Token and config managers
//! - `poller` - Poll queue and interval timer
//! - `server` - Local HTTP server for OAuth callbacks
//! - `session` - Shared per-instance state
//! - `spotify` - Spotify Web API client implementation
//! - `state` - Normalized playback snapshot
//! - `types` - Wire types and table rows
//! - `utils` - Utility functions and helpers
//! - `variables` - Variable catalog and values
//!
//! # Example
//!
//! ```
//! use spotify_remote::{config, instance::SpotifyInstance, spotify::transport::HttpTransport};
//!
//! async fn start<H: spotify_remote::host::Host + 'static>(host: H) -> spotify_remote::Res<()> {
//!     let instance = SpotifyInstance::new(host, HttpTransport::from_env()?);
//!     instance.init(config::ModuleConfig::default()).await;
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diff;
pub mod feedbacks;
pub mod host;
pub mod instance;
pub mod logging;
pub mod management;
pub mod poller;
pub mod server;
pub mod session;
pub mod spotify;
pub mod state;
pub mod types;
pub mod utils;
pub mod variables;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern throughout the application
/// using a boxed dynamic error trait object. This allows for flexible
/// error handling while maintaining Send + Sync bounds for async contexts.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
///
/// # Example
///
/// ```
/// use spotify_remote::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// use spotify_remote::info;
///
/// let interval = 3;
/// info!("Starting authentication process...");
/// info!("Polling every {}s", interval);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations. Used to provide positive feedback
/// when operations complete successfully.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// use spotify_remote::success;
///
/// let action_id = "play/pause";
/// success!("Authentication completed successfully");
/// success!("Executed {}", action_id);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// use spotify_remote::error;
///
/// let var_name = "SPOTIFY_CLIENT_ID";
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program termination.
/// Used for recoverable issues or important information that users should notice.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// use spotify_remote::warning;
///
/// let status = "connecting";
/// warning!("Failed to save config, changes are lost on restart");
/// warning!("Status {}", status);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
