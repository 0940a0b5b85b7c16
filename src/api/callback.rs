use std::sync::Arc;

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{types::AuthCallback, warning};

/// Receives the OAuth redirect and hands code and state to the waiting
/// `auth` command. The exchange itself happens there.
pub async fn callback(
    Query(params): Query<AuthCallback>,
    Extension(shared_state): Extension<Arc<Mutex<Option<AuthCallback>>>>,
) -> Html<&'static str> {
    if let Some(error) = params.error.as_deref() {
        warning!("Authorization denied: {}", error);
        return Html("<h4>Authorization denied.</h4>");
    }

    if params.code.as_deref().is_none_or(str::is_empty) {
        return Html("<h4>Missing authorization code.</h4>");
    }

    *shared_state.lock().await = Some(params);
    Html("<h2>Authorization received.</h2><p>You can close this browser window.</p>")
}
