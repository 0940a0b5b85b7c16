use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::types::AuthCallback;

/// Liveness of the callback server and whether a code has arrived yet.
pub async fn health(
    Extension(shared_state): Extension<Arc<Mutex<Option<AuthCallback>>>>,
) -> Json<Value> {
    let received = shared_state.lock().await.is_some();
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "callback_received": received,
    }))
}
