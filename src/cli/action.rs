use serde_json::Value;

use crate::{actions::Action, error, success};

/// Executes one action by its host id, e.g. `volumeUp`, with options given
/// as a JSON object.
pub async fn action(action_id: &str, options: Option<&str>) {
    let options: Value = match options {
        Some(raw) => match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => error!("Options must be a JSON object. Err: {}", e),
        },
        None => Value::Object(Default::default()),
    };

    let action = match Action::parse(action_id, &options) {
        Ok(action) => action,
        Err(e) => error!("{}", e),
    };

    let session = super::authorized_session(false).await;
    let config = session.config().await;
    if action.requires_device() && config.device_id().is_none() {
        error!("No playback device selected. Run {} devices", env!("CARGO_PKG_NAME"));
    }

    match action.run(&session, config.device_id()).await {
        Ok(()) => success!("Executed {}", action.id()),
        Err(e) => error!("Execute action failed: {}", e),
    }
}
