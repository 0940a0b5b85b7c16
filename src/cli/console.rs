use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    actions::ActionDefinition,
    config::ModuleConfig,
    feedbacks::{FeedbackDefinition, FeedbackId},
    host::{Host, InstanceStatus},
    info,
    management::ConfigManager,
    success,
    variables::{VariableDefinition, VariableValues},
    warning,
};

/// [`Host`] for the terminal: prints status changes and, when `echo` is
/// set, every variable update. Saved configs go to the [`ConfigManager`]
/// file.
pub struct ConsoleHost {
    store: Mutex<ConfigManager>,
    echo: bool,
    variables: StdMutex<VariableValues>,
    status: StdMutex<Option<(InstanceStatus, Option<String>)>>,
}

impl ConsoleHost {
    pub fn new(store: ConfigManager, echo: bool) -> Self {
        Self {
            store: Mutex::new(store),
            echo,
            variables: StdMutex::new(VariableValues::new()),
            status: StdMutex::new(None),
        }
    }

    /// Latest value of every variable published so far.
    pub fn variables(&self) -> VariableValues {
        self.variables
            .lock()
            .map(|values| values.clone())
            .unwrap_or_default()
    }

    pub fn status(&self) -> Option<(InstanceStatus, Option<String>)> {
        self.status.lock().ok().and_then(|status| status.clone())
    }
}

#[async_trait]
impl Host for ConsoleHost {
    async fn set_action_definitions(&self, actions: Vec<ActionDefinition>) {
        debug!(count = actions.len(), "registered actions");
    }

    async fn set_feedback_definitions(&self, feedbacks: Vec<FeedbackDefinition>) {
        debug!(count = feedbacks.len(), "registered feedbacks");
    }

    async fn set_variable_definitions(&self, variables: Vec<VariableDefinition>) {
        debug!(count = variables.len(), "registered variables");
    }

    async fn set_variable_values(&self, values: VariableValues) {
        if self.echo {
            for (id, value) in &values {
                info!("{} = {}", id, value);
            }
        }
        if let Ok(mut current) = self.variables.lock() {
            current.extend(values);
        }
    }

    async fn check_feedbacks(&self, feedbacks: Vec<FeedbackId>) {
        debug!(?feedbacks, "feedbacks invalidated");
    }

    async fn update_status(&self, status: InstanceStatus, message: Option<String>) {
        let next = (status, message);
        let changed = match self.status.lock() {
            Ok(mut current) => {
                let changed = current.as_ref() != Some(&next);
                *current = Some(next.clone());
                changed
            }
            Err(_) => true,
        };
        if !changed || !self.echo {
            return;
        }

        let (status, message) = next;
        let message = message.map(|m| format!(": {m}")).unwrap_or_default();
        match status {
            InstanceStatus::Ok => success!("Status {}{}", status, message),
            InstanceStatus::Connecting => info!("Status {}{}", status, message),
            InstanceStatus::BadConfig | InstanceStatus::ConnectionFailure => {
                warning!("Status {}{}", status, message)
            }
        }
    }

    async fn save_config(&self, config: ModuleConfig) {
        let mut store = self.store.lock().await;
        store.replace(config);
        if let Err(e) = store.persist().await {
            warning!("Failed to save config to {}: {}", store.path().display(), e);
        }
    }
}
