//! The capabilities the remote needs from its host application.
//!
//! The host owns the buttons: it registers actions, feedbacks and variables,
//! stores the config and shows a connection status to the operator. The
//! remote only talks to it through [`Host`], so the same core runs inside a
//! plugin runtime, in the console binary, or against a recording fake.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    actions::ActionDefinition, config::ModuleConfig, feedbacks::FeedbackDefinition,
    feedbacks::FeedbackId, variables::VariableDefinition, variables::VariableValues,
};

/// Connection status shown by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceStatus {
    Ok,
    Connecting,
    BadConfig,
    ConnectionFailure,
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InstanceStatus::Ok => "ok",
            InstanceStatus::Connecting => "connecting",
            InstanceStatus::BadConfig => "bad_config",
            InstanceStatus::ConnectionFailure => "connection_failure",
        })
    }
}

/// One input the host renders for an action or feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionField {
    pub id: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<&'static str>,
    #[serde(flatten)]
    pub kind: OptionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptionKind {
    Dropdown {
        default: &'static str,
        choices: Vec<OptionChoice>,
    },
    #[serde(rename = "textinput")]
    TextInput { default: &'static str },
    Number { default: f64, min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionChoice {
    pub id: &'static str,
    pub label: &'static str,
}

impl OptionField {
    pub fn dropdown(
        id: &'static str,
        label: &'static str,
        default: &'static str,
        choices: &[(&'static str, &'static str)],
    ) -> Self {
        Self::new(
            id,
            label,
            OptionKind::Dropdown {
                default,
                choices: choices
                    .iter()
                    .map(|&(id, label)| OptionChoice { id, label })
                    .collect(),
            },
        )
    }

    pub fn text(id: &'static str, label: &'static str) -> Self {
        Self::new(id, label, OptionKind::TextInput { default: "" })
    }

    pub fn number(id: &'static str, label: &'static str, default: f64, min: f64, max: f64) -> Self {
        Self::new(id, label, OptionKind::Number { default, min, max })
    }

    pub fn with_tooltip(mut self, tooltip: &'static str) -> Self {
        self.tooltip = Some(tooltip);
        self
    }

    /// The value the host fills in when the operator leaves the field
    /// untouched. Empty text inputs have none.
    pub fn default_value(&self) -> Option<Value> {
        match &self.kind {
            OptionKind::Dropdown { default, .. } => Some(json!(default)),
            OptionKind::TextInput { default } if default.is_empty() => None,
            OptionKind::TextInput { default } => Some(json!(default)),
            OptionKind::Number { default, .. } => Some(json!(default)),
        }
    }

    fn new(id: &'static str, label: &'static str, kind: OptionKind) -> Self {
        Self {
            id,
            label,
            tooltip: None,
            kind,
        }
    }
}

#[async_trait]
pub trait Host: Send + Sync {
    async fn set_action_definitions(&self, actions: Vec<ActionDefinition>);

    async fn set_feedback_definitions(&self, feedbacks: Vec<FeedbackDefinition>);

    async fn set_variable_definitions(&self, variables: Vec<VariableDefinition>);

    /// One batched update; never called with an empty map.
    async fn set_variable_values(&self, values: VariableValues);

    /// Asks the host to re-evaluate every feedback of the given kinds.
    async fn check_feedbacks(&self, feedbacks: Vec<FeedbackId>);

    async fn update_status(&self, status: InstanceStatus, message: Option<String>);

    /// Persists the config. The host hands it back on the next `init`.
    async fn save_config(&self, config: ModuleConfig);
}
