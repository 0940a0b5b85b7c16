use chrono::Local;
use tabled::Table;

use crate::{
    poller::{self, PollOutcome},
    types::VariableTableRow,
    variables::VariableId,
    warning,
};

/// Polls once and prints every variable the host would show.
pub async fn status() {
    let session = super::authorized_session(false).await;

    let mut outcome = poller::poll_playback_state(&session).await;
    if outcome == PollOutcome::Retry {
        outcome = poller::poll_playback_state(&session).await;
    }
    if outcome != PollOutcome::Updated {
        warning!("Failed to query playback state.");
    }
    if let Some((status, message)) = session.host().status() {
        let message = message.map(|m| format!(": {m}")).unwrap_or_default();
        println!("Status {status}{message}");
    }
    if let Some(expires_at) = session.token_expires_at().await {
        let local = expires_at.with_timezone(&Local);
        println!("Access token valid until {}", local.format("%Y-%m-%d %H:%M:%S"));
    }

    let values = session.host().variables();
    let rows: Vec<VariableTableRow> = VariableId::ALL
        .iter()
        .map(|id| VariableTableRow {
            variable: id.as_str().to_string(),
            value: values.get(id).map(ToString::to_string).unwrap_or_default(),
        })
        .collect();

    println!("{}", Table::new(rows));
}
