use tabled::Table;

use crate::{
    commands::with_retry, error, spotify::player, success, types::DeviceTableRow, warning,
};

/// Lists the Spotify Connect devices. The configured one is marked.
pub async fn devices() {
    let session = super::authorized_session(false).await;
    let configured = session.config().await.device_id;

    let session = &session;
    let result = with_retry(session, "list devices", |token| async move {
        player::get_devices(session.transport(), &token).await
    })
    .await;

    let devices = match result {
        Ok(response) => response.devices,
        Err(e) => error!("Failed to fetch devices. Err: {}", e),
    };

    if devices.is_empty() {
        warning!("No devices available. Open Spotify on the device you want to control.");
        return;
    }

    let rows: Vec<DeviceTableRow> = devices
        .into_iter()
        .map(|device| {
            let selected = device.id.is_some() && device.id == configured;
            DeviceTableRow {
                active: match (device.is_active, selected) {
                    (true, true) => "active, selected".to_string(),
                    (true, false) => "active".to_string(),
                    (false, true) => "selected".to_string(),
                    (false, false) => String::new(),
                },
                name: device.name,
                kind: device.kind.unwrap_or_default(),
                volume: device
                    .volume_percent
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                id: device.id.unwrap_or_default(),
            }
        })
        .collect();

    println!("{}", Table::new(rows));
    if configured.is_none() {
        success!("Select a device with the switchActiveDevice or activeDeviceToConfig action.");
    }
}
