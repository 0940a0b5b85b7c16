#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::{
    sync::{Notify, Semaphore},
    time::{sleep, timeout},
};

use spotify_remote::{
    actions::ActionDefinition,
    config::ModuleConfig,
    feedbacks::{FeedbackDefinition, FeedbackId},
    host::{Host, InstanceStatus},
    session::Session,
    spotify::transport::{ApiError, ApiRequest, ApiResponse, Endpoint, Method, Transport},
    variables::{VariableDefinition, VariableValues},
};

pub const PLAYER: &str = "/v1/me/player";
pub const DEVICES: &str = "/v1/me/player/devices";
pub const TOKEN: &str = "/api/token";
pub const DEVICE_ID: &str = "dev1";

pub const WAIT: Duration = Duration::from_secs(3);

type Key = (Method, String);

/// Holds matching requests until released, and signals each arrival.
#[derive(Clone)]
pub struct Gate {
    pub entered: Arc<Notify>,
    release: Arc<Semaphore>,
}

impl Gate {
    pub fn release(&self, requests: usize) {
        self.release.add_permits(requests);
    }
}

/// Scripted [`Transport`]: records every request and answers with queued
/// responses per method and path. Unscripted calls get `204 No Content`.
#[derive(Default)]
pub struct FakeTransport {
    requests: Mutex<Vec<ApiRequest>>,
    responses: Mutex<HashMap<Key, VecDeque<Result<ApiResponse, ApiError>>>>,
    gates: Mutex<HashMap<Key, Gate>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, response: Result<ApiResponse, ApiError>) {
        self.responses
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    pub fn respond_json(&self, method: Method, path: &str, body: Value) {
        self.respond(method, path, Ok(ApiResponse::new(200, Some(body))));
    }

    pub fn respond_status(&self, method: Method, path: &str, status: u16) {
        self.respond(method, path, Err(ApiError::new(status, format!("status {status}"))));
    }

    pub fn respond_playback(&self, body: Value) {
        self.respond_json(Method::Get, PLAYER, body);
    }

    pub fn respond_token(&self, access_token: &str, refresh_token: Option<&str>) {
        let mut body = json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "expires_in": 3600,
        });
        if let Some(refresh_token) = refresh_token {
            body["refresh_token"] = json!(refresh_token);
        }
        self.respond_json(Method::Post, TOKEN, body);
    }

    pub fn hold(&self, method: Method, path: &str) -> Gate {
        let gate = Gate {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Semaphore::new(0)),
        };
        self.gates
            .lock()
            .unwrap()
            .insert((method, path.to_string()), gate.clone());
        gate
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Web API calls only, token requests excluded.
    pub fn api_requests(&self) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.endpoint == Endpoint::Api)
            .collect()
    }

    /// Web API writes, i.e. everything except `GET`.
    pub fn writes(&self) -> Vec<ApiRequest> {
        self.api_requests()
            .into_iter()
            .filter(|r| r.method != Method::Get)
            .collect()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let key = (request.method, request.path.clone());
        self.requests.lock().unwrap().push(request);

        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            if let Ok(permit) = gate.release.acquire().await {
                permit.forget();
            }
        }

        self.responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(ApiResponse::new(204, None)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    ActionDefinitions(usize),
    FeedbackDefinitions(usize),
    VariableDefinitions(usize),
    Variables(VariableValues),
    CheckFeedbacks(Vec<FeedbackId>),
    Status(InstanceStatus, Option<String>),
    SaveConfig(ModuleConfig),
}

/// [`Host`] that records every call.
#[derive(Default)]
pub struct FakeHost {
    calls: Mutex<Vec<HostCall>>,
}

impl FakeHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn variable_updates(&self) -> Vec<VariableValues> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::Variables(values) => Some(values),
                _ => None,
            })
            .collect()
    }

    pub fn feedback_checks(&self) -> Vec<Vec<FeedbackId>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::CheckFeedbacks(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<(InstanceStatus, Option<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::Status(status, message) => Some((status, message)),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<(InstanceStatus, Option<String>)> {
        self.statuses().pop()
    }

    pub fn saved_configs(&self) -> Vec<ModuleConfig> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::SaveConfig(config) => Some(config),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Host for FakeHost {
    async fn set_action_definitions(&self, actions: Vec<ActionDefinition>) {
        self.record(HostCall::ActionDefinitions(actions.len()));
    }

    async fn set_feedback_definitions(&self, feedbacks: Vec<FeedbackDefinition>) {
        self.record(HostCall::FeedbackDefinitions(feedbacks.len()));
    }

    async fn set_variable_definitions(&self, variables: Vec<VariableDefinition>) {
        self.record(HostCall::VariableDefinitions(variables.len()));
    }

    async fn set_variable_values(&self, values: VariableValues) {
        self.record(HostCall::Variables(values));
    }

    async fn check_feedbacks(&self, feedbacks: Vec<FeedbackId>) {
        self.record(HostCall::CheckFeedbacks(feedbacks));
    }

    async fn update_status(&self, status: InstanceStatus, message: Option<String>) {
        self.record(HostCall::Status(status, message));
    }

    async fn save_config(&self, config: ModuleConfig) {
        self.record(HostCall::SaveConfig(config));
    }
}

pub type TestSession = Session<FakeHost, FakeTransport>;

/// Complete config with client credentials, a refresh token and a device.
pub fn config() -> ModuleConfig {
    ModuleConfig {
        client_id: Some("client".into()),
        client_secret: Some("secret".into()),
        redirect_uri: Some("http://127.0.0.1:8888/callback".into()),
        refresh_token: Some("refresh-1".into()),
        device_id: Some(DEVICE_ID.into()),
        ..ModuleConfig::default()
    }
}

pub fn session(transport: FakeTransport, config: ModuleConfig) -> TestSession {
    Session::new(FakeHost::default(), transport, config)
        .with_accounts_url("https://accounts.example.test")
}

/// Session that already holds access token `token-1`. Host calls and
/// recorded requests from the setup are cleared.
pub async fn authorized_session(transport: FakeTransport) -> TestSession {
    transport.respond_token("token-1", None);
    let session = session(transport, config());
    session.setup_or_refresh_authentication(true).await;
    assert_eq!(session.access_token().await.as_deref(), Some("token-1"));

    session.host().clear();
    session.transport().clear_requests();
    session
}

/// Polls `done` until it holds, failing the test after [`WAIT`].
pub async fn wait_until(mut done: impl FnMut() -> bool) {
    timeout(WAIT, async {
        while !done() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

pub fn bearer(request: &ApiRequest) -> Option<&str> {
    match &request.authorization {
        spotify_remote::spotify::transport::Authorization::Bearer(token) => Some(token.as_str()),
        _ => None,
    }
}

pub fn playback(is_playing: bool) -> Value {
    json!({
        "device": {
            "id": DEVICE_ID,
            "name": "Studio",
            "is_active": true,
            "type": "Computer",
            "volume_percent": 40
        },
        "repeat_state": "off",
        "shuffle_state": false,
        "context": { "uri": "spotify:playlist:pl1", "type": "playlist" },
        "progress_ms": 30000,
        "is_playing": is_playing,
        "currently_playing_type": "track",
        "item": {
            "name": "Song",
            "uri": "spotify:track:tr1",
            "duration_ms": 200000,
            "artists": [{ "name": "A" }, { "name": "B" }],
            "album": {
                "name": "Album",
                "images": [{ "url": "https://img.example.test/1.jpg" }]
            }
        }
    })
}

pub fn devices(volume: Option<u8>) -> Value {
    json!({
        "devices": [
            { "id": "other", "name": "Phone", "is_active": false, "type": "Smartphone", "volume_percent": 10 },
            { "id": DEVICE_ID, "name": "Studio", "is_active": true, "type": "Computer", "volume_percent": volume }
        ]
    })
}
