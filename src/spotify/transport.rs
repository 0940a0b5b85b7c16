use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{
    Client,
    header::{AUTHORIZATION, CONTENT_LENGTH, HeaderMap},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config;

/// Ceiling for a single request, including connect and body transfer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status used for failures that never produced an HTTP response.
pub const NETWORK_ERROR_STATUS: u16 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
}

/// Which Spotify host a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `https://api.spotify.com`
    Api,
    /// `https://accounts.spotify.com`
    Accounts,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Authorization {
    Bearer(String),
    Basic {
        client_id: String,
        client_secret: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
}

/// One call against the Spotify API, independent of the HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub authorization: Authorization,
}

impl ApiRequest {
    /// Bearer-authenticated request against the Web API.
    pub fn api(method: Method, path: &str, access_token: &str) -> Self {
        Self {
            endpoint: Endpoint::Api,
            method,
            path: path.to_string(),
            query: Vec::new(),
            body: RequestBody::Empty,
            authorization: Authorization::Bearer(access_token.to_string()),
        }
    }

    /// Form-encoded request against the accounts service, authenticated
    /// with the client credentials.
    pub fn accounts_form(
        path: &str,
        client_id: &str,
        client_secret: &str,
        form: &[(&str, &str)],
    ) -> Self {
        Self {
            endpoint: Endpoint::Accounts,
            method: Method::Post,
            path: path.to_string(),
            query: Vec::new(),
            body: RequestBody::Form(
                form.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            authorization: Authorization::Basic {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
            },
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds `device_id` to the query when a device is given.
    pub fn device(self, device_id: Option<&str>) -> Self {
        match device_id {
            Some(id) => self.query("device_id", id),
            None => self,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Value of a query parameter, mostly useful when inspecting recorded
    /// requests.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Normalized successful response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status_code: u16,
    pub headers: HeaderMap,
    /// `None` for empty bodies, e.g. `204 No Content`.
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status_code: u16, body: Option<Value>) -> Self {
        Self {
            status_code,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Decodes the body, `Ok(None)` when there is none.
    pub fn json<T: DeserializeOwned>(&self) -> Result<Option<T>, ApiError> {
        match &self.body {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                ApiError::new(
                    self.status_code,
                    format!("unexpected response payload: {e}"),
                )
            }),
        }
    }
}

/// Normalized failure: HTTP errors keep their status, everything else is
/// reported as [`NETWORK_ERROR_STATUS`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("spotify request failed with status {status_code}: {message}")]
pub struct ApiError {
    pub status_code: u16,
    pub headers: HeaderMap,
    pub message: String,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: HeaderMap::new(),
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(NETWORK_ERROR_STATUS, message)
    }

    /// The access token was rejected and may be refreshed.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401
    }
}

/// Performs a single request. Implementations never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// [`Transport`] backed by `reqwest`.
pub struct HttpTransport {
    client: Client,
    api_url: String,
    accounts_url: String,
}

impl HttpTransport {
    pub fn new(api_url: String, accounts_url: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            accounts_url: accounts_url.trim_end_matches('/').to_string(),
        })
    }

    /// Transport against the endpoints resolved from the environment.
    pub fn from_env() -> Result<Self, reqwest::Error> {
        Self::new(config::spotify_api_url(), config::spotify_accounts_url())
    }

    fn url(&self, request: &ApiRequest) -> String {
        let base = match request.endpoint {
            Endpoint::Api => &self.api_url,
            Endpoint::Accounts => &self.accounts_url,
        };
        format!("{base}{path}", path = request.path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Put => self.client.put(&url),
            Method::Post => self.client.post(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.authorization {
            Authorization::Bearer(token) => builder.bearer_auth(token),
            Authorization::Basic {
                client_id,
                client_secret,
            } => {
                let credentials = STANDARD.encode(format!("{client_id}:{client_secret}"));
                builder.header(AUTHORIZATION, format!("Basic {credentials}"))
            }
        };

        builder = match &request.body {
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Form(form) => builder.form(form),
            // Spotify answers 411 to bodiless PUT/POST without a length
            RequestBody::Empty if request.method != Method::Get => {
                builder.header(CONTENT_LENGTH, "0")
            }
            RequestBody::Empty => builder,
        };

        tracing::trace!(method = ?request.method, %url, "spotify request");

        let response = builder.send().await.map_err(from_reqwest)?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(ApiError {
                status_code: status.as_u16(),
                headers,
                message: error_message(&bytes).unwrap_or_else(|| status.to_string()),
            });
        }

        let body = if bytes.is_empty() {
            None
        } else {
            // Some player endpoints answer 200 with a non-JSON body
            serde_json::from_slice(&bytes).ok()
        };

        Ok(ApiResponse {
            status_code: status.as_u16(),
            headers,
            body,
        })
    }
}

fn from_reqwest(err: reqwest::Error) -> ApiError {
    let status_code = err
        .status()
        .map(|s| s.as_u16())
        .unwrap_or(NETWORK_ERROR_STATUS);
    ApiError::new(status_code, err.to_string())
}

/// Pulls the human readable part out of a Spotify error payload.
///
/// The Web API answers `{"error": {"status": 401, "message": "..."}}`, the
/// accounts service `{"error": "invalid_grant", "error_description": "..."}`.
fn error_message(bytes: &[u8]) -> Option<String> {
    let json: Value = serde_json::from_slice(bytes).ok()?;
    json["error"]["message"]
        .as_str()
        .or_else(|| json["error_description"].as_str())
        .or_else(|| json["error"].as_str())
        .map(str::to_string)
}
