mod common;

use chrono::{Duration, Utc};
use common::*;
use spotify_remote::{
    config::ModuleConfig,
    host::InstanceStatus,
    spotify::transport::{ApiError, Method, RequestBody},
};

fn form_value<'a>(body: &'a RequestBody, key: &str) -> Option<&'a str> {
    match body {
        RequestBody::Form(pairs) => pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str()),
        _ => None,
    }
}

#[tokio::test]
async fn code_is_exchanged_once_and_discarded() {
    let transport = FakeTransport::new();
    transport.respond_token("token-1", Some("refresh-new"));
    let mut config = config();
    config.refresh_token = None;
    config.code = Some("  the-code ".into());
    let session = session(transport, config);

    session.setup_or_refresh_authentication(true).await;

    assert_eq!(session.access_token().await.as_deref(), Some("token-1"));

    let requests = session.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, TOKEN);
    assert_eq!(form_value(&requests[0].body, "grant_type"), Some("authorization_code"));
    assert_eq!(form_value(&requests[0].body, "code"), Some("the-code"));

    let saved = session.host().saved_configs();
    assert_eq!(saved.first().and_then(|c| c.code.clone()), None);
    let last = saved.last().unwrap();
    assert_eq!(last.code, None);
    assert_eq!(last.refresh_token.as_deref(), Some("refresh-new"));

    assert_eq!(
        session.host().statuses(),
        vec![(InstanceStatus::Connecting, None), (InstanceStatus::Ok, None)]
    );
}

#[tokio::test]
async fn code_exchange_without_refresh_token_removes_stored_one() {
    let transport = FakeTransport::new();
    transport.respond_token("token-1", None);
    let mut config = config();
    config.code = Some("the-code".into());
    let session = session(transport, config);

    session.setup_or_refresh_authentication(true).await;

    assert_eq!(session.config().await.refresh_token, None);
}

#[tokio::test]
async fn refresh_token_is_used_when_no_code() {
    let transport = FakeTransport::new();
    transport.respond_token("token-1", None);
    let session = session(transport, config());

    session.setup_or_refresh_authentication(true).await;

    let requests = session.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(form_value(&requests[0].body, "grant_type"), Some("refresh_token"));
    assert_eq!(form_value(&requests[0].body, "refresh_token"), Some("refresh-1"));
    assert_eq!(session.host().last_status(), Some((InstanceStatus::Ok, None)));
    assert!(session.host().saved_configs().is_empty());
}

#[tokio::test]
async fn token_expiry_follows_reported_lifetime() {
    let transport = FakeTransport::new();
    transport.respond_token("token-1", None);
    let session = session(transport, config());
    let before = Utc::now();

    session.setup_or_refresh_authentication(true).await;

    let expires_at = session.token_expires_at().await.unwrap();
    assert!(expires_at >= before + Duration::seconds(3600));
    assert!(expires_at <= Utc::now() + Duration::seconds(3600));

    session
        .transport()
        .respond_json(Method::Post, TOKEN, serde_json::json!({ "token_type": "Bearer" }));
    assert!(!session.should_retry(&ApiError::new(401, "expired")).await);
    assert_eq!(session.token_expires_at().await, None);
}

#[tokio::test]
async fn rotated_refresh_token_is_saved() {
    let transport = FakeTransport::new();
    transport.respond_token("token-1", Some("refresh-2"));
    let session = session(transport, config());

    session.setup_or_refresh_authentication(true).await;

    assert_eq!(session.config().await.refresh_token.as_deref(), Some("refresh-2"));
    assert_eq!(
        session.host().saved_configs().last().and_then(|c| c.refresh_token.clone()),
        Some("refresh-2".to_string())
    );
}

#[tokio::test]
async fn missing_credentials_is_bad_config() {
    let session = session(FakeTransport::new(), ModuleConfig::default());

    session.setup_or_refresh_authentication(true).await;

    assert!(session.transport().requests().is_empty());
    assert_eq!(
        session.host().statuses(),
        vec![(InstanceStatus::BadConfig, None)]
    );
}

#[tokio::test]
async fn authorize_url_is_generated_without_code_or_refresh_token() {
    let mut config = config();
    config.refresh_token = None;
    let session = session(FakeTransport::new(), config);

    session.setup_or_refresh_authentication(true).await;

    assert!(session.transport().requests().is_empty());
    assert_eq!(session.host().last_status(), Some((InstanceStatus::BadConfig, None)));

    let url = session.config().await.auth_url.unwrap();
    assert!(url.starts_with("https://accounts.example.test/authorize?"));
    assert!(url.contains("client_id=client"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("user-modify-playback-state"));
    assert_eq!(
        session.host().saved_configs().last().and_then(|c| c.auth_url.clone()),
        Some(url)
    );
}

#[tokio::test]
async fn ok_without_device_is_reported_as_bad_config() {
    let transport = FakeTransport::new();
    transport.respond_token("token-1", None);
    let mut config = config();
    config.device_id = Some("  ".into());
    let session = session(transport, config);

    session.setup_or_refresh_authentication(true).await;

    assert_eq!(
        session.host().last_status(),
        Some((
            InstanceStatus::BadConfig,
            Some("No playout device selected".to_string())
        ))
    );
}

#[tokio::test]
async fn existing_token_is_kept_unless_cleared() {
    let session = authorized_session(FakeTransport::new()).await;

    session.setup_or_refresh_authentication(false).await;
    assert!(session.transport().requests().is_empty());
    assert_eq!(session.host().last_status(), Some((InstanceStatus::Ok, None)));

    session.transport().respond_token("token-2", None);
    session.setup_or_refresh_authentication(true).await;
    assert_eq!(session.access_token().await.as_deref(), Some("token-2"));
}

#[tokio::test]
async fn only_unauthorized_errors_are_retried() {
    let session = authorized_session(FakeTransport::new()).await;

    assert!(!session.should_retry(&ApiError::new(500, "boom")).await);
    assert!(!session.should_retry(&ApiError::network("timeout")).await);
    assert!(session.transport().requests().is_empty());

    session.transport().respond_token("token-2", None);
    assert!(session.should_retry(&ApiError::new(401, "expired")).await);
    assert_eq!(session.access_token().await.as_deref(), Some("token-2"));
}

#[tokio::test]
async fn refresh_without_access_token_refuses_retry() {
    let session = authorized_session(FakeTransport::new()).await;
    session
        .transport()
        .respond_json(Method::Post, TOKEN, serde_json::json!({ "token_type": "Bearer" }));

    assert!(!session.should_retry(&ApiError::new(401, "expired")).await);
    assert_eq!(session.access_token().await, None);
    assert_eq!(
        session.host().last_status(),
        Some((InstanceStatus::Connecting, None))
    );
}

#[tokio::test]
async fn missing_refresh_token_fails_fast() {
    let mut config = config();
    config.refresh_token = None;
    let session = session(FakeTransport::new(), config);

    assert!(!session.should_retry(&ApiError::new(401, "expired")).await);
    assert!(session.transport().requests().is_empty());
    assert!(session.host().statuses().is_empty());
}
