use std::collections::HashSet;
use std::sync::Mutex;

use jainam_rs::auth::{create_checksum, login_url, parse_redirect_url};
use jainam_rs::{Credentials, JainamClient, JainamError, SessionManager};
use serde_json::json;
use tempfile::tempdir;

use crate::common::{ok_envelope, MockApi, TOKEN, USER_ID};

const LOGIN_PATH: &str = "/omt/auth/sso/vendor/getUserDetails";

/// Vendor stand-in that accepts each auth code once.
async fn sso_server() -> MockApi {
    let used = Mutex::new(HashSet::new());
    MockApi::start(move |req| {
        let body: serde_json::Value = serde_json::from_str(&req.body).unwrap_or_default();
        let code = body["authCode"].as_str().unwrap_or_default().to_string();
        if !used.lock().unwrap().insert(code) {
            let err = json!({"status": "Not_Ok", "message": "Invalid authCode", "errorCode": "EC001"});
            return (200, err.to_string());
        }
        (200, ok_envelope(json!({"accessToken": TOKEN})))
    })
    .await
}

#[tokio::test]
async fn test_login_with_sso_builds_session() {
    let api = sso_server().await;
    let session = api
        .client()
        .login_with_sso(USER_ID, "abc123xyz", "S", "APP1")
        .await
        .unwrap();
    assert_eq!(session.user_id, USER_ID);
    assert_eq!(session.access_token, TOKEN);
    assert_eq!(session.checksum, create_checksum(USER_ID, "abc123xyz", "S"));
    assert_eq!(session.app_code.as_deref(), Some("APP1"));

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, LOGIN_PATH);
    assert_eq!(requests[0].authorization, None);
    let body = requests[0].json();
    assert_eq!(body["userId"], USER_ID);
    assert_eq!(body["authCode"], "abc123xyz");
    assert_eq!(body["appCode"], "APP1");
    assert_eq!(body["checkSum"], session.checksum.as_str());
}

#[tokio::test]
async fn test_reused_auth_code_is_authentication_error() {
    let api = sso_server().await;
    let client = api.client();
    client.login_with_sso(USER_ID, "abc123xyz", "S", "APP1").await.unwrap();
    let err = client
        .login_with_sso(USER_ID, "abc123xyz", "S", "APP1")
        .await
        .unwrap_err();
    assert!(err.is_authentication(), "unexpected error: {err:?}");
    assert!(err.to_string().contains("Invalid authCode"));
}

#[tokio::test]
async fn test_user_session_fallback_token() {
    let api = MockApi::fixed(200, &ok_envelope(json!([{"userSession": "legacy"}]))).await;
    let session = api
        .client()
        .login_with_sso(USER_ID, "code", "S", "APP1")
        .await
        .unwrap();
    assert_eq!(session.access_token, "legacy");
}

#[tokio::test]
async fn test_success_without_token_is_authentication_error() {
    let api = MockApi::fixed(200, &ok_envelope(json!({"accessToken": ""}))).await;
    let err = api
        .client()
        .login_with_sso(USER_ID, "code", "S", "APP1")
        .await
        .unwrap_err();
    assert!(err.is_authentication());
}

#[tokio::test]
async fn test_login_http_401_is_authentication_error() {
    let api = MockApi::fixed(401, r#"{"status":"Not_Ok","message":"Unauthorized"}"#).await;
    let err = api
        .client()
        .login_with_sso(USER_ID, "code", "S", "APP1")
        .await
        .unwrap_err();
    assert!(err.is_authentication());
}

#[tokio::test]
async fn test_login_rate_limited_keeps_status() {
    let api = MockApi::fixed(429, r#"{"status":"Not_Ok","message":"Too many requests"}"#).await;
    let err = api
        .client()
        .login_with_sso(USER_ID, "code", "S", "APP1")
        .await
        .unwrap_err();
    assert!(err.is_rate_limited(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = JainamClient::new_with_config(Some(format!("http://{addr}/")));
    let err = client
        .login_with_sso(USER_ID, "code", "S", "APP1")
        .await
        .unwrap_err();
    assert!(matches!(err, JainamError::Network(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_empty_auth_code_is_rejected_locally() {
    let api = sso_server().await;
    let err = api
        .client()
        .login_with_sso(USER_ID, " ", "S", "APP1")
        .await
        .unwrap_err();
    assert!(matches!(err, JainamError::Validation(_)));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_session_manager_login_persists_session() {
    let api = sso_server().await;
    let dir = tempdir().unwrap();
    let manager = SessionManager::with_path(dir.path().join("session.json"));
    let credentials = Credentials::new(USER_ID, "S", "APP1");
    let session = manager
        .login(&api.client(), &credentials, "abc123xyz")
        .await
        .unwrap();
    assert_eq!(manager.load_session(), Some(session));

    let err = manager
        .login(&api.client(), &credentials, "abc123xyz")
        .await
        .unwrap_err();
    assert!(err.is_authentication());
}

#[tokio::test]
async fn test_websocket_session_requires_session() {
    let api = MockApi::fixed(200, &ok_envelope(json!({}))).await;
    let err = api.client().create_websocket_session().await.unwrap_err();
    assert!(matches!(err, JainamError::SessionNotFound));
    assert!(api.requests().is_empty());

    api.authenticated_client().create_websocket_session().await.unwrap();
    let requests = api.requests();
    assert_eq!(requests[0].path, "/api/client-rest/profile/createWsSess");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-access-token"));
    assert_eq!(requests[0].json()["userId"], USER_ID);
    assert_eq!(requests[0].json()["source"], "API");
}

#[test]
fn test_parse_redirect_url() {
    let params =
        parse_redirect_url("https://app.example.com/cb?authCode=ABC123,ABC123&userId=DK2200295")
            .unwrap();
    assert_eq!(params.auth_code, "ABC123");
    assert_eq!(params.user_id, "DK2200295");

    let err = parse_redirect_url("https://app.example.com/cb?userId=DK2200295").unwrap_err();
    assert!(matches!(err, JainamError::Validation(_)));
    assert!(parse_redirect_url("not a url").is_err());
}

#[test]
fn test_login_url() {
    assert_eq!(login_url("APP1"), "https://protrade.jainam.in/?appcode=APP1");
}
