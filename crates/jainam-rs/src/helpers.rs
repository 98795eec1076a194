//! Helper functions for making authenticated and unauthenticated HTTP requests

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::JainamError;
use crate::response::{ApiResponse, STATUS_OK};


/// Join the base URL and an endpoint path with exactly one slash.
pub(crate) fn build_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}


fn bearer(access_token: Option<&str>) -> Result<String, JainamError> {
    match access_token {
        Some(token) if !token.is_empty() => Ok(format!("Bearer {}", token)),
        _ => Err(JainamError::SessionNotFound),
    }
}


/// Make an authenticated GET request
pub(crate) async fn authenticated_get(
    http_client: &Client,
    base_url: &str,
    access_token: Option<&str>,
    path: &str,
) -> Result<Value, JainamError> {
    let auth = bearer(access_token)?;
    let url = build_url(base_url, path);
    let request = http_client
        .get(&url)
        .header(reqwest::header::AUTHORIZATION, auth)
        .header(reqwest::header::ACCEPT, "application/json");
    send(request, "GET", &url).await
}


/// Make an authenticated POST request with a JSON body
pub(crate) async fn authenticated_post<T>(
    http_client: &Client,
    base_url: &str,
    access_token: Option<&str>,
    path: &str,
    json_body: &T,
) -> Result<Value, JainamError>
where
    T: serde::Serialize + ?Sized,
{
    let auth = bearer(access_token)?;
    let url = build_url(base_url, path);
    let request = http_client
        .post(&url)
        .header(reqwest::header::AUTHORIZATION, auth)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(json_body);
    send(request, "POST", &url).await
}


/// Make an unauthenticated POST request (login)
pub(crate) async fn unauthenticated_post<T>(
    http_client: &Client,
    base_url: &str,
    path: &str,
    json_body: &T,
) -> Result<Value, JainamError>
where
    T: serde::Serialize + ?Sized,
{
    let url = build_url(base_url, path);
    let request = http_client
        .post(&url)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(json_body);
    send(request, "POST", &url).await
}


/// Download a raw body (contract master files are not enveloped, and may be zipped)
pub(crate) async fn download(http_client: &Client, url: &str) -> Result<Vec<u8>, JainamError> {
    debug!(url, "download");
    let resp = http_client.get(url).send().await?;
    let status = resp.status();
    let body = resp.bytes().await?;
    if !status.is_success() {
        let text = String::from_utf8_lossy(&body);
        return Err(JainamError::from_vendor(Some(status), None, Some(truncate(&text))));
    }
    Ok(body.to_vec())
}


async fn send(request: RequestBuilder, method: &str, url: &str) -> Result<Value, JainamError> {
    debug!(method, url, "request");
    let resp = request.send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    let result = check_response(status, &body);
    if let Err(e) = &result {
        warn!(method, url, status = status.as_u16(), "request failed: {e}");
    }
    result
}


/// Turn a raw HTTP response into the envelope JSON, or the matching error.
///
/// A response fails when the HTTP status is not 2xx or when the envelope's
/// `status` field is anything other than `"Ok"`.
pub(crate) fn check_response(status: StatusCode, body: &str) -> Result<Value, JainamError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let Some(value) = parsed else {
        if status.is_success() {
            return Err(JainamError::Other(format!(
                "Invalid JSON response (HTTP {}): {}",
                status,
                truncate(body)
            )));
        }
        return Err(JainamError::from_vendor(Some(status), None, Some(truncate(body))));
    };

    let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
    let code = field("errorCode").or_else(|| field("error_code"));
    let message = field("message");

    if !status.is_success() {
        return Err(JainamError::from_vendor(Some(status), code, message));
    }
    let ok = value
        .get("status")
        .and_then(Value::as_str)
        .map(|s| s.eq_ignore_ascii_case(STATUS_OK))
        .unwrap_or(false);
    if !ok {
        return Err(JainamError::from_vendor(None, code, message));
    }
    Ok(value)
}


/// Decode the `result` of an already checked envelope.
pub(crate) fn decode_result<T>(value: Value) -> Result<Vec<T>, JainamError>
where
    T: DeserializeOwned,
{
    let envelope: ApiResponse<T> = serde_json::from_value(value)?;
    Ok(envelope.result)
}


fn truncate(body: &str) -> String {
    const LIMIT: usize = 500;
    if body.len() <= LIMIT {
        return body.to_string();
    }
    let mut end = LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
