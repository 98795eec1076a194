//! Auth module endpoints.
//!
//! SSO vendor flow:
//! 1. the user logs in at the broker and is redirected back with `authCode` and `userId`
//! 2. the integration computes `checkSum = SHA256(userId + authCode + apiSecret)`
//! 3. the checksum is exchanged for a bearer token
//!
//! The auth code is single use; a second exchange with the same code is rejected.

use chrono::Utc;
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::auth::auth_loader::create_checksum;
use crate::auth::models::{
    RedirectParams, Session, SsoLoginRequest, SsoLoginResult, WsSessionRequest,
};
use crate::client::{JainamClient, JAINAM_API};
use crate::errors::JainamError;
use crate::helpers::decode_result;


const SSO_VENDOR_DETAILS: &str = "omt/auth/sso/vendor/getUserDetails";
const CREATE_WS_SESSION: &str = "api/client-rest/profile/createWsSess";
const INVALIDATE_WS_SESSION: &str = "api/client-rest/profile/invalidateWsSess";


impl JainamClient {

    /// Exchange an SSO auth code for a session.
    ///
    /// **Endpoint:** `POST omt/auth/sso/vendor/getUserDetails`
    ///
    /// Any non-success answer from the vendor, including a reused auth code, is an
    /// [`JainamError::Authentication`]. Rate limiting and transport failures keep
    /// their own variants. The returned session is not attached to `self`; use
    /// [`JainamClient::set_session`] or [`JainamClient::with_session`].
    pub async fn login_with_sso(
        &self,
        user_id: &str,
        auth_code: &str,
        api_secret: &str,
        app_code: &str,
    ) -> Result<Session, JainamError> {
        if user_id.trim().is_empty() {
            return Err(JainamError::Validation("user_id cannot be empty".into()));
        }
        if auth_code.trim().is_empty() {
            return Err(JainamError::Validation("auth_code cannot be empty".into()));
        }
        let checksum = create_checksum(user_id, auth_code, api_secret);
        let body = SsoLoginRequest {
            user_id,
            auth_code,
            app_code,
            check_sum: &checksum,
        };
        let resp = match self.unauthenticated_post(SSO_VENDOR_DETAILS, &body).await {
            Ok(resp) => resp,
            Err(e) if e.is_rate_limited() => return Err(e),
            Err(JainamError::Vendor { code, message, .. }) => {
                return Err(JainamError::Authentication(match code {
                    Some(c) => format!("login rejected [{c}]: {message}"),
                    None => format!("login rejected: {message}"),
                }));
            }
            Err(e) => return Err(e),
        };
        let results: Vec<SsoLoginResult> = decode_result(resp)?;
        let access_token = results
            .into_iter()
            .find_map(SsoLoginResult::token)
            .ok_or_else(|| {
                JainamError::Authentication("login response carried no session token".into())
            })?;
        info!(user_id, "sso login succeeded");
        Ok(Session::new(user_id, access_token, checksum, Utc::now()).with_app_code(app_code))
    }


    /// Create a websocket session for the market-data feed.
    ///
    /// **Endpoint:** `POST api/client-rest/profile/createWsSess`
    pub async fn create_websocket_session(&self) -> Result<Value, JainamError> {
        let (user_id, token) = self.session_identity()?;
        let body = WsSessionRequest {
            source: "API",
            user_id,
            token,
        };
        self.authenticated_post(CREATE_WS_SESSION, &body).await
    }


    /// Invalidate the websocket session.
    ///
    /// **Endpoint:** `POST api/client-rest/profile/invalidateWsSess`
    pub async fn invalidate_websocket_session(&self) -> Result<Value, JainamError> {
        let (user_id, token) = self.session_identity()?;
        let body = WsSessionRequest {
            source: "API",
            user_id,
            token,
        };
        self.authenticated_post(INVALIDATE_WS_SESSION, &body).await
    }


    fn session_identity(&self) -> Result<(&str, &str), JainamError> {
        match (self.user_id.as_deref(), self.access_token.as_deref()) {
            (Some(user_id), Some(token)) if !token.is_empty() => Ok((user_id, token)),
            _ => Err(JainamError::SessionNotFound),
        }
    }
}


/// Browser URL where the user logs in to obtain an auth code.
pub fn login_url(app_code: &str) -> String {
    format!("{}?appcode={}", JAINAM_API, app_code)
}


/// Extract `authCode` and `userId` from the SSO redirect URL.
///
/// `https://your-app.com/callback?authCode=ABC123&userId=DK2200295`
///
/// Some redirects repeat a value as `ABC123,ABC123`; the first one is used.
pub fn parse_redirect_url(url: &str) -> Result<RedirectParams, JainamError> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| JainamError::Validation(format!("invalid redirect url: {e}")))?;
    let param = |name: &str| {
        parsed
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.split(',').next().unwrap_or_default().trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let auth_code = param("authCode")
        .ok_or_else(|| JainamError::Validation("redirect url has no authCode".into()))?;
    let user_id = param("userId")
        .ok_or_else(|| JainamError::Validation("redirect url has no userId".into()))?;
    Ok(RedirectParams { auth_code, user_id })
}
