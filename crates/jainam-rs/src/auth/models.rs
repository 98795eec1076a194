//! Auth module models.
//!
//! This module contains data structures for auth functionality.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};


/// One authenticated login.
///
/// Either every field is present or there is no session at all; the on-disk record
/// is rejected by [`SessionManager::load_session`](crate::SessionManager::load_session)
/// when any required field is missing or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("session for {user_id} since {login_time}")]
pub struct Session {
    pub user_id: String,
    /// Opaque bearer credential.
    pub access_token: String,
    /// SHA-256 over `user_id + auth_code + api_secret`, fixed at login.
    pub checksum: String,
    pub login_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_code: Option<String>,
}


impl Session {
    pub fn new(
        user_id: impl Into<String>,
        access_token: impl Into<String>,
        checksum: impl Into<String>,
        login_time: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
            checksum: checksum.into(),
            login_time,
            app_code: None,
        }
    }


    pub fn with_app_code(mut self, app_code: impl Into<String>) -> Self {
        self.app_code = Some(app_code.into());
        self
    }


    /// All required fields carry a value.
    pub fn is_complete(&self) -> bool {
        !self.user_id.is_empty() && !self.access_token.is_empty() && !self.checksum.is_empty()
    }
}


/// Vendor integration credentials from the developer portal.
#[derive(Debug, Clone)]
pub struct Credentials {
    user_id: String,
    api_secret: String,
    app_code: String,
}


impl Credentials {
    pub fn new(
        user_id: impl Into<String>,
        api_secret: impl Into<String>,
        app_code: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            api_secret: api_secret.into(),
            app_code: app_code.into(),
        }
    }


    pub fn user_id(&self) -> &str {
        &self.user_id
    }


    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }


    pub fn app_code(&self) -> &str {
        &self.app_code
    }
}


/// Query parameters carried by the SSO redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectParams {
    pub auth_code: String,
    pub user_id: String,
}


/// Request body for the token exchange endpoint.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SsoLoginRequest<'a> {
    pub user_id: &'a str,
    pub auth_code: &'a str,
    pub app_code: &'a str,
    pub check_sum: &'a str,
}


/// Token exchange result. Older deployments name the token `userSession`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SsoLoginResult {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user_session: Option<String>,
}


impl SsoLoginResult {
    pub(crate) fn token(self) -> Option<String> {
        self.access_token
            .filter(|t| !t.is_empty())
            .or(self.user_session.filter(|t| !t.is_empty()))
    }
}


/// Body for creating or invalidating a feed session.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WsSessionRequest<'a> {
    pub source: &'a str,
    pub user_id: &'a str,
    pub token: &'a str,
}
