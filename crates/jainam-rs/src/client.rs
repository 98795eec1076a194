use reqwest::Client;
use serde_json::Value;

use crate::auth::Session;
use crate::errors::JainamError;
use crate::helpers;


// Jainam Lite REST base URL
pub(crate) const JAINAM_API: &str = "https://protrade.jainam.in/";


/// Main client for interacting with the Jainam Lite API.
///
/// The `JainamClient` exposes every REST endpoint as an async method. It holds the
/// bearer token of one session; build it from a [`Session`] with
/// [`JainamClient::with_session`] (or [`SessionManager::get_api_client`]) or log in
/// with [`JainamClient::login_with_sso`] and attach the returned session.
///
/// # Available Endpoint Categories
///
/// ## Authentication
/// - [`login_with_sso`](JainamClient::login_with_sso) - Exchange an auth code for a session
/// - [`create_websocket_session`](JainamClient::create_websocket_session) - Register a feed session
///
/// ## Orders
/// - [`place_order`](JainamClient::place_order) - Place a new order
/// - [`modify_order`](JainamClient::modify_order) - Modify an open order
/// - [`cancel_order`](JainamClient::cancel_order) - Cancel an open order
/// - [`order_report`](JainamClient::order_report) - Order book
/// - [`order_history`](JainamClient::order_history) - State transitions of one order
/// - [`trade_report`](JainamClient::trade_report) - Trade book
/// - [`margin_required`](JainamClient::margin_required) - Margin needed for an order
///
/// ## Portfolio
/// - [`positions`](JainamClient::positions), [`square_off`](JainamClient::square_off)
/// - [`holdings`](JainamClient::holdings), [`limits`](JainamClient::limits),
///   [`profile`](JainamClient::profile)
///
/// ## Contract master
/// - [`contract_master`](JainamClient::contract_master) - Download instruments of an exchange
/// - [`search_symbol`](JainamClient::search_symbol) - Filter a downloaded contract master
///
/// # Example
/// ```no_run
/// use jainam_rs::{JainamClient, SessionManager};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = SessionManager::new();
/// let session = manager.load_session().ok_or("no cached session")?;
/// let client = manager.get_api_client(&session);
///
/// let positions = client.positions().await?;
/// println!("{} open positions", positions.len());
/// # Ok(())
/// # }
/// ```
///
/// [`SessionManager::get_api_client`]: crate::SessionManager::get_api_client
#[derive(Debug, Clone)]
pub struct JainamClient {
    pub(crate) http_client: Client,
    pub(crate) base_url: String,
    pub(crate) access_token: Option<String>,
    pub(crate) user_id: Option<String>,
}


impl Default for JainamClient {
    fn default() -> Self {
        JainamClient::new()
    }
}


impl JainamClient {
    /// Create an unauthenticated client with the default API endpoint
    pub fn new() -> JainamClient {
        JainamClient {
            http_client: Client::new(),
            base_url: JAINAM_API.to_string(),
            access_token: None,
            user_id: None,
        }
    }


    /// Create a client with a custom API endpoint
    /// Useful for testing or using different API environments
    pub fn new_with_config(configuration: Option<String>) -> JainamClient {
        JainamClient {
            http_client: Client::new(),
            base_url: configuration.unwrap_or_else(|| JAINAM_API.to_string()),
            access_token: None,
            user_id: None,
        }
    }


    /// Create a client already carrying the session's bearer token.
    /// The session is not re-validated.
    pub fn with_session(session: &Session) -> JainamClient {
        let mut client = JainamClient::new();
        client.set_session(session);
        client
    }


    pub fn set_session(&mut self, session: &Session) {
        self.access_token = Some(session.access_token.clone());
        self.user_id = Some(session.user_id.clone());
    }


    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }


    /// Forget the token (logout on the client side).
    pub fn clear_token(&mut self) {
        self.access_token = None;
        self.user_id = None;
    }


    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }


    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }


    pub fn base_url(&self) -> &str {
        &self.base_url
    }


    pub fn is_authenticated(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }


    /// Wrapper for authenticated GET requests
    pub async fn authenticated_get(&self, path: &str) -> Result<Value, JainamError> {
        helpers::authenticated_get(
                &self.http_client,
                &self.base_url,
                self.access_token.as_deref(),
                path,
            )
            .await
    }


    /// Wrapper for authenticated POST requests
    pub async fn authenticated_post<T>(
        &self,
        path: &str,
        json_body: &T,
    ) -> Result<Value, JainamError>
    where
        T: serde::Serialize + ?Sized,
    {
        helpers::authenticated_post(
                &self.http_client,
                &self.base_url,
                self.access_token.as_deref(),
                path,
                json_body,
            )
            .await
    }


    /// Wrapper for unauthenticated POST requests
    pub async fn unauthenticated_post<T>(
        &self,
        path: &str,
        json_body: &T,
    ) -> Result<Value, JainamError>
    where
        T: serde::Serialize + ?Sized,
    {
        helpers::unauthenticated_post(&self.http_client, &self.base_url, path, json_body).await
    }
}
