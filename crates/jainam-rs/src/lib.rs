//! Jainam Lite Rust SDK
//!
//! Async client for the Jainam Lite brokerage API: SSO login with an on-disk session
//! cache, the REST trading and portfolio endpoints, and the market data stream.
//!
//! # Quick Start
//!
//! ```no_run
//! use jainam_rs::{Credentials, JainamClient, JainamWebsocketClient, SessionManager};
//! use jainam_rs::websocket::subscriptions::Instrument;
//! use jainam_rs::ws_client::StreamEvent;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // 1. Reuse today's session, or log in with a fresh auth code
//! let manager = SessionManager::new();
//! let session = match manager.load_valid_session(SessionManager::DEFAULT_MAX_AGE) {
//!     Some(session) => session,
//!     None => {
//!         let credentials = Credentials::from_env()?;
//!         manager.login(&JainamClient::new(), &credentials, "AUTH_CODE").await?
//!     }
//! };
//!
//! // 2. REST calls go through the client
//! let client = manager.get_api_client(&session);
//! println!("{} positions", client.positions().await?.len());
//!
//! // 3. Market data goes through the stream
//! let stream = JainamWebsocketClient::new(&session);
//! let mut events = stream.connect().await?;
//! stream.subscribe_tick(&[Instrument::new("NSE", "26000")]).await?;
//! while let Some(event) = events.recv().await {
//!     if let StreamEvent::Message(msg) = event {
//!         println!("{msg:?}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Main Components
//!
//! - [`SessionManager`] - Login, session persistence and expiry
//! - [`JainamClient`] - All REST endpoint methods
//! - [`JainamWebsocketClient`] - Market data stream
//!
//! # API Endpoint Modules
//!
//! - [`auth`] - SSO login, checksum, websocket session registration
//! - [`orders`] - Place, modify, cancel, order and trade books, margin
//! - [`portfolio`] - Positions, square off, holdings, limits, profile
//! - [`contract_master`] - Instrument lists and symbol search


// Core modules
pub mod auth;           // SSO login and credentials
pub mod client;         // Main HTTP client
pub mod ws_client;      // Market data stream client
pub mod session;        // Session cache on disk
pub mod errors;         // Error types
pub mod error_codes;    // Vendor error code table
pub mod response;       // Response envelope
pub(crate) mod helpers; // Internal HTTP helpers


// API endpoint modules
pub mod contract_master;    // Instrument master files
pub mod orders;             // Order management
pub mod portfolio;          // Positions, holdings, funds
pub mod websocket;          // Stream frames and subscriptions


// Re-exports for convenient access
pub use auth::{Credentials, Session};
pub use client::JainamClient;
pub use errors::JainamError;
pub use session::SessionManager;
pub use ws_client::JainamWebsocketClient;
