//! Authentication: SSO checksum exchange, session model and credential loading.

pub mod auth_loader;
pub mod endpoints;
pub mod models;

pub use auth_loader::{create_checksum, create_susertoken, load_credentials_from_env};
pub use endpoints::{login_url, parse_redirect_url};
pub use models::{Credentials, RedirectParams, Session};
