use sha2::{Digest, Sha256};
use std::env;

use crate::auth::models::Credentials;
use crate::errors::JainamError;


// Environment variable names for authentication
pub const JAINAM_USER_ID: &str = "JAINAM_USER_ID";
pub const JAINAM_API_SECRET: &str = "JAINAM_API_SECRET";
pub const JAINAM_APP_CODE: &str = "JAINAM_APP_CODE";


/// Load integration credentials from environment variables
///
/// Expects:
/// - JAINAM_USER_ID: the trading account id
/// - JAINAM_API_SECRET: API secret from the developer portal
/// - JAINAM_APP_CODE: app code from the developer portal
pub fn load_credentials_from_env() -> Result<Credentials, JainamError> {
    let user_id = required_var(JAINAM_USER_ID)?;
    let api_secret = required_var(JAINAM_API_SECRET)?;
    let app_code = required_var(JAINAM_APP_CODE)?;
    Ok(Credentials::new(user_id, api_secret, app_code))
}


fn required_var(name: &str) -> Result<String, JainamError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(JainamError::Validation(format!("{name} is not set"))),
    }
}


impl Credentials {
    /// Same as [`load_credentials_from_env`].
    pub fn from_env() -> Result<Credentials, JainamError> {
        load_credentials_from_env()
    }
}


fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}


/// SSO checksum: hex SHA-256 of `user_id + auth_code + api_secret` as UTF-8 text.
pub fn create_checksum(user_id: &str, auth_code: &str, api_secret: &str) -> String {
    let data = format!("{}{}{}", user_id, auth_code, api_secret);
    sha256_hex(data.as_bytes())
}


/// Feed handshake token: the access token hashed twice, each round hex encoded
/// before the next.
pub fn create_susertoken(access_token: &str) -> String {
    let first = sha256_hex(access_token.as_bytes());
    sha256_hex(first.as_bytes())
}
