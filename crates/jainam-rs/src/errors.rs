use std::fmt;

use reqwest::StatusCode;

use crate::error_codes::{describe_error_code, SESSION_EXPIRED};


#[derive(Debug)]
pub enum JainamError {
    /// Bad credentials, a reused auth code, or an expired/invalid session.
    Authentication(String),
    /// The transport could not reach the vendor (connect failure, timeout, TLS).
    Network(reqwest::Error),
    /// Caller-supplied parameters rejected before anything was sent.
    Validation(String),
    /// The vendor answered with a non-success status.
    Vendor {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },
    /// An operation needed a session and none was available.
    SessionNotFound,
    ParseError(serde_json::Error),
    IoError(std::io::Error),
    WebSocket(String),
    Other(String),
}


impl JainamError {
    /// Build the error for a failed vendor response.
    ///
    /// `EC087` and HTTP 401/403 are session problems and become
    /// [`JainamError::Authentication`]; everything else is kept as a vendor error
    /// so the caller sees the status and code.
    pub fn from_vendor(
        status: Option<StatusCode>,
        code: Option<String>,
        message: Option<String>,
    ) -> JainamError {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .or_else(|| code.as_deref().map(|c| describe_error_code(c).to_string()))
            .unwrap_or_else(|| "request failed".to_string());
        let unauthorized = matches!(
            status,
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        );
        if unauthorized || code.as_deref() == Some(SESSION_EXPIRED) {
            return JainamError::Authentication(match code {
                Some(c) => format!("[{c}] {message}"),
                None => message,
            });
        }
        JainamError::Vendor {
            status: status.map(|s| s.as_u16()),
            code,
            message,
        }
    }

    /// True for HTTP 429 responses; the caller is expected to back off.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, JainamError::Vendor { status: Some(429), .. })
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, JainamError::Authentication(_))
    }

    pub fn vendor_code(&self) -> Option<&str> {
        match self {
            JainamError::Vendor { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}


impl fmt::Display for JainamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JainamError::Authentication(msg) => write!(f, "Authentication error: {}", msg),
            JainamError::Network(e) => write!(f, "Network error: {}", e),
            JainamError::Validation(msg) => write!(f, "Validation error: {}", msg),
            JainamError::Vendor { status, code, message } => {
                write!(f, "Vendor error")?;
                if let Some(s) = status {
                    write!(f, " (HTTP {})", s)?;
                }
                if let Some(c) = code {
                    write!(f, " [{}]", c)?;
                }
                write!(f, ": {}", message)
            }
            JainamError::SessionNotFound => {
                write!(f, "No session available. Log in or load a cached session first")
            }
            JainamError::ParseError(e) => write!(f, "Parse error: {}", e),
            JainamError::IoError(e) => write!(f, "IO error: {}", e),
            JainamError::WebSocket(msg) => write!(f, "WebSocket error: {}", msg),
            JainamError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}


impl std::error::Error for JainamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JainamError::Network(e) => Some(e),
            JainamError::ParseError(e) => Some(e),
            JainamError::IoError(e) => Some(e),
            _ => None,
        }
    }
}


impl From<reqwest::Error> for JainamError {
    fn from(err: reqwest::Error) -> Self {
        JainamError::Network(err)
    }
}


impl From<serde_json::Error> for JainamError {
    fn from(err: serde_json::Error) -> Self {
        JainamError::ParseError(err)
    }
}


impl From<std::io::Error> for JainamError {
    fn from(err: std::io::Error) -> Self {
        JainamError::IoError(err)
    }
}


impl From<tokio_tungstenite::tungstenite::Error> for JainamError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        JainamError::WebSocket(err.to_string())
    }
}


impl From<String> for JainamError {
    fn from(s: String) -> JainamError {
        JainamError::Other(s)
    }
}
