//! Session caching.
//!
//! A login is an SSO exchange with a single use auth code, so the resulting bearer
//! token is cached on disk and reused until it ages out:
//!
//! ```no_run
//! use jainam_rs::{Credentials, JainamClient, SessionManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = SessionManager::new();
//! let session = match manager.load_valid_session(SessionManager::DEFAULT_MAX_AGE) {
//!     Some(session) => session,
//!     None => {
//!         let credentials = Credentials::from_env()?;
//!         manager.login(&JainamClient::new(), &credentials, "AUTH_CODE").await?
//!     }
//! };
//! let client = manager.get_api_client(&session);
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::auth::{Credentials, Session};
use crate::client::JainamClient;
use crate::errors::JainamError;


const SESSION_FILE_NAME: &str = ".jainam_session.json";


/// Owns the on-disk session record.
///
/// One record per local user, keyed by file path. The manager holds no session
/// state of its own; sessions are plain values passed in and out.
#[derive(Debug, Clone)]
pub struct SessionManager {
    path: PathBuf,
}


impl Default for SessionManager {
    fn default() -> Self {
        SessionManager::new()
    }
}


impl SessionManager {
    /// Sessions usually expire at the end of the trading day.
    pub const DEFAULT_MAX_AGE: Duration = Duration::hours(8);


    /// Manager for `$HOME/.jainam_session.json` (current directory if no home is set).
    pub fn new() -> Self {
        Self::with_path(default_session_path())
    }


    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }


    pub fn path(&self) -> &Path {
        &self.path
    }


    /// Exchange the auth code for a session and cache it.
    pub async fn login(
        &self,
        client: &JainamClient,
        credentials: &Credentials,
        auth_code: &str,
    ) -> Result<Session, JainamError> {
        let session = client
            .login_with_sso(
                credentials.user_id(),
                auth_code,
                credentials.api_secret(),
                credentials.app_code(),
            )
            .await?;
        self.save_session(&session)?;
        Ok(session)
    }


    /// Write the session record, replacing any previous one.
    ///
    /// The record is written to a temporary file next to the destination and
    /// renamed over it, so a reader never observes a partial file. The temporary
    /// file is removed if anything fails before the rename.
    pub fn save_session(&self, session: &Session) -> Result<(), JainamError> {
        if !session.is_complete() {
            return Err(JainamError::Validation(
                "refusing to save an incomplete session".into(),
            ));
        }
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), session)?;
        tmp.as_file_mut().write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| JainamError::IoError(e.error))?;

        info!(path = %self.path.display(), user_id = %session.user_id, "session saved");
        Ok(())
    }


    /// Read the session record.
    ///
    /// A missing, unreadable or malformed record is reported as `None`, never as
    /// an error.
    pub fn load_session(&self) -> Option<Session> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cached session");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), "could not read session: {e}");
                return None;
            }
        };
        match serde_json::from_str::<Session>(&data) {
            Ok(session) if session.is_complete() => Some(session),
            Ok(_) => {
                warn!(path = %self.path.display(), "cached session is incomplete");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), "could not parse session: {e}");
                None
            }
        }
    }


    /// [`load_session`](Self::load_session) restricted to sessions younger than `max_age`.
    pub fn load_valid_session(&self, max_age: Duration) -> Option<Session> {
        self.load_session()
            .filter(|session| is_session_valid(session, max_age))
    }


    /// Delete the record. Deleting a missing record is not an error.
    pub fn clear_session(&self) -> Result<(), JainamError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }


    /// Façade client carrying the session's token. The session is not re-validated.
    pub fn get_api_client(&self, session: &Session) -> JainamClient {
        JainamClient::with_session(session)
    }


    pub fn is_session_valid(&self, session: &Session, max_age: Duration) -> bool {
        is_session_valid(session, max_age)
    }
}


fn default_session_path() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SESSION_FILE_NAME)
}


/// `true` while the session is strictly younger than `max_age`.
pub fn is_session_valid(session: &Session, max_age: Duration) -> bool {
    is_session_valid_at(session, max_age, Utc::now())
}


/// [`is_session_valid`] against an explicit clock.
pub fn is_session_valid_at(session: &Session, max_age: Duration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(session.login_time) < max_age
}
