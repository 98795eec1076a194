use chrono::{Duration, Utc};
use jainam_rs::session::{is_session_valid, is_session_valid_at};
use jainam_rs::{JainamError, Session, SessionManager};
use tempfile::tempdir;

use crate::common::{test_session, TOKEN, USER_ID};

#[test]
fn test_save_then_load_returns_same_session() {
    let dir = tempdir().unwrap();
    let manager = SessionManager::with_path(dir.path().join("session.json"));
    let session = test_session().with_app_code("APP1");
    manager.save_session(&session).unwrap();
    assert_eq!(manager.load_session(), Some(session));
}

#[test]
fn test_save_overwrites_previous_record() {
    let dir = tempdir().unwrap();
    let manager = SessionManager::with_path(dir.path().join("session.json"));
    manager.save_session(&test_session()).unwrap();
    let newer = Session::new(USER_ID, "second-token", "checksum", Utc::now());
    manager.save_session(&newer).unwrap();
    assert_eq!(manager.load_session().unwrap().access_token, "second-token");
}

#[test]
fn test_save_leaves_no_temporary_files() {
    let dir = tempdir().unwrap();
    let manager = SessionManager::with_path(dir.path().join("session.json"));
    manager.save_session(&test_session()).unwrap();
    manager.save_session(&test_session()).unwrap();
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_save_creates_missing_parent_directory() {
    let dir = tempdir().unwrap();
    let manager = SessionManager::with_path(dir.path().join("nested").join("session.json"));
    manager.save_session(&test_session()).unwrap();
    assert!(manager.load_session().is_some());
}

#[test]
fn test_incomplete_session_is_not_saved() {
    let dir = tempdir().unwrap();
    let manager = SessionManager::with_path(dir.path().join("session.json"));
    let partial = Session::new(USER_ID, "", "checksum", Utc::now());
    let err = manager.save_session(&partial).unwrap_err();
    assert!(matches!(err, JainamError::Validation(_)));
    assert!(!manager.path().exists());
}

#[test]
fn test_missing_file_loads_as_none() {
    let dir = tempdir().unwrap();
    let manager = SessionManager::with_path(dir.path().join("absent.json"));
    assert_eq!(manager.load_session(), None);
}

#[test]
fn test_corrupt_or_partial_file_loads_as_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    let manager = SessionManager::with_path(&path);

    std::fs::write(&path, "{not json").unwrap();
    assert_eq!(manager.load_session(), None);

    std::fs::write(&path, r#"{"user_id":"DK2200295","access_token":"t"}"#).unwrap();
    assert_eq!(manager.load_session(), None);

    std::fs::write(
        &path,
        r#"{"user_id":"DK2200295","access_token":"","checksum":"c","login_time":"2025-01-01T09:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(manager.load_session(), None);
}

#[test]
fn test_record_without_app_code_loads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(
        &path,
        r#"{"user_id":"DK2200295","access_token":"t","checksum":"c","login_time":"2025-01-01T09:00:00+05:30"}"#,
    )
    .unwrap();
    let session = SessionManager::with_path(&path).load_session().unwrap();
    assert_eq!(session.user_id, "DK2200295");
    assert_eq!(session.app_code, None);
}

#[test]
fn test_clear_session_is_idempotent() {
    let dir = tempdir().unwrap();
    let manager = SessionManager::with_path(dir.path().join("session.json"));
    manager.save_session(&test_session()).unwrap();
    manager.clear_session().unwrap();
    assert!(!manager.path().exists());
    manager.clear_session().unwrap();
    assert_eq!(manager.load_session(), None);
}

#[test]
fn test_nine_hour_old_session_is_invalid() {
    let session = Session::new(USER_ID, TOKEN, "c", Utc::now() - Duration::hours(9));
    assert!(!is_session_valid(&session, Duration::hours(8)));
    assert!(is_session_valid(&test_session(), SessionManager::DEFAULT_MAX_AGE));
}

#[test]
fn test_exactly_max_age_is_invalid() {
    let now = Utc::now();
    let session = Session::new(USER_ID, TOKEN, "c", now - Duration::hours(8));
    assert!(!is_session_valid_at(&session, Duration::hours(8), now));
    assert!(is_session_valid_at(
        &session,
        Duration::hours(8),
        now - Duration::seconds(1)
    ));
}

#[test]
fn test_load_valid_session_filters_expired() {
    let dir = tempdir().unwrap();
    let manager = SessionManager::with_path(dir.path().join("session.json"));
    let old = Session::new(USER_ID, TOKEN, "c", Utc::now() - Duration::hours(9));
    manager.save_session(&old).unwrap();
    assert!(manager.load_session().is_some());
    assert_eq!(manager.load_valid_session(SessionManager::DEFAULT_MAX_AGE), None);
    assert!(manager.load_valid_session(Duration::hours(10)).is_some());
}

#[test]
fn test_get_api_client_carries_token() {
    let manager = SessionManager::with_path("unused.json");
    let client = manager.get_api_client(&test_session());
    assert_eq!(client.access_token(), Some(TOKEN));
    assert_eq!(client.user_id(), Some(USER_ID));
    assert!(client.is_authenticated());
}
