use jainam_rs::auth::auth_loader::{JAINAM_API_SECRET, JAINAM_APP_CODE, JAINAM_USER_ID};
use jainam_rs::auth::{create_checksum, create_susertoken, load_credentials_from_env};
use jainam_rs::JainamError;
use sha2::{Digest, Sha256};

fn hex_sha256(s: &str) -> String {
    format!("{:x}", Sha256::digest(s.as_bytes()))
}

#[test]
fn test_checksum_is_sha256_of_concatenation() {
    let checksum = create_checksum("DK2200295", "abc123xyz", "S");
    assert_eq!(checksum, hex_sha256("DK2200295abc123xyzS"));
    assert_eq!(checksum.len(), 64);
    assert!(checksum.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_checksum_changes_with_any_input() {
    let base = create_checksum("DK2200295", "abc123xyz", "S");
    assert_ne!(base, create_checksum("DK2200296", "abc123xyz", "S"));
    assert_ne!(base, create_checksum("DK2200295", "abc123xyy", "S"));
    assert_ne!(base, create_checksum("DK2200295", "abc123xyz", "T"));
}

#[test]
fn test_susertoken_hashes_twice() {
    let token = "session-token";
    assert_eq!(create_susertoken(token), hex_sha256(&hex_sha256(token)));
}

#[test]
fn test_credentials_from_env() {
    std::env::set_var(JAINAM_USER_ID, "DK2200295");
    std::env::set_var(JAINAM_API_SECRET, "secret");
    std::env::remove_var(JAINAM_APP_CODE);
    let err = load_credentials_from_env().unwrap_err();
    assert!(matches!(err, JainamError::Validation(ref m) if m.contains(JAINAM_APP_CODE)));

    std::env::set_var(JAINAM_APP_CODE, " APP1 ");
    let credentials = load_credentials_from_env().unwrap();
    assert_eq!(credentials.user_id(), "DK2200295");
    assert_eq!(credentials.api_secret(), "secret");
    assert_eq!(credentials.app_code(), "APP1");
}
