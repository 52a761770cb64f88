use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use weka_event_logger::config::ClusterSettings;
use weka_event_logger::credentials::{load_token_file, CredentialError, Credentials};

fn cluster(username: Option<&str>, password: Option<&str>, token_file: Option<PathBuf>) -> ClusterSettings {
    ClusterSettings {
        hosts: vec!["10.0.0.1".to_string()],
        username: username.map(str::to_string),
        password: password.map(str::to_string),
        organization: "root".to_string(),
        auth_token_file: token_file,
        port: 14000,
        verify_ssl: false,
    }
}

fn write_token_file(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("auth-token.json");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_password_login() {
    let creds = Credentials::resolve(&cluster(Some("admin"), Some("secret"), None)).unwrap();

    let login = creds.login.unwrap();
    assert_eq!(login.username, "admin");
    assert_eq!(login.password, "secret");
    assert_eq!(login.organization, "root");
    assert!(creds.tokens.is_none());
}

#[test]
fn test_token_file() {
    let dir = TempDir::new().unwrap();
    let path = write_token_file(
        &dir,
        r#"{"access_token":"acc","refresh_token":"ref-789","token_type":"Bearer"}"#,
    );

    let creds = Credentials::resolve(&cluster(None, None, Some(path))).unwrap();

    let tokens = creds.tokens.unwrap();
    assert_eq!(tokens.refresh_token, "ref-789");
    assert_eq!(tokens.extra["access_token"], "acc");
    assert!(creds.login.is_none());
}

#[test]
fn test_no_credentials() {
    let err = Credentials::resolve(&cluster(None, None, None)).unwrap_err();
    assert!(matches!(err, CredentialError::NoCredentials));
}

#[test]
fn test_username_without_password_is_not_enough() {
    let err = Credentials::resolve(&cluster(Some("admin"), None, None)).unwrap_err();
    assert!(matches!(err, CredentialError::NoCredentials));
}

#[test]
fn test_unreadable_token_file_falls_back_to_password() {
    let creds = Credentials::resolve(&cluster(
        Some("admin"),
        Some("secret"),
        Some(PathBuf::from("/nonexistent/auth-token.json")),
    ))
    .unwrap();

    assert!(creds.tokens.is_none());
    assert!(creds.login.is_some());
}

#[test]
fn test_unreadable_token_file_alone_is_fatal() {
    let err = Credentials::resolve(&cluster(
        None,
        None,
        Some(PathBuf::from("/nonexistent/auth-token.json")),
    ))
    .unwrap_err();
    assert!(matches!(err, CredentialError::NoCredentials));
}

#[test]
fn test_token_file_without_refresh_token() {
    let dir = TempDir::new().unwrap();
    let path = write_token_file(&dir, r#"{"access_token":"acc"}"#);

    let err = load_token_file(&path).unwrap_err();
    assert!(matches!(err, CredentialError::Parse { .. }));
}
