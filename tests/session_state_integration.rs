//! Integration tests for session persistence and the facade's logout path.

use campus_dl::cookies::normalize_cookies;
use campus_dl::state::{clear_state, load_state, save_state};
use campus_dl::{Session, SessionConfig};

#[tokio::test]
async fn test_state_round_trip_through_cookie_normalization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let cookies = normalize_cookies(
        r#"[ { "domain": ".campus.example.com", "name": "sid", "value": "s3cret", "secure": true } ]"#,
    )
    .unwrap();

    save_state(&path, &cookies).await.unwrap();
    let restored = load_state(&path).await.unwrap().unwrap();

    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].name, "sid");
    assert_eq!(restored[0].value, "s3cret");
    assert_eq!(restored[0].secure, Some(true));
}

#[tokio::test]
async fn test_clear_state_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    save_state(&path, &Vec::<serde_json::Value>::new())
        .await
        .unwrap();
    assert!(clear_state(&path).await.unwrap());
    assert!(!clear_state(&path).await.unwrap());
}

#[tokio::test]
async fn test_logout_through_facade_removes_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    tokio::fs::write(&session_file, "[]").await.unwrap();

    let session = Session::new(SessionConfig {
        session_file: session_file.clone(),
        ..SessionConfig::default()
    });

    session.logout().await.unwrap();
    assert!(!session_file.exists());

    // A second logout with nothing persisted is still fine.
    session.logout().await.unwrap();
}

#[tokio::test]
async fn test_new_session_starts_unauthenticated() {
    let session = Session::new(SessionConfig::default());
    assert!(!session.is_authenticated());
}
