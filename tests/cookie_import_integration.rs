//! Integration tests for cookie export files on disk.

use std::io::Write;

use campus_dl::CookieImportError;
use campus_dl::cookies::read_cookie_file;

fn write_fixture(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_import_browser_extension_export() {
    let fixture = write_fixture(
        r#"[
  {
    "domain": ".campus.example.com",
    "expirationDate": 4102444800.5,
    "httpOnly": true,
    "name": "_campus_session",
    "path": "/",
    "sameSite": "lax",
    "secure": true,
    "value": "deadbeef"
  },
  {
    "domain": "campus.example.com",
    "name": "locale",
    "value": "en"
  }
]"#,
    );

    let cookies = read_cookie_file(fixture.path()).await.unwrap();
    assert_eq!(cookies.len(), 2);
    assert_eq!(cookies[0].name, "_campus_session");
    assert_eq!(cookies[1].path.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_import_wrapped_export() {
    let fixture = write_fixture(
        r#"{ "cookies": [ { "domain": "campus.example.com", "name": "sid", "value": "x" } ] }"#,
    );
    let cookies = read_cookie_file(fixture.path()).await.unwrap();
    assert_eq!(cookies.len(), 1);
}

#[tokio::test]
async fn test_import_malformed_entry_reports_position() {
    let fixture = write_fixture(r#"[ { "domain": "d.com", "value": "no-name" } ]"#);
    let err = read_cookie_file(fixture.path()).await.unwrap_err();
    match err {
        CookieImportError::Entry { index, .. } => assert_eq!(index, 1),
        other => panic!("expected Entry error, got: {other}"),
    }
}

#[tokio::test]
async fn test_import_non_json_file_fails() {
    let fixture = write_fixture("# Netscape HTTP Cookie File\n.d.com\tTRUE\t/\tFALSE\t0\ta\tb\n");
    assert!(matches!(
        read_cookie_file(fixture.path()).await,
        Err(CookieImportError::Json(_))
    ));
}
