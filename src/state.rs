//! Session state persistence.
//!
//! The persisted blob is the browser context's cookie set serialized as
//! JSON. Callers treat it as opaque: it is written after a successful login
//! or cookie import and read back on `start()` to restore the context.

use std::path::{Path, PathBuf};

use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::{CONFIG_DIR_NAME, SESSION_FILE_NAME};

/// Errors from reading or writing the persisted session blob.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes the session blob to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`StateError`] when the directory cannot be created, the file
/// cannot be written, or serialization fails.
pub async fn save_state<T: Serialize>(path: &Path, state: &T) -> Result<(), StateError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(state)?;
    tokio::fs::write(path, json).await?;
    debug!(path = %path.display(), "persisted session state");
    Ok(())
}

/// Loads the persisted session blob.
///
/// Returns `Ok(None)` when no session file exists. A present but corrupt
/// file is an error; callers decide whether to treat it as fatal.
///
/// # Errors
///
/// Returns [`StateError`] for unreadable files or invalid JSON.
pub async fn load_state(path: &Path) -> Result<Option<Vec<CookieParam>>, StateError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no persisted session state");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let cookies: Vec<CookieParam> = serde_json::from_str(&raw)?;
    debug!(path = %path.display(), count = cookies.len(), "loaded session state");
    Ok(Some(cookies))
}

/// Removes the persisted session blob. Returns whether a file existed.
///
/// # Errors
///
/// Returns an I/O error for failures other than the file being absent.
pub async fn clear_state(path: &Path) -> std::io::Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "cleared session state");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Default location of the session file: `$XDG_CONFIG_HOME/campus-dl/`
/// falling back to `~/.config/campus-dl/`, and finally the working
/// directory when no home can be determined.
#[must_use]
pub fn default_session_file() -> PathBuf {
    config_dir().join(SESSION_FILE_NAME)
}

fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return PathBuf::from(xdg).join(CONFIG_DIR_NAME);
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        if !home.trim().is_empty() {
            return PathBuf::from(home).join(".config").join(CONFIG_DIR_NAME);
        }
    }
    warn!("no config directory available, using working directory");
    PathBuf::from(".").join(CONFIG_DIR_NAME)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_cookies() -> Vec<CookieParam> {
        vec![
            CookieParam::builder()
                .name("session")
                .value("abc123")
                .domain(".campus.example.com")
                .build()
                .unwrap(),
        ]
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        save_state(&path, &sample_cookies()).await.unwrap();
        let loaded = load_state(&path).await.unwrap().unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "session");
        assert_eq!(loaded[0].value, "abc123");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(load_state(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();
        assert!(matches!(
            load_state(&path).await,
            Err(StateError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_reports_whether_file_existed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        assert!(!clear_state(&path).await.unwrap());

        tokio::fs::write(&path, "[]").await.unwrap();
        assert!(clear_state(&path).await.unwrap());
        assert!(!path.exists());
    }
}
