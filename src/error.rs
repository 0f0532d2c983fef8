//! Error taxonomy for session operations.
//!
//! Every public facade operation returns [`SessionError`], never a raw
//! browser-driver or HTTP error. The original cause is preserved as the
//! `source` for diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::cookies::CookieImportError;

/// Errors surfaced by [`crate::session::Session`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The interactive login did not complete (greeting never appeared,
    /// or something failed during the login flow).
    #[error("login did not complete: {reason}")]
    Login {
        /// What went wrong, user-facing.
        reason: String,
    },

    /// A gated operation was invoked before a successful login or probe.
    #[error("authentication required: run `campus-dl login` or import cookies first")]
    AuthenticationRequired,

    /// The facade was used before `start()` launched the browser.
    #[error("session not started: call start() before issuing requests")]
    NotStarted,

    /// Uniform wrapper around any failure inside a network/browser-touching
    /// operation other than login.
    #[error("request failed: {source}")]
    Request {
        /// The underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// `download` was called with a URL the classifier cannot categorize.
    #[error("invalid URL {url}: expected a video, lecture, quiz or course link")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// Reading or normalizing a cookie export file failed.
    #[error("cookie import from {path} failed: {source}")]
    CookieImport {
        /// The cookie export file.
        path: PathBuf,
        /// What was wrong with it.
        #[source]
        source: CookieImportError,
    },
}

impl SessionError {
    /// Creates a login error from any displayable cause.
    pub fn login(reason: impl std::fmt::Display) -> Self {
        Self::Login {
            reason: reason.to_string(),
        }
    }

    /// Wraps an underlying failure as a request error, preserving the cause.
    pub fn request(source: anyhow::Error) -> Self {
        Self::Request {
            source: source.into(),
        }
    }

    /// Creates an invalid-URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a cookie import error.
    pub fn cookie_import(path: impl Into<PathBuf>, source: CookieImportError) -> Self {
        Self::CookieImport {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_display_includes_reason() {
        let error = SessionError::login("greeting element never appeared");
        assert!(error.to_string().contains("login did not complete"));
        assert!(error.to_string().contains("greeting element never appeared"));
    }

    #[test]
    fn test_request_error_preserves_cause() {
        let error = SessionError::request(anyhow::anyhow!("connection reset"));
        let msg = error.to_string();
        assert!(msg.contains("request failed"), "got: {msg}");
        assert!(msg.contains("connection reset"), "got: {msg}");
        assert!(
            std::error::Error::source(&error).is_some(),
            "cause must survive wrapping"
        );
    }

    #[test]
    fn test_invalid_url_display_names_the_url() {
        let error = SessionError::invalid_url("https://example.com/");
        assert!(error.to_string().contains("https://example.com/"));
    }

    #[test]
    fn test_authentication_required_suggests_login() {
        let msg = SessionError::AuthenticationRequired.to_string();
        assert!(msg.contains("login"), "got: {msg}");
    }
}
