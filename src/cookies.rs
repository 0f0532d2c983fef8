//! Cookie export parsing and normalization to the browser-context schema.
//!
//! Accepts JSON cookie exports from common browser extensions, either a bare
//! array or `{ "cookies": [...] }`. The target schema is the CDP
//! `CookieParam` contract, which is fixed and external to this crate:
//!
//! - `name`, `value`, `domain` — required, non-empty
//! - `path` — optional, defaults to `/`
//! - `secure`, `httpOnly` — optional booleans
//! - `sameSite` — optional, one of `strict` / `lax` / `no_restriction`
//! - `expirationDate` (or `expires`) — optional Unix seconds
//!
//! Malformed entries fail fast with the entry index rather than being
//! silently installed.

use std::path::Path;

use chromiumoxide::cdp::browser_protocol::network::{CookieParam, CookieSameSite, TimeSinceEpoch};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Errors that can occur while importing a cookie export file.
#[derive(Debug, thiserror::Error)]
pub enum CookieImportError {
    /// The export file could not be read.
    #[error("failed to read cookie file: {0}")]
    Io(#[from] std::io::Error),

    /// The export file is not valid JSON.
    #[error("invalid cookie JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A cookie entry is malformed (1-based index into the export).
    #[error("cookie entry {index}: {reason}")]
    Entry {
        /// 1-based position of the offending entry.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The export parsed but contained no cookies at all.
    #[error("cookie file contains no cookies")]
    Empty,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CookieExport {
    Array(Vec<ExportEntry>),
    Wrapped { cookies: Vec<ExportEntry> },
}

/// One entry of a browser-extension cookie export. Field aliases cover the
/// spellings seen across popular export extensions.
#[derive(Debug, Deserialize)]
struct ExportEntry {
    name: Option<String>,
    value: Option<String>,
    #[serde(alias = "host")]
    domain: Option<String>,
    path: Option<String>,
    secure: Option<bool>,
    #[serde(rename = "httpOnly")]
    http_only: Option<bool>,
    #[serde(rename = "sameSite")]
    same_site: Option<String>,
    #[serde(rename = "expirationDate", alias = "expires")]
    expiration_date: Option<f64>,
}

/// Reads a JSON cookie export from disk and normalizes it.
///
/// # Errors
///
/// Returns [`CookieImportError`] when the file is missing or unreadable, is
/// not valid JSON, is empty, or contains a malformed entry.
#[instrument(level = "debug")]
pub async fn read_cookie_file(path: &Path) -> Result<Vec<CookieParam>, CookieImportError> {
    let raw = tokio::fs::read_to_string(path).await?;
    normalize_cookies(&raw)
}

/// Normalizes a JSON cookie export into CDP cookie parameters.
///
/// # Errors
///
/// Returns [`CookieImportError`] for invalid JSON, an empty export, or a
/// malformed entry (fail-fast; no partial installs).
pub fn normalize_cookies(raw: &str) -> Result<Vec<CookieParam>, CookieImportError> {
    let export: CookieExport = serde_json::from_str(raw)?;
    let entries = match export {
        CookieExport::Array(entries) | CookieExport::Wrapped { cookies: entries } => entries,
    };

    if entries.is_empty() {
        return Err(CookieImportError::Empty);
    }

    let mut cookies = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        let index = idx + 1;
        cookies.push(convert_entry(entry, index)?);
    }

    debug!(count = cookies.len(), "normalized cookie export");
    Ok(cookies)
}

fn convert_entry(entry: ExportEntry, index: usize) -> Result<CookieParam, CookieImportError> {
    let entry_error = |reason: String| CookieImportError::Entry { index, reason };

    let name = required_field(entry.name, "name").map_err(&entry_error)?;
    let value = required_field(entry.value, "value").map_err(&entry_error)?;
    let domain = required_field(entry.domain, "domain").map_err(&entry_error)?;

    let path = entry
        .path
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| "/".to_string());

    let mut builder = CookieParam::builder()
        .name(name)
        .value(value)
        .domain(domain)
        .path(path);

    if let Some(secure) = entry.secure {
        builder = builder.secure(secure);
    }
    if let Some(http_only) = entry.http_only {
        builder = builder.http_only(http_only);
    }
    if let Some(raw_same_site) = entry.same_site.as_deref() {
        if let Some(same_site) = parse_same_site(raw_same_site)
            .map_err(|reason| entry_error(reason))?
        {
            builder = builder.same_site(same_site);
        }
    }
    if let Some(expiry) = entry.expiration_date {
        if expiry.is_finite() && expiry > 0.0 {
            builder = builder.expires(TimeSinceEpoch::new(expiry));
        }
    }

    builder
        .build()
        .map_err(|reason| entry_error(format!("not a valid cookie: {reason}")))
}

fn required_field(value: Option<String>, field: &str) -> Result<String, String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("missing required field: {field}"))
}

/// Maps extension-export sameSite spellings onto the CDP enum.
/// `unspecified` means "no attribute" and is dropped, not an error.
fn parse_same_site(raw: &str) -> Result<Option<CookieSameSite>, String> {
    match raw.to_ascii_lowercase().as_str() {
        "strict" => Ok(Some(CookieSameSite::Strict)),
        "lax" => Ok(Some(CookieSameSite::Lax)),
        "none" | "no_restriction" => Ok(Some(CookieSameSite::None)),
        "unspecified" | "" => Ok(None),
        other => Err(format!("unsupported sameSite value '{other}'")),
    }
}
