//! Content download: video media over HTTP, page archives over CDP.
//!
//! Video units stream their media URL through an HTTP client that carries
//! the browser context's cookies. Lecture and quiz units are captured as
//! MHTML page archives, since their value is the rendered page itself.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::Cookie;
use chromiumoxide::cdp::browser_protocol::page::CaptureSnapshotParams;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::cookie::Jar;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use crate::browser::BrowserHandle;
use crate::constants::USER_AGENT;
use crate::models::{Course, Unit, UnitKind};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Per-invocation download options.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Directory downloads land in. Courses get a slug-named subdirectory.
    pub output_dir: PathBuf,
    /// Replace files that already exist instead of skipping them.
    pub overwrite: bool,
    /// Suppress the progress bar.
    pub quiet: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            overwrite: false,
            quiet: false,
        }
    }
}

/// Writes collected content to disk.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Downloads a single unit to `dest`.
    async fn download_unit(
        &self,
        unit: &Unit,
        dest: &Path,
        options: &DownloadOptions,
    ) -> anyhow::Result<()>;

    /// Downloads every unit of a course into a course subdirectory.
    async fn download_course(&self, course: &Course, options: &DownloadOptions)
    -> anyhow::Result<()>;
}

/// Downloader backed by the shared browser context.
pub struct MediaDownloader {
    handle: BrowserHandle,
}

impl MediaDownloader {
    #[must_use]
    pub fn new(handle: BrowserHandle) -> Self {
        Self { handle }
    }

    /// Streams a video's media URL to `dest` through an HTTP client that
    /// carries the browser context's cookies.
    async fn download_video(&self, unit: &Unit, dest: &Path) -> anyhow::Result<()> {
        let media_url = match &unit.media_url {
            Some(url) => url.clone(),
            None => self.resolve_media_url(unit).await?,
        };

        let cookies = self.handle.cookies().await?;
        let client = build_media_client(&cookies)?;
        stream_to_file(&client, &media_url, dest).await
    }

    /// Revisits the unit page to pick up the media URL when the collected
    /// record does not carry one.
    async fn resolve_media_url(&self, unit: &Unit) -> anyhow::Result<String> {
        debug!(slug = %unit.slug, "resolving media URL from unit page");
        let page = self.handle.new_page().await?;
        let result = async {
            page.goto(unit.url.as_str()).await?;
            page.wait_for_navigation().await?;

            for selector in ["video source", "video"] {
                let Ok(element) = page.find_element(selector).await else {
                    continue;
                };
                if let Some(src) = element.attribute("src").await.ok().flatten() {
                    if !src.trim().is_empty() {
                        return url::Url::parse(&unit.url)
                            .and_then(|base| base.join(&src))
                            .map(String::from)
                            .context("media URL failed to resolve against page URL");
                    }
                }
            }
            anyhow::bail!("no media element on video page {}", unit.url)
        }
        .await;
        let _ = page.close().await;
        result
    }

    /// Captures the rendered unit page as an MHTML archive.
    async fn download_page_archive(&self, unit: &Unit, dest: &Path) -> anyhow::Result<()> {
        let page = self.handle.new_page().await?;
        let result = async {
            page.goto(unit.url.as_str()).await?;
            page.wait_for_navigation().await?;

            let snapshot = page
                .execute(CaptureSnapshotParams::default())
                .await
                .context("page snapshot failed")?;
            tokio::fs::write(dest, snapshot.result.data.as_bytes())
                .await
                .with_context(|| format!("failed to write {}", dest.display()))?;
            Ok(())
        }
        .await;
        let _ = page.close().await;
        result
    }
}

#[async_trait]
impl Downloader for MediaDownloader {
    #[instrument(skip(self, unit, options), fields(slug = %unit.slug))]
    async fn download_unit(
        &self,
        unit: &Unit,
        dest: &Path,
        options: &DownloadOptions,
    ) -> anyhow::Result<()> {
        if dest.exists() && !options.overwrite {
            info!(dest = %dest.display(), "already downloaded, skipping");
            return Ok(());
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match unit.kind {
            UnitKind::Video => self.download_video(unit, dest).await?,
            UnitKind::Lecture | UnitKind::Quiz => self.download_page_archive(unit, dest).await?,
        }
        info!(dest = %dest.display(), "downloaded unit");
        Ok(())
    }

    #[instrument(skip(self, course, options), fields(slug = %course.slug))]
    async fn download_course(
        &self,
        course: &Course,
        options: &DownloadOptions,
    ) -> anyhow::Result<()> {
        let course_dir = options.output_dir.join(&course.slug);
        tokio::fs::create_dir_all(&course_dir).await?;

        let progress = course_progress(course, options.quiet);
        for unit in &course.units {
            progress.set_message(unit.slug.clone());
            let dest = course_dir.join(unit.file_name());
            self.download_unit(unit, &dest, options).await?;
            progress.inc(1);
        }
        progress.finish_with_message(format!("{} done", course.slug));

        info!(units = course.units.len(), dir = %course_dir.display(), "downloaded course");
        Ok(())
    }
}

fn course_progress(course: &Course, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(course.units.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Builds an HTTP client whose cookie jar mirrors the browser context, so
/// media requests are authenticated the same way page loads are.
fn build_media_client(cookies: &[Cookie]) -> anyhow::Result<reqwest::Client> {
    let jar = Jar::default();
    for cookie in cookies {
        let set_cookie = build_set_cookie_string(cookie);
        let origin = build_origin_url(cookie);
        if let Ok(url) = origin.parse::<reqwest::Url>() {
            jar.add_cookie_str(&set_cookie, &url);
        }
    }

    reqwest::Client::builder()
        .cookie_provider(Arc::new(jar))
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .gzip(true)
        .build()
        .context("failed to build media HTTP client")
}

/// Renders a browser cookie as a `Set-Cookie` string for jar insertion.
/// Expiry is omitted on purpose: the jar only lives for one download.
fn build_set_cookie_string(cookie: &Cookie) -> String {
    let mut parts = vec![format!("{}={}", cookie.name, cookie.value)];
    parts.push(format!("Domain={}", cookie.domain));
    parts.push(format!("Path={}", cookie.path));
    if cookie.secure {
        parts.push("Secure".to_string());
    }
    parts.join("; ")
}

/// Origin URL matching the cookie's domain and scheme, for
/// `Jar::add_cookie_str` domain matching.
fn build_origin_url(cookie: &Cookie) -> String {
    let scheme = if cookie.secure { "https" } else { "http" };
    let host = cookie.domain.trim_start_matches('.');
    format!("{scheme}://{host}{}", cookie.path)
}

/// Streams an HTTP response body to `dest`, cleaning up the partial file
/// when the transfer fails midway.
async fn stream_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> anyhow::Result<()> {
    debug!(url, dest = %dest.display(), "streaming media download");

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("server rejected media request for {url}"))?;

    let file = File::create(dest)
        .await
        .with_context(|| format!("failed to create {}", dest.display()))?;
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    let write_result: anyhow::Result<()> = async {
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| format!("stream from {url} broke"))?;
            writer.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(())
    }
    .await;

    if let Err(e) = write_result {
        if let Err(cleanup) = tokio::fs::remove_file(dest).await {
            warn!(dest = %dest.display(), "failed to remove partial file: {cleanup}");
        }
        return Err(e);
    }

    debug!(bytes_written, "media download complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // The protocol cookie type carries many required bookkeeping fields;
    // building it from its wire form keeps the tests focused on the ones
    // that matter here.
    fn cookie(name: &str, domain: &str, path: &str, secure: bool) -> Cookie {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "value": "v",
            "domain": domain,
            "path": path,
            "expires": -1.0,
            "size": 0,
            "httpOnly": false,
            "secure": secure,
            "session": true,
            "priority": "Medium",
            "sameParty": false,
            "sourceScheme": "Secure",
            "sourcePort": 443
        }))
        .unwrap()
    }

    #[test]
    fn test_set_cookie_string_has_domain_and_path() {
        let s = build_set_cookie_string(&cookie("sid", ".campus.example.com", "/", false));
        assert!(s.starts_with("sid=v"));
        assert!(s.contains("Domain=.campus.example.com"));
        assert!(s.contains("Path=/"));
        assert!(!s.contains("Secure"));
    }

    #[test]
    fn test_set_cookie_string_secure_flag() {
        let s = build_set_cookie_string(&cookie("sid", "campus.example.com", "/", true));
        assert!(s.ends_with("Secure"));
    }

    #[test]
    fn test_origin_url_strips_leading_dot() {
        assert_eq!(
            build_origin_url(&cookie("sid", ".campus.example.com", "/", true)),
            "https://campus.example.com/"
        );
    }

    #[test]
    fn test_origin_url_non_secure_scheme() {
        assert_eq!(
            build_origin_url(&cookie("sid", "campus.example.com", "/media", false)),
            "http://campus.example.com/media"
        );
    }

    #[test]
    fn test_default_options_download_into_working_dir() {
        let options = DownloadOptions::default();
        assert_eq!(options.output_dir, PathBuf::from("."));
        assert!(!options.overwrite);
        assert!(!options.quiet);
    }
}
