//! Metadata collection by scraping platform pages.
//!
//! A [`Collector`] turns content URLs into structured [`Unit`] and
//! [`Course`] records. The production implementation drives the shared
//! browser context; the trait exists so the session facade can be exercised
//! without a browser.

use async_trait::async_trait;
use chromiumoxide::Page;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::browser::BrowserHandle;
use crate::classify::{self, ContentKind};
use crate::models::{Course, Unit, UnitKind};

/// Selector for the page heading used as the unit/course title.
const TITLE_SELECTOR: &str = "h1";

/// Selectors tried in order for the direct media URL of a video page.
const MEDIA_SELECTORS: &[&str] = &["video source", "video"];

/// Fetches structured metadata for platform content.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Fetches metadata for a single unit page.
    async fn fetch_unit(&self, url: &str) -> anyhow::Result<Unit>;

    /// Fetches a course page and enumerates its units.
    async fn fetch_course(&self, url: &str) -> anyhow::Result<Course>;
}

/// Collector backed by the shared browser context.
pub struct ScrapeCollector {
    handle: BrowserHandle,
}

impl ScrapeCollector {
    #[must_use]
    pub fn new(handle: BrowserHandle) -> Self {
        Self { handle }
    }

    async fn scrape_unit(&self, page: &Page, url: &str, kind: UnitKind) -> anyhow::Result<Unit> {
        let slug = classify::slug_from_url(url)
            .ok_or_else(|| anyhow::anyhow!("no slug in unit URL: {url}"))?;
        let title = scrape_title(page).await.unwrap_or_else(|| slug.clone());

        let media_url = if kind == UnitKind::Video {
            let found = scrape_media_url(page, url).await;
            if found.is_none() {
                warn!(url, "video page has no resolvable media element");
            }
            found
        } else {
            None
        };

        Ok(Unit {
            kind,
            slug,
            title,
            url: url.to_string(),
            media_url,
        })
    }
}

#[async_trait]
impl Collector for ScrapeCollector {
    #[instrument(skip(self))]
    async fn fetch_unit(&self, url: &str) -> anyhow::Result<Unit> {
        let kind = classify::classify(url)
            .and_then(ContentKind::unit_kind)
            .ok_or_else(|| anyhow::anyhow!("not a unit URL: {url}"))?;

        let page = self.handle.new_page().await?;
        let result = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            self.scrape_unit(&page, url, kind).await
        }
        .await;
        let _ = page.close().await;

        let unit = result?;
        debug!(slug = %unit.slug, ?unit.kind, "collected unit");
        Ok(unit)
    }

    #[instrument(skip(self))]
    async fn fetch_course(&self, url: &str) -> anyhow::Result<Course> {
        if !classify::is_course(url) {
            anyhow::bail!("not a course URL: {url}");
        }
        let slug = classify::slug_from_url(url)
            .ok_or_else(|| anyhow::anyhow!("no slug in course URL: {url}"))?;

        let page = self.handle.new_page().await?;
        let result: anyhow::Result<Course> = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;

            let title = scrape_title(&page).await.unwrap_or_else(|| slug.clone());
            let units = scrape_course_units(&page, url).await?;
            Ok(Course { slug, title, units })
        }
        .await;
        let _ = page.close().await;

        let course: Course = result?;
        debug!(slug = %course.slug, units = course.units.len(), "collected course");
        Ok(course)
    }
}

async fn scrape_title(page: &Page) -> Option<String> {
    let element = page.find_element(TITLE_SELECTOR).await.ok()?;
    element
        .inner_text()
        .await
        .ok()
        .flatten()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Looks for a playable media source on the current page and absolutizes
/// it against the page URL.
async fn scrape_media_url(page: &Page, page_url: &str) -> Option<String> {
    for selector in MEDIA_SELECTORS {
        let Ok(element) = page.find_element(*selector).await else {
            continue;
        };
        if let Some(src) = element.attribute("src").await.ok().flatten() {
            if !src.trim().is_empty() {
                return absolutize(page_url, &src);
            }
        }
    }
    None
}

/// Enumerates the syllabus links on a course page, in document order,
/// keeping only recognized unit URLs and dropping duplicates.
async fn scrape_course_units(page: &Page, course_url: &str) -> anyhow::Result<Vec<Unit>> {
    let anchors = page
        .find_elements("a")
        .await
        .map_err(|e| anyhow::anyhow!("failed to enumerate course links: {e}"))?;

    let mut units = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for anchor in anchors {
        let Some(href) = anchor.attribute("href").await.ok().flatten() else {
            continue;
        };
        let Some(absolute) = absolutize(course_url, &href) else {
            continue;
        };
        let Some(kind) = classify::classify(&absolute).and_then(ContentKind::unit_kind) else {
            continue;
        };
        let Some(slug) = classify::slug_from_url(&absolute) else {
            continue;
        };
        if !seen.insert(absolute.clone()) {
            continue;
        }

        let title = anchor
            .inner_text()
            .await
            .ok()
            .flatten()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| slug.clone());

        units.push(Unit {
            kind,
            slug,
            title,
            url: absolute,
            media_url: None,
        });
    }

    Ok(units)
}

fn absolutize(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_absolutize_relative_href() {
        assert_eq!(
            absolutize("https://campus.example.com/courses/rust", "/videos/1-a").as_deref(),
            Some("https://campus.example.com/videos/1-a")
        );
    }

    #[test]
    fn test_absolutize_keeps_absolute_href() {
        assert_eq!(
            absolutize(
                "https://campus.example.com/courses/rust",
                "https://cdn.example.com/media/a.mp4"
            )
            .as_deref(),
            Some("https://cdn.example.com/media/a.mp4")
        );
    }

    #[test]
    fn test_absolutize_garbage_base_is_none() {
        assert_eq!(absolutize("not a url", "/videos/1-a"), None);
    }
}
