//! URL classification for platform content links.
//!
//! Pure, stateless functions: no network access, deterministic. A URL is
//! classified by its first path segment; everything that is not a known
//! content shape maps to `None`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;
use url::Url;

use crate::models::UnitKind;

/// Numeric id prefix on unit slugs, e.g. `123-some-slug`.
#[allow(clippy::expect_used)]
static ID_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-").expect("static pattern is valid"));

/// What a platform URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Video,
    Lecture,
    Quiz,
    Course,
}

impl ContentKind {
    /// The unit kind for unit-shaped content; `None` for courses.
    #[must_use]
    pub fn unit_kind(self) -> Option<UnitKind> {
        match self {
            Self::Video => Some(UnitKind::Video),
            Self::Lecture => Some(UnitKind::Lecture),
            Self::Quiz => Some(UnitKind::Quiz),
            Self::Course => None,
        }
    }
}

/// Classifies a URL string into a content kind, or `None` for anything that
/// is not a recognized platform content link.
///
/// Only http/https URLs with a host qualify. The host itself is not checked:
/// staging and mirror hosts serve the same paths.
#[must_use]
pub fn classify(url: &str) -> Option<ContentKind> {
    let parsed = Url::parse(url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
        return None;
    }

    let mut segments = parsed.path_segments()?;
    let section = segments.next()?;
    let slug = segments.next().filter(|s| !s.is_empty())?;

    let kind = match section {
        "videos" => ContentKind::Video,
        "lectures" => ContentKind::Lecture,
        "quizzes" => ContentKind::Quiz,
        "courses" => ContentKind::Course,
        _ => return None,
    };

    trace!(url, ?kind, slug, "classified URL");
    Some(kind)
}

/// Returns true for video unit URLs.
#[must_use]
pub fn is_video(url: &str) -> bool {
    classify(url) == Some(ContentKind::Video)
}

/// Returns true for lecture unit URLs.
#[must_use]
pub fn is_lecture(url: &str) -> bool {
    classify(url) == Some(ContentKind::Lecture)
}

/// Returns true for quiz unit URLs.
#[must_use]
pub fn is_quiz(url: &str) -> bool {
    classify(url) == Some(ContentKind::Quiz)
}

/// Returns true for course URLs.
#[must_use]
pub fn is_course(url: &str) -> bool {
    classify(url) == Some(ContentKind::Course)
}

/// Extracts the stable slug from a content URL: the segment after the
/// section, with any numeric id prefix stripped (`123-some-slug` →
/// `some-slug`).
#[must_use]
pub fn slug_from_url(url: &str) -> Option<String> {
    classify(url)?;
    let parsed = Url::parse(url).ok()?;
    let raw = parsed.path_segments()?.nth(1)?;
    Some(ID_PREFIX.replace(raw, "").into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_video_url() {
        assert_eq!(
            classify("https://campus.example.com/videos/123-ownership"),
            Some(ContentKind::Video)
        );
    }

    #[test]
    fn test_classify_lecture_url() {
        assert_eq!(
            classify("https://campus.example.com/lectures/45-borrowing"),
            Some(ContentKind::Lecture)
        );
    }

    #[test]
    fn test_classify_quiz_url() {
        assert_eq!(
            classify("https://campus.example.com/quizzes/7-lifetimes"),
            Some(ContentKind::Quiz)
        );
    }

    #[test]
    fn test_classify_course_url() {
        assert_eq!(
            classify("https://campus.example.com/courses/rust-from-zero"),
            Some(ContentKind::Course)
        );
    }

    #[test]
    fn test_classify_ignores_host() {
        // Mirror/staging hosts serve the same path shapes
        assert_eq!(
            classify("https://platform/videos/123-some-slug"),
            Some(ContentKind::Video)
        );
    }

    #[test]
    fn test_classify_rejects_unrelated_url() {
        assert_eq!(classify("https://example.com/"), None);
        assert_eq!(classify("https://example.com/blog/post"), None);
    }

    #[test]
    fn test_classify_rejects_empty_and_garbage() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("not a url"), None);
        assert_eq!(classify("ftp://campus.example.com/videos/1-x"), None);
    }

    #[test]
    fn test_classify_rejects_section_without_slug() {
        assert_eq!(classify("https://campus.example.com/videos"), None);
        assert_eq!(classify("https://campus.example.com/videos/"), None);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let url = "https://campus.example.com/quizzes/9-traits";
        assert_eq!(classify(url), classify(url));
    }

    #[test]
    fn test_predicates_are_mutually_exclusive() {
        let url = "https://campus.example.com/videos/1-a";
        assert!(is_video(url));
        assert!(!is_lecture(url));
        assert!(!is_quiz(url));
        assert!(!is_course(url));
    }

    #[test]
    fn test_slug_strips_numeric_id_prefix() {
        assert_eq!(
            slug_from_url("https://campus.example.com/videos/123-some-slug").as_deref(),
            Some("some-slug")
        );
    }

    #[test]
    fn test_slug_without_id_prefix_kept_verbatim() {
        assert_eq!(
            slug_from_url("https://campus.example.com/courses/rust-from-zero").as_deref(),
            Some("rust-from-zero")
        );
    }

    #[test]
    fn test_slug_from_unclassified_url_is_none() {
        assert_eq!(slug_from_url("https://example.com/videos"), None);
        assert_eq!(slug_from_url(""), None);
    }
}
