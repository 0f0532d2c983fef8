//! Content records produced by collectors and consumed by downloaders.

use serde::{Deserialize, Serialize};

use crate::constants::{PAGE_ARCHIVE_EXTENSION, VIDEO_EXTENSION};

/// The kind of a single content unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Video,
    Lecture,
    Quiz,
}

/// A single piece of course content. Built once by a collector from scraped
/// page data; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Content type.
    pub kind: UnitKind,
    /// Stable identifier, used to name the downloaded file.
    pub slug: String,
    /// Page title as scraped.
    pub title: String,
    /// Canonical unit URL.
    pub url: String,
    /// Direct media URL for video units, when already resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl Unit {
    /// Extension chosen by content type: media file for videos, a page
    /// archive for everything else.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self.kind {
            UnitKind::Video => VIDEO_EXTENSION,
            UnitKind::Lecture | UnitKind::Quiz => PAGE_ARCHIVE_EXTENSION,
        }
    }

    /// Destination file name derived from the slug.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}{}", self.slug, self.extension())
    }
}

/// A course: an ordered collection of units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Stable identifier, used to name the course directory.
    pub slug: String,
    /// Course title as scraped.
    pub title: String,
    /// Units in syllabus order.
    pub units: Vec<Unit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(kind: UnitKind) -> Unit {
        Unit {
            kind,
            slug: "intro-to-rust".to_string(),
            title: "Intro to Rust".to_string(),
            url: "https://campus.example.com/videos/42-intro-to-rust".to_string(),
            media_url: None,
        }
    }

    #[test]
    fn test_video_unit_file_name_uses_mp4() {
        assert_eq!(unit(UnitKind::Video).file_name(), "intro-to-rust.mp4");
    }

    #[test]
    fn test_lecture_unit_file_name_uses_page_archive() {
        assert_eq!(unit(UnitKind::Lecture).file_name(), "intro-to-rust.mhtml");
    }

    #[test]
    fn test_quiz_unit_file_name_uses_page_archive() {
        assert_eq!(unit(UnitKind::Quiz).file_name(), "intro-to-rust.mhtml");
    }
}
