//! Integration tests for URL classification through the public API.

use campus_dl::{ContentKind, UnitKind, classify, is_course, is_video};

#[test]
fn test_every_content_section_classifies() {
    let cases = [
        ("https://campus.example.com/videos/1-a", ContentKind::Video),
        ("https://campus.example.com/lectures/2-b", ContentKind::Lecture),
        ("https://campus.example.com/quizzes/3-c", ContentKind::Quiz),
        ("https://campus.example.com/courses/rust", ContentKind::Course),
    ];
    for (url, expected) in cases {
        assert_eq!(classify(url), Some(expected), "url: {url}");
    }
}

#[test]
fn test_unit_kinds_map_to_their_content_kind() {
    assert_eq!(
        classify("https://campus.example.com/videos/1-a").and_then(ContentKind::unit_kind),
        Some(UnitKind::Video)
    );
    assert_eq!(
        classify("https://campus.example.com/courses/rust").and_then(ContentKind::unit_kind),
        None
    );
}

#[test]
fn test_non_content_urls_do_not_classify() {
    for url in [
        "",
        "not a url",
        "https://campus.example.com/",
        "https://campus.example.com/profile",
        "ftp://campus.example.com/videos/1-a",
        "https://campus.example.com/videos/",
    ] {
        assert_eq!(classify(url), None, "url: {url}");
    }
}

#[test]
fn test_predicates_agree_with_classify() {
    let video = "https://campus.example.com/videos/1-a";
    let course = "https://campus.example.com/courses/rust";
    assert!(is_video(video) && !is_course(video));
    assert!(is_course(course) && !is_video(course));
}
