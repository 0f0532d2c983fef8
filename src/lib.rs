//! Campus platform download library.
//!
//! Drives a real browser session against the Campus e-learning platform to
//! collect course metadata and download content the account has access to.
//!
//! # Architecture
//!
//! - [`session`] - the facade: browser lifecycle, authentication, dispatch
//! - [`browser`] - Chrome process and page setup over CDP
//! - [`classify`] - pure URL classification for platform content links
//! - [`collect`] - page scraping into [`models`] records
//! - [`download`] - media streaming and page-archive capture
//! - [`state`] - session persistence across runs
//! - [`cookies`] - browser-extension cookie export import

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod classify;
pub mod collect;
pub mod constants;
pub mod cookies;
pub mod download;
pub mod error;
pub mod models;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use classify::{ContentKind, classify, is_course, is_lecture, is_quiz, is_video};
pub use collect::Collector;
pub use cookies::CookieImportError;
pub use download::{DownloadOptions, Downloader};
pub use error::SessionError;
pub use models::{Course, Unit, UnitKind};
pub use session::{Session, SessionConfig};
