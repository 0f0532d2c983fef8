//! Platform constants: URLs, selectors, timeouts, viewport.
//!
//! Everything here is site-specific configuration for the Campus platform.
//! The selectors and URL paths are the only parts expected to churn when the
//! platform ships a redesign.

use std::time::Duration;

/// Platform home page, also used by the authentication probe.
pub const BASE_URL: &str = "https://campus.example.com";

/// Interactive sign-in page opened by `login`.
pub const LOGIN_URL: &str = "https://campus.example.com/users/sign_in";

/// Greeting element shown on the home page only for signed-in users.
pub const GREETING_SELECTOR: &str = "h1.greeting-title";

/// How long `login` waits for the user to finish the manual sign-in.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(2 * 60);

/// Poll interval while waiting for the post-login greeting.
pub const LOGIN_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long the authentication probe waits for the greeting element.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Mobile viewport applied to every page. The mobile layout exposes the
/// plain `<video>` element instead of the desktop DRM player.
pub const VIEWPORT_WIDTH: i64 = 390;
pub const VIEWPORT_HEIGHT: i64 = 844;
pub const DEVICE_SCALE_FACTOR: f64 = 3.0;

/// User agent matching the mobile viewport.
pub const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Mobile Safari/537.36";

/// Extension for downloaded video media.
pub const VIDEO_EXTENSION: &str = ".mp4";

/// Extension for page-archive captures of non-video units.
pub const PAGE_ARCHIVE_EXTENSION: &str = ".mhtml";

/// File name of the persisted session blob inside the config directory.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Directory name under the user config directory.
pub const CONFIG_DIR_NAME: &str = "campus-dl";
