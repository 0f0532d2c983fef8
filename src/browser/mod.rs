//! Browser context management.
//!
//! Wraps a Chrome instance driven over CDP. [`Driver`] owns the process and
//! its event loop; [`BrowserHandle`] is the cheap clone collaborators hold
//! to open pages and manage cookies. Every page comes pre-configured with
//! the mobile viewport and the fingerprint evasion scripts, since the
//! platform only exposes a plain `<video>` element in its mobile layout.

pub mod stealth;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    Cookie, CookieParam, SetUserAgentOverrideParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::constants::{
    DEVICE_SCALE_FACTOR, GREETING_SELECTOR, USER_AGENT, VIEWPORT_HEIGHT, VIEWPORT_WIDTH,
};

const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

/// Browser-context operations the session facade performs. A trait so the
/// facade's login/probe/import flow can run against a stub context.
#[async_trait]
pub trait Context: Send + Sync {
    /// Opens a pre-configured page.
    async fn open_page(&self) -> anyhow::Result<Box<dyn PageHandle>>;

    /// Installs cookies into the context, returning how many the browser
    /// accepted.
    async fn install_cookies(&self, cookies: Vec<CookieParam>) -> anyhow::Result<usize>;

    /// Exports the context's current cookie set.
    async fn export_cookies(&self) -> anyhow::Result<Vec<Cookie>>;
}

/// One open page, as the session facade sees it.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigates the page to `url`.
    async fn navigate(&self, url: &str) -> anyhow::Result<()>;

    /// The signed-in greeting text, when the greeting element is present.
    async fn greeting_text(&self) -> Option<String>;

    /// Closes the page. Best-effort.
    async fn close(self: Box<Self>);
}

/// Shared handle to the running browser. Clones are cheap and all refer to
/// the same Chrome instance.
#[derive(Clone)]
pub struct BrowserHandle {
    browser: Arc<Mutex<Browser>>,
}

impl BrowserHandle {
    /// Opens a new page with the mobile viewport, user agent override and
    /// evasion scripts applied, without navigating anywhere yet.
    ///
    /// # Errors
    ///
    /// Fails when the browser refuses to open a page or apply overrides.
    pub async fn new_page(&self) -> anyhow::Result<Page> {
        let browser = self.browser.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open page")?;
        drop(browser);

        page.execute(SetUserAgentOverrideParams::new(USER_AGENT.to_string()))
            .await
            .context("failed to override user agent")?;
        page.execute(SetDeviceMetricsOverrideParams::new(
            VIEWPORT_WIDTH,
            VIEWPORT_HEIGHT,
            DEVICE_SCALE_FACTOR,
            true,
        ))
        .await
        .context("failed to set mobile viewport")?;
        stealth::apply(&page).await;

        Ok(page)
    }

    /// Installs cookies into the browser context, returning how many the
    /// browser accepted. Individual rejects are logged and skipped; the
    /// context keeps whatever Chrome took.
    ///
    /// # Errors
    ///
    /// Fails when no page can be opened to carry the cookie commands.
    pub async fn set_cookies(&self, cookies: Vec<CookieParam>) -> anyhow::Result<usize> {
        let page = self.new_page().await?;
        let mut installed = 0usize;
        for cookie in cookies {
            let name = cookie.name.clone();
            match page.set_cookie(cookie).await {
                Ok(_) => installed += 1,
                Err(e) => warn!(cookie = %name, "browser rejected cookie: {e}"),
            }
        }
        debug!(installed, "installed cookies into browser context");
        let _ = page.close().await;
        Ok(installed)
    }

    /// Returns all cookies currently held by the browser context.
    ///
    /// # Errors
    ///
    /// Fails when the CDP command fails.
    pub async fn cookies(&self) -> anyhow::Result<Vec<Cookie>> {
        let browser = self.browser.lock().await;
        browser
            .get_cookies()
            .await
            .context("failed to read browser cookies")
    }
}

#[async_trait]
impl Context for BrowserHandle {
    async fn open_page(&self) -> anyhow::Result<Box<dyn PageHandle>> {
        let page = self.new_page().await?;
        Ok(Box::new(LivePage { page }))
    }

    async fn install_cookies(&self, cookies: Vec<CookieParam>) -> anyhow::Result<usize> {
        self.set_cookies(cookies).await
    }

    async fn export_cookies(&self) -> anyhow::Result<Vec<Cookie>> {
        self.cookies().await
    }
}

struct LivePage {
    page: Page,
}

#[async_trait]
impl PageHandle for LivePage {
    async fn navigate(&self, url: &str) -> anyhow::Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        Ok(())
    }

    async fn greeting_text(&self) -> Option<String> {
        let element = self.page.find_element(GREETING_SELECTOR).await.ok()?;
        element
            .inner_text()
            .await
            .ok()
            .flatten()
            .map(|text| text.trim().to_string())
    }

    async fn close(self: Box<Self>) {
        let _ = self.page.close().await;
    }
}

/// Owns the Chrome process and its CDP event loop.
pub struct Driver {
    handle: BrowserHandle,
    event_loop: JoinHandle<()>,
}

impl Driver {
    /// Launches Chrome and starts the event loop task.
    ///
    /// # Errors
    ///
    /// Fails when no Chrome executable can be found or the launch fails.
    pub async fn launch(headless: bool) -> anyhow::Result<Self> {
        let chrome_path = find_chrome()?;
        info!(path = %chrome_path.display(), headless, "launching browser");

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);
        if !headless {
            builder = builder.with_head();
        }
        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--mute-audio");

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch browser")?;

        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            handle: BrowserHandle {
                browser: Arc::new(Mutex::new(browser)),
            },
            event_loop,
        })
    }

    /// A cloneable handle for collaborators.
    #[must_use]
    pub fn handle(&self) -> BrowserHandle {
        self.handle.clone()
    }

    /// Shuts the browser down. Best-effort: a Chrome that already died is
    /// not an error.
    pub async fn close(self) {
        {
            let mut browser = self.handle.browser.lock().await;
            if let Err(e) = browser.close().await {
                debug!("browser close failed: {e}");
            }
            if let Err(e) = browser.wait().await {
                debug!("browser wait failed: {e}");
            }
        }
        self.event_loop.abort();
        info!("browser closed");
    }
}

/// Locates a Chrome or Chromium executable: well-known install paths first,
/// then `which` on common binary names.
fn find_chrome() -> anyhow::Result<PathBuf> {
    for path in CHROME_PATHS {
        let p = std::path::Path::new(path);
        if p.exists() {
            debug!(path, "found Chrome");
            return Ok(p.to_path_buf());
        }
    }

    for cmd in &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    debug!(path, "found Chrome in PATH");
                    return Ok(PathBuf::from(path));
                }
            }
        }
    }

    Err(anyhow::anyhow!(
        "Chrome/Chromium not found; install it or put it on PATH"
    ))
}
