//! The session facade: browser lifecycle, authentication and dispatch.
//!
//! [`Session`] is the single entry point callers use. It owns the browser
//! driver, tracks authentication state, persists it across runs, and routes
//! fetch/download calls to its collaborators. Gated operations check
//! authentication before doing anything else, so an unauthenticated call
//! performs no network activity at all.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::browser::{Context, Driver};
use crate::classify::{self, ContentKind};
use crate::collect::{Collector, ScrapeCollector};
use crate::constants::{BASE_URL, LOGIN_POLL_INTERVAL, LOGIN_TIMEOUT, LOGIN_URL, PROBE_TIMEOUT};
use crate::download::{DownloadOptions, Downloader, MediaDownloader};
use crate::error::SessionError;
use crate::models::{Course, Unit};
use crate::state;

/// Session configuration. [`Default`] matches the production platform.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run the browser without a window. Interactive login needs a headed
    /// browser; everything else works headless.
    pub headless: bool,
    /// Platform home page, used by the authentication probe.
    pub base_url: String,
    /// Sign-in page opened by `login`.
    pub login_url: String,
    /// How long `login` waits for the manual sign-in to complete.
    pub login_timeout: Duration,
    /// Where the session blob is persisted.
    pub session_file: std::path::PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            base_url: BASE_URL.to_string(),
            login_url: LOGIN_URL.to_string(),
            login_timeout: LOGIN_TIMEOUT,
            session_file: state::default_session_file(),
        }
    }
}

/// Facade over the browser-driven platform client.
pub struct Session {
    config: SessionConfig,
    authenticated: bool,
    driver: Option<Driver>,
    context: Option<Arc<dyn Context>>,
    collector: Option<Arc<dyn Collector>>,
    downloader: Option<Arc<dyn Downloader>>,
}

impl Session {
    /// Creates a stopped, unauthenticated session.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            authenticated: false,
            driver: None,
            context: None,
            collector: None,
            downloader: None,
        }
    }

    /// Creates a session with explicit collaborators instead of the
    /// browser-backed defaults.
    #[must_use]
    pub fn with_collaborators(
        config: SessionConfig,
        collector: Arc<dyn Collector>,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        Self {
            config,
            authenticated: false,
            driver: None,
            context: None,
            collector: Some(collector),
            downloader: Some(downloader),
        }
    }

    /// Whether a login or probe has confirmed authentication.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Launches the browser, restores any persisted session state, and
    /// probes whether that state still authenticates.
    ///
    /// Calling `start` on a started session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] when the browser cannot be
    /// launched. A missing or stale session blob is not an error; the
    /// session simply starts unauthenticated.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if self.driver.is_some() {
            debug!("session already started");
            return Ok(());
        }

        let driver = Driver::launch(self.config.headless)
            .await
            .map_err(SessionError::request)?;
        let handle = driver.handle();
        self.driver = Some(driver);
        self.context = Some(Arc::new(handle.clone()));

        if self.collector.is_none() {
            self.collector = Some(Arc::new(ScrapeCollector::new(handle.clone())));
        }
        if self.downloader.is_none() {
            self.downloader = Some(Arc::new(MediaDownloader::new(handle)));
        }

        match state::load_state(&self.config.session_file).await {
            Ok(Some(cookies)) => {
                if let Err(e) = self.context()?.install_cookies(cookies).await {
                    warn!("failed to restore session cookies: {e}");
                }
            }
            Ok(None) => {}
            // A corrupt blob is recoverable: the user logs in again.
            Err(e) => warn!("ignoring unreadable session file: {e}"),
        }
        self.probe().await;

        info!(authenticated = self.authenticated, "session started");
        Ok(())
    }

    /// Shuts the browser down. Best-effort and idempotent.
    pub async fn stop(&mut self) {
        self.context = None;
        if let Some(driver) = self.driver.take() {
            driver.close().await;
        }
    }

    /// Opens the sign-in page and waits for the user to complete the login
    /// manually. Succeeds when the signed-in greeting appears on the page.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotStarted`] before `start`, and
    /// [`SessionError::Login`] when the greeting never appears within the
    /// login window.
    #[instrument(skip(self))]
    pub async fn login(&mut self) -> Result<(), SessionError> {
        let context = self.context()?;
        let page = context.open_page().await.map_err(SessionError::login)?;

        let outcome = async {
            page.navigate(&self.config.login_url)
                .await
                .map_err(|e| SessionError::login(format!("sign-in page failed to load: {e}")))?;

            info!("waiting for manual sign-in to complete");
            let deadline = Instant::now() + self.config.login_timeout;
            loop {
                if page.greeting_text().await.is_some() {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(SessionError::login(
                        "sign-in was not completed within the login window",
                    ));
                }
                tokio::time::sleep(LOGIN_POLL_INTERVAL).await;
            }
        }
        .await;
        page.close().await;
        outcome?;

        self.authenticated = true;
        self.persist().await?;
        info!("login complete");
        Ok(())
    }

    /// Deletes the persisted session blob. The running browser context is
    /// left untouched; it keeps whatever access its cookies still grant
    /// until `stop`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Request`] for I/O failures other than the
    /// blob being absent.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let existed = state::clear_state(&self.config.session_file)
            .await
            .map_err(|e| SessionError::request(e.into()))?;
        info!(existed, "cleared persisted session");
        Ok(())
    }

    /// Fetches metadata for a single unit page.
    ///
    /// # Errors
    ///
    /// [`SessionError::AuthenticationRequired`] when not authenticated,
    /// [`SessionError::Request`] when collection fails.
    pub async fn fetch_unit(&self, url: &str) -> Result<Unit, SessionError> {
        self.require_auth()?;
        self.collector()?
            .fetch_unit(url)
            .await
            .map_err(SessionError::request)
    }

    /// Fetches a course page and enumerates its units.
    ///
    /// # Errors
    ///
    /// [`SessionError::AuthenticationRequired`] when not authenticated,
    /// [`SessionError::Request`] when collection fails.
    pub async fn fetch_course(&self, url: &str) -> Result<Course, SessionError> {
        self.require_auth()?;
        self.collector()?
            .fetch_course(url)
            .await
            .map_err(SessionError::request)
    }

    /// Downloads whatever `url` points at: a single unit to a file named
    /// after its slug, or a whole course into a slug-named subdirectory.
    ///
    /// # Errors
    ///
    /// [`SessionError::AuthenticationRequired`] when not authenticated,
    /// [`SessionError::InvalidUrl`] when the URL is not platform content,
    /// [`SessionError::Request`] when fetching or downloading fails.
    #[instrument(skip(self, options))]
    pub async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<(), SessionError> {
        self.require_auth()?;

        match classify::classify(url) {
            Some(ContentKind::Course) => {
                let course = self
                    .collector()?
                    .fetch_course(url)
                    .await
                    .map_err(SessionError::request)?;
                self.downloader()?
                    .download_course(&course, options)
                    .await
                    .map_err(SessionError::request)
            }
            Some(_) => {
                let unit = self
                    .collector()?
                    .fetch_unit(url)
                    .await
                    .map_err(SessionError::request)?;
                let dest = options.output_dir.join(unit.file_name());
                self.downloader()?
                    .download_unit(&unit, &dest, options)
                    .await
                    .map_err(SessionError::request)
            }
            None => Err(SessionError::invalid_url(url)),
        }
    }

    /// Imports cookies from a JSON export file, installs them into the
    /// browser context, and probes whether they authenticate.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotStarted`] before `start`,
    /// [`SessionError::CookieImport`] for unreadable or malformed exports,
    /// [`SessionError::Request`] when installation fails.
    #[instrument(skip(self))]
    pub async fn set_cookies(&mut self, path: &Path) -> Result<(), SessionError> {
        let context = self.context()?;

        let cookies = crate::cookies::read_cookie_file(path)
            .await
            .map_err(|e| SessionError::cookie_import(path, e))?;
        let installed = context
            .install_cookies(cookies)
            .await
            .map_err(SessionError::request)?;
        debug!(installed, "imported cookies installed");

        self.probe().await;
        if !self.authenticated {
            warn!("imported cookies did not authenticate");
        }
        // Persisted either way: the blob mirrors the context, and the next
        // start re-probes it.
        self.persist().await?;
        Ok(())
    }

    /// Visits the home page and checks for the signed-in greeting. Sets the
    /// authentication flag only when the greeting carries actual text;
    /// every failure is swallowed and leaves the flag untouched.
    async fn probe(&mut self) {
        let Ok(context) = self.context() else {
            return;
        };
        let Ok(page) = context.open_page().await else {
            debug!("probe could not open a page");
            return;
        };

        // The timeout bounds the whole navigate-and-read sequence; a hung
        // navigation must not stall startup.
        let outcome = tokio::time::timeout(PROBE_TIMEOUT, async {
            page.navigate(&self.config.base_url).await.ok()?;
            page.greeting_text().await
        })
        .await
        .ok()
        .flatten()
        .filter(|text| !text.trim().is_empty());

        if let Some(greeting) = outcome {
            self.authenticated = true;
            info!(greeting = %greeting, "session is authenticated");
        } else {
            debug!("probe found no signed-in greeting");
        }
        page.close().await;
    }

    /// Persists the browser context's cookies as the session blob.
    async fn persist(&self) -> Result<(), SessionError> {
        let cookies = self
            .context()?
            .export_cookies()
            .await
            .map_err(SessionError::request)?;
        state::save_state(&self.config.session_file, &cookies)
            .await
            .map_err(|e| SessionError::request(e.into()))
    }

    fn require_auth(&self) -> Result<(), SessionError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(SessionError::AuthenticationRequired)
        }
    }

    fn context(&self) -> Result<Arc<dyn Context>, SessionError> {
        self.context.clone().ok_or(SessionError::NotStarted)
    }

    fn collector(&self) -> Result<&Arc<dyn Collector>, SessionError> {
        self.collector.as_ref().ok_or(SessionError::NotStarted)
    }

    fn downloader(&self) -> Result<&Arc<dyn Downloader>, SessionError> {
        self.downloader.as_ref().ok_or(SessionError::NotStarted)
    }
}
