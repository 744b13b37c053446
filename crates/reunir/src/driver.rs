//! Abstract browser-session driver.
//!
//! The harness drives every participant through the [`SessionDriver`]
//! trait so implementations can be swapped: the default CDP driver
//! (chromiumoxide, behind the `browser` feature) for live runs, and
//! [`crate::mock::MockSession`] for in-process scenario execution.
//!
//! Drivers perform no implicit waiting. Synchronizing on asynchronous UI
//! transitions is the job of [`crate::wait`].

use crate::result::ReunirResult;
use async_trait::async_trait;

/// Keyboard keys the harness dispatches to elements.
///
/// Only the arrow keys are needed today (slider stepping); the enum keeps
/// the driver surface typed instead of passing raw key strings around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Left arrow
    ArrowLeft,
    /// Right arrow
    ArrowRight,
}

impl Key {
    /// DOM `KeyboardEvent.key` value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Low-level operations against one browser session.
///
/// Selectors are CSS. Query operations distinguish *presence* (matched in
/// the DOM) from *displayed* (present and visible); a missing element is
/// reported as not displayed, never as an error, so polling waits can
/// observe both directions of a transition.
#[async_trait]
pub trait SessionDriver: Send + Sync {
    /// Navigate to a URL, consuming any configuration it carries
    async fn navigate(&mut self, url: &str) -> ReunirResult<()>;

    /// Click the first element matching `selector`
    ///
    /// Fails with [`crate::ReunirError::ElementNotFound`] if nothing matches.
    async fn click(&self, selector: &str) -> ReunirResult<()>;

    /// Move the pointer over the element and hold, without clicking
    async fn hover(&self, selector: &str) -> ReunirResult<()>;

    /// Dispatch a key press to the element
    async fn press_key(&self, selector: &str, key: Key) -> ReunirResult<()>;

    /// Read an attribute of the element (`None` when the attribute is unset)
    async fn attribute(&self, selector: &str, name: &str) -> ReunirResult<Option<String>>;

    /// Execute JavaScript in page context
    async fn execute_js(&self, script: &str) -> ReunirResult<serde_json::Value>;

    /// Whether any element matches `selector`
    async fn is_present(&self, selector: &str) -> ReunirResult<bool>;

    /// Whether a matching element exists and is currently visible
    async fn is_displayed(&self, selector: &str) -> ReunirResult<bool>;

    /// Current page URL
    async fn current_url(&self) -> ReunirResult<String>;

    /// Terminate the session; idempotent
    async fn close(&mut self) -> ReunirResult<()>;
}

/// Launch configuration for real browser sessions.
#[derive(Debug, Clone)]
pub struct BrowserLaunchConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Path to the chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers/CI)
    pub sandbox: bool,
}

impl Default for BrowserLaunchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserLaunchConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the chromium binary path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable the sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP implementation (when the `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::{BrowserLaunchConfig, Key, SessionDriver};
    use crate::fixture::Role;
    use crate::result::{ReunirError, ReunirResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn driver_err(e: impl std::fmt::Display) -> ReunirError {
        ReunirError::Driver {
            message: e.to_string(),
        }
    }

    /// One headless-Chrome session with a real CDP connection.
    ///
    /// Each participant gets its own browser process so media permissions
    /// and configuration fragments stay isolated per session.
    #[derive(Debug)]
    pub struct CdpDriver {
        browser: Arc<Mutex<CdpBrowser>>,
        page: Arc<Mutex<CdpPage>>,
        url: Arc<Mutex<String>>,
        closed: bool,
        #[allow(dead_code)]
        handle: tokio::task::JoinHandle<()>,
    }

    impl CdpDriver {
        /// Launch a browser and open a blank page.
        ///
        /// # Errors
        ///
        /// Returns [`ReunirError::Driver`] if the browser cannot be launched.
        pub async fn launch(config: &BrowserLaunchConfig) -> ReunirResult<Self> {
            let mut builder = CdpConfig::builder();

            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder.build().map_err(driver_err)?;
            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config).await.map_err(driver_err)?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(driver_err)?;

            Ok(Self {
                browser: Arc::new(Mutex::new(browser)),
                page: Arc::new(Mutex::new(page)),
                url: Arc::new(Mutex::new(String::from("about:blank"))),
                closed: false,
                handle,
            })
        }

        async fn eval<T: serde::de::DeserializeOwned>(&self, expr: &str) -> ReunirResult<T> {
            let page = self.page.lock().await;
            let result = page.evaluate(expr).await.map_err(driver_err)?;
            result.into_value().map_err(driver_err)
        }
    }

    #[async_trait]
    impl SessionDriver for CdpDriver {
        async fn navigate(&mut self, url: &str) -> ReunirResult<()> {
            tracing::debug!(url, "navigating");
            {
                let page = self.page.lock().await;
                page.goto(url).await.map_err(driver_err)?;
            }
            *self.url.lock().await = url.to_string();
            Ok(())
        }

        async fn click(&self, selector: &str) -> ReunirResult<()> {
            let found: bool = self
                .eval(&format!(
                    "(() => {{ const el = document.querySelector({selector:?}); \
                     if (!el) return false; el.click(); return true; }})()"
                ))
                .await?;
            if found {
                Ok(())
            } else {
                Err(ReunirError::ElementNotFound {
                    selector: selector.to_string(),
                })
            }
        }

        async fn hover(&self, selector: &str) -> ReunirResult<()> {
            let found: bool = self
                .eval(&format!(
                    "(() => {{ const el = document.querySelector({selector:?}); \
                     if (!el) return false; \
                     el.dispatchEvent(new MouseEvent('mouseover', {{bubbles: true}})); \
                     el.dispatchEvent(new MouseEvent('mousemove', {{bubbles: true}})); \
                     return true; }})()"
                ))
                .await?;
            if found {
                Ok(())
            } else {
                Err(ReunirError::ElementNotFound {
                    selector: selector.to_string(),
                })
            }
        }

        async fn press_key(&self, selector: &str, key: Key) -> ReunirResult<()> {
            let key_name = key.as_str();
            let found: bool = self
                .eval(&format!(
                    "(() => {{ const el = document.querySelector({selector:?}); \
                     if (!el) return false; el.focus(); \
                     for (const type of ['keydown', 'keyup']) {{ \
                       el.dispatchEvent(new KeyboardEvent(type, \
                         {{key: {key_name:?}, bubbles: true}})); \
                     }} \
                     return true; }})()"
                ))
                .await?;
            if found {
                Ok(())
            } else {
                Err(ReunirError::ElementNotFound {
                    selector: selector.to_string(),
                })
            }
        }

        async fn attribute(&self, selector: &str, name: &str) -> ReunirResult<Option<String>> {
            let present: bool = self
                .eval(&format!(
                    "!!document.querySelector({selector:?})"
                ))
                .await?;
            if !present {
                return Err(ReunirError::ElementNotFound {
                    selector: selector.to_string(),
                });
            }
            self.eval(&format!(
                "document.querySelector({selector:?}).getAttribute({name:?})"
            ))
            .await
        }

        async fn execute_js(&self, script: &str) -> ReunirResult<serde_json::Value> {
            self.eval(script).await
        }

        async fn is_present(&self, selector: &str) -> ReunirResult<bool> {
            self.eval(&format!("!!document.querySelector({selector:?})"))
                .await
        }

        async fn is_displayed(&self, selector: &str) -> ReunirResult<bool> {
            self.eval(&format!(
                "(() => {{ const el = document.querySelector({selector:?}); \
                 if (!el) return false; \
                 const style = window.getComputedStyle(el); \
                 return style.display !== 'none' && style.visibility !== 'hidden' \
                     && el.getClientRects().length > 0; }})()"
            ))
            .await
        }

        async fn current_url(&self) -> ReunirResult<String> {
            Ok(self.url.lock().await.clone())
        }

        async fn close(&mut self) -> ReunirResult<()> {
            if self.closed {
                return Ok(());
            }
            let mut browser = self.browser.lock().await;
            browser.close().await.map_err(driver_err)?;
            self.closed = true;
            Ok(())
        }
    }

    /// Session factory launching one browser process per role.
    #[derive(Debug, Clone, Default)]
    pub struct CdpFactory {
        config: BrowserLaunchConfig,
    }

    impl CdpFactory {
        /// Create a factory with the given launch configuration
        #[must_use]
        pub fn new(config: BrowserLaunchConfig) -> Self {
            Self { config }
        }
    }

    #[async_trait]
    impl crate::fixture::SessionFactory for CdpFactory {
        type Driver = CdpDriver;

        async fn launch(&self, role: Role) -> ReunirResult<Self::Driver> {
            tracing::info!(%role, "launching browser");
            CdpDriver::launch(&self.config).await
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{CdpDriver, CdpFactory};
