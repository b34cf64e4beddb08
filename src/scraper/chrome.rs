use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, ResourceType,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::{Result, VaultError};
use crate::scraper::capture::{CapturedResponse, CAPTURE_CHANNEL_CAPACITY};
use crate::scraper::config::ScraperConfig;
use crate::scraper::session::{BrowserSession, OpenedSession, SessionProvider};

/// Runs before any page script to hide the usual automation fingerprints.
const STEALTH_JS: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
    window.chrome = { runtime: {} };
    const originalQuery = window.navigator.permissions && window.navigator.permissions.query;
    if (originalQuery) {
        window.navigator.permissions.query = (parameters) =>
            parameters.name === 'notifications'
                ? Promise.resolve({ state: Notification.permission })
                : originalQuery(parameters);
    }
"#;

const VISIBILITY_POLL: Duration = Duration::from_millis(100);

/// Launches a fresh headless Chrome per session.
pub struct ChromeSessionProvider {
    config: ScraperConfig,
}

impl ChromeSessionProvider {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--no-first-run")
            .arg("--lang=en-US")
            .window_size(self.config.viewport_width, self.config.viewport_height)
            .viewport(Some(Viewport {
                width: self.config.viewport_width,
                height: self.config.viewport_height,
                device_scale_factor: Some(1.0),
                ..Default::default()
            }));

        if !self.config.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| VaultError::Browser(format!("Failed to build browser config: {}", e)))
    }
}

#[async_trait]
impl SessionProvider for ChromeSessionProvider {
    async fn open(&self) -> Result<OpenedSession> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| {
                VaultError::Browser(format!(
                    "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                    e
                ))
            })?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Drive the CDP connection
            }
        });

        match prepare_page(&browser, &self.config).await {
            Ok((page, listener_task, responses)) => Ok(OpenedSession {
                session: Box::new(ChromeSession {
                    browser,
                    page,
                    tasks: vec![listener_task, handler_task],
                }),
                responses,
            }),
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    debug!("Failed to close browser after setup error: {}", close_err);
                }
                handler_task.abort();
                Err(e)
            }
        }
    }
}

/// Blank page with stealth patches, a rotated user agent and a response
/// listener forwarding image responses into a bounded channel.
async fn prepare_page(
    browser: &Browser,
    config: &ScraperConfig,
) -> Result<(Page, JoinHandle<()>, mpsc::Receiver<CapturedResponse>)> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| VaultError::Browser(format!("Failed to create page: {}", e)))?;

    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_JS))
        .await
        .map_err(|e| VaultError::Browser(format!("Failed to install stealth script: {}", e)))?;

    if let Some(ref ua) = config.pick_user_agent() {
        page.set_user_agent(ua)
            .await
            .map_err(|e| VaultError::Browser(format!("Failed to set user agent: {}", e)))?;
    }

    page.execute(EnableParams::default())
        .await
        .map_err(|e| VaultError::Browser(format!("Failed to enable network events: {}", e)))?;

    let mut events = page
        .event_listener::<EventResponseReceived>()
        .await
        .map_err(|e| VaultError::Browser(format!("Failed to subscribe to responses: {}", e)))?;

    let (tx, rx) = mpsc::channel(CAPTURE_CHANNEL_CAPACITY);
    let listener_task = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let mime = event.response.mime_type.as_str();
            if event.r#type != ResourceType::Image && !mime.starts_with("image/") {
                continue;
            }

            let response = CapturedResponse::new(event.response.url.clone(), Some(mime));
            match tx.try_send(response) {
                Ok(()) => {}
                Err(TrySendError::Full(dropped)) => {
                    warn!("Response capture buffer full, dropping {}", dropped.url);
                }
                Err(TrySendError::Closed(_)) => break,
            }
        }
    });

    Ok((page, listener_task, rx))
}

/// One browser process with one page, owned by a single scrape call.
///
/// Dropping it aborts the CDP tasks; the browser process itself is killed
/// by `Browser`'s own drop.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    tasks: Vec<JoinHandle<()>>,
}

impl ChromeSession {
    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| VaultError::Browser(format!("Script execution failed: {}", e)))?
            .into_value::<T>()
            .map_err(|e| VaultError::Browser(format!("Failed to parse result: {:?}", e)))
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        self.eval(format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                return rect.width > 0 && rect.height > 0
                    && style.visibility !== 'hidden' && style.display !== 'none';
            }})()
            "#,
            selector = js_string(selector)
        ))
        .await
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        debug!("Navigating to {}", url);
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(VaultError::Browser(format!("Navigation failed: {}", e))),
            Err(_) => Err(VaultError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        self.eval(format!(
            "document.querySelectorAll({}).length",
            js_string(selector)
        ))
        .await
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_visible(selector).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(VISIBILITY_POLL).await;
        }
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        let Ok(element) = self.page.find_element(selector).await else {
            return Ok(false);
        };
        element
            .click()
            .await
            .map_err(|e| VaultError::Browser(format!("Click on {} failed: {}", selector, e)))?;
        Ok(true)
    }

    async fn text(&self, selector: &str) -> Result<Option<String>> {
        self.eval(format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                return el ? el.innerText : null;
            }})()
            "#,
            selector = js_string(selector)
        ))
        .await
    }

    async fn attributes(&self, selector: &str, attribute: &str) -> Result<Vec<String>> {
        self.eval(format!(
            r#"
            Array.from(document.querySelectorAll({selector}))
                .map(el => el.getAttribute({attribute}))
                .filter(v => v !== null)
            "#,
            selector = js_string(selector),
            attribute = js_string(attribute)
        ))
        .await
    }

    async fn close(self: Box<Self>) {
        let mut this = *self;
        if let Err(e) = this.page.clone().close().await {
            debug!("Failed to close page: {}", e);
        }
        if let Err(e) = this.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = this.browser.wait().await {
            debug!("Failed to reap browser process: {}", e);
        }
    }
}

/// Quote a value as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
