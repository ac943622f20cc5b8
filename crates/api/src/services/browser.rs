//! Chromium-driven check-in attempts.
//!
//! Each attempt runs in its own browser session: the portal sees a fresh
//! profile with the configured location injected through DevTools, and the
//! form is filled with human-like pacing before submission.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::browser::{GrantPermissionsParams, PermissionType};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetGeolocationOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::layout::Point;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use domain::models::{AttemptOutcome, AttemptRequest, Coordinates, OutcomeKind};
use domain::services::{resolve_checkin_time, AttemptError, AttemptExecutor, PageClassifier};
use futures::StreamExt;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{BrowserConfig, PacingConfig, PortalConfig};

const FORM_POLL_INTERVAL: Duration = Duration::from_millis(250);
const LOCATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Distance kept from the viewport edges when moving the pointer.
const POINTER_MARGIN: f64 = 80.0;

/// Executes attempts against the portal with a real browser.
pub struct BrowserExecutor {
    portal: PortalConfig,
    browser: BrowserConfig,
    pacing: PacingConfig,
    screenshot_dir: PathBuf,
    classifier: PageClassifier,
}

impl BrowserExecutor {
    pub fn new(
        portal: PortalConfig,
        browser: BrowserConfig,
        pacing: PacingConfig,
        screenshot_dir: impl Into<PathBuf>,
        classifier: PageClassifier,
    ) -> Self {
        Self {
            portal,
            browser,
            pacing,
            screenshot_dir: screenshot_dir.into(),
            classifier,
        }
    }

    async fn drive(&self, page: &Page, request: &AttemptRequest) -> Result<AttemptOutcome, AttemptError> {
        let selectors = &self.portal.selectors;

        self.navigate(page).await?;
        self.trigger_geolocation(page).await;

        let nip_field = match self.wait_for_form(page).await {
            Some(element) => element,
            None => {
                self.screenshot(page, "form_not_found").await;
                let current = page.url().await.ok().flatten();
                return Err(AttemptError::FormNotFound {
                    url: reported_url(current, &self.portal.url),
                });
            }
        };
        self.screenshot(page, "loaded").await;

        self.wander_mouse(page).await;
        self.type_into(page, &nip_field, &request.nip).await?;
        tokio::time::sleep(self.pacing.field_pause.sample()).await;

        let password_field = page.find_element(selectors.password.as_str()).await.map_err(cdp)?;
        self.type_into(page, &password_field, &request.password).await?;
        tokio::time::sleep(self.pacing.field_pause.sample()).await;

        self.select(page, &selectors.mode, request.mode.portal_value()).await?;
        if request.mode.requires_shift() {
            if let Some(shift) = request.shift.as_deref() {
                tokio::time::sleep(self.pacing.field_pause.sample()).await;
                self.select(page, &selectors.shift, shift).await?;
            }
        }

        self.ensure_location(page, request.coordinates).await?;
        self.screenshot(page, "filled").await;

        tokio::time::sleep(self.pacing.field_pause.sample()).await;
        let submit = page.find_element(selectors.submit.as_str()).await.map_err(cdp)?;
        submit.click().await.map_err(cdp)?;

        let submit_wait = Duration::from_secs(self.portal.submit_wait_secs);
        if tokio::time::timeout(submit_wait, page.wait_for_navigation())
            .await
            .is_err()
        {
            debug!("No navigation after submit, reading current page");
        }

        let text: String = page
            .evaluate(BODY_TEXT_SCRIPT)
            .await
            .map_err(cdp)?
            .into_value()
            .unwrap_or_default();
        let kind = self.classifier.classify(&text);
        let mut outcome = AttemptOutcome::from_kind(kind);
        outcome.screenshot = self.screenshot(page, "result").await;

        if kind == OutcomeKind::Unrecognized {
            outcome.page_title = page.get_title().await.ok().flatten();
            warn!(nip = %request.nip, title = ?outcome.page_title, "Unrecognized portal response");
        }

        if kind.is_success() {
            let row: Option<Vec<String>> = match page.evaluate(row_cells_script(&selectors.results_row)).await {
                Ok(result) => result.into_value().ok().filter(|cells: &Vec<String>| !cells.is_empty()),
                Err(e) => {
                    debug!(error = %e, "Results table not readable");
                    None
                }
            };
            let time = resolve_checkin_time(row.as_deref(), shared::calendar::local_now());
            outcome = outcome.with_checkin_time(time);
        }

        Ok(outcome)
    }

    async fn navigate(&self, page: &Page) -> Result<(), AttemptError> {
        let attempts = self.portal.navigation_attempts.max(1);
        let timeout = Duration::from_secs(self.portal.navigation_timeout_secs);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match tokio::time::timeout(timeout, page.goto(self.portal.url.as_str())).await {
                Ok(Ok(_)) => {
                    debug!(attempt, "Portal loaded");
                    return Ok(());
                }
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => last_error = format!("timed out after {}s", timeout.as_secs()),
            }

            warn!(attempt, attempts, error = %last_error, "Portal navigation failed");
            if attempt < attempts {
                tokio::time::sleep(Duration::from_secs(self.portal.navigation_retry_delay_secs)).await;
            }
        }

        Err(AttemptError::Navigation {
            attempts,
            message: last_error,
        })
    }

    async fn trigger_geolocation(&self, page: &Page) {
        let timeout = Duration::from_secs(self.portal.geolocation_timeout_secs);
        let script = geolocation_probe_script(self.portal.geolocation_timeout_secs * 1000);
        match tokio::time::timeout(timeout + Duration::from_secs(1), page.evaluate(script)).await {
            Ok(Ok(result)) => {
                let located = result.into_value::<bool>().unwrap_or(false);
                debug!(located, "In-page geolocation probe finished");
            }
            Ok(Err(e)) => warn!(error = %e, "In-page geolocation probe failed"),
            Err(_) => warn!("In-page geolocation probe timed out"),
        }
    }

    async fn wait_for_form(&self, page: &Page) -> Option<Element> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(self.portal.form_timeout_secs);
        loop {
            if let Ok(element) = page.find_element(self.portal.selectors.nip.as_str()).await {
                return Some(element);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(FORM_POLL_INTERVAL).await;
        }
    }

    /// A few random pointer movements over the viewport.
    async fn wander_mouse(&self, page: &Page) {
        let points: Vec<(f64, f64)> = {
            let mut rng = rand::thread_rng();
            let moves = rng.gen_range(2..5);
            (0..moves)
                .map(|_| {
                    (
                        rng.gen_range(pointer_span(self.browser.viewport_width)),
                        rng.gen_range(pointer_span(self.browser.viewport_height)),
                    )
                })
                .collect()
        };

        for (x, y) in points {
            if let Err(e) = page.move_mouse(Point::new(x, y)).await {
                debug!(error = %e, "Mouse move failed");
                return;
            }
            tokio::time::sleep(self.pacing.field_pause.sample() / 3).await;
        }
    }

    /// Clicks the field, clears it and types `text` one character at a time.
    async fn type_into(
        &self,
        page: &Page,
        element: &Element,
        text: &str,
    ) -> Result<(), AttemptError> {
        if let Ok(point) = element.clickable_point().await {
            let _ = page.move_mouse(point).await;
        }
        element.click().await.map_err(cdp)?;
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(cdp)?;

        let mut buf = [0u8; 4];
        for ch in text.chars() {
            element.type_str(ch.encode_utf8(&mut buf)).await.map_err(cdp)?;
            tokio::time::sleep(self.pacing.typing.sample()).await;
        }
        Ok(())
    }

    async fn select(&self, page: &Page, selector: &str, value: &str) -> Result<(), AttemptError> {
        let matched: bool = page
            .evaluate(select_option_script(selector, value))
            .await
            .map_err(cdp)?
            .into_value()
            .unwrap_or(false);
        if matched {
            return Ok(());
        }

        debug!(selector, value, "No matching option, assigning value directly");
        page.evaluate(assign_value_script(selector, value))
            .await
            .map_err(cdp)?;
        Ok(())
    }

    async fn ensure_location(&self, page: &Page, coordinates: Coordinates) -> Result<(), AttemptError> {
        let selector = &self.portal.selectors.location;
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(self.portal.location_wait_secs);

        loop {
            let value: String = match page.evaluate(field_value_script(selector)).await {
                Ok(result) => result.into_value().unwrap_or_default(),
                Err(_) => String::new(),
            };
            if !value.trim().is_empty() {
                debug!(location = %value, "Location field populated by the portal");
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(LOCATION_POLL_INTERVAL).await;
        }

        info!("Location field still empty, writing coordinates directly");
        page.evaluate(assign_value_script(selector, &location_value(coordinates)))
            .await
            .map_err(cdp)?;
        Ok(())
    }

    async fn screenshot(&self, page: &Page, stage: &str) -> Option<PathBuf> {
        let path = screenshot_path(&self.screenshot_dir, stage, chrono::Utc::now().timestamp_millis());
        if let Err(e) = tokio::fs::create_dir_all(&self.screenshot_dir).await {
            warn!(error = %e, dir = %self.screenshot_dir.display(), "Cannot create screenshot directory");
            return None;
        }
        match page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), &path)
            .await
        {
            Ok(_) => Some(path),
            Err(e) => {
                warn!(error = %e, stage, "Screenshot failed");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl AttemptExecutor for BrowserExecutor {
    async fn attempt(&self, request: &AttemptRequest) -> Result<AttemptOutcome, AttemptError> {
        let session = Session::open(&self.browser).await?;

        let result = match session.page(&self.browser, &self.portal.url, request.coordinates).await {
            Ok(page) => {
                let result = self.drive(&page, request).await;
                if let Err(e) = &result {
                    if !matches!(e, AttemptError::FormNotFound { .. }) {
                        self.screenshot(&page, "error").await;
                    }
                }
                result
            }
            Err(e) => Err(e),
        };

        session.close().await;
        result
    }
}

/// A launched (or attached) browser and its event loop.
struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl Session {
    async fn open(config: &BrowserConfig) -> Result<Self, AttemptError> {
        let (browser, mut handler) = match config.ws_url.as_deref() {
            Some(ws_url) => Browser::connect(ws_url).await.map_err(cdp)?,
            None => Browser::launch(launch_config(config)?).await.map_err(cdp)?,
        };

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser handler event error");
                }
            }
        });

        Ok(Self { browser, handler })
    }

    /// Opens a blank page with identity and location overrides applied.
    async fn page(
        &self,
        config: &BrowserConfig,
        portal_url: &str,
        coordinates: Coordinates,
    ) -> Result<Page, AttemptError> {
        let page = self.browser.new_page("about:blank").await.map_err(cdp)?;

        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(config.user_agent.clone())
            .accept_language(config.accept_language.clone())
            .build()
            .map_err(AttemptError::Browser)?;
        page.execute(user_agent).await.map_err(cdp)?;

        let mut grant = GrantPermissionsParams::new(vec![PermissionType::Geolocation]);
        grant.origin = origin_of(portal_url);
        self.browser.execute(grant).await.map_err(cdp)?;

        let location = SetGeolocationOverrideParams::builder()
            .latitude(coordinates.latitude)
            .longitude(coordinates.longitude)
            .accuracy(25.0)
            .build();
        page.execute(location).await.map_err(cdp)?;

        Ok(page)
    }

    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!(error = %e, "Browser close failed");
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }
}

fn launch_config(config: &BrowserConfig) -> Result<LaunchConfig, AttemptError> {
    let mut builder = LaunchConfig::builder()
        .window_size(config.viewport_width, config.viewport_height)
        .viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .arg(format!("--lang={}", primary_language(&config.accept_language)))
        .arg("--disable-blink-features=AutomationControlled");

    if !config.headless {
        builder = builder.with_head();
    }
    if !config.sandbox {
        builder = builder.no_sandbox();
    }
    if let Some(executable) = &config.executable {
        builder = builder.chrome_executable(executable);
    }

    builder.build().map_err(AttemptError::Browser)
}

fn cdp(e: chromiumoxide::error::CdpError) -> AttemptError {
    AttemptError::Browser(e.to_string())
}

/// `<dir>/<stage>_<epoch-ms>.png`
/// Range of pointer coordinates along a viewport axis, keeping clear of the edges.
///
/// Never empty, whatever the configured extent.
pub fn pointer_span(extent: u32) -> std::ops::Range<f64> {
    let extent = f64::from(extent);
    let margin = (extent / 8.0).min(POINTER_MARGIN);
    let end = (extent - margin).max(margin + 1.0);
    margin..end
}

/// The page's current address, or the configured one when the browser cannot tell.
fn reported_url(current: Option<String>, configured: &str) -> String {
    current
        .filter(|url| !url.is_empty() && url != "about:blank")
        .unwrap_or_else(|| configured.to_string())
}

pub fn screenshot_path(dir: &Path, stage: &str, epoch_ms: i64) -> PathBuf {
    dir.join(format!("{}_{}.png", stage, epoch_ms))
}

/// Scheme, host and port of `url`, or `None` when it does not parse.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// First language tag of an `Accept-Language` value.
fn primary_language(accept_language: &str) -> &str {
    accept_language
        .split([',', ';'])
        .next()
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .unwrap_or("en-US")
}

fn location_value(coordinates: Coordinates) -> String {
    format!("{}, {}", coordinates.latitude, coordinates.longitude)
}

/// JSON string literal, safe to splice into a script.
fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

const BODY_TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";

fn geolocation_probe_script(timeout_ms: u64) -> String {
    format!(
        "new Promise(resolve => {{ \
            if (!navigator.geolocation) {{ resolve(false); return; }} \
            navigator.geolocation.getCurrentPosition(() => resolve(true), () => resolve(false), \
                {{ enableHighAccuracy: true, timeout: {} }}); \
        }})",
        timeout_ms
    )
}

fn field_value_script(selector: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); return el ? (el.value || '') : ''; }})()",
        js_string(selector)
    )
}

/// Selects the option whose value or label matches; `false` when none does.
fn select_option_script(selector: &str, value: &str) -> String {
    format!(
        "(() => {{ \
            const el = document.querySelector({sel}); \
            if (!el || !el.options) return false; \
            const wanted = {val}.toLowerCase(); \
            const opt = Array.from(el.options).find(o => \
                o.value.toLowerCase() === wanted || o.text.trim().toLowerCase() === wanted); \
            if (!opt) return false; \
            el.value = opt.value; \
            el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
            el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
            return true; \
        }})()",
        sel = js_string(selector),
        val = js_string(value)
    )
}

/// Sets the element value and fires `change`.
fn assign_value_script(selector: &str, value: &str) -> String {
    format!(
        "(() => {{ \
            const el = document.querySelector({sel}); \
            if (!el) return false; \
            el.value = {val}; \
            el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
            el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
            return true; \
        }})()",
        sel = js_string(selector),
        val = js_string(value)
    )
}

fn row_cells_script(selector: &str) -> String {
    format!(
        "Array.from(document.querySelectorAll({})).map(td => (td.innerText || '').trim())",
        js_string(selector)
    )
}
