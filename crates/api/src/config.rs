use std::net::SocketAddr;
use std::path::PathBuf;

use domain::services::{ClassificationRule, PageClassifier};
use serde::Deserialize;
use shared::jitter::DelayRange;

use domain::models::WindowKind;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Page classification rules; empty means the built-in rules.
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// When set, `/api` routes other than health require `X-API-Key`.
    #[serde(default)]
    pub dashboard_token: Option<String>,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl SecurityConfig {
    pub fn dashboard_token(&self) -> Option<&str> {
        self.dashboard_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding settings.json, employees.json and logs.json.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

/// CSS selectors of the portal's login/check-in form.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalSelectors {
    #[serde(default = "default_nip_selector")]
    pub nip: String,
    #[serde(default = "default_password_selector")]
    pub password: String,
    #[serde(default = "default_mode_selector")]
    pub mode: String,
    #[serde(default = "default_shift_selector")]
    pub shift: String,
    #[serde(default = "default_location_selector")]
    pub location: String,
    #[serde(default = "default_submit_selector")]
    pub submit: String,
    /// Cells of the first row of the results table.
    #[serde(default = "default_results_row_selector")]
    pub results_row: String,
}

impl Default for PortalSelectors {
    fn default() -> Self {
        Self {
            nip: default_nip_selector(),
            password: default_password_selector(),
            mode: default_mode_selector(),
            shift: default_shift_selector(),
            location: default_location_selector(),
            submit: default_submit_selector(),
            results_row: default_results_row_selector(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Check-in form URL.
    #[serde(default)]
    pub url: String,

    /// Employee directory endpoint; queried with `?kode=<office_code>`.
    #[serde(default)]
    pub directory_url: String,

    #[serde(default = "default_directory_timeout")]
    pub directory_timeout_secs: u64,

    #[serde(default = "default_navigation_attempts")]
    pub navigation_attempts: u32,

    #[serde(default = "default_navigation_retry_delay")]
    pub navigation_retry_delay_secs: u64,

    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    #[serde(default = "default_form_timeout")]
    pub form_timeout_secs: u64,

    #[serde(default = "default_location_wait")]
    pub location_wait_secs: u64,

    #[serde(default = "default_submit_wait")]
    pub submit_wait_secs: u64,

    #[serde(default = "default_geolocation_timeout")]
    pub geolocation_timeout_secs: u64,

    #[serde(default)]
    pub selectors: PortalSelectors,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            directory_url: String::new(),
            directory_timeout_secs: default_directory_timeout(),
            navigation_attempts: default_navigation_attempts(),
            navigation_retry_delay_secs: default_navigation_retry_delay(),
            navigation_timeout_secs: default_navigation_timeout(),
            form_timeout_secs: default_form_timeout(),
            location_wait_secs: default_location_wait(),
            submit_wait_secs: default_submit_wait(),
            geolocation_timeout_secs: default_geolocation_timeout(),
            selectors: PortalSelectors::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Chromium binary; autodetected when unset.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// DevTools websocket of an already running browser; launches one when unset.
    #[serde(default)]
    pub ws_url: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    #[serde(default = "default_true")]
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            ws_url: None,
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            sandbox: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default = "default_gateway_url")]
    pub base_url: String,

    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,

    /// Country code sent with each message for local-format numbers.
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_url(),
            timeout_secs: default_gateway_timeout(),
            country_code: default_country_code(),
        }
    }
}

/// Randomized pacing between and within attempts.
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Before each employee's attempt.
    #[serde(default = "default_attempt_jitter")]
    pub attempt_jitter: DelayRange,

    /// Between consecutive employees.
    #[serde(default = "default_between_employees")]
    pub between_employees: DelayRange,

    /// Per typed character.
    #[serde(default = "default_typing")]
    pub typing: DelayRange,

    /// Between form fields.
    #[serde(default = "default_field_pause")]
    pub field_pause: DelayRange,

    /// Before a scheduled run starts, per window.
    #[serde(default = "default_pre_run_pagi")]
    pub pre_run_pagi: DelayRange,
    #[serde(default = "default_pre_run_siang")]
    pub pre_run_siang: DelayRange,
    #[serde(default = "default_pre_run_sore")]
    pub pre_run_sore: DelayRange,
}

impl PacingConfig {
    pub fn pre_run(&self, window: WindowKind) -> DelayRange {
        match window {
            WindowKind::Pagi => self.pre_run_pagi,
            WindowKind::Siang => self.pre_run_siang,
            WindowKind::Sore => self.pre_run_sore,
        }
    }

    /// All delays zero; used by tests and dry runs.
    pub fn none() -> Self {
        Self {
            attempt_jitter: DelayRange::ZERO,
            between_employees: DelayRange::ZERO,
            typing: DelayRange::ZERO,
            field_pause: DelayRange::ZERO,
            pre_run_pagi: DelayRange::ZERO,
            pre_run_siang: DelayRange::ZERO,
            pre_run_sore: DelayRange::ZERO,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            attempt_jitter: default_attempt_jitter(),
            between_employees: default_between_employees(),
            typing: default_typing(),
            field_pause: default_field_pause(),
            pre_run_pagi: default_pre_run_pagi(),
            pre_run_siang: default_pre_run_siang(),
            pre_run_sore: default_pre_run_sore(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Register the daily check-in windows when serving.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub rules: Vec<ClassificationRule>,
}

impl ClassifierConfig {
    pub fn build(&self) -> PageClassifier {
        if self.rules.is_empty() {
            PageClassifier::default()
        } else {
            PageClassifier::new(self.rules.clone())
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_true() -> bool {
    true
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("data/screenshots")
}
fn default_nip_selector() -> String {
    "input[name='nip']".to_string()
}
fn default_password_selector() -> String {
    "input[name='password']".to_string()
}
fn default_mode_selector() -> String {
    "select[name='jenis_presensi']".to_string()
}
fn default_shift_selector() -> String {
    "select[name='shift']".to_string()
}
fn default_location_selector() -> String {
    "input[name='lokasi']".to_string()
}
fn default_submit_selector() -> String {
    "button[type='submit']".to_string()
}
fn default_results_row_selector() -> String {
    "table tbody tr:first-child td".to_string()
}
fn default_directory_timeout() -> u64 {
    15
}
fn default_navigation_attempts() -> u32 {
    3
}
fn default_navigation_retry_delay() -> u64 {
    5
}
fn default_navigation_timeout() -> u64 {
    30
}
fn default_form_timeout() -> u64 {
    15
}
fn default_location_wait() -> u64 {
    10
}
fn default_submit_wait() -> u64 {
    15
}
fn default_geolocation_timeout() -> u64 {
    5
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string()
}
fn default_accept_language() -> String {
    "id-ID,id;q=0.9,en-US;q=0.8,en;q=0.7".to_string()
}
fn default_viewport_width() -> u32 {
    1366
}
fn default_viewport_height() -> u32 {
    768
}
fn default_gateway_url() -> String {
    "https://api.fonnte.com".to_string()
}
fn default_gateway_timeout() -> u64 {
    15
}
fn default_country_code() -> String {
    "62".to_string()
}
fn default_attempt_jitter() -> DelayRange {
    DelayRange::from_secs(0, 30)
}
fn default_between_employees() -> DelayRange {
    DelayRange::from_secs(3, 8)
}
fn default_typing() -> DelayRange {
    DelayRange::from_millis(60, 160)
}
fn default_field_pause() -> DelayRange {
    DelayRange::from_millis(300, 900)
}
fn default_pre_run_pagi() -> DelayRange {
    DelayRange::from_secs(60, 900)
}
fn default_pre_run_siang() -> DelayRange {
    DelayRange::from_secs(30, 600)
}
fn default_pre_run_sore() -> DelayRange {
    DelayRange::from_secs(60, 900)
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Smallest accepted viewport side, in CSS pixels.
const MIN_VIEWPORT: u32 = 320;

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with CHECKIN__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CHECKIN").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [logging]
            level = "info"
            format = "json"

            [storage]
            data_dir = "data"

            [portal]
            url = "https://presensi.example.go.id/absen"
            directory_url = "https://presensi.example.go.id/api/pegawai"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.portal.url.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CHECKIN__PORTAL__URL must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.portal.navigation_attempts == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "portal.navigation_attempts must be at least 1".to_string(),
            ));
        }

        if self.browser.viewport_width < MIN_VIEWPORT
            || self.browser.viewport_height < MIN_VIEWPORT
        {
            return Err(ConfigValidationError::InvalidValue(format!(
                "browser viewport must be at least {}x{}",
                MIN_VIEWPORT, MIN_VIEWPORT
            )));
        }

        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "Invalid socket address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }
}
