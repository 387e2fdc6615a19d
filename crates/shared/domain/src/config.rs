use crate::constants::{
    DEFAULT_CAPACITY, DEFAULT_CAPTCHA_ANSWER, DEFAULT_ENDPOINT, DEFAULT_FULL_PANEL_DELAY_MS,
};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Top-level configuration shared across the gatekeeper and its host.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub trip: TripConfig,
    pub form: FormConfig,
    pub submission: SubmissionConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Capacity gate and captcha settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TripConfig {
    pub capacity: u32,
    pub captcha_answer: String,
    pub full_panel_delay_ms: u64,
}

impl TripConfig {
    #[must_use]
    pub const fn full_panel_delay(&self) -> Duration {
        Duration::from_millis(self.full_panel_delay_ms)
    }
}

/// Client-side form behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Rewrites phone input to digits and title-cases names on blur.
    pub input_formatters: bool,
}

/// Where and how submissions are forwarded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub endpoint: String,
    /// `None` waits for the endpoint indefinitely.
    pub timeout_ms: Option<u64>,
}

/// Location of the persisted key-value store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
    pub json: bool,
}

// --- Default ---

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            captcha_answer: DEFAULT_CAPTCHA_ANSWER.to_owned(),
            full_panel_delay_ms: DEFAULT_FULL_PANEL_DELAY_MS,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self { input_formatters: true }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self { endpoint: DEFAULT_ENDPOINT.to_owned(), timeout_ms: None }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), directory: None, json: false }
    }
}
