use std::env;
use std::time::Duration;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_GEMINI_VERIFY_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REPLICATE_API_BASE: &str = "https://api.replicate.com/v1";
pub const DEFAULT_REPLICATE_MODEL: &str = "bytedance/seedream-4";

/// How a Replicate token is checked at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplicateVerification {
    /// Shape check only. Generation rights are not confirmed until the first
    /// call.
    #[default]
    ClientOnly,
    /// Authenticated `GET /account` round-trip.
    Account,
}

/// Endpoints, models and timing for the provider adapters. Never holds a
/// credential.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub gemini_api_base: String,
    pub gemini_image_model: String,
    pub gemini_verify_model: String,
    pub replicate_api_base: String,
    pub replicate_model: String,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub replicate_verification: ReplicateVerification,
    pub dry_run: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            gemini_image_model: DEFAULT_GEMINI_IMAGE_MODEL.to_string(),
            gemini_verify_model: DEFAULT_GEMINI_VERIFY_MODEL.to_string(),
            replicate_api_base: DEFAULT_REPLICATE_API_BASE.to_string(),
            replicate_model: DEFAULT_REPLICATE_MODEL.to_string(),
            request_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
            replicate_verification: ReplicateVerification::default(),
            dry_run: false,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::default().with_overrides(non_empty_env)
    }

    /// Applies overrides from `lookup`, which returns trimmed non-empty
    /// values or `None`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup("GEMINI_API_BASE") {
            self.gemini_api_base = normalize_base(&base);
        }
        if let Some(model) = lookup("GEMINI_IMAGE_MODEL") {
            self.gemini_image_model = model;
        }
        if let Some(base) = lookup("REPLICATE_API_BASE") {
            self.replicate_api_base = normalize_base(&base);
        }
        if let Some(model) = lookup("REPLICATE_MODEL") {
            self.replicate_model = model;
        }
        if let Some(seconds) = lookup("HAIRSTUDIO_REQUEST_TIMEOUT").and_then(|raw| raw.parse::<f64>().ok()) {
            self = self.with_timeout_secs(seconds);
        }
        self
    }

    pub fn with_timeout_secs(mut self, seconds: f64) -> Self {
        self.request_timeout = Duration::from_secs_f64(clamp_seconds(seconds, 120.0, 5.0, 600.0));
        self
    }

    pub fn with_poll_interval_secs(mut self, seconds: f64) -> Self {
        self.poll_interval = Duration::from_secs_f64(clamp_seconds(seconds, 1.0, 0.2, 5.0));
        self
    }
}

fn clamp_seconds(value: f64, default: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

fn normalize_base(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
