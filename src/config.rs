//! Generator configuration and environment lookup

use log::warn;

/// Environment variable holding the hosted-model API key.
pub const API_KEY_ENV: &str = "WIDGETSMITH_API_KEY";
/// Accepted as a fallback when [`API_KEY_ENV`] is unset.
pub const API_KEY_FALLBACK_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "WIDGETSMITH_MODEL";
pub const ENDPOINT_ENV: &str = "WIDGETSMITH_ENDPOINT";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the hosted text model.
///
/// The defaults are conservative: no credential, the fast flash model, and no
/// request timeout (the HTTP client's own behaviour applies).
///
/// # Examples
///
/// ```
/// let cfg = widgetsmith::GeneratorConfig::default();
/// assert!(cfg.api_key.is_none());
/// assert_eq!(cfg.model, "gemini-2.5-flash");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// API credential; `None` makes every generation fail immediately
    pub api_key: Option<String>,
    /// Model name as understood by the remote service
    pub model: String,
    /// Base URL of the remote service (no trailing path)
    pub endpoint: String,
    /// Optional request timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: None,
        }
    }
}

impl GeneratorConfig {
    /// Build a configuration from the process environment.
    ///
    /// A missing key is not an error here; it is logged and generation calls
    /// will report it.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`GeneratorConfig::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = non_empty(API_KEY_ENV).or_else(|| non_empty(API_KEY_FALLBACK_ENV));
        if api_key.is_none() {
            warn!(
                "API key not found. Set {} (or {}) to enable widget generation",
                API_KEY_ENV, API_KEY_FALLBACK_ENV
            );
        }

        let defaults = Self::default();
        Self {
            api_key,
            model: non_empty(MODEL_ENV).unwrap_or(defaults.model),
            endpoint: non_empty(ENDPOINT_ENV).unwrap_or(defaults.endpoint),
            timeout_ms: None,
        }
    }

    /// Whether a usable credential is present.
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}
