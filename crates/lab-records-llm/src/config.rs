//! Analysis service configuration.

use std::env;

/// Default hosted model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default REST base URL of the model service.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for the hosted analysis model.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// API key; analysis is unavailable without one
    pub api_key: Option<String>,
    /// Model name (e.g., "gemini-2.5-flash")
    pub model: String,
    /// REST base URL
    pub endpoint: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AnalysisConfig {
    /// Read configuration from the environment, loading `.env` first if present.
    ///
    /// - `LAB_AI_API_KEY` (falls back to `API_KEY`)
    /// - `LAB_AI_MODEL`
    /// - `LAB_AI_ENDPOINT`
    /// - `LAB_AI_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = match non_empty("LAB_AI_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid LAB_AI_TIMEOUT_SECS, using default");
                defaults.timeout_secs
            }),
            None => defaults.timeout_secs,
        };

        Self {
            api_key: non_empty("LAB_AI_API_KEY").or_else(|| non_empty("API_KEY")),
            model: non_empty("LAB_AI_MODEL").unwrap_or(defaults.model),
            endpoint: non_empty("LAB_AI_ENDPOINT")
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or(defaults.endpoint),
            timeout_secs,
        }
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
