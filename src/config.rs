//! Daemon configuration module.
//!
//! Contains the runtime configuration for the lyricloom daemon: API
//! credentials and endpoint, model and voice selection, audio output and
//! export paths.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::audio::OutputKind;
use crate::generation::{DEFAULT_SPEECH_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_VOICE};

/// Default Gemini REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Maximum accepted request timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// Runtime configuration for the daemon.
///
/// This configuration is typically loaded from environment variables at
/// startup and adjusted by command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// API key for the Gemini API. Never serialized.
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API.
    pub api_endpoint: String,

    /// Model used for lyrics.
    pub text_model: String,

    /// Model used for sung previews.
    pub speech_model: String,

    /// Prebuilt voice for sung previews.
    pub voice: String,

    /// Timeout for each API request, in seconds.
    pub timeout_secs: u64,

    /// Audio output selection.
    pub output: OutputKind,

    /// Directory for exported lyrics.
    /// If None, uses the platform-specific default data location.
    pub export_path: Option<PathBuf>,
}

impl DaemonConfig {
    /// Creates a new DaemonConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a DaemonConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `GEMINI_API_KEY` - API key (falls back to `API_KEY`)
    /// - `LYRICLOOM_ENDPOINT` - Gemini REST base URL
    /// - `LYRICLOOM_TEXT_MODEL` - Lyrics model
    /// - `LYRICLOOM_SPEECH_MODEL` - Speech model
    /// - `LYRICLOOM_VOICE` - Prebuilt voice name
    /// - `LYRICLOOM_TIMEOUT_SECS` - Request timeout (1-600)
    /// - `LYRICLOOM_OUTPUT` - Audio output (auto, speaker, silent)
    /// - `LYRICLOOM_EXPORT_PATH` - Export directory
    ///
    /// Falls back to defaults for unset or invalid variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        config.api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY"));

        if let Some(endpoint) = non_empty("LYRICLOOM_ENDPOINT") {
            config.api_endpoint = endpoint;
        }

        if let Some(model) = non_empty("LYRICLOOM_TEXT_MODEL") {
            config.text_model = model;
        }

        if let Some(model) = non_empty("LYRICLOOM_SPEECH_MODEL") {
            config.speech_model = model;
        }

        if let Some(voice) = non_empty("LYRICLOOM_VOICE") {
            config.voice = voice;
        }

        if let Some(timeout_str) = non_empty("LYRICLOOM_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout_str.trim().parse::<u64>() {
                if (1..=MAX_TIMEOUT_SECS).contains(&timeout) {
                    config.timeout_secs = timeout;
                }
            }
        }

        if let Some(output_str) = non_empty("LYRICLOOM_OUTPUT") {
            if let Some(output) = OutputKind::parse(&output_str) {
                config.output = output;
            }
        }

        if let Some(path) = non_empty("LYRICLOOM_EXPORT_PATH") {
            config.export_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the effective export path, using platform defaults if not specified.
    pub fn effective_export_path(&self) -> PathBuf {
        if let Some(ref path) = self.export_path {
            path.clone()
        } else {
            default_export_path()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Some(format!(
                "timeout_secs must be between 1 and {}, got {}",
                MAX_TIMEOUT_SECS, self.timeout_secs
            ));
        }

        if !self.api_endpoint.starts_with("http://") && !self.api_endpoint.starts_with("https://") {
            return Some(format!("api_endpoint is not an http(s) URL: {}", self.api_endpoint));
        }

        if self.text_model.trim().is_empty() || self.speech_model.trim().is_empty() {
            return Some("model names cannot be empty".to_string());
        }

        if self.voice.trim().is_empty() {
            return Some("voice cannot be empty".to_string());
        }

        None
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output: OutputKind::Auto,
            export_path: None,
        }
    }
}

/// Returns the platform-specific default export path.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Application Support/lyricloom/exports
/// - Linux: ~/.local/share/lyricloom/exports
/// - Windows: C:\Users\<user>\AppData\Roaming\lyricloom\data\exports
fn default_export_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "lyricloom") {
        proj_dirs.data_dir().join("exports")
    } else {
        // Fallback to current directory
        PathBuf::from("./exports")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = DaemonConfig::new();
        assert!(config.api_key.is_none());
        assert_eq!(config.api_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.text_model, "gemini-3-flash-preview");
        assert_eq!(config.speech_model, "gemini-2.5-flash-preview-tts");
        assert_eq!(config.voice, "Kore");
        assert_eq!(config.output, OutputKind::Auto);
        assert!(config.validate().is_none());
    }

    #[test]
    fn from_lookup_reads_all_vars() {
        let config = DaemonConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "secret"),
            ("LYRICLOOM_ENDPOINT", "http://localhost:8080/v1beta"),
            ("LYRICLOOM_TEXT_MODEL", "text-x"),
            ("LYRICLOOM_SPEECH_MODEL", "tts-x"),
            ("LYRICLOOM_VOICE", "Puck"),
            ("LYRICLOOM_TIMEOUT_SECS", "30"),
            ("LYRICLOOM_OUTPUT", "silent"),
            ("LYRICLOOM_EXPORT_PATH", "/tmp/lyrics"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.api_endpoint, "http://localhost:8080/v1beta");
        assert_eq!(config.text_model, "text-x");
        assert_eq!(config.speech_model, "tts-x");
        assert_eq!(config.voice, "Puck");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.output, OutputKind::Silent);
        assert_eq!(config.effective_export_path(), PathBuf::from("/tmp/lyrics"));
    }

    #[test]
    fn api_key_fallback() {
        let config = DaemonConfig::from_lookup(lookup(&[("API_KEY", "fallback")]));
        assert_eq!(config.api_key.as_deref(), Some("fallback"));

        let config = DaemonConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "  "),
            ("API_KEY", "fallback"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("fallback"));
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = DaemonConfig::from_lookup(lookup(&[
            ("LYRICLOOM_TIMEOUT_SECS", "0"),
            ("LYRICLOOM_OUTPUT", "hdmi"),
        ]));
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.output, OutputKind::Auto);

        let config = DaemonConfig::from_lookup(lookup(&[("LYRICLOOM_TIMEOUT_SECS", "9000")]));
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn config_validation() {
        let mut config = DaemonConfig::new();
        config.timeout_secs = 0;
        assert!(config.validate().is_some());

        config.timeout_secs = 10;
        config.api_endpoint = "ftp://example".to_string();
        assert!(config.validate().is_some());

        config.api_endpoint = DEFAULT_ENDPOINT.to_string();
        config.voice = String::new();
        assert!(config.validate().is_some());
    }

    #[test]
    fn api_key_not_serialized() {
        let mut config = DaemonConfig::new();
        config.api_key = Some("secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn effective_export_path_default() {
        let config = DaemonConfig::new();
        let path = config.effective_export_path();
        assert!(!path.as_os_str().is_empty());
        assert!(path.ends_with("exports"));
    }
}
