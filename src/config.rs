//! Runtime configuration, read once from the environment at startup.

use std::time::Duration;

use crate::domain::ValidationRules;

pub const DEFAULT_API_ENDPOINT: &str = "https://heart-disease-detector-lcij.onrender.com";

/// 2 minutes: the hosted model may need to cold-start.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

pub const PREDICT_PATH: &str = "/predict";
pub const HEALTH_PATH: &str = "/health";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns the screen), stdout otherwise
    Auto,
    File,
    Stdout,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the inference service
    pub api_endpoint: String,
    pub request_timeout: Duration,
    pub validation: ValidationRules,
    /// Show the input recap on the result screen
    pub show_input_summary: bool,
    /// Log request and response payloads at debug level without redaction
    pub log_payloads: bool,
    pub log_mode: LogMode,
    pub log_file: String,
    /// Settings that were present but unusable, kept until logging is up
    pub rejected: Vec<RejectedSetting>,
}

/// An environment value that was ignored in favour of the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSetting {
    pub key: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            validation: ValidationRules::default(),
            show_input_summary: true,
            log_payloads: false,
            log_mode: LogMode::Auto,
            log_file: "cardioscreen.log".to_string(),
            rejected: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Read `CARDIOSCREEN_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparsable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("CARDIOSCREEN_API_ENDPOINT") {
            let endpoint = raw.trim().trim_end_matches('/').to_string();
            if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
                config.api_endpoint = endpoint;
            } else {
                config.reject("CARDIOSCREEN_API_ENDPOINT", raw, "expected an http(s) URL");
            }
        }

        if let Some(raw) = lookup("CARDIOSCREEN_REQUEST_TIMEOUT_MS") {
            let millis = raw.trim().parse::<u64>().ok().filter(|ms| *ms > 0);
            match millis {
                Some(ms) => config.request_timeout = Duration::from_millis(ms),
                None => config.reject(
                    "CARDIOSCREEN_REQUEST_TIMEOUT_MS",
                    raw,
                    "expected a positive number of milliseconds",
                ),
            }
        }

        if let Some(raw) = lookup("CARDIOSCREEN_SHOW_INPUT_SUMMARY") {
            match parse_flag(&raw) {
                Some(v) => config.show_input_summary = v,
                None => config.reject("CARDIOSCREEN_SHOW_INPUT_SUMMARY", raw, "expected a boolean"),
            }
        }

        if let Some(raw) = lookup("CARDIOSCREEN_LOG_PAYLOADS") {
            match parse_flag(&raw) {
                Some(v) => config.log_payloads = v,
                None => config.reject("CARDIOSCREEN_LOG_PAYLOADS", raw, "expected a boolean"),
            }
        }

        if let Some(raw) = lookup("CARDIOSCREEN_LOG_MODE") {
            let mode = match raw.trim() {
                "auto" => Some(LogMode::Auto),
                "file" => Some(LogMode::File),
                "stdout" => Some(LogMode::Stdout),
                _ => None,
            };
            match mode {
                Some(mode) => config.log_mode = mode,
                None => config.reject("CARDIOSCREEN_LOG_MODE", raw, "expected auto, file or stdout"),
            }
        }

        if let Some(path) = lookup("CARDIOSCREEN_LOG_FILE").filter(|p| !p.trim().is_empty()) {
            config.log_file = path;
        }

        config
    }

    fn reject(&mut self, key: &'static str, value: String, reason: &'static str) {
        self.rejected.push(RejectedSetting { key, value, reason });
    }

    /// Warn about every ignored setting. Call once a subscriber is installed;
    /// the environment is read before logging exists.
    pub fn log_rejected(&self) {
        for setting in &self.rejected {
            tracing::warn!(
                key = setting.key,
                value = %setting.value,
                "Ignoring invalid setting ({}), using the default",
                setting.reason
            );
        }
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.api_endpoint, DEFAULT_API_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_millis(120_000));
        assert!(config.show_input_summary);
        assert!(!config.log_payloads);
        assert_eq!(config.log_mode, LogMode::Auto);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CARDIOSCREEN_API_ENDPOINT", "http://localhost:8000/"),
            ("CARDIOSCREEN_REQUEST_TIMEOUT_MS", "5000"),
            ("CARDIOSCREEN_SHOW_INPUT_SUMMARY", "no"),
            ("CARDIOSCREEN_LOG_PAYLOADS", "true"),
            ("CARDIOSCREEN_LOG_MODE", "stdout"),
        ]);
        assert_eq!(config.api_endpoint, "http://localhost:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(!config.show_input_summary);
        assert!(config.log_payloads);
        assert_eq!(config.log_mode, LogMode::Stdout);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = config_from(&[
            ("CARDIOSCREEN_API_ENDPOINT", "ftp://example"),
            ("CARDIOSCREEN_REQUEST_TIMEOUT_MS", "0"),
            ("CARDIOSCREEN_SHOW_INPUT_SUMMARY", "maybe"),
        ]);
        assert_eq!(config.api_endpoint, DEFAULT_API_ENDPOINT);
        assert_eq!(
            config.request_timeout,
            Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)
        );
        assert!(config.show_input_summary);

        let keys: Vec<&str> = config.rejected.iter().map(|r| r.key).collect();
        assert_eq!(
            keys,
            [
                "CARDIOSCREEN_API_ENDPOINT",
                "CARDIOSCREEN_REQUEST_TIMEOUT_MS",
                "CARDIOSCREEN_SHOW_INPUT_SUMMARY",
            ]
        );
        assert!(config_from(&[]).rejected.is_empty());
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_rejected_settings_are_logged_once_a_subscriber_exists() {
        // Built with no subscriber installed, as at startup.
        let config = config_from(&[("CARDIOSCREEN_REQUEST_TIMEOUT_MS", "soon")]);

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || config.log_rejected());

        let output = String::from_utf8(logs.0.lock().expect("log buffer").clone()).expect("utf8");
        assert!(output.contains("WARN"));
        assert!(output.contains("CARDIOSCREEN_REQUEST_TIMEOUT_MS"));
        assert!(output.contains("soon"));
    }
}
