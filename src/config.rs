//! Connection option handling.
//!
//! This module provides the option bag consumed by the reconnect policy.
//! Recognized keys are `auto_reconnect` and `retry_times`; unrecognized keys
//! and unparseable values are ignored rather than rejected, so option bags
//! assembled from URLs or config files can carry driver-specific extras.

use serde::{Deserialize, Serialize};

/// Default for `auto_reconnect`: execution errors propagate immediately.
pub const DEFAULT_AUTO_RECONNECT: bool = false;

/// Default for `retry_times`: a single reconnect cycle when enabled.
pub const DEFAULT_RETRY_TIMES: u32 = 1;

/// Options controlling reconnect-on-failure behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectOptions {
    /// Reconnect and retry a failed statement (default: false)
    pub auto_reconnect: Option<bool>,
    /// Reconnect cycles to attempt before giving up (default: 1)
    pub retry_times: Option<u32>,
}

impl ConnectOptions {
    /// Create an empty option bag (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable auto-reconnect.
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = Some(enabled);
        self
    }

    /// Set the number of reconnect cycles.
    pub fn with_retry_times(mut self, times: u32) -> Self {
        self.retry_times = Some(times);
        self
    }

    /// Build options from string key-value pairs.
    ///
    /// Keys are matched case-insensitively with underscores ignored, so
    /// `autoReconnect` and `auto_reconnect` are equivalent. Invalid values
    /// are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            let normalized: String = key
                .as_ref()
                .chars()
                .filter(|c| *c != '_')
                .collect::<String>()
                .to_ascii_lowercase();
            match normalized.as_str() {
                "autoreconnect" => {
                    let v = value.as_ref();
                    if v.eq_ignore_ascii_case("true") {
                        options.auto_reconnect = Some(true);
                    } else if v.eq_ignore_ascii_case("false") {
                        options.auto_reconnect = Some(false);
                    }
                }
                "retrytimes" => {
                    options.retry_times = value.as_ref().parse().ok();
                }
                _ => {}
            }
        }
        options
    }

    /// Get auto_reconnect with default value.
    pub fn auto_reconnect_or_default(&self) -> bool {
        self.auto_reconnect.unwrap_or(DEFAULT_AUTO_RECONNECT)
    }

    /// Get retry_times with default value.
    pub fn retry_times_or_default(&self) -> u32 {
        self.retry_times.unwrap_or(DEFAULT_RETRY_TIMES)
    }

    /// Validate options and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(times) = self.retry_times {
            if times == 0 {
                return Err("retry_times must be greater than 0".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ConnectOptions::default();
        assert!(!opts.auto_reconnect_or_default());
        assert_eq!(opts.retry_times_or_default(), 1);
    }

    #[test]
    fn test_builder_style() {
        let opts = ConnectOptions::new()
            .with_auto_reconnect(true)
            .with_retry_times(3);
        assert!(opts.auto_reconnect_or_default());
        assert_eq!(opts.retry_times_or_default(), 3);
    }

    #[test]
    fn test_from_pairs_snake_case() {
        let opts = ConnectOptions::from_pairs([("auto_reconnect", "true"), ("retry_times", "5")]);
        assert_eq!(opts.auto_reconnect, Some(true));
        assert_eq!(opts.retry_times, Some(5));
    }

    #[test]
    fn test_from_pairs_camel_case() {
        let opts = ConnectOptions::from_pairs([("autoReconnect", "TRUE"), ("retryTimes", "2")]);
        assert_eq!(opts.auto_reconnect, Some(true));
        assert_eq!(opts.retry_times, Some(2));
    }

    #[test]
    fn test_from_pairs_invalid_values_ignored() {
        let opts = ConnectOptions::from_pairs([("auto_reconnect", "yes"), ("retry_times", "many")]);
        assert!(opts.auto_reconnect.is_none());
        assert!(opts.retry_times.is_none());
    }

    #[test]
    fn test_from_pairs_unknown_keys_ignored() {
        let opts = ConnectOptions::from_pairs([("charset", "utf8"), ("retry_times", "4")]);
        assert!(opts.auto_reconnect.is_none());
        assert_eq!(opts.retry_times, Some(4));
    }

    #[test]
    fn test_from_pairs_last_value_wins() {
        let opts =
            ConnectOptions::from_pairs([("auto_reconnect", "false"), ("auto_reconnect", "true")]);
        assert_eq!(opts.auto_reconnect, Some(true));
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let opts = ConnectOptions::new().with_retry_times(0);
        let err = opts.validate().unwrap_err();
        assert!(err.contains("retry_times"));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(ConnectOptions::default().validate().is_ok());
    }
}
