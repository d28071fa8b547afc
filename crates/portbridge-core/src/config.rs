//! Bridge configuration.

use serde::{Deserialize, Serialize};

/// Default storage key holding the persisted session.
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Default field of the persisted session object holding the token.
pub const DEFAULT_TOKEN_FIELD: &str = "token";

/// Configuration for a [`Bridge`](crate::Bridge).
///
/// Every field has a default, so a host can pass `{}` (or nothing) and get
/// the stock behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Storage key the auth token is recovered from at startup.
    pub token_key: String,
    /// Field of the stored JSON object that holds the token.
    pub token_field: String,
    /// Emit `UploadFailed` when an upload cannot be set up.
    ///
    /// When disabled, setup faults are only logged and the core never hears
    /// about the upload again.
    pub report_upload_failures: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            token_field: DEFAULT_TOKEN_FIELD.to_string(),
            report_upload_failures: true,
        }
    }
}

impl BridgeConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different storage key and field for the token.
    #[must_use]
    pub fn with_token_location(mut self, key: impl Into<String>, field: impl Into<String>) -> Self {
        self.token_key = key.into();
        self.token_field = field.into();
        self
    }

    /// Enable or disable `UploadFailed` reporting.
    #[must_use]
    pub const fn with_upload_failure_reports(mut self, enabled: bool) -> Self {
        self.report_upload_failures = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.token_key, "token");
        assert_eq!(config.token_field, "token");
        assert!(config.report_upload_failures);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: BridgeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_partial_object_camel_case() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"tokenKey":"session","reportUploadFailures":false}"#).unwrap();
        assert_eq!(config.token_key, "session");
        assert_eq!(config.token_field, "token");
        assert!(!config.report_upload_failures);
    }

    #[test]
    fn test_builders() {
        let config = BridgeConfig::new()
            .with_token_location("auth", "jwt")
            .with_upload_failure_reports(false);
        assert_eq!(config.token_key, "auth");
        assert_eq!(config.token_field, "jwt");
        assert!(!config.report_upload_failures);
    }
}
