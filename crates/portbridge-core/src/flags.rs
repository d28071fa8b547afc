//! Startup flags handed to the application core.

use crate::config::BridgeConfig;
use crate::storage::{Storage, StorageExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable snapshot passed to the application core's entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupFlags {
    /// Auth token recovered from storage, or `""`.
    pub token: String,
    /// Milliseconds since the Unix epoch at startup.
    pub time: u64,
}

/// Recover the persisted auth token.
///
/// Reads `config.token_key`, parses it as a JSON object and returns its
/// `config.token_field` string. Any gap along the way (storage error, no
/// entry, bad JSON, missing or non-string field) yields `""`.
pub fn recover_token<S: Storage + ?Sized>(storage: &S, config: &BridgeConfig) -> String {
    let stored: Option<Value> = match storage.get_json(&config.token_key) {
        Ok(stored) => stored,
        Err(err) => {
            tracing::warn!(key = %config.token_key, error = %err, "token storage unreadable");
            None
        }
    };

    stored
        .as_ref()
        .and_then(|session| session.get(&config.token_field))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}
