//! Messages crossing the port boundary.
//!
//! Outbound messages flow from the application core to the bridge, inbound
//! messages flow back. On the wire each message is a port name plus a JSON
//! payload; the tables below are the whole protocol.
//!
//! | Outbound port | Payload                      |
//! |---------------|------------------------------|
//! | `set`         | `[key, value]`               |
//! | `remove`      | `key`                        |
//! | `clear`       | ignored                      |
//! | `preload`     | `[url, ...]`                 |
//! | `upload`      | `[endpoint, formId, token]`  |
//!
//! | Inbound port   | Payload        |
//! |----------------|----------------|
//! | `domLoaded`    | `true`         |
//! | `status`       | response body  |
//! | `uploadFailed` | error message  |

use crate::error::MessageError;
use serde_json::Value;

/// Port names.
pub mod ports {
    /// Persist a JSON value under a key.
    pub const SET: &str = "set";
    /// Delete a key.
    pub const REMOVE: &str = "remove";
    /// Wipe storage.
    pub const CLEAR: &str = "clear";
    /// Warm the image cache.
    pub const PRELOAD: &str = "preload";
    /// Upload a form.
    pub const UPLOAD: &str = "upload";

    /// Document finished loading.
    pub const DOM_LOADED: &str = "domLoaded";
    /// Upload response body.
    pub const STATUS: &str = "status";
    /// Upload could not be started.
    pub const UPLOAD_FAILED: &str = "uploadFailed";

    /// Every outbound port, in subscription order.
    pub const OUTBOUND: [&str; 5] = [SET, REMOVE, CLEAR, PRELOAD, UPLOAD];
    /// Every inbound port.
    pub const INBOUND: [&str; 3] = [DOM_LOADED, STATUS, UPLOAD_FAILED];
}

/// A side effect requested by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Serialize `value` and store it under `key`.
    SetItem {
        /// Storage key
        key: String,
        /// Arbitrary JSON value
        value: Value,
    },
    /// Delete `key` if present.
    RemoveItem {
        /// Storage key
        key: String,
    },
    /// Delete every entry in the origin's storage.
    ClearAll,
    /// Ask the host to fetch and decode each image.
    PreloadImages {
        /// Image URLs, in request order
        urls: Vec<String>,
    },
    /// POST the named form as multipart data with bearer auth.
    UploadForm {
        /// Target URL
        endpoint: String,
        /// Id of the `<form>` element
        form_id: String,
        /// Bearer token
        token: String,
    },
}

impl OutboundMessage {
    /// Decode a message from its port name and JSON payload.
    pub fn from_port(port: &str, payload: Value) -> Result<Self, MessageError> {
        let invalid = |source| MessageError::InvalidPayload {
            port: port.to_string(),
            source,
        };

        match port {
            ports::SET => {
                let (key, value): (String, Value) =
                    serde_json::from_value(payload).map_err(invalid)?;
                Ok(Self::SetItem { key, value })
            }
            ports::REMOVE => {
                let key: String = serde_json::from_value(payload).map_err(invalid)?;
                Ok(Self::RemoveItem { key })
            }
            ports::CLEAR => Ok(Self::ClearAll),
            ports::PRELOAD => {
                let urls: Vec<String> = serde_json::from_value(payload).map_err(invalid)?;
                Ok(Self::PreloadImages { urls })
            }
            ports::UPLOAD => {
                let (endpoint, form_id, token): (String, String, String) =
                    serde_json::from_value(payload).map_err(invalid)?;
                Ok(Self::UploadForm {
                    endpoint,
                    form_id,
                    token,
                })
            }
            other => Err(MessageError::UnknownPort(other.to_string())),
        }
    }

    /// The port this message arrives on.
    #[must_use]
    pub const fn port(&self) -> &'static str {
        match self {
            Self::SetItem { .. } => ports::SET,
            Self::RemoveItem { .. } => ports::REMOVE,
            Self::ClearAll => ports::CLEAR,
            Self::PreloadImages { .. } => ports::PRELOAD,
            Self::UploadForm { .. } => ports::UPLOAD,
        }
    }
}

/// A notification delivered to the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// The document reached `complete`. Always `true`.
    DomReady(bool),
    /// Raw response body of a finished upload, whatever its HTTP status.
    UploadStatus(String),
    /// An upload could not be started; carries the reason.
    UploadFailed(String),
}

impl InboundMessage {
    /// The port this message is sent on.
    #[must_use]
    pub const fn port(&self) -> &'static str {
        match self {
            Self::DomReady(_) => ports::DOM_LOADED,
            Self::UploadStatus(_) => ports::STATUS,
            Self::UploadFailed(_) => ports::UPLOAD_FAILED,
        }
    }

    /// The JSON payload sent on the port.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::DomReady(ready) => Value::Bool(*ready),
            Self::UploadStatus(body) | Self::UploadFailed(body) => Value::String(body.clone()),
        }
    }
}
