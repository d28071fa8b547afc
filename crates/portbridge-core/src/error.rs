//! Error types for the port bridge.
//!
//! Each concern gets its own enum so callers can tell a storage fault
//! (propagated) from an upload setup fault (recovered and reported).

use thiserror::Error;

/// Errors raised by a [`Storage`](crate::Storage) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Storage is not available (no window, disabled, private mode).
    #[error("storage not available")]
    Unavailable,

    /// The write did not fit in the origin's quota.
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The host refused access to storage.
    #[error("storage access denied: {0}")]
    AccessDenied(String),
}

/// Synchronous failure while preparing an upload.
///
/// No request leaves the host when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// No element with the given id exists in the document.
    #[error("form element '{0}' not found")]
    FormNotFound(String),

    /// The element exists but is not a `<form>`.
    #[error("element '{0}' is not a form")]
    NotAForm(String),

    /// Building or sending the request threw.
    #[error("upload request failed: {0}")]
    Request(String),
}

/// Failure reported by the transport after the request was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("upload transport failed: {0}")]
pub struct TransportError(pub String);

/// Errors decoding an outbound port message.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The port name is not one the bridge subscribes to.
    #[error("unknown outbound port '{0}'")]
    UnknownPort(String),

    /// The payload does not have the shape the port expects.
    #[error("invalid payload for port '{port}': {source}")]
    InvalidPayload {
        /// Port the payload was sent on.
        port: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level bridge errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A storage write, remove or clear failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A value could not be serialized to JSON.
    #[error("serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// An outbound message could not be decoded.
    #[error(transparent)]
    Message(#[from] MessageError),

    /// Startup flags were already handed to the application core.
    #[error("application core already started")]
    AlreadyStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        assert_eq!(StorageError::Unavailable.to_string(), "storage not available");
        assert_eq!(
            StorageError::QuotaExceeded("5MB".to_string()).to_string(),
            "storage quota exceeded: 5MB"
        );
        assert_eq!(
            StorageError::AccessDenied("sandbox".to_string()).to_string(),
            "storage access denied: sandbox"
        );
    }

    #[test]
    fn test_upload_error_display() {
        assert_eq!(
            UploadError::FormNotFound("myform".to_string()).to_string(),
            "form element 'myform' not found"
        );
        assert_eq!(
            UploadError::NotAForm("title".to_string()).to_string(),
            "element 'title' is not a form"
        );
    }

    #[test]
    fn test_bridge_error_wraps_storage_transparently() {
        let err: BridgeError = StorageError::Unavailable.into();
        assert_eq!(err.to_string(), "storage not available");
        assert!(matches!(err, BridgeError::Storage(StorageError::Unavailable)));
    }

    #[test]
    fn test_message_error_display() {
        let err = MessageError::UnknownPort("frobnicate".to_string());
        assert_eq!(err.to_string(), "unknown outbound port 'frobnicate'");
    }
}
