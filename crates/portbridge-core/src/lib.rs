//! Core types for the portbridge browser integration layer.
//!
//! A compiled front-end application talks to the outside world through
//! named ports. This crate translates between those ports and the host
//! capabilities the application needs:
//! - Durable key/value storage: [`Storage`]
//! - Document readiness: [`DocumentLifecycle`]
//! - Image preloading: [`ImageLoader`]
//! - Authenticated multipart upload: [`Uploader`]
//!
//! The capabilities are injected through a [`Host`], so everything here
//! runs and tests on native targets. The `portbridge` crate supplies the
//! browser host.
//!
//! # Examples
//!
//! ```
//! use portbridge_core::{Bridge, BridgeConfig, InboundMessage, MemoryHost, OutboundMessage};
//! use serde_json::json;
//!
//! let host = MemoryHost::new();
//! let (bridge, _inbound) = Bridge::new(host, BridgeConfig::default());
//!
//! let _ = bridge
//!     .dispatch(OutboundMessage::SetItem {
//!         key: "token".to_string(),
//!         value: json!({"token": "abc123"}),
//!     })
//!     .unwrap();
//! assert_eq!(bridge.read_item("token").unwrap(), Some(json!({"token": "abc123"})));
//! ```

mod bridge;
mod config;
mod error;
mod flags;
mod host;
mod image;
mod lifecycle;
pub mod message;
mod storage;
mod upload;

pub use bridge::{Bridge, Effect, Inbound, UploadTask};
pub use config::{BridgeConfig, DEFAULT_TOKEN_FIELD, DEFAULT_TOKEN_KEY};
pub use error::{BridgeError, MessageError, StorageError, TransportError, UploadError};
pub use flags::{recover_token, StartupFlags};
pub use host::{Host, MemoryHost};
pub use image::{ImageLoader, RecordingImageLoader};
pub use lifecycle::{DocumentLifecycle, DocumentReadyState, ManualDocument, ReadyCallback, ReadyLatch};
pub use message::{ports, InboundMessage, OutboundMessage};
pub use storage::{MemoryStorage, Storage, StorageExt};
pub use upload::{ScriptedUploader, UploadFuture, UploadId, UploadRequest, Uploader};
