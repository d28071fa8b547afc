//! The bridge adapter.
//!
//! Turns outbound messages into host side effects and host events into
//! inbound messages. Each dispatch is independent: a failure in one never
//! affects the next.

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::flags::{recover_token, StartupFlags};
use crate::host::Host;
use crate::image::ImageLoader;
use crate::lifecycle::{DocumentLifecycle, ReadyLatch};
use crate::message::{InboundMessage, OutboundMessage};
use crate::storage::{Storage, StorageExt};
use crate::upload::{UploadId, UploadRequest, Uploader};
use futures::channel::mpsc;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Receiving end of the inbound channel, read by the application core.
pub type Inbound = mpsc::UnboundedReceiver<InboundMessage>;

type Outbox = mpsc::UnboundedSender<InboundMessage>;

/// Continuation of an upload.
///
/// Driving it to completion emits exactly one `UploadStatus`. Dropping it
/// before completion means the status is never delivered.
pub struct UploadTask {
    id: UploadId,
    future: LocalBoxFuture<'static, ()>,
}

impl UploadTask {
    /// Id of the upload this task completes.
    #[must_use]
    pub const fn id(&self) -> UploadId {
        self.id
    }
}

impl fmt::Debug for UploadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadTask").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Future for UploadTask {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.future.poll_unpin(cx)
    }
}

/// What a dispatch left behind.
#[derive(Debug)]
#[must_use = "pending uploads only report back if their task is driven"]
pub enum Effect {
    /// The side effect is complete.
    Done,
    /// An upload is in flight; spawn the task to get its status.
    Pending(UploadTask),
}

impl Effect {
    /// Whether nothing remains to be driven.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The pending task, if any.
    #[must_use]
    pub fn into_task(self) -> Option<UploadTask> {
        match self {
            Self::Done => None,
            Self::Pending(task) => Some(task),
        }
    }
}

/// Bridge between an application core and a [`Host`].
pub struct Bridge<H: Host> {
    host: H,
    config: BridgeConfig,
    outbox: Outbox,
    ready: ReadyLatch,
    started: Cell<bool>,
    next_upload: Cell<u64>,
}

impl<H: Host> Bridge<H> {
    /// Create a bridge and the inbound channel the core reads from.
    pub fn new(host: H, config: BridgeConfig) -> (Self, Inbound) {
        let (outbox, inbound) = mpsc::unbounded();
        let bridge = Self {
            host,
            config,
            outbox,
            ready: ReadyLatch::new(),
            started: Cell::new(false),
            next_upload: Cell::new(0),
        };
        (bridge, inbound)
    }

    /// The injected host.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The active configuration.
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Snapshot the flags the application core starts with.
    ///
    /// The core is constructed once per process, so this succeeds once.
    pub fn startup_flags(&self) -> Result<StartupFlags, BridgeError> {
        if self.started.replace(true) {
            return Err(BridgeError::AlreadyStarted);
        }

        let flags = StartupFlags {
            token: recover_token(self.host.storage(), &self.config),
            time: self.host.now_millis(),
        };
        tracing::info!(
            has_token = !flags.token.is_empty(),
            time = flags.time,
            "startup flags ready"
        );
        Ok(flags)
    }

    /// Emit `DomReady(true)` once the document is fully loaded.
    ///
    /// At most one `DomReady` is ever emitted, however many times this is
    /// called or the host reports completion.
    pub fn watch_ready(&self) {
        let latch = self.ready.clone();
        let outbox = self.outbox.clone();
        self.host.document().on_ready(Box::new(move || {
            if latch.fire() {
                tracing::debug!("document ready");
                deliver(&outbox, InboundMessage::DomReady(true));
            }
        }));
    }

    /// Whether `DomReady` has been emitted.
    pub fn is_ready(&self) -> bool {
        self.ready.has_fired()
    }

    /// Decode a port message and dispatch it.
    pub fn dispatch_port(&self, port: &str, payload: Value) -> Result<Effect, BridgeError> {
        let message = OutboundMessage::from_port(port, payload)?;
        self.dispatch(message)
    }

    /// Perform the side effect for `message`.
    ///
    /// Storage faults are returned to the caller. Upload setup faults are
    /// logged (and reported as `UploadFailed` when configured) and yield
    /// [`Effect::Done`].
    pub fn dispatch(&self, message: OutboundMessage) -> Result<Effect, BridgeError> {
        tracing::debug!(port = message.port(), "dispatch");

        match message {
            OutboundMessage::SetItem { key, value } => {
                self.host.storage().set_json(&key, &value)?;
                Ok(Effect::Done)
            }
            OutboundMessage::RemoveItem { key } => {
                self.host.storage().remove(&key)?;
                Ok(Effect::Done)
            }
            OutboundMessage::ClearAll => {
                self.host.storage().clear()?;
                Ok(Effect::Done)
            }
            OutboundMessage::PreloadImages { urls } => {
                for url in &urls {
                    self.host.images().preload(url);
                }
                Ok(Effect::Done)
            }
            OutboundMessage::UploadForm {
                endpoint,
                form_id,
                token,
            } => Ok(self.upload(UploadRequest {
                endpoint,
                form_id,
                token,
            })),
        }
    }

    /// Read back a stored value. Missing keys and invalid JSON yield `None`.
    pub fn read_item(&self, key: &str) -> Result<Option<Value>, BridgeError> {
        Ok(self.host.storage().get_json(key)?)
    }

    fn upload(&self, request: UploadRequest) -> Effect {
        let id = UploadId(self.next_upload.get());
        self.next_upload.set(id.0 + 1);

        let response = match self.host.uploader().upload(&request) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    %id,
                    endpoint = %request.endpoint,
                    form = %request.form_id,
                    error = %err,
                    "upload setup failed"
                );
                if self.config.report_upload_failures {
                    deliver(&self.outbox, InboundMessage::UploadFailed(err.to_string()));
                }
                return Effect::Done;
            }
        };

        tracing::debug!(%id, endpoint = %request.endpoint, "upload sent");
        let outbox = self.outbox.clone();
        let future = async move {
            let body = match response.await {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(%id, error = %err, "upload transport failed");
                    String::new()
                }
            };
            tracing::debug!(%id, bytes = body.len(), "upload finished");
            deliver(&outbox, InboundMessage::UploadStatus(body));
        };

        Effect::Pending(UploadTask {
            id,
            future: future.boxed_local(),
        })
    }
}

fn deliver(outbox: &Outbox, message: InboundMessage) {
    if outbox.unbounded_send(message).is_err() {
        tracing::debug!("inbound channel closed, message dropped");
    }
}
