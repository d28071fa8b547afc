//! Multipart form upload capability.
//!
//! Uploading has two distinct failure points. Building the request
//! (finding the form, opening the connection) fails synchronously with an
//! [`UploadError`]. Once the request is on the wire, the returned
//! [`UploadFuture`] resolves to the response body or a [`TransportError`].

use crate::error::{TransportError, UploadError};
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Completion of an in-flight upload: the raw response body.
pub type UploadFuture = LocalBoxFuture<'static, Result<String, TransportError>>;

/// Sequential id assigned to each upload for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploadId(pub u64);

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upload-{}", self.0)
    }
}

/// Everything needed to POST a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Target URL.
    pub endpoint: String,
    /// Id of the form element whose fields are sent.
    pub form_id: String,
    /// Bearer token.
    pub token: String,
}

impl UploadRequest {
    /// HTTP method used for every upload.
    pub const METHOD: &'static str = "POST";

    /// Create a request.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        form_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            form_id: form_id.into(),
            token: token.into(),
        }
    }

    /// Value of the `Authorization` header.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Host-side uploader.
pub trait Uploader {
    /// Start uploading the form named in `request`.
    ///
    /// Returns `Err` if the request could not be set up. The future
    /// resolves once the transport reports completion; the HTTP status is
    /// not inspected.
    fn upload(&self, request: &UploadRequest) -> Result<UploadFuture, UploadError>;
}

impl<T: Uploader + ?Sized> Uploader for Rc<T> {
    fn upload(&self, request: &UploadRequest) -> Result<UploadFuture, UploadError> {
        (**self).upload(request)
    }
}

type Completion = oneshot::Sender<Result<String, TransportError>>;

/// Uploader whose responses are supplied by the test.
///
/// Only forms registered with [`with_form`](Self::with_form) exist; each
/// accepted upload stays pending until [`respond`](Self::respond) or
/// [`fail`](Self::fail) is called for its endpoint.
#[derive(Debug, Default)]
pub struct ScriptedUploader {
    forms: RefCell<HashSet<String>>,
    sent: RefCell<Vec<UploadRequest>>,
    pending: RefCell<Vec<(String, Completion)>>,
}

impl ScriptedUploader {
    /// Uploader with no forms.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a form id that uploads may reference.
    #[must_use]
    pub fn with_form(self, form_id: impl Into<String>) -> Self {
        self.forms.borrow_mut().insert(form_id.into());
        self
    }

    /// Requests that were accepted, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<UploadRequest> {
        self.sent.borrow().clone()
    }

    /// Number of uploads still waiting for a response.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Complete the oldest pending upload to `endpoint` with `body`.
    ///
    /// Returns `false` if nothing was pending for that endpoint.
    pub fn respond(&self, endpoint: &str, body: impl Into<String>) -> bool {
        self.finish(endpoint, Ok(body.into()))
    }

    /// Fail the oldest pending upload to `endpoint` at the transport level.
    pub fn fail(&self, endpoint: &str, reason: impl Into<String>) -> bool {
        self.finish(endpoint, Err(TransportError(reason.into())))
    }

    fn finish(&self, endpoint: &str, outcome: Result<String, TransportError>) -> bool {
        let mut pending = self.pending.borrow_mut();
        let Some(index) = pending.iter().position(|(e, _)| e == endpoint) else {
            return false;
        };
        let (_, completion) = pending.remove(index);
        // A dropped receiver means the task was abandoned; nothing to do.
        let _ = completion.send(outcome);
        true
    }
}

impl Uploader for ScriptedUploader {
    fn upload(&self, request: &UploadRequest) -> Result<UploadFuture, UploadError> {
        if !self.forms.borrow().contains(&request.form_id) {
            return Err(UploadError::FormNotFound(request.form_id.clone()));
        }

        let (tx, rx) = oneshot::channel();
        self.sent.borrow_mut().push(request.clone());
        self.pending
            .borrow_mut()
            .push((request.endpoint.clone(), tx));

        Ok(rx
            .map(|outcome| {
                outcome.unwrap_or_else(|_| Err(TransportError("upload abandoned".to_string())))
            })
            .boxed_local())
    }
}
