//! Multipart form upload over `XMLHttpRequest`.

use crate::js::describe;
use futures::channel::oneshot;
use futures::FutureExt;
use portbridge_core::{TransportError, UploadError, UploadFuture, UploadRequest, Uploader};
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{FormData, HtmlFormElement, XmlHttpRequest};

type Outcome = Result<String, TransportError>;

/// Uploads a document form with a bearer token.
#[derive(Debug, Clone, Copy, Default)]
pub struct XhrUploader;

impl XhrUploader {
    /// Create an uploader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn request_error(err: JsValue) -> UploadError {
    UploadError::Request(describe(&err))
}

impl Uploader for XhrUploader {
    fn upload(&self, request: &UploadRequest) -> Result<UploadFuture, UploadError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| UploadError::Request("No document".to_string()))?;

        let form = document
            .get_element_by_id(&request.form_id)
            .ok_or_else(|| UploadError::FormNotFound(request.form_id.clone()))?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| UploadError::NotAForm(request.form_id.clone()))?;

        // Field values are captured now, not when the request completes.
        let data = FormData::new_with_form(&form).map_err(request_error)?;

        let xhr = XmlHttpRequest::new().map_err(request_error)?;
        xhr.open_with_async(UploadRequest::METHOD, &request.endpoint, true)
            .map_err(request_error)?;
        xhr.set_request_header("Authorization", &request.authorization())
            .map_err(request_error)?;

        let completion = XhrCompletion::attach(xhr.clone());
        xhr.send_with_opt_form_data(Some(&data))
            .map_err(request_error)?;

        Ok(completion.boxed_local())
    }
}

/// Resolves when the request loads, errors or is aborted.
///
/// Dropping it detaches the handlers; the request itself keeps going.
struct XhrCompletion {
    xhr: XmlHttpRequest,
    outcome: oneshot::Receiver<Outcome>,
    _on_load: Closure<dyn FnMut()>,
    _on_error: Closure<dyn FnMut()>,
}

impl XhrCompletion {
    fn attach(xhr: XmlHttpRequest) -> Self {
        let (tx, rx) = oneshot::channel::<Outcome>();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let load_tx = Rc::clone(&tx);
        let load_xhr = xhr.clone();
        // Status is deliberately not checked: any completed response counts.
        let on_load = Closure::<dyn FnMut()>::new(move || {
            let body = load_xhr.response_text().ok().flatten().unwrap_or_default();
            if let Some(tx) = load_tx.borrow_mut().take() {
                let _ = tx.send(Ok(body));
            }
        });

        let on_error = Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Err(TransportError(
                    "request failed before a response arrived".to_string(),
                )));
            }
        });

        xhr.set_onload(Some(on_load.as_ref().unchecked_ref()));
        xhr.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        xhr.set_onabort(Some(on_error.as_ref().unchecked_ref()));

        Self {
            xhr,
            outcome: rx,
            _on_load: on_load,
            _on_error: on_error,
        }
    }
}

impl Future for XhrCompletion {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome> {
        self.outcome.poll_unpin(cx).map(|outcome| {
            outcome.unwrap_or_else(|_| Err(TransportError("upload handlers detached".to_string())))
        })
    }
}

impl Drop for XhrCompletion {
    fn drop(&mut self) {
        self.xhr.set_onload(None);
        self.xhr.set_onerror(None);
        self.xhr.set_onabort(None);
    }
}
