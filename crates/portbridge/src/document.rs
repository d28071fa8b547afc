//! Document readiness via `readystatechange`.

use portbridge_core::{DocumentLifecycle, DocumentReadyState, ReadyCallback};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Document;

/// The page's `document`.
#[derive(Debug, Clone)]
pub struct BrowserDocument {
    document: Document,
}

impl BrowserDocument {
    /// Wrap the current window's document.
    pub fn new() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .ok_or("No window")?
            .document()
            .ok_or("No document")?;
        Ok(Self { document })
    }

    /// Wrap an explicit document.
    #[must_use]
    pub const fn from_document(document: Document) -> Self {
        Self { document }
    }
}

fn state_of(document: &Document) -> DocumentReadyState {
    DocumentReadyState::from(document.ready_state().as_str())
}

impl DocumentLifecycle for BrowserDocument {
    fn ready_state(&self) -> DocumentReadyState {
        state_of(&self.document)
    }

    fn on_ready(&self, callback: ReadyCallback) {
        // readystatechange never fires again once complete.
        if self.ready_state().is_complete() {
            callback();
            return;
        }

        let document = self.document.clone();
        let mut pending = Some(callback);
        let listener = Closure::<dyn FnMut()>::new(move || {
            if state_of(&document).is_complete() {
                if let Some(callback) = pending.take() {
                    callback();
                }
            }
        });

        if let Err(err) = self
            .document
            .add_event_listener_with_callback("readystatechange", listener.as_ref().unchecked_ref())
        {
            tracing::warn!(error = %crate::js::describe(&err), "could not watch readystatechange");
        }
        listener.forget();
    }
}
