//! The browser [`Host`].

use crate::document::BrowserDocument;
use crate::images::ImagePreloader;
use crate::storage::LocalStorage;
use crate::upload::XhrUploader;
use portbridge_core::Host;
use wasm_bindgen::JsValue;

/// Host backed by the current window.
#[derive(Debug)]
pub struct BrowserHost {
    storage: LocalStorage,
    document: BrowserDocument,
    images: ImagePreloader,
    uploader: XhrUploader,
}

impl BrowserHost {
    /// Bind to the current window and document.
    pub fn new() -> Result<Self, JsValue> {
        Ok(Self {
            storage: LocalStorage::new(),
            document: BrowserDocument::new()?,
            images: ImagePreloader::new(),
            uploader: XhrUploader::new(),
        })
    }
}

impl Host for BrowserHost {
    type Storage = LocalStorage;
    type Document = BrowserDocument;
    type Images = ImagePreloader;
    type Uploader = XhrUploader;

    fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    fn document(&self) -> &BrowserDocument {
        &self.document
    }

    fn images(&self) -> &ImagePreloader {
        &self.images
    }

    fn uploader(&self) -> &XhrUploader {
        &self.uploader
    }

    fn now_millis(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}
