//! Host capability bundle.
//!
//! A [`Host`] is everything the bridge touches outside itself. The browser
//! crate provides one backed by `web-sys`; [`MemoryHost`] backs tests.

use crate::image::{ImageLoader, RecordingImageLoader};
use crate::lifecycle::{DocumentLifecycle, ManualDocument};
use crate::storage::{MemoryStorage, Storage};
use crate::upload::{ScriptedUploader, Uploader};
use std::cell::Cell;
use std::rc::Rc;

/// Capabilities injected into a [`Bridge`](crate::Bridge).
pub trait Host {
    /// Durable key/value storage.
    type Storage: Storage;
    /// Document lifecycle.
    type Document: DocumentLifecycle;
    /// Image preloader.
    type Images: ImageLoader;
    /// Form uploader.
    type Uploader: Uploader;

    /// Storage capability.
    fn storage(&self) -> &Self::Storage;

    /// Document capability.
    fn document(&self) -> &Self::Document;

    /// Image capability.
    fn images(&self) -> &Self::Images;

    /// Upload capability.
    fn uploader(&self) -> &Self::Uploader;

    /// Wall-clock time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// In-memory host built from the fakes in this crate.
///
/// Clones share the same fakes, so a test can hand one clone to the bridge
/// and inspect the other.
#[derive(Clone, Default)]
pub struct MemoryHost {
    storage: Rc<MemoryStorage>,
    document: Rc<ManualDocument>,
    images: Rc<RecordingImageLoader>,
    uploader: Rc<ScriptedUploader>,
    now: Rc<Cell<u64>>,
}

impl MemoryHost {
    /// Host with empty storage, a loading document and no forms.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `storage`, typically shared with an earlier host to model a
    /// page reload.
    #[must_use]
    pub fn with_storage(mut self, storage: Rc<MemoryStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Use `document`.
    #[must_use]
    pub fn with_document(mut self, document: ManualDocument) -> Self {
        self.document = Rc::new(document);
        self
    }

    /// Use `uploader`.
    #[must_use]
    pub fn with_uploader(mut self, uploader: ScriptedUploader) -> Self {
        self.uploader = Rc::new(uploader);
        self
    }

    /// Fix the clock at `millis`.
    #[must_use]
    pub fn at_time(self, millis: u64) -> Self {
        self.now.set(millis);
        self
    }

    /// Shared handle to the storage.
    #[must_use]
    pub fn shared_storage(&self) -> Rc<MemoryStorage> {
        Rc::clone(&self.storage)
    }

    /// Set the clock.
    pub fn set_time(&self, millis: u64) {
        self.now.set(millis);
    }
}

impl Host for MemoryHost {
    type Storage = Rc<MemoryStorage>;
    type Document = Rc<ManualDocument>;
    type Images = Rc<RecordingImageLoader>;
    type Uploader = Rc<ScriptedUploader>;

    fn storage(&self) -> &Self::Storage {
        &self.storage
    }

    fn document(&self) -> &Self::Document {
        &self.document
    }

    fn images(&self) -> &Self::Images {
        &self.images
    }

    fn uploader(&self) -> &Self::Uploader {
        &self.uploader
    }

    fn now_millis(&self) -> u64 {
        self.now.get()
    }
}
