//! Image preloading capability.

use std::cell::RefCell;
use std::rc::Rc;

/// Fire-and-forget image fetcher.
///
/// The host's own HTTP/image cache is what keeps the result around; the
/// bridge tracks nothing and hears nothing back.
pub trait ImageLoader {
    /// Start fetching and decoding `url`.
    fn preload(&self, url: &str);
}

impl<T: ImageLoader + ?Sized> ImageLoader for Rc<T> {
    fn preload(&self, url: &str) {
        (**self).preload(url);
    }
}

/// Loader that only records what it was asked to fetch.
#[derive(Debug, Default)]
pub struct RecordingImageLoader {
    requested: RefCell<Vec<String>>,
}

impl RecordingImageLoader {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl ImageLoader for RecordingImageLoader {
    fn preload(&self, url: &str) {
        self.requested.borrow_mut().push(url.to_string());
    }
}
