//! Image preloading with detached `<img>` elements.

use portbridge_core::ImageLoader;
use web_sys::HtmlImageElement;

/// Preloads by setting `src` on a fresh `HtmlImageElement`.
///
/// The element is dropped as soon as `src` is set; the fetch continues in
/// the browser and lands in its image cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePreloader;

impl ImagePreloader {
    /// Create a preloader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ImageLoader for ImagePreloader {
    fn preload(&self, url: &str) {
        match HtmlImageElement::new() {
            Ok(image) => image.set_src(url),
            Err(err) => {
                tracing::warn!(url, error = %crate::js::describe(&err), "could not create image");
            }
        }
    }
}
