//! portbridge: browser host for a port-based front-end application.
//!
//! Connects the application's ports to `localStorage`, image preloading and
//! authenticated multipart upload. The bridge logic lives in
//! [`portbridge_core`]; this crate supplies the `web-sys` capabilities and
//! the `#[wasm_bindgen]` entry point.
//!
//! # Browser Usage (WASM)
//!
//! ```javascript
//! import init, { PortBridge } from './portbridge.js';
//!
//! async function main() {
//!     await init();
//!     const bridge = PortBridge.boot(flags => Elm.Main.fullscreen(flags));
//!     bridge.subscribe('status', body => console.log(body));
//! }
//! ```

pub use portbridge_core::*;

// WASM-only modules
#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod document;
#[cfg(target_arch = "wasm32")]
pub mod host;
#[cfg(target_arch = "wasm32")]
pub mod images;
#[cfg(target_arch = "wasm32")]
mod js;
#[cfg(target_arch = "wasm32")]
pub mod upload;

// Cross-platform modules
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub use app::PortBridge;
#[cfg(target_arch = "wasm32")]
pub use document::BrowserDocument;
#[cfg(target_arch = "wasm32")]
pub use host::BrowserHost;
#[cfg(target_arch = "wasm32")]
pub use images::ImagePreloader;
#[cfg(target_arch = "wasm32")]
pub use upload::XhrUploader;
pub use storage::LocalStorage;
