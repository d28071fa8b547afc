//! Document lifecycle capability and the single-fire readiness latch.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Mirror of `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentReadyState {
    /// Still parsing.
    #[default]
    Loading,
    /// Parsed, subresources still loading.
    Interactive,
    /// Fully loaded.
    Complete,
}

impl DocumentReadyState {
    /// The DOM string for this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Interactive => "interactive",
            Self::Complete => "complete",
        }
    }

    /// Whether the document is fully loaded.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl From<&str> for DocumentReadyState {
    fn from(state: &str) -> Self {
        match state {
            "complete" => Self::Complete,
            "interactive" => Self::Interactive,
            _ => Self::Loading,
        }
    }
}

/// Callback run once the document is fully loaded.
pub type ReadyCallback = Box<dyn FnOnce()>;

/// Host document lifecycle.
pub trait DocumentLifecycle {
    /// Current ready state.
    fn ready_state(&self) -> DocumentReadyState;

    /// Run `callback` once the document is complete.
    ///
    /// Implementations must run it immediately when the document is already
    /// complete, and must never run it before that.
    fn on_ready(&self, callback: ReadyCallback);
}

impl<T: DocumentLifecycle + ?Sized> DocumentLifecycle for Rc<T> {
    fn ready_state(&self) -> DocumentReadyState {
        (**self).ready_state()
    }

    fn on_ready(&self, callback: ReadyCallback) {
        (**self).on_ready(callback);
    }
}

/// Latch that lets exactly one caller through.
#[derive(Debug, Clone, Default)]
pub struct ReadyLatch {
    fired: Rc<Cell<bool>>,
}

impl ReadyLatch {
    /// Create an unfired latch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the latch. Returns `true` only for the first call.
    pub fn fire(&self) -> bool {
        !self.fired.replace(true)
    }

    /// Whether the latch has fired.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired.get()
    }
}

/// Document whose state is advanced by hand.
#[derive(Default)]
pub struct ManualDocument {
    state: Cell<DocumentReadyState>,
    waiting: RefCell<Vec<ReadyCallback>>,
}

impl ManualDocument {
    /// A document that is still loading.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A document that has already finished loading.
    #[must_use]
    pub fn complete() -> Self {
        Self {
            state: Cell::new(DocumentReadyState::Complete),
            waiting: RefCell::default(),
        }
    }

    /// Move to `state`, running waiting callbacks on `Complete`.
    pub fn set_state(&self, state: DocumentReadyState) {
        self.state.set(state);
        if state.is_complete() {
            let waiting: Vec<_> = self.waiting.borrow_mut().drain(..).collect();
            for callback in waiting {
                callback();
            }
        }
    }

    /// Number of callbacks waiting for completion.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.waiting.borrow().len()
    }
}

impl DocumentLifecycle for ManualDocument {
    fn ready_state(&self) -> DocumentReadyState {
        self.state.get()
    }

    fn on_ready(&self, callback: ReadyCallback) {
        if self.state.get().is_complete() {
            callback();
        } else {
            self.waiting.borrow_mut().push(callback);
        }
    }
}
