//! Host callbacks invoked when a flow exits

use std::fmt;

/// The two ways a flow hands control back to its host.
///
/// `on_complete` is `FnOnce` and is only reachable through a consuming terminal
/// action, so it runs at most once and the record moves into it.
pub struct FlowCallbacks<T> {
    on_cancel: Box<dyn FnMut() + Send>,
    on_complete: Box<dyn FnOnce(T) + Send>,
}

impl<T> FlowCallbacks<T> {
    pub fn new(
        on_cancel: impl FnMut() + Send + 'static,
        on_complete: impl FnOnce(T) + Send + 'static,
    ) -> Self {
        Self {
            on_cancel: Box::new(on_cancel),
            on_complete: Box::new(on_complete),
        }
    }

    /// Callbacks that ignore both outcomes
    pub fn detached() -> Self {
        Self::new(|| {}, |_| {})
    }

    pub(crate) fn cancel(&mut self) {
        (self.on_cancel)();
    }

    pub(crate) fn complete(self, record: T) {
        (self.on_complete)(record);
    }
}

impl<T> fmt::Debug for FlowCallbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowCallbacks").finish_non_exhaustive()
    }
}
