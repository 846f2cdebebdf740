//! The browser primitives query-sync is built on.

use crate::error::Result;
use serde_json::Value;
use std::rc::Rc;

/// Session history of one browsing context.
///
/// Mirrors the parts of `window.location` and `window.history` that
/// query-sync consumes. Implementations treat `push_state`/`replace_state`
/// as the native entry points: once [`HistoryBackend::intercept`] has run,
/// every call to them, from any caller, is followed by `on_change`.
pub trait HistoryBackend {
    /// Absolute URL of the current entry.
    fn href(&self) -> Result<String>;

    /// Add a same-origin entry after the current one.
    fn push_state(&self, state: &Value, url: &str) -> Result<()>;

    /// Rewrite the current entry with a same-origin URL.
    fn replace_state(&self, state: &Value, url: &str) -> Result<()>;

    /// Full-page navigation to any URL.
    fn assign(&self, url: &str) -> Result<()>;

    /// Wrap the push/replace entry points and hook back/forward traversal
    /// so that `on_change` runs after each of them.
    fn intercept(&self, on_change: Rc<dyn Fn()>) -> Result<()>;
}

/// Backend for the current platform: the page's own history on wasm32.
#[cfg(target_arch = "wasm32")]
pub fn default_backend() -> Result<Rc<dyn HistoryBackend>> {
    Ok(Rc::new(super::BrowserHistory::new()?))
}

/// Backend for the current platform: an in-memory history elsewhere.
#[cfg(not(target_arch = "wasm32"))]
pub fn default_backend() -> Result<Rc<dyn HistoryBackend>> {
    Ok(Rc::new(super::MemoryHistory::new(
        super::memory::DEFAULT_URL,
    )?))
}
