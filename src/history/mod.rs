//! Browser history access and interception.
//!
//! This module provides:
//! - [`HistoryBackend`], the location/history primitives query-sync uses
//! - [`MemoryHistory`], an in-memory session history
//! - `BrowserHistory`, the page's history on wasm32
//! - one-time interception that turns every navigation into a
//!   notification of the listener registry
//!
//! # Example
//!
//! ```ignore
//! let history = MemoryHistory::new("https://app.test/page?tomato=RED")?;
//! history::install(Rc::new(history.clone()), SyncConfig::default())?;
//!
//! // Any push/replace/back/forward now notifies subscribers.
//! history.push_state(&Value::Null, "?tomato=GREEN")?;
//! ```

mod backend;
#[cfg(target_arch = "wasm32")]
mod browser;
mod interceptor;
mod memory;

pub use backend::{default_backend, HistoryBackend};
#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserHistory, NAVIGATE_EVENT};
pub use interceptor::{backend, config, ensure_interception_installed, install, is_installed};
pub use memory::{HistoryEntry, MemoryHistory};
