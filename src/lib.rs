//! # Query Sync
//!
//! URL query parameters as a plain key → values mapping, kept in sync with
//! browser navigation, with refreshes limited to the keys a reader used.
//!
//! ## Core Concepts
//!
//! - **History interception**: push/replace and back/forward all end in one
//!   notification of the listener registry, whoever triggered them
//! - **Snapshots**: the [`ParamMap`] of the current URL, rebuilt on change
//! - **Read tracking**: the [`Params`] accessor records which keys were read
//!   (or that all keys were enumerated)
//! - **Change detection**: a subscriber refreshes only when something it
//!   read has a different value list
//! - **Writes**: [`SetParams`] applies a mapping (or an updater function)
//!   onto the current URL and navigates
//!
//! Reads go through explicit accessor methods (`get`, `has`, `keys` and
//! friends) so that every read can be recorded.
//!
//! ## Example
//!
//! ```ignore
//! use query_sync::{history, ParamMap, QuerySubscription, QueryUpdate};
//!
//! history::ensure_interception_installed()?;
//!
//! let subscription = QuerySubscription::mount(|| request_render())?;
//! let (params, set_params) = subscription.use_query_params()?;
//!
//! if params.first("tomato") == Some("RED") {
//!     set_params.set(ParamMap::new().with("tomato", "GREEN"));
//! }
//!
//! // Functional update: reads inside the updater are not tracked.
//! set_params.replace(QueryUpdate::with(|params| {
//!     ParamMap::new().with("page", params.get("page").to_vec())
//! }));
//! ```

pub mod error;
pub mod history;
pub mod mutate;
pub mod params;
pub mod registry;
pub mod subscription;
pub mod types;

// Re-exports
pub use error::{QueryError, Result};
pub use history::{
    ensure_interception_installed, install, HistoryBackend, HistoryEntry, MemoryHistory,
};
#[cfg(target_arch = "wasm32")]
pub use history::BrowserHistory;
pub use mutate::{apply_query_params, set_location, QueryTarget, QueryUpdate, SetParams};
pub use params::{current_snapshot, derive_params, Params, ReadSet, Tracker};
pub use registry::{Listener, ListenerRegistry};
pub use subscription::{subscription_count, QuerySubscription, SubscriptionId};
pub use types::*;
