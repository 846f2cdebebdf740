//! Hook-style subscriptions for UI code.
//!
//! A [`QuerySubscription`] belongs to one UI unit (a component instance).
//! It is mounted with a refresh callback, asked for fresh parameters on
//! every render, and dropped on unmount.
//!
//! # Example
//!
//! ```ignore
//! let subscription = QuerySubscription::mount(move || schedule_render())?;
//!
//! // In the render function:
//! let (params, set_params) = subscription.use_query_params()?;
//! let tomato = params.first("tomato").unwrap_or("RED");
//! on_click(move || set_params.set(ParamMap::new().with("tomato", "GREEN")));
//! ```

use crate::error::Result;
use crate::history;
use crate::mutate::SetParams;
use crate::params::{current_snapshot, Params, ReadSet, Tracker};
use crate::registry::{self, Listener};
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(1) };
}

struct Inner {
    id: SubscriptionId,
    tracker: Rc<Tracker>,
    refresh: Box<dyn Fn()>,
    active: Cell<bool>,
}

impl Inner {
    /// Registry callback: refresh if anything that was read has changed.
    fn on_navigation(&self) {
        if !self.active.get() {
            return;
        }

        let snapshot = match current_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(subscription = self.id.0, error = %e, "cannot read current params");
                return;
            }
        };

        if self.tracker.take_refresh(&snapshot) {
            tracing::trace!(subscription = self.id.0, "read params changed, refreshing");
            (self.refresh)();
        }
    }
}

/// One UI unit's interest in the query parameters.
///
/// Dropping the subscription removes it from the listener registry.
pub struct QuerySubscription {
    inner: Rc<Inner>,
    listener: Listener,
}

impl QuerySubscription {
    /// Subscribe with `refresh`, the callback that makes the owning UI unit
    /// render again.
    ///
    /// Installs history interception over the default backend if nothing is
    /// installed yet.
    pub fn mount<F>(refresh: F) -> Result<Self>
    where
        F: Fn() + 'static,
    {
        history::ensure_interception_installed()?;

        let id = NEXT_ID.with(|next| SubscriptionId(next.replace(next.get() + 1)));
        let inner = Rc::new(Inner {
            id,
            tracker: Rc::new(Tracker::new()),
            refresh: Box::new(refresh),
            active: Cell::new(true),
        });

        let weak: Weak<Inner> = Rc::downgrade(&inner);
        let listener: Listener = Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_navigation();
            }
        });
        registry::add(&listener);
        tracing::debug!(subscription = id.0, "query subscription mounted");

        Ok(Self { inner, listener })
    }

    pub fn id(&self) -> SubscriptionId {
        self.inner.id
    }

    /// Start a render: clear the read-set and hand out an accessor bound to
    /// the current snapshot together with a setter.
    pub fn use_query_params(&self) -> Result<(Params, SetParams)> {
        self.inner.tracker.reset();
        let snapshot = current_snapshot()?;
        let tracker = Rc::clone(&self.inner.tracker);
        Ok((
            Params::tracked(snapshot, Rc::clone(&tracker)),
            SetParams::tracked(tracker),
        ))
    }

    /// Copy of what was read since the last render or refresh.
    pub fn read_set(&self) -> ReadSet {
        self.inner.tracker.read_set()
    }
}

impl Drop for QuerySubscription {
    fn drop(&mut self) {
        self.inner.active.set(false);
        registry::remove(&self.listener);
        tracing::debug!(subscription = self.inner.id.0, "query subscription unmounted");
    }
}

impl fmt::Debug for QuerySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySubscription")
            .field("id", &self.inner.id)
            .field("read_set", &self.read_set())
            .finish()
    }
}

/// Number of listeners currently registered.
pub fn subscription_count() -> usize {
    registry::listener_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HistoryBackend, MemoryHistory};
    use crate::types::{ParamMap, SyncConfig};
    use serde_json::Value;

    fn installed(start: &str) -> MemoryHistory {
        let history = MemoryHistory::new(start).unwrap();
        history::install(Rc::new(history.clone()), SyncConfig::default()).unwrap();
        history
    }

    fn counting() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn test_mount_and_drop_manage_registry() {
        installed("https://app.test/");
        let (_, refresh) = counting();

        let subscription = QuerySubscription::mount(refresh).unwrap();
        assert_eq!(subscription_count(), 1);

        drop(subscription);
        assert_eq!(subscription_count(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        installed("https://app.test/");
        let a = QuerySubscription::mount(|| {}).unwrap();
        let b = QuerySubscription::mount(|| {}).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_render_resets_read_set() {
        installed("https://app.test/?a=1");
        let subscription = QuerySubscription::mount(|| {}).unwrap();

        let (params, _) = subscription.use_query_params().unwrap();
        params.get("a");
        assert!(!subscription.read_set().is_empty());

        let _ = subscription.use_query_params().unwrap();
        assert!(subscription.read_set().is_empty());
    }

    #[test]
    fn test_refresh_clears_read_set_and_fires_once() {
        let history = installed("https://app.test/?a=1");
        let (count, refresh) = counting();
        let subscription = QuerySubscription::mount(refresh).unwrap();

        let (params, _) = subscription.use_query_params().unwrap();
        params.get("a");

        history.push_state(&Value::Null, "?a=2").unwrap();
        assert_eq!(count.get(), 1);
        assert!(subscription.read_set().is_empty());

        // Nothing was read since the refresh.
        history.push_state(&Value::Null, "?a=3").unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_updater_reads_do_not_track() {
        let history = installed("https://app.test/?a=1&b=1");
        let (count, refresh) = counting();
        let subscription = QuerySubscription::mount(refresh).unwrap();

        let (_, set_params) = subscription.use_query_params().unwrap();
        set_params.set(crate::QueryUpdate::with(|params| {
            let b = params.first("b").unwrap_or("0").to_string();
            ParamMap::new().with("a", "2").with("b", b)
        }));

        assert_eq!(history.current_url().query(), Some("a=2&b=1"));
        assert!(subscription.read_set().is_empty());
        assert_eq!(count.get(), 0);
    }
}
