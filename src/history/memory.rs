//! In-memory session history.

use crate::error::{QueryError, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use url::Url;

use super::backend::HistoryBackend;

/// URL the default in-memory history starts at.
pub(crate) const DEFAULT_URL: &str = "http://localhost/";

/// One session history entry.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub url: Url,
    pub state: Value,
}

struct Inner {
    entries: Vec<HistoryEntry>,
    /// Index of the current entry.
    index: usize,
    /// Targets of full-page navigations, oldest first.
    full_navigations: Vec<Url>,
    /// Installed by `intercept`.
    on_change: Option<Rc<dyn Fn()>>,
}

/// Session history held in memory.
///
/// Behaves like `window.history` of a single tab: pushing drops forward
/// entries, traversal fires the popstate hook, and pushState/replaceState
/// refuse cross-origin URLs. Clones share the same history, so a clone
/// handed to unrelated code observes and drives the same entries.
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryHistory {
    /// Create a history with one entry at `initial_url`.
    pub fn new(initial_url: &str) -> Result<Self> {
        let url = Url::parse(initial_url)?;
        Ok(Self {
            inner: Rc::new(RefCell::new(Inner {
                entries: vec![HistoryEntry {
                    url,
                    state: Value::Null,
                }],
                index: 0,
                full_navigations: Vec::new(),
                on_change: None,
            })),
        })
    }

    /// URL of the current entry.
    pub fn current_url(&self) -> Url {
        let inner = self.inner.borrow();
        inner.entries[inner.index].url.clone()
    }

    /// State object of the current entry.
    pub fn current_state(&self) -> Value {
        let inner = self.inner.borrow();
        inner.entries[inner.index].state.clone()
    }

    /// Number of entries in the session history.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.inner.borrow().entries.clone()
    }

    pub fn index(&self) -> usize {
        self.inner.borrow().index
    }

    /// Targets of every [`assign`](HistoryBackend::assign) so far.
    pub fn full_navigations(&self) -> Vec<Url> {
        self.inner.borrow().full_navigations.clone()
    }

    pub fn back(&self) {
        self.go(-1);
    }

    pub fn forward(&self) {
        self.go(1);
    }

    /// Traverse `delta` entries. Out-of-range and zero deltas do nothing.
    pub fn go(&self, delta: isize) {
        let moved = {
            let mut inner = self.inner.borrow_mut();
            let target = (inner.index as isize)
                .checked_add(delta)
                .and_then(|target| usize::try_from(target).ok())
                .filter(|&target| delta != 0 && target < inner.entries.len());
            match target {
                Some(target) => {
                    inner.index = target;
                    true
                }
                None => false,
            }
        };

        if moved {
            tracing::trace!(delta, "popstate");
            self.fire_change();
        }
    }

    /// Resolve `url` against the current entry, rejecting other origins.
    fn resolve_same_origin(&self, url: &str) -> Result<Url> {
        let current = self.current_url();
        let next = current.join(url)?;
        if next.origin() != current.origin() {
            return Err(QueryError::History(format!(
                "{} is not same-origin with {}",
                next, current
            )));
        }
        Ok(next)
    }

    /// Run the interception hook. No borrow is held while it runs, so the
    /// hook may navigate again.
    fn fire_change(&self) {
        let hook = self.inner.borrow().on_change.clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

impl HistoryBackend for MemoryHistory {
    fn href(&self) -> Result<String> {
        Ok(self.current_url().into())
    }

    fn push_state(&self, state: &Value, url: &str) -> Result<()> {
        let url = self.resolve_same_origin(url)?;
        {
            let mut inner = self.inner.borrow_mut();
            let keep = inner.index + 1;
            inner.entries.truncate(keep);
            inner.entries.push(HistoryEntry {
                url,
                state: state.clone(),
            });
            inner.index = keep;
        }
        self.fire_change();
        Ok(())
    }

    fn replace_state(&self, state: &Value, url: &str) -> Result<()> {
        let url = self.resolve_same_origin(url)?;
        {
            let mut inner = self.inner.borrow_mut();
            let index = inner.index;
            inner.entries[index] = HistoryEntry {
                url,
                state: state.clone(),
            };
        }
        self.fire_change();
        Ok(())
    }

    fn assign(&self, url: &str) -> Result<()> {
        let url = self.current_url().join(url)?;
        tracing::debug!(%url, "full navigation");

        // A full load replaces the document; nothing in it gets notified.
        let mut inner = self.inner.borrow_mut();
        let keep = inner.index + 1;
        inner.entries.truncate(keep);
        inner.entries.push(HistoryEntry {
            url: url.clone(),
            state: Value::Null,
        });
        inner.index = keep;
        inner.full_navigations.push(url);
        Ok(())
    }

    fn intercept(&self, on_change: Rc<dyn Fn()>) -> Result<()> {
        self.inner.borrow_mut().on_change = Some(on_change);
        Ok(())
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MemoryHistory")
            .field("entries", &inner.entries.len())
            .field("index", &inner.index)
            .field("current", &inner.entries[inner.index].url.as_str())
            .field("intercepted", &inner.on_change.is_some())
            .finish()
    }
}
