//! Writing query parameters back to the URL.

use crate::error::{QueryError, Result};
use crate::history;
use crate::params::{current_snapshot, Params, Tracker};
use crate::registry::panic_message;
use crate::types::{NavigationMode, ParamMap};
use serde_json::Value;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use url::Url;

/// Something a parameter mapping can be applied to.
pub trait QueryTarget {
    /// For each key in `mapping`, drop the target's values for that key and
    /// append the mapping's values in order. With `remove_extras`, keys the
    /// mapping does not mention are dropped as well.
    fn apply_params(&mut self, mapping: &ParamMap, remove_extras: bool);
}

impl QueryTarget for ParamMap {
    fn apply_params(&mut self, mapping: &ParamMap, remove_extras: bool) {
        if remove_extras {
            *self = ParamMap::new();
        }
        for (key, values) in mapping.iter() {
            // Re-appended keys move to the end, as with URLSearchParams.
            self.remove(key);
            for value in values {
                self.append(key, value.as_str());
            }
        }
    }
}

impl QueryTarget for Url {
    fn apply_params(&mut self, mapping: &ParamMap, remove_extras: bool) {
        let kept: Vec<(String, String)> = if remove_extras {
            Vec::new()
        } else {
            self.query_pairs()
                .filter(|(key, _)| !mapping.contains_key(key))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        };

        if kept.is_empty() && mapping.pairs().next().is_none() {
            self.set_query(None);
            return;
        }

        self.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .extend_pairs(mapping.pairs());
    }
}

/// Apply `mapping` to a copy of `target`.
///
/// Applying the same mapping twice gives the same result as applying it
/// once.
pub fn apply_query_params<T>(target: &T, mapping: &ParamMap, remove_extras: bool) -> T
where
    T: QueryTarget + Clone,
{
    let mut next = target.clone();
    next.apply_params(mapping, remove_extras);
    next
}

/// Navigate to `url`.
///
/// Same-origin targets go through the history API with `mode`; anything
/// else is a full-page navigation, since pushState and replaceState only
/// accept same-origin URLs.
pub fn set_location(url: &Url, mode: NavigationMode) -> Result<()> {
    let backend = history::backend()?;
    let current = Url::parse(&backend.href()?)?;

    if url.origin() != current.origin() {
        tracing::debug!(%url, "cross-origin target, navigating the whole page");
        return backend.assign(url.as_str());
    }

    match mode {
        NavigationMode::Push => backend.push_state(&Value::Null, url.as_str()),
        NavigationMode::Replace => backend.replace_state(&Value::Null, url.as_str()),
    }
}

type Updater = Box<dyn FnOnce(&Params) -> Result<ParamMap>>;

/// The next parameters: a literal mapping or a function of the current ones.
pub enum QueryUpdate {
    Mapping(ParamMap),
    Updater(Updater),
}

impl QueryUpdate {
    /// Compute the next mapping from the current parameters.
    pub fn with<F>(f: F) -> Self
    where
        F: FnOnce(&Params) -> ParamMap + 'static,
    {
        QueryUpdate::Updater(Box::new(move |params| Ok(f(params))))
    }

    /// Like [`QueryUpdate::with`], for updaters that can fail.
    ///
    /// An `Err` aborts the write on every target, including wasm32 where
    /// panics cannot be caught.
    pub fn try_with<F, E>(f: F) -> Self
    where
        F: FnOnce(&Params) -> std::result::Result<ParamMap, E> + 'static,
        E: fmt::Display,
    {
        QueryUpdate::Updater(Box::new(move |params| {
            f(params).map_err(|e| QueryError::Updater(e.to_string()))
        }))
    }
}

impl From<ParamMap> for QueryUpdate {
    fn from(mapping: ParamMap) -> Self {
        QueryUpdate::Mapping(mapping)
    }
}

impl fmt::Debug for QueryUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryUpdate::Mapping(mapping) => f.debug_tuple("Mapping").field(mapping).finish(),
            QueryUpdate::Updater(_) => f.write_str("Updater(..)"),
        }
    }
}

/// Writes query parameters, fire-and-forget.
///
/// Failures are logged and leave the history untouched; callers get no
/// error back.
#[derive(Clone, Default)]
pub struct SetParams {
    tracker: Option<Rc<Tracker>>,
}

impl SetParams {
    pub(crate) fn tracked(tracker: Rc<Tracker>) -> Self {
        Self {
            tracker: Some(tracker),
        }
    }

    /// A setter not tied to any subscription.
    pub fn untracked() -> Self {
        Self::default()
    }

    /// Write with the configured default navigation mode.
    pub fn set(&self, update: impl Into<QueryUpdate>) {
        self.set_params(update, history::config().default_mode);
    }

    /// Write by rewriting the current history entry.
    pub fn replace(&self, update: impl Into<QueryUpdate>) {
        self.set_params(update, NavigationMode::Replace);
    }

    pub fn set_params(&self, update: impl Into<QueryUpdate>, mode: NavigationMode) {
        if let Err(e) = self.try_set_params(update.into(), mode) {
            tracing::warn!(error = %e, "query parameter write aborted");
        }
    }

    fn try_set_params(&self, update: QueryUpdate, mode: NavigationMode) -> Result<()> {
        let mapping = self.resolve(update)?;
        let current = Url::parse(&history::backend()?.href()?)?;
        let next = apply_query_params(&current, &mapping, history::config().remove_extras);
        set_location(&next, mode)
    }

    /// Turn `update` into a mapping. Updater reads are not tracked.
    ///
    /// A panicking updater is caught on unwinding targets only. On wasm32
    /// report failure through [`QueryUpdate::try_with`] instead.
    fn resolve(&self, update: QueryUpdate) -> Result<ParamMap> {
        let f = match update {
            QueryUpdate::Mapping(mapping) => return Ok(mapping),
            QueryUpdate::Updater(f) => f,
        };

        let snapshot = current_snapshot()?;
        let params = match &self.tracker {
            Some(tracker) => Params::tracked(snapshot, Rc::clone(tracker)),
            None => Params::untracked(snapshot),
        };

        let _guard = self.tracker.as_ref().map(|tracker| tracker.pause());
        panic::catch_unwind(AssertUnwindSafe(|| f(&params))).unwrap_or_else(|payload| {
            Err(QueryError::Updater(format!(
                "panicked: {}",
                panic_message(payload.as_ref())
            )))
        })
    }
}

impl fmt::Debug for SetParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetParams")
            .field("tracked", &self.tracker.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HistoryBackend, MemoryHistory};
    use crate::types::SyncConfig;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn installed(start: &str) -> MemoryHistory {
        let history = MemoryHistory::new(start).unwrap();
        history::install(Rc::new(history.clone()), SyncConfig::default()).unwrap();
        history
    }

    #[test]
    fn test_apply_with_remove_extras() {
        let mapping = ParamMap::new().with("tomato", ["RED", "ROUND"]);
        let next = apply_query_params(&url("http://h.test/x?tomato=OLD&potato=Y"), &mapping, true);

        assert_eq!(next.as_str(), "http://h.test/x?tomato=RED&tomato=ROUND");
    }

    #[test]
    fn test_apply_merge_moves_key_to_end() {
        let mapping = ParamMap::new().with("tomato", ["RED", "ROUND"]);
        let next = apply_query_params(&url("http://h.test/x?tomato=OLD&potato=Y"), &mapping, false);

        assert_eq!(next.as_str(), "http://h.test/x?potato=Y&tomato=RED&tomato=ROUND");
    }

    #[test]
    fn test_apply_empty_values_deletes_key() {
        let mapping = ParamMap::new().with("potato", Vec::<String>::new());
        let next = apply_query_params(&url("http://h.test/x?potato=Y#frag"), &mapping, false);

        assert_eq!(next.as_str(), "http://h.test/x#frag");
    }

    #[test]
    fn test_apply_to_param_map_matches_url() {
        let start = url("http://h.test/x?a=1&b=2&a=3");
        let mapping = ParamMap::new().with("a", "9").with("c", ["1", "2"]);

        for remove_extras in [false, true] {
            let by_url = apply_query_params(&start, &mapping, remove_extras);
            let by_map = apply_query_params(&ParamMap::from_url(&start), &mapping, remove_extras);
            assert_eq!(ParamMap::from_url(&by_url), by_map);
        }
    }

    #[test]
    fn test_set_location_same_origin_uses_history() {
        let history = installed("https://app.test/page");

        set_location(&url("https://app.test/page?a=1"), NavigationMode::Push).unwrap();
        set_location(&url("https://app.test/page?a=2"), NavigationMode::Replace).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.href().unwrap(), "https://app.test/page?a=2");
        assert!(history.full_navigations().is_empty());
    }

    #[test]
    fn test_set_location_cross_origin_navigates_page() {
        let history = installed("https://app.test/page");

        set_location(&url("https://other.test/page?a=1"), NavigationMode::Push).unwrap();

        assert_eq!(history.full_navigations(), vec![url("https://other.test/page?a=1")]);
    }

    #[test]
    fn test_set_full_replace() {
        let history = installed("https://app.test/page?tomato=RED&session=abc");

        SetParams::untracked().set(ParamMap::new().with("tomato", "GREEN"));

        assert_eq!(history.current_url().query(), Some("tomato=GREEN"));
    }

    #[test]
    fn test_updater_sees_current_params() {
        let history = installed("https://app.test/page?count=1");

        SetParams::untracked().replace(QueryUpdate::with(|params| {
            let count: u32 = params.first("count").and_then(|c| c.parse().ok()).unwrap_or(0);
            ParamMap::new().with("count", (count + 1).to_string())
        }));

        assert_eq!(history.len(), 1);
        assert_eq!(history.current_url().query(), Some("count=2"));
    }

    #[test]
    fn test_failing_updater_aborts_write() {
        let history = installed("https://app.test/page?a=1");
        let tracker = Rc::new(Tracker::new());
        let setter = SetParams::tracked(Rc::clone(&tracker));

        setter.set(QueryUpdate::try_with(|_| Err::<ParamMap, _>("bad input")));
        setter.set(QueryUpdate::with(|_| panic!("updater fault")));

        assert_eq!(history.len(), 1);
        assert!(!tracker.is_paused());
    }

    #[test]
    fn test_set_without_install_is_logged_not_raised() {
        SetParams::untracked().set(ParamMap::new().with("a", "1"));
        assert!(!history::is_installed());
    }
}
