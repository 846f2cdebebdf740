//! Read-tracking accessor over a param snapshot.

use crate::types::ParamMap;
use std::fmt;
use std::rc::Rc;

use super::tracking::Tracker;

/// Read-only view of the current parameters that records what is read.
///
/// Reading a specific key (`get`, `first`, `has`) records that key with the
/// values seen. Looking at the key set as a whole (`keys`, `len`,
/// `is_empty`, `entries`) records an enumeration. Nothing is recorded
/// while the owning subscription is paused.
#[derive(Clone)]
pub struct Params {
    snapshot: Rc<ParamMap>,
    tracker: Option<Rc<Tracker>>,
}

impl Params {
    pub(crate) fn tracked(snapshot: Rc<ParamMap>, tracker: Rc<Tracker>) -> Self {
        Self {
            snapshot,
            tracker: Some(tracker),
        }
    }

    /// An accessor that records nothing.
    pub fn untracked(snapshot: Rc<ParamMap>) -> Self {
        Self {
            snapshot,
            tracker: None,
        }
    }

    fn record_key(&self, key: &str) -> &[String] {
        let values = self.snapshot.get(key);
        if let Some(tracker) = &self.tracker {
            tracker.record_key(key, values);
        }
        values
    }

    fn record_enumeration(&self) {
        if let Some(tracker) = &self.tracker {
            tracker.record_enumeration(self.snapshot.len());
        }
    }

    /// Values of `key`, empty when absent.
    pub fn get(&self, key: &str) -> &[String] {
        self.record_key(key)
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.record_key(key).first().map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.record_key(key);
        self.snapshot.contains_key(key)
    }

    /// All keys, in query-string order.
    pub fn keys(&self) -> Vec<&str> {
        self.record_enumeration();
        self.snapshot.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.record_enumeration();
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every key with its values. Counts as an enumeration plus a read of
    /// each key.
    pub fn entries(&self) -> Vec<(&str, &[String])> {
        self.record_enumeration();
        self.snapshot
            .keys()
            .map(|key| (key, self.record_key(key)))
            .collect()
    }

    /// Owned copy of every key and value, tracked like [`Params::entries`].
    pub fn to_map(&self) -> ParamMap {
        let mut map = ParamMap::new();
        for (key, values) in self.entries() {
            map.insert(key, values);
        }
        map
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Params")
            .field("snapshot", &self.snapshot)
            .field("tracked", &self.tracker.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked(query: &str) -> (Params, Rc<Tracker>) {
        let tracker = Rc::new(Tracker::new());
        let params = Params::tracked(Rc::new(ParamMap::from_query(query)), Rc::clone(&tracker));
        (params, tracker)
    }

    #[test]
    fn test_get_records_key() {
        let (params, tracker) = tracked("tomato=RED&potato=Y");

        assert_eq!(params.get("tomato"), ["RED"]);
        let read_set = tracker.read_set();
        assert_eq!(read_set.keys().collect::<Vec<_>>(), vec!["tomato"]);
        assert!(!read_set.is_enumerated());
    }

    #[test]
    fn test_has_records_missing_key() {
        let (params, tracker) = tracked("potato=Y");

        assert!(!params.has("tomato"));
        assert!(tracker.read_set().should_refresh(&ParamMap::from_query("tomato=RED")));
    }

    #[test]
    fn test_keys_records_enumeration() {
        let (params, tracker) = tracked("a=1&b=2");

        assert_eq!(params.keys(), vec!["a", "b"]);
        let read_set = tracker.read_set();
        assert!(read_set.is_enumerated());
        assert_eq!(read_set.keys().count(), 0);
        assert!(read_set.should_refresh(&ParamMap::from_query("a=1&b=2&c=3")));
    }

    #[test]
    fn test_entries_records_every_key() {
        let (params, tracker) = tracked("a=1&b=2");

        let entries = params.entries();
        assert_eq!(entries.len(), 2);
        let read_set = tracker.read_set();
        assert!(read_set.is_enumerated());
        assert_eq!(read_set.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_paused_reads_are_not_recorded() {
        let (params, tracker) = tracked("a=1");
        {
            let _guard = tracker.pause();
            assert_eq!(params.first("a"), Some("1"));
            assert_eq!(params.len(), 1);
        }
        assert!(tracker.read_set().is_empty());
    }

    #[test]
    fn test_untracked_reads() {
        let params = Params::untracked(Rc::new(ParamMap::from_query("a=1&a=2")));
        assert_eq!(params.get("a"), ["1", "2"]);
        assert_eq!(params.to_map().to_query_string(), "a=1&a=2");
    }
}
