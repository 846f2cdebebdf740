//! Read-sets and change detection.

use crate::types::ParamMap;
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};

/// What a reader looked at since the last refresh.
///
/// Specific keys are stored with the values the reader saw. Enumerating
/// the key set additionally stores the key count seen at that time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadSet {
    keys: IndexMap<String, Vec<String>>,
    enumerated: Option<usize>,
}

impl ReadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a read of `key` that returned `values`.
    ///
    /// All reads of one render see the same snapshot, so the first read of
    /// a key wins.
    pub fn record_key(&mut self, key: &str, values: &[String]) {
        if !self.keys.contains_key(key) {
            self.keys.insert(key.to_string(), values.to_vec());
        }
    }

    /// Record an enumeration of all keys, `count` of them.
    pub fn record_enumeration(&mut self, count: usize) {
        self.enumerated = Some(count);
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.enumerated.is_none()
    }

    /// Whether all keys were enumerated.
    pub fn is_enumerated(&self) -> bool {
        self.enumerated.is_some()
    }

    /// Keys read individually, in first-read order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.enumerated = None;
    }

    /// Whether `next` differs from what was read.
    ///
    /// Stops at the first difference: key count first (when enumerated),
    /// then each read key's value list, compared by length and then element
    /// by element in order. An empty read-set never asks for a refresh.
    pub fn should_refresh(&self, next: &ParamMap) -> bool {
        if let Some(count) = self.enumerated {
            if next.len() != count {
                return true;
            }
        }
        self.keys
            .iter()
            .any(|(key, seen)| seen.as_slice() != next.get(key))
    }
}

/// Read-set plus pause flag of one subscription.
///
/// Shared between the subscription and every accessor it hands out.
#[derive(Debug, Default)]
pub struct Tracker {
    read_set: RefCell<ReadSet>,
    paused: Cell<bool>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// Suspend recording until the returned guard is dropped.
    pub fn pause(&self) -> PauseGuard<'_> {
        let was_paused = self.paused.replace(true);
        PauseGuard {
            tracker: self,
            was_paused,
        }
    }

    pub(crate) fn record_key(&self, key: &str, values: &[String]) {
        if !self.is_paused() {
            self.read_set.borrow_mut().record_key(key, values);
        }
    }

    pub(crate) fn record_enumeration(&self, count: usize) {
        if !self.is_paused() {
            self.read_set.borrow_mut().record_enumeration(count);
        }
    }

    /// Copy of the current read-set.
    pub fn read_set(&self) -> ReadSet {
        self.read_set.borrow().clone()
    }

    pub fn reset(&self) {
        self.read_set.borrow_mut().clear();
    }

    /// Decide whether `next` requires a refresh, clearing the read-set if so.
    ///
    /// When this returns false the read-set is left as it was.
    pub fn take_refresh(&self, next: &ParamMap) -> bool {
        let mut read_set = self.read_set.borrow_mut();
        if read_set.should_refresh(next) {
            read_set.clear();
            true
        } else {
            false
        }
    }
}

/// Clears the pause flag on drop, including during unwinding.
#[must_use = "tracking resumes as soon as the guard is dropped"]
pub struct PauseGuard<'a> {
    tracker: &'a Tracker,
    was_paused: bool,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.tracker.paused.set(self.was_paused);
    }
}
