//! Listener registry for navigation notifications.
//!
//! Every navigation (push, replace, back/forward) ends in a call to
//! [`notify_all`], which fans out synchronously to each registered
//! listener in registration order. The registry is per thread; on the UI
//! thread that makes it the single process-wide registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// A zero-argument notification callback.
pub type Listener = Rc<dyn Fn()>;

/// Identity of a listener: the address of its allocation.
fn listener_key(listener: &Listener) -> usize {
    Rc::as_ptr(listener) as *const () as usize
}

/// Registration-ordered slots; removal leaves a tombstone.
#[derive(Default)]
struct Slots {
    slots: Vec<Option<Listener>>,
    /// Listener identity to its slot.
    positions: HashMap<usize, usize>,
}

impl Slots {
    /// Drop tombstones once they outnumber live listeners.
    fn compact_if_sparse(&mut self) {
        if self.slots.len() <= 2 * self.positions.len() + 8 {
            return;
        }
        self.slots.retain(Option::is_some);
        for (pos, listener) in self.slots.iter().enumerate() {
            if let Some(listener) = listener {
                self.positions.insert(listener_key(listener), pos);
            }
        }
    }
}

/// Set of listeners keyed by identity.
///
/// Add and remove are O(1) (amortized); notification order is registration
/// order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RefCell<Slots>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. Adding the same `Rc` twice is a no-op.
    pub fn add(&self, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        let key = listener_key(listener);
        if listeners.positions.contains_key(&key) {
            return;
        }
        let pos = listeners.slots.len();
        listeners.slots.push(Some(Rc::clone(listener)));
        listeners.positions.insert(key, pos);
    }

    /// Deregister `listener`. Returns whether it was registered.
    pub fn remove(&self, listener: &Listener) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.positions.remove(&listener_key(listener)) {
            Some(pos) => {
                listeners.slots[pos] = None;
                listeners.compact_if_sparse();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, listener: &Listener) -> bool {
        self.listeners
            .borrow()
            .positions
            .contains_key(&listener_key(listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().positions.is_empty()
    }

    /// Invoke every listener registered at the time of the call.
    ///
    /// Listeners may add or remove listeners (or navigate) while running;
    /// the set being iterated is fixed when the call starts. A panicking
    /// listener is logged and the remaining listeners still run. Panics are
    /// only caught where they unwind; `wasm32-unknown-unknown` aborts.
    pub fn notify_all(&self) {
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .slots
            .iter()
            .flatten()
            .cloned()
            .collect();
        tracing::trace!(listeners = snapshot.len(), "notifying listeners");

        for listener in snapshot {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener())) {
                tracing::error!(
                    panic = panic_message(payload.as_ref()),
                    "navigation listener panicked"
                );
            }
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

thread_local! {
    static GLOBAL: ListenerRegistry = ListenerRegistry::new();
}

/// Register `listener` with the global registry.
pub fn add(listener: &Listener) {
    GLOBAL.with(|registry| registry.add(listener));
}

/// Deregister `listener` from the global registry.
pub fn remove(listener: &Listener) -> bool {
    GLOBAL.with(|registry| registry.remove(listener))
}

/// Notify every listener in the global registry.
pub fn notify_all() {
    GLOBAL.with(ListenerRegistry::notify_all);
}

/// Number of listeners in the global registry.
pub fn listener_count() -> usize {
    GLOBAL.with(ListenerRegistry::len)
}
