//! Event listener plumbing.
//!
//! Listener collections are ordered and lock-protected; delivery iterates over a
//! snapshot, so registering or removing listeners while an event is being fanned
//! out can never fail or skip established listeners mid-delivery.

use std::sync::{Arc, Mutex};

use crate::device::InputEvent;

/// Consumer of raw input events.
pub trait InputEventListener: Send + Sync {
    fn receive_input_event(&self, event: &InputEvent);
}

/// An ordered set of shared listeners with identity-based membership.
pub(crate) struct ListenerList<T: ?Sized> {
    entries: Mutex<Vec<Arc<T>>>,
}

impl<T: ?Sized> ListenerList<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Appends `listener` unless the same instance is already registered.
    /// Returns whether the set changed.
    pub fn add(&self, listener: Arc<T>) -> bool {
        let mut entries = self.entries.lock().expect("listener list poisoned");
        if entries.iter().any(|known| Arc::ptr_eq(known, &listener)) {
            return false;
        }
        entries.push(listener);
        true
    }

    /// Removes the given instance. Returns whether the set changed.
    pub fn remove(&self, listener: &Arc<T>) -> bool {
        let mut entries = self.entries.lock().expect("listener list poisoned");
        let before = entries.len();
        entries.retain(|known| !Arc::ptr_eq(known, listener));
        entries.len() != before
    }

    /// Removes every listener. Returns whether the set changed.
    pub fn clear(&self) -> bool {
        let mut entries = self.entries.lock().expect("listener list poisoned");
        let had_entries = !entries.is_empty();
        entries.clear();
        had_entries
    }

    pub fn contains(&self, listener: &Arc<T>) -> bool {
        self.entries
            .lock()
            .expect("listener list poisoned")
            .iter()
            .any(|known| Arc::ptr_eq(known, listener))
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .expect("listener list poisoned")
            .is_empty()
    }

    /// A point-in-time copy for iteration outside the lock.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.entries
            .lock()
            .expect("listener list poisoned")
            .clone()
    }
}

impl<T: ?Sized> Default for ListenerList<T> {
    fn default() -> Self {
        Self::new()
    }
}
