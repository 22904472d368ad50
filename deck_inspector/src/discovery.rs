use std::sync::{Arc, Mutex};

/// Process-wide, read-mostly cache of discovered devices, shared across
/// action instances. Refresh replaces the snapshot wholesale; nothing ever
/// mutates entries in place. Consumers must re-fetch a snapshot per use
/// rather than hold one across refreshes.
#[derive(Debug)]
pub struct DiscoveryCache<T> {
    snapshot: Mutex<Arc<Vec<T>>>,
}

impl<T> DiscoveryCache<T> {
    pub fn new() -> Self {
        Self {
            snapshot: Mutex::new(Arc::new(Vec::new())),
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<T>> {
        match self.snapshot.lock() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn replace(&self, entries: Vec<T>) {
        let entries = Arc::new(entries);
        match self.snapshot.lock() {
            Ok(mut guard) => *guard = entries,
            Err(poisoned) => *poisoned.into_inner() = entries,
        }
    }
}

impl<T> Default for DiscoveryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
