//! Debounced autosave.
//!
//! Rapid edits to the same document coalesce into one save: scheduling a save
//! for a key cancels the pending one for that key and restarts the delay. A
//! save that has already started is left to finish.
//!
//! This sits beside the [`HybridAddressService`](crate::service::HybridAddressService),
//! at the orchestration layer; the service itself never delays or drops writes.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveOptions {
    pub delay: Duration,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(800),
        }
    }
}

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Slots<K> {
    next_generation: u64,
    pending: HashMap<K, Pending>,
}

/// Per-key cancelable delay. Must be used inside a Tokio runtime.
pub struct Debouncer<K> {
    options: AutosaveOptions,
    slots: Arc<Mutex<Slots<K>>>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
{
    pub fn new(options: AutosaveOptions) -> Self {
        Self {
            options,
            slots: Arc::new(Mutex::new(Slots {
                next_generation: 0,
                pending: HashMap::new(),
            })),
        }
    }

    /// Run `save` after the delay unless another save for `key` is scheduled first.
    pub fn schedule<F>(&self, key: K, save: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slots = lock(&self.slots);
        slots.next_generation += 1;
        let generation = slots.next_generation;

        if let Some(prev) = slots.pending.remove(&key) {
            prev.handle.abort();
            debug!(?key, "autosave coalesced");
        }

        let delay = self.options.delay;
        let shared = Arc::clone(&self.slots);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slots = lock(&shared);
                if slots.pending.get(&task_key).map(|p| p.generation) != Some(generation) {
                    // replaced or cancelled while waking up
                    return;
                }
                slots.pending.remove(&task_key);
            }
            debug!(key = ?task_key, "autosave firing");
            save.await;
        });

        slots.pending.insert(key, Pending { generation, handle });
    }

    /// Drop the pending save for `key`. Returns whether one was pending.
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.slots).pending.remove(key) {
            Some(prev) => {
                prev.handle.abort();
                debug!(?key, "autosave cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        lock(&self.slots).pending.contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.slots).pending.len()
    }
}

impl<K> Default for Debouncer<K>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
{
    fn default() -> Self {
        Self::new(AutosaveOptions::default())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
