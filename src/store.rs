//! Synchronous, subscribable holder for a list of filter fragments.
//!
//! A `FilterListStore` plays the part of the user's allow-list or block-list
//! setting: whoever edits the list calls `set`/`update`, and every subscriber
//! is told about the new value before the call returns.

use crate::error::FilterError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;

type Listener = Box<dyn FnMut(&[String]) -> Result<(), FilterError> + Send>;

struct StoreInner {
    value: Vec<String>,
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

impl StoreInner {
    /// Push the current value to every listener in registration order,
    /// stopping at the first error.
    fn notify(&mut self) -> Result<(), FilterError> {
        debug!(
            fragments = self.value.len(),
            listeners = self.listeners.len(),
            "Filter list changed"
        );
        for (_, listener) in self.listeners.iter_mut() {
            listener(self.value.as_slice())?;
        }
        Ok(())
    }
}

fn lock_inner(inner: &Mutex<StoreInner>) -> MutexGuard<'_, StoreInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reactive list of filter fragments.
///
/// Listeners run while the store is locked, so they must not call back into
/// the same store (that includes dropping one of its [`Subscription`]s).
pub struct FilterListStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl FilterListStore {
    /// Create a store holding `initial`.
    pub fn new<I, S>(initial: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                value: initial.into_iter().map(Into::into).collect(),
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        lock_inner(&self.inner)
    }

    /// Register a listener.
    ///
    /// The listener is called immediately with the current list and again on
    /// every change, until the returned [`Subscription`] is dropped. If the
    /// immediate call fails, the error is returned and the listener is not
    /// kept.
    pub fn subscribe<F>(&self, mut listener: F) -> Result<Subscription, FilterError>
    where
        F: FnMut(&[String]) -> Result<(), FilterError> + Send + 'static,
    {
        let mut inner = self.lock();
        listener(inner.value.as_slice())?;

        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Box::new(listener)));
        debug!(id, listeners = inner.listeners.len(), "Filter list subscriber added");

        Ok(Subscription {
            store: Arc::downgrade(&self.inner),
            id,
        })
    }

    /// Replace the list and notify every listener in registration order.
    ///
    /// The first listener error stops notification and is returned; the new
    /// value is kept regardless.
    pub fn set(&self, value: Vec<String>) -> Result<(), FilterError> {
        let mut inner = self.lock();
        inner.value = value;
        inner.notify()
    }

    /// Edit the current list in place, then notify listeners as `set` does.
    ///
    /// The edit and the notification happen under one lock, so concurrent
    /// updates never overwrite each other.
    pub fn update<F>(&self, f: F) -> Result<(), FilterError>
    where
        F: FnOnce(&mut Vec<String>),
    {
        let mut inner = self.lock();
        f(&mut inner.value);
        inner.notify()
    }

    /// Snapshot of the current list.
    pub fn get(&self) -> Vec<String> {
        self.lock().value.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().value.is_empty()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

impl Default for FilterListStore {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl std::fmt::Debug for FilterListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("FilterListStore")
            .field("value", &inner.value)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

/// Keeps a listener registered with a [`FilterListStore`].
///
/// Dropping it removes the listener. It may outlive the store.
#[must_use = "dropping a Subscription unsubscribes its listener"]
#[derive(Debug)]
pub struct Subscription {
    store: Weak<Mutex<StoreInner>>,
    id: u64,
}

impl Subscription {
    /// Remove the listener now. Same as dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            let mut inner = lock_inner(&store);
            inner.listeners.retain(|(id, _)| *id != self.id);
            debug!(
                id = self.id,
                listeners = inner.listeners.len(),
                "Filter list subscriber removed"
            );
        }
    }
}
