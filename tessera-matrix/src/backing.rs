//! Shared backing stores
//!
//! A [`Backing`] is one owning reference to a heap store. Cloning a backing
//! adds a reference; dropping it removes one. The store is written in place
//! only when the writer holds the sole reference. A writer sharing the store
//! forks a private copy while holding the shared store's advisory lock.

use crate::store::Store;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tessera_core::Element;

struct BackingInner<T: Element> {
    lock: Mutex<()>,
    store: Store<T>,
}

impl<T: Element> Clone for BackingInner<T> {
    fn clone(&self) -> Self {
        // a fork gets its own lock
        Self {
            lock: Mutex::new(()),
            store: self.store.clone(),
        }
    }
}

pub struct Backing<T: Element> {
    inner: Arc<BackingInner<T>>,
}

impl<T: Element> Backing<T> {
    pub fn new(store: Store<T>) -> Self {
        Self {
            inner: Arc::new(BackingInner {
                lock: Mutex::new(()),
                store,
            }),
        }
    }

    pub fn store(&self) -> &Store<T> {
        &self.inner.store
    }

    /// Take another reference to the same store
    pub fn add_reference(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Release this reference; true when it was the last one
    pub fn remove_reference(self) -> bool {
        Arc::into_inner(self.inner).is_some()
    }

    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.inner.lock.lock()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Writable access, forking the store when it is shared
    pub fn store_mut(&mut self) -> &mut Store<T> {
        if Arc::get_mut(&mut self.inner).is_none() {
            let fork = {
                let _guard = self.lock();
                tracing::trace!(
                    references = self.reference_count(),
                    rows = self.inner.store.rows(),
                    cols = self.inner.store.cols(),
                    "copy-on-write fork of shared backing store"
                );
                Arc::new(BackingInner::clone(&self.inner))
            };
            self.inner = fork;
        }
        // sole reference from here on, so no further copy happens
        &mut Arc::make_mut(&mut self.inner).store
    }

    /// Replace the store wholesale; other holders keep the old one
    pub fn replace(&mut self, store: Store<T>) {
        *self = Self::new(store);
    }
}

impl<T: Element> Clone for Backing<T> {
    fn clone(&self) -> Self {
        self.add_reference()
    }
}

impl<T: Element> std::fmt::Debug for Backing<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backing")
            .field("references", &self.reference_count())
            .field("store", &self.inner.store)
            .finish()
    }
}
