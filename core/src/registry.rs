//! The set of live state holders the engine knows about.
//!
//! Collaborators register a holder when they construct it and deregister
//! it at their defined teardown point. Registration order is preserved:
//! when two live instances share an instance name, the save side lets the
//! later-registered one win, and that only stays deterministic if
//! iteration follows registration.

use std::sync::{Arc, Mutex};

use crate::holder::SharedHolder;

// ---------------------------------------------------------------------------
// InstanceRegistry
// ---------------------------------------------------------------------------

/// Mutex-guarded list of registered holders, in registration order.
///
/// Identity is the shared pointer, not the instance name — two instances
/// of the same class can be registered side by side. Registering a holder
/// twice and deregistering an unknown holder are both no-ops.
/// Deregistration may arrive from any thread at any time, including while
/// a save is iterating a snapshot taken earlier.
#[derive(Default)]
pub struct InstanceRegistry {
    inner: Mutex<Vec<SharedHolder>>,
}

impl InstanceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        InstanceRegistry::default()
    }

    /// Register a holder. No-op if this exact instance is already present.
    pub fn register(&self, holder: &SharedHolder) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.iter().any(|h| Arc::ptr_eq(h, holder)) {
            inner.push(Arc::clone(holder));
        }
    }

    /// Deregister a holder. No-op if this instance was never registered.
    pub fn deregister(&self, holder: &SharedHolder) {
        let mut inner = self.inner.lock().unwrap();
        inner.retain(|h| !Arc::ptr_eq(h, holder));
    }

    /// Snapshot of all registered holders, in registration order.
    pub fn all(&self) -> Vec<SharedHolder> {
        self.inner.lock().unwrap().clone()
    }

    /// Number of registered holders.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Whether no holders are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
