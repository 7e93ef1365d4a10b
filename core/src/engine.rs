//! The persistence engine — the facade tying the registry, the parser
//! cache, the document store, and the save/load passes together.
//!
//! Typical use: build one `Engine` at startup, register each state holder
//! as it comes alive, call [`Engine::load_all`] on each holder once its
//! fields exist, and call [`Engine::save_all`] on shutdown (or whenever a
//! durable snapshot is wanted).
//!
//! The saved document is read from disk at most once per engine; later
//! loads reuse the cached copy. Saving does not refresh the cache, so a
//! holder loaded after a save still sees the startup-time document. Build
//! a fresh engine to observe newly written state.

use std::sync::Mutex;

use tracing::info;

use crate::document::SavedDocument;
use crate::error::PersistError;
use crate::holder::{PropertyDescriptor, SharedHolder};
use crate::load;
use crate::parsers::ParserRegistry;
use crate::registry::InstanceRegistry;
use crate::save;
use crate::store::{DocumentStore, StoreConfig};

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

enum DocumentCache {
    Unloaded,
    Loaded(Option<SavedDocument>),
}

pub struct Engine {
    store: DocumentStore,
    instances: InstanceRegistry,
    parsers: ParserRegistry,
    document: Mutex<DocumentCache>,
    save_lock: Mutex<()>,
}

impl Engine {
    pub fn new(config: StoreConfig) -> Self {
        Engine {
            store: DocumentStore::new(config),
            instances: InstanceRegistry::new(),
            parsers: ParserRegistry::new(),
            document: Mutex::new(DocumentCache::Unloaded),
            save_lock: Mutex::new(()),
        }
    }

    /// The parser registry, for registering parsers for app-defined types.
    pub fn parsers(&self) -> &ParserRegistry {
        &self.parsers
    }

    /// Track a live holder. Registering the same instance again is a no-op.
    pub fn register(&self, holder: &SharedHolder) {
        self.instances.register(holder);
    }

    /// Stop tracking a holder. Its state is no longer written on save.
    pub fn deregister(&self, holder: &SharedHolder) {
        self.instances.deregister(holder);
    }

    /// Number of holders currently tracked.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Restore every saved record of one holder. Call once per instance,
    /// after its fields exist; list records append, so a second call
    /// duplicates list contents.
    pub fn load_all(&self, holder: &SharedHolder) -> Result<(), PersistError> {
        self.with_document(|doc| {
            let mut guard = holder.lock().unwrap();
            load::apply_document(doc, &mut *guard, &self.parsers)
        })
    }

    /// Restore a single scalar field of one holder, leaving everything
    /// else untouched.
    pub fn reload_one(
        &self,
        holder: &SharedHolder,
        descriptor: &PropertyDescriptor,
    ) -> Result<(), PersistError> {
        self.with_document(|doc| {
            let mut guard = holder.lock().unwrap();
            load::apply_single(doc, &mut *guard, &self.parsers, descriptor)
        })
    }

    fn with_document<F>(&self, apply: F) -> Result<(), PersistError>
    where
        F: FnOnce(&SavedDocument) -> Result<(), PersistError>,
    {
        let mut cache = self.document.lock().unwrap();
        if let DocumentCache::Unloaded = *cache {
            *cache = DocumentCache::Loaded(self.store.load());
        }
        match &*cache {
            DocumentCache::Loaded(Some(doc)) => apply(doc),
            _ => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    /// Snapshot every registered holder and rewrite the document on disk.
    /// The previous file contents are fully replaced.
    pub fn save_all(&self) -> Result<(), PersistError> {
        if self.store.is_disabled() {
            return Ok(());
        }
        let _guard = self.save_lock.lock().unwrap();
        let doc = save::build_document(&self.instances.all());
        self.store.save(&doc)?;
        info!(
            classes = doc.classes().len(),
            values = doc.values.len(),
            "state saved"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
