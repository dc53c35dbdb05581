//! Snapshot hand-off between the introspector and request handling.

use crate::model::SchemaSnapshot;
use std::sync::{Arc, RwLock};

/// Holds the current schema snapshot.
///
/// A request captures the snapshot once via [`SchemaRegistry::current`] and
/// uses that pointer for every pipeline stage, so a concurrent
/// [`SchemaRegistry::replace`] can never produce a torn read mid-request.
#[derive(Debug)]
pub struct SchemaRegistry {
    current: RwLock<Arc<SchemaSnapshot>>,
}

impl SchemaRegistry {
    pub fn new(initial: SchemaSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The snapshot to use for the whole of one request.
    pub fn current(&self) -> Arc<SchemaSnapshot> {
        self.current
            .read()
            .expect("schema registry lock poisoned")
            .clone()
    }

    /// Atomically install a freshly introspected snapshot.
    pub fn replace(&self, snapshot: SchemaSnapshot) {
        let mut guard = self
            .current
            .write()
            .expect("schema registry lock poisoned");
        *guard = Arc::new(snapshot);
    }
}
