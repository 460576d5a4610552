//! Thread-safe access to a single hierarchy store.

use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::application::services::HierarchyStore;
use crate::application::ApplicationResult;
use crate::infrastructure::{InfraError, InfraResult};

/// A [`HierarchyStore`] behind a reader/writer lock.
///
/// Mutations hold the write lock for their whole duration, so readers never
/// see a tree mid-surgery; queries and exports share the read lock.
#[derive(Debug, Clone, Default)]
pub struct SharedHierarchy {
    inner: Arc<RwLock<HierarchyStore>>,
}

impl SharedHierarchy {
    pub fn new(store: HierarchyStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Run a read-only operation.
    pub fn read<T, F>(&self, op: F) -> InfraResult<T>
    where
        F: FnOnce(&HierarchyStore) -> ApplicationResult<T>,
    {
        let guard = self.inner.read().map_err(|_| InfraError::LockPoisoned)?;
        trace!("read lock acquired");
        Ok(op(&guard)?)
    }

    /// Run a mutating operation under the exclusive lock.
    pub fn write<T, F>(&self, op: F) -> InfraResult<T>
    where
        F: FnOnce(&mut HierarchyStore) -> ApplicationResult<T>,
    {
        let mut guard = self.inner.write().map_err(|_| InfraError::LockPoisoned)?;
        trace!("write lock acquired");
        Ok(op(&mut guard)?)
    }
}
