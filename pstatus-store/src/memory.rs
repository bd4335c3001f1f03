//! In-memory store
//!
//! Keeps documents in a map shared between clones. Used by tests and by
//! anything that needs a store without a network round-trip. Failures can be
//! injected to exercise backend error paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Result, StoreError};
use crate::{Store, WriteOptions};

#[derive(Debug, Default)]
struct Inner {
    objects: HashMap<String, Vec<u8>>,
    writes: usize,
    last_options: Option<WriteOptions>,
    failure: Option<String>,
}

/// In-memory implementation of Store
///
/// Uses Arc<Mutex<..>> so every clone sees the same objects.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds `key` without counting it as a write
    pub fn insert(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.lock().objects.insert(key.into(), body.into());
    }

    /// Current bytes under `key`
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().objects.get(key).cloned()
    }

    /// Deletes `key`, returning whether it existed
    pub fn remove(&self, key: &str) -> bool {
        self.lock().objects.remove(key).is_some()
    }

    /// Number of writes performed through the Store trait
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Options passed to the most recent write
    pub fn last_write_options(&self) -> Option<WriteOptions> {
        self.lock().last_options.clone()
    }

    /// Makes every following operation fail with `message` until cleared with `None`
    pub fn set_failure(&self, message: Option<&str>) {
        self.lock().failure = message.map(str::to_string);
    }

    fn check_failure(inner: &Inner) -> Result<()> {
        match &inner.failure {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.lock();
        Self::check_failure(&inner)?;
        Ok(inner.objects.get(key).cloned())
    }

    async fn write(&self, key: &str, body: Vec<u8>, options: &WriteOptions) -> Result<()> {
        let mut inner = self.lock();
        Self::check_failure(&inner)?;
        inner.objects.insert(key.to_string(), body);
        inner.writes += 1;
        inner.last_options = Some(options.clone());
        Ok(())
    }
}
