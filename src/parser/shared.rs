//! A [`ModelReader`] behind one lock, for callers on several threads.
//!
//! The lock is held for the whole read-or-parse sequence of a request, so two
//! threads asking for the same view never parse it twice. Nested parsing
//! through href resolution happens inside that single critical section.

use super::{ContentSource, ModelReader};
use crate::error::ModelError;
use crate::model::{Entity, ModelTree};
use parking_lot::Mutex;
use std::sync::Arc;

pub struct SharedModelReader<S: ContentSource> {
    inner: Arc<Mutex<ModelReader<S>>>,
}

impl<S: ContentSource> Clone for SharedModelReader<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ContentSource> SharedModelReader<S> {
    pub fn new(reader: ModelReader<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(reader)),
        }
    }

    pub fn list_files(&self) -> Vec<String> {
        self.inner
            .lock()
            .list_files()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn read_file(&self, file: &str) -> Result<Option<Arc<ModelTree>>, ModelError> {
        self.inner.lock().read_file(file)
    }

    pub fn search<F>(&self, predicate: F) -> Vec<Entity>
    where
        F: FnMut(&Entity) -> bool,
    {
        self.inner.lock().search(predicate)
    }

    /// Run `f` with exclusive access to the underlying reader.
    pub fn with_reader<T>(&self, f: impl FnOnce(&mut ModelReader<S>) -> T) -> T {
        let mut reader = self.inner.lock();
        f(&mut reader)
    }
}
