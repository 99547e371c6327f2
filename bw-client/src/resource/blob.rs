//! Scoped blob handles
//!
//! Decoded response bodies (cover art, audio) are registered in a
//! `BlobStore` under a `blob:` URL that a view uses as its display source.
//! The URL stays resolvable until its `BlobHandle` is released, either
//! explicitly or on drop, whichever comes first. Release is idempotent so
//! a handle that is evicted and later dropped is only revoked once.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// Display source of a registered blob
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    fn generate() -> Self {
        Self(format!("blob:bluewaves/{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded binary data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

#[derive(Default)]
struct StoreInner {
    blobs: Mutex<HashMap<BlobUrl, Arc<Blob>>>,
    allocated: AtomicUsize,
    released: AtomicUsize,
}

impl StoreInner {
    fn revoke(&self, url: &BlobUrl) {
        let removed = self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url);

        if removed.is_some() {
            self.released.fetch_add(1, Ordering::SeqCst);
            debug!(url = %url, "Blob released");
        }
    }
}

/// Registry of live blobs, shared by every view of one client
#[derive(Clone, Default)]
pub struct BlobStore {
    inner: Arc<StoreInner>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` and return the handle owning its URL
    pub fn allocate(&self, bytes: Vec<u8>, mime: Option<String>) -> BlobHandle {
        let url = BlobUrl::generate();
        let size = bytes.len();
        let blob = Arc::new(Blob {
            bytes,
            mime: mime.clone(),
        });

        self.inner
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone(), blob);
        self.inner.allocated.fetch_add(1, Ordering::SeqCst);
        debug!(url = %url, size, "Blob allocated");

        BlobHandle {
            url,
            mime,
            size,
            store: Arc::clone(&self.inner),
            released: AtomicBool::new(false),
        }
    }

    /// Look up a URL; `None` once its handle has been released
    pub fn resolve(&self, url: &BlobUrl) -> Option<Arc<Blob>> {
        self.inner
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// Handles allocated and not yet released
    pub fn live_count(&self) -> usize {
        self.inner
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn allocated_count(&self) -> usize {
        self.inner.allocated.load(Ordering::SeqCst)
    }

    pub fn released_count(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobStore")
            .field("live", &self.live_count())
            .field("allocated", &self.allocated_count())
            .field("released", &self.released_count())
            .finish()
    }
}

/// Owner of one blob URL
pub struct BlobHandle {
    url: BlobUrl,
    mime: Option<String>,
    size: usize,
    store: Arc<StoreInner>,
    released: AtomicBool,
}

impl BlobHandle {
    pub fn url(&self) -> &BlobUrl {
        &self.url
    }

    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The blob's data, or `None` after release
    pub fn read(&self) -> Option<Arc<Blob>> {
        self.store
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.url)
            .cloned()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Revoke the URL; later calls are no-ops
    pub fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.store.revoke(&self.url);
        }
    }
}

impl Drop for BlobHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobHandle")
            .field("url", &self.url)
            .field("mime", &self.mime)
            .field("size", &self.size)
            .field("released", &self.is_released())
            .finish()
    }
}
