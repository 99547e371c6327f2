//! Stage 2 of the resource pipeline: token-gated dependent fetches
//!
//! `GatedResource` is the one place where "wait for the token, then fetch"
//! lives. Every read goes through the same state machine:
//!
//! ```text
//! Idle -> AwaitingToken(k) -> Fetching(k) -> Ready(k)
//!                   \                \-----> Failed { k, error }
//!                    \---------------------> Failed { k, Unauthenticated }
//! ```
//!
//! Reads are serialized per resource. A read for a key other than the
//! cached one evicts (and releases) the cached value before anything else
//! happens, so a stale value is never served and never leaked. A token
//! failure short-circuits before the fetcher is called. A fetch failure
//! only empties the slot; the token stays cached and the next read
//! retries the fetch alone.

use crate::error::Result;
use crate::resource::Release;
use crate::session::{SessionToken, TokenResource};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

/// A request that needs the bearer token
#[async_trait]
pub trait DependentFetch: Send + Sync {
    type Key: Clone + Eq + Debug + Send + Sync;
    type Output: Release + Send + Sync;

    /// Name used in log lines
    fn name(&self) -> &'static str;

    /// Perform the request for `key` with an already-settled token
    async fn fetch(&self, key: &Self::Key, token: &SessionToken) -> Result<Self::Output>;
}

/// Observable loading state of a `GatedResource`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase<K> {
    Idle,
    AwaitingToken(K),
    Fetching(K),
    Ready(K),
    Failed {
        key: K,
        error: crate::error::ClientError,
    },
}

impl<K> Phase<K> {
    /// True while either stage is pending
    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::AwaitingToken(_) | Phase::Fetching(_))
    }
}

struct Cached<K, T> {
    key: K,
    value: Arc<T>,
}

/// Token-gated, key-addressed, single-slot resource cache
pub struct GatedResource<F: DependentFetch> {
    token: Arc<TokenResource>,
    fetcher: F,
    slot: Mutex<Option<Cached<F::Key, F::Output>>>,
    phase: watch::Sender<Phase<F::Key>>,
    fetches: AtomicUsize,
}

impl<F: DependentFetch> GatedResource<F> {
    pub fn new(token: Arc<TokenResource>, fetcher: F) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            token,
            fetcher,
            slot: Mutex::new(None),
            phase,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Read the value for `key`, suspending until both stages settle
    pub async fn read(&self, key: F::Key) -> Result<Arc<F::Output>> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.key == key {
                return Ok(Arc::clone(&cached.value));
            }
        }

        if let Some(stale) = slot.take() {
            debug!(
                resource = self.fetcher.name(),
                stale_key = ?stale.key,
                key = ?key,
                "Key changed, releasing cached value"
            );
            stale.value.release();
        }

        self.phase.send_replace(Phase::AwaitingToken(key.clone()));
        let token = match self.token.acquire().await {
            Ok(token) => token,
            Err(error) => {
                self.phase.send_replace(Phase::Failed {
                    key,
                    error: error.clone(),
                });
                return Err(error);
            }
        };

        self.phase.send_replace(Phase::Fetching(key.clone()));
        self.fetches.fetch_add(1, Ordering::SeqCst);

        match self.fetcher.fetch(&key, &token).await {
            Ok(value) => {
                let value = Arc::new(value);
                *slot = Some(Cached {
                    key: key.clone(),
                    value: Arc::clone(&value),
                });
                debug!(resource = self.fetcher.name(), key = ?key, "Resource ready");
                self.phase.send_replace(Phase::Ready(key));
                Ok(value)
            }
            Err(error) => {
                warn!(
                    resource = self.fetcher.name(),
                    key = ?key,
                    error = %error,
                    "Dependent fetch failed"
                );
                self.phase.send_replace(Phase::Failed {
                    key,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Mark the cached value for `key` stale and release it
    ///
    /// Returns false when `key` is not the cached key, in which case
    /// nothing changes.
    pub async fn invalidate(&self, key: &F::Key) -> bool {
        let mut slot = self.slot.lock().await;

        if !slot.as_ref().is_some_and(|cached| &cached.key == key) {
            return false;
        }

        if let Some(stale) = slot.take() {
            stale.value.release();
        }
        debug!(resource = self.fetcher.name(), key = ?key, "Resource invalidated");
        self.phase.send_replace(Phase::Idle);
        true
    }

    /// Apply a confirmed local change to the cached value for `key`
    ///
    /// Returns `None` when nothing is cached for `key`. Consumers holding an
    /// earlier `Arc` keep seeing the old value.
    pub async fn mutate<R>(&self, key: &F::Key, f: impl FnOnce(&mut F::Output) -> R) -> Option<R>
    where
        F::Output: Clone,
    {
        let mut slot = self.slot.lock().await;
        let cached = slot.as_mut().filter(|cached| &cached.key == key)?;
        Some(f(Arc::make_mut(&mut cached.value)))
    }

    /// Cached value for `key` without fetching; `None` while a read is in
    /// flight or when a different key is cached
    pub fn peek(&self, key: &F::Key) -> Option<Arc<F::Output>> {
        let slot = self.slot.try_lock().ok()?;
        let value = slot
            .as_ref()
            .filter(|cached| &cached.key == key)
            .map(|cached| Arc::clone(&cached.value));
        value
    }

    pub fn phase(&self) -> Phase<F::Key> {
        self.phase.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase<F::Key>> {
        self.phase.subscribe()
    }

    /// Number of times the fetcher has been invoked
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

impl<F: DependentFetch> Drop for GatedResource<F> {
    fn drop(&mut self) {
        if let Some(cached) = self.slot.get_mut().take() {
            cached.value.release();
        }
    }
}
