use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::channel::mpsc;
use futures::StreamExt;

use crate::error::CoreError;
use crate::live::LiveStream;

type Item<T> = Result<T, CoreError>;

// ==============================================================================
// Shared Live Value
// ==============================================================================

struct Fanout<T> {
    latest: Option<Item<T>>,
    consumers: Vec<mpsc::UnboundedSender<Item<T>>>,
    finished: bool,
}

/// A handle onto one shared upstream subscription.
///
/// The upstream is driven by a background task that forwards every item to
/// each registered consumer. A new consumer from [`SharedLive::stream`]
/// first receives the latest item, then every later one. Dropping a consumer
/// never stops the upstream.
pub struct SharedLive<T> {
    fanout: Arc<Mutex<Fanout<T>>>,
}

impl<T> Clone for SharedLive<T> {
    fn clone(&self) -> Self {
        Self {
            fanout: Arc::clone(&self.fanout),
        }
    }
}

impl<T> SharedLive<T>
where
    T: Clone + Send + 'static,
{
    /// Start driving `upstream` on the current tokio runtime.
    fn spawn(key: &str, mut upstream: LiveStream<T>) -> Self {
        let fanout = Arc::new(Mutex::new(Fanout {
            latest: None,
            consumers: Vec::new(),
            finished: false,
        }));
        let shared = Self {
            fanout: Arc::clone(&fanout),
        };

        let key = key.to_owned();
        tokio::spawn(async move {
            while let Some(item) = upstream.next().await {
                let failed = item.is_err();
                if let Err(err) = &item {
                    tracing::warn!(key = %key, error = %err, "shared subscription failed");
                }
                {
                    let mut state = fanout.lock().unwrap_or_else(PoisonError::into_inner);
                    state
                        .consumers
                        .retain(|tx| tx.unbounded_send(item.clone()).is_ok());
                    state.latest = Some(item);
                }
                if failed {
                    break;
                }
            }

            // Closing the senders ends every consumer stream.
            let mut state = fanout.lock().unwrap_or_else(PoisonError::into_inner);
            state.finished = true;
            state.consumers.clear();
            tracing::debug!(key = %key, "shared subscription finished");
        });
        shared
    }

    /// A new consumer of the shared value.
    pub fn stream(&self) -> LiveStream<T> {
        let (tx, rx) = mpsc::unbounded();
        let mut state = self.fanout.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(latest) = &state.latest {
            // The receiver is alive, so this cannot fail.
            let _ = tx.unbounded_send(latest.clone());
        }
        if !state.finished {
            state.consumers.push(tx);
        }
        rx.boxed()
    }
}

// ==============================================================================
// Memo
// ==============================================================================

/// Memoizes live subscriptions by identity.
///
/// The first request for a key invokes the factory and starts the upstream;
/// every later request for the same key shares it. Entries are never
/// evicted and never torn down: they live as long as the `Memo` itself.
///
/// Owned by a composition root (e.g. `ElectionsApi`) rather than held in a
/// global, so independent roots do not share subscriptions.
pub struct Memo<T> {
    entries: Mutex<HashMap<String, SharedLive<T>>>,
}

impl<T> Memo<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the shared subscription for `key`, creating it with `factory`
    /// on first use.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<F>(&self, key: &str, factory: F) -> SharedLive<T>
    where
        F: FnOnce() -> LiveStream<T>,
    {
        // The map is never left half-updated, so a poisoned lock is usable.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(shared) = entries.get(key) {
            return shared.clone();
        }

        tracing::debug!(key, "establishing shared subscription");
        let shared = SharedLive::spawn(key, factory());
        entries.insert(key.to_owned(), shared.clone());
        shared
    }

    /// Bind `factory` to `key`, returning a zero-argument callable that
    /// yields a consumer stream of the shared subscription.
    pub fn memoize<'a, F>(&'a self, key: &'a str, factory: F) -> impl Fn() -> LiveStream<T> + 'a
    where
        F: Fn() -> LiveStream<T> + 'a,
    {
        move || self.subscribe(key, &factory).stream()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Memo<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
