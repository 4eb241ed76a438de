//! Live value streams and their combination.
//!
//! Every query in this crate yields a [`LiveStream`]: a stream of
//! successive values of some remote state, where an `Err` item is terminal.
//! [`CombineLatest`] joins several of them into one stream of snapshots.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::sync::watch;

use crate::error::CoreError;

/// A live, updating stream of values. An `Err` item ends the stream.
pub type LiveStream<T> = BoxStream<'static, Result<T, CoreError>>;

// ==============================================================================
// Combine Latest
// ==============================================================================

/// Joins several live streams into one stream of snapshots.
///
/// Nothing is emitted until every source has produced a value. From then on,
/// each value from any source yields a new snapshot holding the latest value
/// of every source, in source order. The first error from any source is
/// forwarded and ends the combined stream.
///
/// If a source completes before it ever produced a value the combined stream
/// completes immediately. Otherwise it completes when all sources have.
pub struct CombineLatest<T> {
    sources: Vec<Option<LiveStream<T>>>,
    latest: Vec<Option<T>>,
    ready: usize,
    /// Index to start polling from, rotated so one busy source cannot starve
    /// the others.
    cursor: usize,
    done: bool,
}

impl<T: Clone> CombineLatest<T> {
    pub fn new(sources: Vec<LiveStream<T>>) -> Self {
        let latest = sources.iter().map(|_| None).collect();
        Self {
            sources: sources.into_iter().map(Some).collect(),
            latest,
            ready: 0,
            cursor: 0,
            done: false,
        }
    }

    fn snapshot(&self) -> Vec<T> {
        self.latest.iter().flatten().cloned().collect()
    }
}

// Sources are boxed and latest values are never pinned.
impl<T> Unpin for CombineLatest<T> {}

/// Polling passes over all sources allowed per `poll_next` before yielding.
const POLL_BUDGET: usize = 32;

impl<T: Clone> Stream for CombineLatest<T> {
    type Item = Result<Vec<T>, CoreError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        // An empty join has nothing to wait for and nothing to emit.
        if this.sources.is_empty() {
            this.done = true;
            return Poll::Ready(None);
        }

        let count = this.sources.len();
        for _ in 0..POLL_BUDGET {
            let mut progressed = false;

            for offset in 0..count {
                let idx = (this.cursor + offset) % count;
                let Some(source) = this.sources[idx].as_mut() else {
                    continue;
                };

                match source.poll_next_unpin(cx) {
                    Poll::Ready(Some(Ok(value))) => {
                        if this.latest[idx].replace(value).is_none() {
                            this.ready += 1;
                        }
                        progressed = true;
                        if this.ready == count {
                            this.cursor = (idx + 1) % count;
                            tracing::trace!(source = idx, "combined emission");
                            return Poll::Ready(Some(Ok(this.snapshot())));
                        }
                    }
                    Poll::Ready(Some(Err(err))) => {
                        this.done = true;
                        return Poll::Ready(Some(Err(err)));
                    }
                    Poll::Ready(None) => {
                        this.sources[idx] = None;
                        progressed = true;
                        if this.latest[idx].is_none() {
                            this.done = true;
                            return Poll::Ready(None);
                        }
                    }
                    Poll::Pending => {}
                }
            }

            if this.sources.iter().all(Option::is_none) {
                this.done = true;
                return Poll::Ready(None);
            }
            if !progressed {
                return Poll::Pending;
            }
        }

        // Sources are still producing but not all are ready yet.
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Combine `sources` and box the result as a [`LiveStream`].
pub fn combine_latest<T>(sources: Vec<LiveStream<T>>) -> LiveStream<Vec<T>>
where
    T: Clone + Send + 'static,
{
    CombineLatest::new(sources).boxed()
}

/// Apply a fallible transform to every value of `source`.
///
/// A transform error is delivered like an upstream error: as the final item.
/// The source is dropped with it.
pub fn map_live<T, U, F>(source: LiveStream<T>, f: F) -> LiveStream<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> Result<U, CoreError> + Send + 'static,
{
    futures::stream::unfold(Some((source, f)), |state| async move {
        let (mut source, mut f) = state?;
        match source.next().await? {
            Ok(value) => match f(value) {
                Ok(mapped) => Some((Ok(mapped), Some((source, f)))),
                Err(err) => Some((Err(err), None)),
            },
            Err(err) => Some((Err(err), None)),
        }
    })
    .boxed()
}

// ==============================================================================
// Watch Adapter
// ==============================================================================

/// Turn a `watch` receiver holding the latest item of some upstream into a
/// [`LiveStream`].
///
/// The first item is the current value if the receiver has not seen it yet.
/// The stream ends after an `Err` item or once the sender is dropped and the
/// last value has been delivered.
pub fn watch_stream<T>(rx: watch::Receiver<Option<Result<T, CoreError>>>) -> LiveStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    futures::stream::unfold(Some(rx), |state| async move {
        let mut rx = state?;
        loop {
            if rx.changed().await.is_err() {
                return None;
            }
            let item = rx.borrow_and_update().clone();
            match item {
                Some(Ok(value)) => return Some((Ok(value), Some(rx))),
                Some(Err(err)) => return Some((Err(err), None)),
                None => continue,
            }
        }
    })
    .boxed()
}
