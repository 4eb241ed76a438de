//! Derived, memoized view of the node's election module.
//!
//! [`ElectionsApi`] is the composition root: it picks an
//! [`ElectionsStrategy`] from the modules the node exposes, builds that
//! strategy's query plan, and shares the resulting live stream between all
//! callers.

pub mod counted_set;
pub mod ranked_ballot;
pub mod strategy;

pub use strategy::ElectionsStrategy;

use std::sync::Arc;

use crate::backend::ChainBackend;
use crate::live::LiveStream;
use crate::memo::Memo;
use crate::types::DerivedElectionsInfo;

/// Memo identity of the combined election info subscription.
const INFO_KEY: &str = "elections.info";

pub struct ElectionsApi {
    backend: Arc<dyn ChainBackend>,
    memo: Memo<DerivedElectionsInfo>,
}

impl ElectionsApi {
    pub fn new(backend: Arc<dyn ChainBackend>) -> Self {
        Self {
            backend,
            memo: Memo::new(),
        }
    }

    /// The strategy the connected node currently calls for.
    pub fn strategy(&self) -> ElectionsStrategy {
        ElectionsStrategy::select(self.backend.as_ref())
    }

    /// Live election info: candidates, members, runners-up and module
    /// parameters, re-emitted whenever any underlying query changes.
    ///
    /// The first call selects the strategy and establishes the remote
    /// subscriptions; every later call shares them. Must be called from
    /// within a tokio runtime.
    pub fn info(&self) -> LiveStream<DerivedElectionsInfo> {
        self.memo
            .subscribe(INFO_KEY, || {
                let strategy = self.strategy();
                tracing::debug!(%strategy, module = strategy.module(), "selected elections strategy");
                strategy.query(self.backend.as_ref())
            })
            .stream()
    }

    /// [`ElectionsApi::info`] as a zero-argument callable.
    pub fn info_fn(&self) -> impl Fn() -> LiveStream<DerivedElectionsInfo> + '_ {
        move || self.info()
    }
}
