use serde::{Deserialize, Serialize};

use crate::backend::{ChainBackend, ModuleProbe};
use crate::live::LiveStream;
use crate::types::DerivedElectionsInfo;

use super::{counted_set, ranked_ballot};

/// Which election module the connected node runs, and therefore which query
/// plan and mapper produce `DerivedElectionsInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionsStrategy {
    /// The original `elections` module: counters, voter sets, no balances.
    CountedSet,
    /// The `electionsPhragmen` module: ranked members and runners-up.
    RankedBallot,
}

impl ElectionsStrategy {
    /// Pick the strategy for the modules `probe` reports.
    ///
    /// `electionsPhragmen` wins whenever present, even alongside
    /// `elections`. A node with neither module still gets `CountedSet`;
    /// callers are expected not to ask for election info on such a node.
    pub fn select<P: ModuleProbe + ?Sized>(probe: &P) -> Self {
        if probe.has_module(ranked_ballot::MODULE) {
            Self::RankedBallot
        } else {
            Self::CountedSet
        }
    }

    /// The runtime module this strategy queries.
    pub fn module(self) -> &'static str {
        match self {
            Self::CountedSet => counted_set::MODULE,
            Self::RankedBallot => ranked_ballot::MODULE,
        }
    }

    /// Build the live derived view using this strategy's query plan.
    pub fn query(self, backend: &dyn ChainBackend) -> LiveStream<DerivedElectionsInfo> {
        match self {
            Self::CountedSet => counted_set::query(backend),
            Self::RankedBallot => ranked_ballot::query(backend),
        }
    }
}

impl std::fmt::Display for ElectionsStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CountedSet => write!(f, "counted_set"),
            Self::RankedBallot => write!(f, "ranked_ballot"),
        }
    }
}
