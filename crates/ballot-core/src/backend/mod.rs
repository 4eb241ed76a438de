//! Collaborator interfaces onto a connected node.
//!
//! Defines the three seams the derive layer consumes: live storage
//! subscriptions ([`StorageSubscriber`]), constant lookup
//! ([`ConstantReader`]) and module discovery ([`ModuleProbe`]). Provides an
//! in-memory snapshot implementation ([`FixtureChain`]) plus a push-driven
//! test mock (`mock::MockChain`).

pub mod fixture;
#[cfg(test)]
pub mod mock;

pub use fixture::FixtureChain;

use crate::error::CoreError;
use crate::live::LiveStream;
use crate::types::{StorageKey, StorageValue};

/// Live storage queries against the connected node.
pub trait StorageSubscriber: Send + Sync {
    /// Subscribe to a single storage entry.
    fn subscribe(&self, key: &StorageKey) -> LiveStream<StorageValue>;

    /// Subscribe to several entries at once. Every emission carries one
    /// value per key, in the order the keys were given.
    fn subscribe_multi(&self, keys: &[StorageKey]) -> LiveStream<Vec<StorageValue>>;
}

/// Synchronous lookup of runtime constants (genesis/compile-time values).
pub trait ConstantReader: Send + Sync {
    fn constant(&self, module: &str, name: &str) -> Result<StorageValue, CoreError>;
}

/// Reports which runtime modules the connected node exposes.
pub trait ModuleProbe: Send + Sync {
    fn has_module(&self, name: &str) -> bool;
}

/// Everything the derive layer needs from a node connection.
pub trait ChainBackend: StorageSubscriber + ConstantReader + ModuleProbe {}

impl<T> ChainBackend for T where T: StorageSubscriber + ConstantReader + ModuleProbe {}
