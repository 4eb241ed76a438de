use std::collections::{BTreeMap, BTreeSet};

use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::live::LiveStream;
use crate::types::{StorageKey, StorageValue};

use super::{ConstantReader, ModuleProbe, StorageSubscriber};

// ==============================================================================
// Fixture Document
// ==============================================================================

/// A serialized snapshot of node state.
///
/// ```json
/// {
///   "modules": ["elections"],
///   "storage": { "elections.candidates": { "accounts": ["X", "Y"] } },
///   "constants": {}
/// }
/// ```
///
/// Keys are `module.item`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub modules: BTreeSet<String>,
    #[serde(default)]
    pub storage: BTreeMap<String, StorageValue>,
    #[serde(default)]
    pub constants: BTreeMap<String, StorageValue>,
}

// ==============================================================================
// FixtureChain
// ==============================================================================

/// A [`ChainBackend`](super::ChainBackend) answering from a fixed snapshot.
///
/// Each subscription emits the stored value once and then completes. A key
/// missing from the snapshot fails its subscription with `CoreError::Rpc`,
/// as a node would for an unknown storage item.
#[derive(Debug, Clone)]
pub struct FixtureChain {
    fixture: Fixture,
}

impl FixtureChain {
    pub fn new(fixture: Fixture) -> Self {
        Self { fixture }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let fixture: Fixture = serde_json::from_str(json)?;
        for key in fixture.storage.keys().chain(fixture.constants.keys()) {
            if key.split_once('.').is_none() {
                return Err(CoreError::Fixture(format!(
                    "key `{key}` must have the form `module.item`"
                )));
            }
        }
        Ok(Self::new(fixture))
    }

    fn lookup(&self, key: &StorageKey) -> Result<StorageValue, CoreError> {
        self.fixture
            .storage
            .get(&key.to_string())
            .cloned()
            .ok_or_else(|| CoreError::Rpc(format!("storage item not found: {key}")))
    }
}

impl StorageSubscriber for FixtureChain {
    fn subscribe(&self, key: &StorageKey) -> LiveStream<StorageValue> {
        futures::stream::once(futures::future::ready(self.lookup(key))).boxed()
    }

    fn subscribe_multi(&self, keys: &[StorageKey]) -> LiveStream<Vec<StorageValue>> {
        let values = keys
            .iter()
            .map(|key| self.lookup(key))
            .collect::<Result<Vec<_>, _>>();
        futures::stream::once(futures::future::ready(values)).boxed()
    }
}

impl ConstantReader for FixtureChain {
    fn constant(&self, module: &str, name: &str) -> Result<StorageValue, CoreError> {
        self.fixture
            .constants
            .get(&format!("{module}.{name}"))
            .cloned()
            .ok_or_else(|| CoreError::MissingConstant {
                module: module.to_owned(),
                name: name.to_owned(),
            })
    }
}

impl ModuleProbe for FixtureChain {
    fn has_module(&self, name: &str) -> bool {
        self.fixture.modules.contains(name)
    }
}
