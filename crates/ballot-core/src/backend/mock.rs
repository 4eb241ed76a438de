use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tokio::sync::watch;

use crate::error::CoreError;
use crate::live::{combine_latest, watch_stream, LiveStream};
use crate::types::{StorageKey, StorageValue};

use super::{ConstantReader, ModuleProbe, StorageSubscriber};

type Item = Option<Result<StorageValue, CoreError>>;

/// The sender feeds a key; the retained receiver never marks anything seen,
/// so its clones start from the latest pushed value.
type Slot = (watch::Sender<Item>, watch::Receiver<Item>);

/// A push-driven mock node for testing. Storage values are fed by the test
/// via [`MockChain::push`] and delivered to every live subscription of that
/// key; constants and modules are fixed via the builder.
pub struct MockChain {
    modules: HashSet<String>,
    constants: HashMap<(String, String), StorageValue>,
    slots: Mutex<HashMap<StorageKey, Slot>>,
    subscriptions: Mutex<HashMap<StorageKey, usize>>,
    multi_subscriptions: Mutex<usize>,
}

impl MockChain {
    pub fn builder() -> MockChainBuilder {
        MockChainBuilder {
            modules: HashSet::new(),
            constants: HashMap::new(),
        }
    }

    fn slot(&self, key: &StorageKey) -> watch::Receiver<Item> {
        let mut slots = self.slots.lock().unwrap();
        slots
            .entry(key.clone())
            .or_insert_with(|| watch::channel(None))
            .1
            .clone()
    }

    fn publish(&self, key: &StorageKey, item: Result<StorageValue, CoreError>) {
        let mut slots = self.slots.lock().unwrap();
        slots
            .entry(key.clone())
            .or_insert_with(|| watch::channel(None))
            .0
            .send_replace(Some(item));
    }

    /// Publish a new value for `module.item`.
    pub fn push(&self, module: &str, item: &str, value: StorageValue) {
        self.publish(&StorageKey::new(module, item), Ok(value));
    }

    /// Fail every live subscription of `module.item`.
    pub fn fail(&self, module: &str, item: &str, err: CoreError) {
        self.publish(&StorageKey::new(module, item), Err(err));
    }

    /// Number of single-key subscriptions opened for `module.item`.
    pub fn subscription_count(&self, module: &str, item: &str) -> usize {
        self.subscriptions
            .lock()
            .unwrap()
            .get(&StorageKey::new(module, item))
            .copied()
            .unwrap_or(0)
    }

    /// Number of batched subscriptions opened.
    pub fn multi_subscription_count(&self) -> usize {
        *self.multi_subscriptions.lock().unwrap()
    }
}

pub struct MockChainBuilder {
    modules: HashSet<String>,
    constants: HashMap<(String, String), StorageValue>,
}

impl MockChainBuilder {
    pub fn with_module(mut self, name: &str) -> Self {
        self.modules.insert(name.to_owned());
        self
    }

    pub fn with_constant(mut self, module: &str, name: &str, value: StorageValue) -> Self {
        self.constants
            .insert((module.to_owned(), name.to_owned()), value);
        self
    }

    pub fn build(self) -> MockChain {
        MockChain {
            modules: self.modules,
            constants: self.constants,
            slots: Mutex::new(HashMap::new()),
            subscriptions: Mutex::new(HashMap::new()),
            multi_subscriptions: Mutex::new(0),
        }
    }
}

impl StorageSubscriber for MockChain {
    fn subscribe(&self, key: &StorageKey) -> LiveStream<StorageValue> {
        *self
            .subscriptions
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_insert(0) += 1;
        watch_stream(self.slot(key))
    }

    fn subscribe_multi(&self, keys: &[StorageKey]) -> LiveStream<Vec<StorageValue>> {
        *self.multi_subscriptions.lock().unwrap() += 1;
        let sources = keys.iter().map(|key| watch_stream(self.slot(key))).collect();
        combine_latest(sources)
    }
}

impl ConstantReader for MockChain {
    fn constant(&self, module: &str, name: &str) -> Result<StorageValue, CoreError> {
        self.constants
            .get(&(module.to_owned(), name.to_owned()))
            .cloned()
            .ok_or_else(|| CoreError::MissingConstant {
                module: module.to_owned(),
                name: name.to_owned(),
            })
    }
}

impl ModuleProbe for MockChain {
    fn has_module(&self, name: &str) -> bool {
        self.modules.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn pushed_values_reach_live_subscriptions() {
        let chain = MockChain::builder().build();
        let mut stream = chain.subscribe(&StorageKey::new("elections", "voteCount"));
        chain.push("elections", "voteCount", StorageValue::U32(1));
        assert_eq!(stream.next().await.unwrap().unwrap(), StorageValue::U32(1));
        chain.push("elections", "voteCount", StorageValue::U32(2));
        assert_eq!(stream.next().await.unwrap().unwrap(), StorageValue::U32(2));
        assert_eq!(chain.subscription_count("elections", "voteCount"), 1);
    }

    #[tokio::test]
    async fn multi_subscription_preserves_key_order() {
        let chain = MockChain::builder().build();
        let keys = [
            StorageKey::new("elections", "voteCount"),
            StorageKey::new("elections", "voterCount"),
        ];
        chain.push("elections", "voterCount", StorageValue::U32(9));
        chain.push("elections", "voteCount", StorageValue::U32(7));
        let mut stream = chain.subscribe_multi(&keys);
        assert_eq!(
            stream.next().await.unwrap().unwrap(),
            vec![StorageValue::U32(7), StorageValue::U32(9)]
        );
        assert_eq!(chain.multi_subscription_count(), 1);
    }
}
