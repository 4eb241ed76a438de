//! Shared test helpers for `ballot-core` unit tests.
//!
//! Builders for account lists and pair lists, plus ready-made mock chains
//! for each elections strategy.

use crate::backend::mock::MockChain;
use crate::elections::{counted_set, ranked_ballot};
use crate::types::{AccountId, Balance, BlockNumber, StorageValue};

// ==============================================================================
// Value Builders
// ==============================================================================

pub fn accounts(ids: &[&str]) -> Vec<AccountId> {
    ids.iter().map(|id| AccountId::from(*id)).collect()
}

pub fn account_balances(entries: &[(&str, u128)]) -> Vec<(AccountId, Balance)> {
    entries
        .iter()
        .map(|(id, balance)| (AccountId::from(*id), Balance(*balance)))
        .collect()
}

pub fn account_blocks(entries: &[(&str, BlockNumber)]) -> Vec<(AccountId, BlockNumber)> {
    entries
        .iter()
        .map(|(id, block)| (AccountId::from(*id), *block))
        .collect()
}

// ==============================================================================
// Mock Chains
// ==============================================================================

/// The batched counted-set values, in wire order: candidate count, desired
/// seats, members, next voter set, term duration, vote count, voter count.
pub type CountedSetTuple = (u32, u32, Vec<(AccountId, BlockNumber)>, u32, u32, u32, u32);

/// Push every item of the counted-set batched query.
pub fn push_counted_set_batch(chain: &MockChain, batch: CountedSetTuple) {
    let module = counted_set::MODULE;
    chain.push(module, "candidateCount", StorageValue::U32(batch.0));
    chain.push(module, "desiredSeats", StorageValue::U32(batch.1));
    chain.push(module, "members", StorageValue::AccountBlocks(batch.2));
    chain.push(module, "nextVoterSet", StorageValue::U32(batch.3));
    chain.push(module, "termDuration", StorageValue::U32(batch.4));
    chain.push(module, "voteCount", StorageValue::U32(batch.5));
    chain.push(module, "voterCount", StorageValue::U32(batch.6));
}

/// A mock node exposing both election modules, with the ranked-ballot
/// constants set. No storage values are pushed yet.
pub fn ranked_ballot_chain() -> MockChain {
    let module = ranked_ballot::MODULE;
    MockChain::builder()
        .with_module(counted_set::MODULE)
        .with_module(module)
        .with_constant(module, "candidacyBond", StorageValue::Balance(Balance(100)))
        .with_constant(module, "desiredMembers", StorageValue::U32(13))
        .with_constant(module, "termDuration", StorageValue::U32(600))
        .with_constant(module, "votingBond", StorageValue::Balance(Balance(5)))
        .build()
}
