//! Query plan and mapper for the original `elections` module.
//!
//! Candidates come from their own subscription. Everything else comes from
//! one batched subscription whose key order is fixed by [`BATCH_ITEMS`].

use futures::{StreamExt, TryStreamExt};

use crate::backend::ChainBackend;
use crate::error::CoreError;
use crate::live::{combine_latest, map_live, LiveStream};
use crate::types::{
    AccountId, Balance, BlockNumber, DerivedElectionsInfo, StorageKey, StorageValue,
};

pub const MODULE: &str = "elections";

/// Items fetched by the batched query, in wire order.
pub const BATCH_ITEMS: [&str; 7] = [
    "candidateCount",
    "desiredSeats",
    "members",
    "nextVoterSet",
    "termDuration",
    "voteCount",
    "voterCount",
];

/// Decoded result of the batched query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedSetBatch {
    pub candidate_count: u32,
    pub desired_seats: u32,
    /// Seated accounts with the block their term ends.
    pub members: Vec<(AccountId, BlockNumber)>,
    pub next_voter_set: u32,
    pub term_duration: BlockNumber,
    pub vote_count: u32,
    pub voter_count: u32,
}

impl CountedSetBatch {
    fn from_values(values: Vec<StorageValue>) -> Result<Self, CoreError> {
        let values: [StorageValue; 7] = values.try_into().map_err(|_| CoreError::UnexpectedShape {
            key: batch_key(),
            expected: "7 values",
        })?;
        let [
            candidate_count,
            desired_seats,
            members,
            next_voter_set,
            term_duration,
            vote_count,
            voter_count,
        ] = values;

        Ok(Self {
            candidate_count: candidate_count.into_u32(&key("candidateCount"))?,
            desired_seats: desired_seats.into_u32(&key("desiredSeats"))?,
            members: members.into_account_blocks(&key("members"))?,
            next_voter_set: next_voter_set.into_u32(&key("nextVoterSet"))?,
            term_duration: term_duration.into_u32(&key("termDuration"))?,
            vote_count: vote_count.into_u32(&key("voteCount"))?,
            voter_count: voter_count.into_u32(&key("voterCount"))?,
        })
    }
}

fn key(item: &str) -> StorageKey {
    StorageKey::new(MODULE, item)
}

fn batch_key() -> StorageKey {
    key(&BATCH_ITEMS.join(","))
}

/// The candidates query may deliver `Empty` instead of an empty list.
fn normalize_candidates(value: StorageValue) -> StorageValue {
    match value {
        StorageValue::Empty => StorageValue::Accounts(Vec::new()),
        other => other,
    }
}

/// Build the derived view from the two decoded upstream results.
///
/// The module stores no balance alongside members, so every member is paired
/// with a zero balance. There are never runners-up.
pub fn derive(candidates: Vec<AccountId>, batch: CountedSetBatch) -> DerivedElectionsInfo {
    DerivedElectionsInfo {
        candidates,
        candidate_count: batch.candidate_count,
        desired_seats: batch.desired_seats,
        members: batch
            .members
            .into_iter()
            .map(|(account, _term_end)| (account, Balance::default()))
            .collect(),
        runners_up: Vec::new(),
        term_duration: batch.term_duration,
        next_voter_set: Some(batch.next_voter_set),
        vote_count: Some(batch.vote_count),
        voter_count: Some(batch.voter_count),
        candidacy_bond: None,
        voting_bond: None,
    }
}

fn derive_from_parts(parts: Vec<StorageValue>) -> Result<DerivedElectionsInfo, CoreError> {
    let [candidates, batch]: [StorageValue; 2] =
        parts.try_into().map_err(|_| CoreError::UnexpectedShape {
            key: key("candidates"),
            expected: "candidates and batch",
        })?;
    let candidates = candidates.into_accounts(&key("candidates"))?;
    let batch = CountedSetBatch::from_values(batch.into_tuple(&batch_key())?)?;
    Ok(derive(candidates, batch))
}

/// Subscribe to candidates and the batched query, emitting a fresh
/// `DerivedElectionsInfo` whenever either changes.
pub fn query(backend: &dyn ChainBackend) -> LiveStream<DerivedElectionsInfo> {
    let batch_keys: Vec<StorageKey> = BATCH_ITEMS.iter().map(|item| key(item)).collect();

    let candidates = backend
        .subscribe(&key("candidates"))
        .map_ok(normalize_candidates)
        .boxed();
    let batch = backend
        .subscribe_multi(&batch_keys)
        .map_ok(StorageValue::Tuple)
        .boxed();

    map_live(combine_latest(vec![candidates, batch]), derive_from_parts)
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::backend::mock::MockChain;
    use crate::test_util::{account_blocks, accounts, push_counted_set_batch};

    #[test]
    fn derive_zeroes_member_balances_and_has_no_runners_up() {
        let batch = CountedSetBatch {
            candidate_count: 1,
            desired_seats: 4,
            members: account_blocks(&[("A", 900), ("B", 950)]),
            next_voter_set: 0,
            term_duration: 10,
            vote_count: 2,
            voter_count: 3,
        };
        let info = derive(accounts(&["C"]), batch);
        assert_eq!(
            info.members,
            vec![
                (AccountId::from("A"), Balance(0)),
                (AccountId::from("B"), Balance(0)),
            ]
        );
        assert!(info.runners_up.is_empty());
        assert_eq!(info.candidacy_bond, None);
    }

    #[tokio::test]
    async fn end_to_end_scenario() {
        let chain = MockChain::builder().with_module(MODULE).build();
        chain.push(MODULE, "candidates", StorageValue::Accounts(accounts(&["X", "Y"])));
        push_counted_set_batch(&chain, (2, 5, account_blocks(&[("X", 100)]), 3, 50, 7, 9));

        let info = query(&chain).next().await.unwrap().unwrap();
        assert_eq!(
            info,
            DerivedElectionsInfo {
                candidates: accounts(&["X", "Y"]),
                candidate_count: 2,
                desired_seats: 5,
                members: vec![(AccountId::from("X"), Balance(0))],
                runners_up: vec![],
                term_duration: 50,
                next_voter_set: Some(3),
                vote_count: Some(7),
                voter_count: Some(9),
                candidacy_bond: None,
                voting_bond: None,
            }
        );
        assert_eq!(chain.multi_subscription_count(), 1);
    }

    #[tokio::test]
    async fn empty_sentinel_candidates_become_an_empty_list() {
        let chain = MockChain::builder().with_module(MODULE).build();
        chain.push(MODULE, "candidates", StorageValue::Empty);
        push_counted_set_batch(&chain, (0, 5, vec![], 0, 50, 0, 0));

        let info = query(&chain).next().await.unwrap().unwrap();
        assert!(info.candidates.is_empty());
        assert_eq!(info.candidates.len(), 0);
    }

    #[tokio::test]
    async fn re_emits_when_candidates_change() {
        let chain = MockChain::builder().with_module(MODULE).build();
        chain.push(MODULE, "candidates", StorageValue::Empty);
        push_counted_set_batch(&chain, (0, 5, vec![], 0, 50, 0, 0));

        let mut stream = query(&chain);
        assert!(stream.next().await.unwrap().unwrap().candidates.is_empty());

        chain.push(MODULE, "candidates", StorageValue::Accounts(accounts(&["Z"])));
        let updated = stream.next().await.unwrap().unwrap();
        assert_eq!(updated.candidates, accounts(&["Z"]));
        assert_eq!(updated.desired_seats, 5);
    }

    #[tokio::test]
    async fn wrong_shape_in_batch_fails_the_stream() {
        let chain = MockChain::builder().with_module(MODULE).build();
        chain.push(MODULE, "candidates", StorageValue::Empty);
        push_counted_set_batch(&chain, (0, 5, vec![], 0, 50, 0, 0));
        chain.push(MODULE, "voteCount", StorageValue::Empty);

        let mut stream = query(&chain);
        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnexpectedShape {
                key: StorageKey::new(MODULE, "voteCount"),
                expected: "u32",
            }
        );
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn upstream_failure_fails_the_stream() {
        let chain = MockChain::builder().with_module(MODULE).build();
        chain.fail(MODULE, "candidates", CoreError::Rpc("decode failure".into()));
        push_counted_set_batch(&chain, (0, 5, vec![], 0, 50, 0, 0));

        let err = query(&chain).next().await.unwrap().unwrap_err();
        assert_eq!(err, CoreError::Rpc("decode failure".into()));
    }
}
