//! Query plan and mapper for the `electionsPhragmen` module.
//!
//! Lists are fetched through independent single-key subscriptions rather
//! than the batched primitive, whose padding of empty lists differs; module
//! parameters are read once from runtime constants.

use futures::StreamExt;

use crate::backend::{ChainBackend, ConstantReader};
use crate::error::CoreError;
use crate::live::{combine_latest, map_live, LiveStream};
use crate::types::{AccountId, Balance, BlockNumber, DerivedElectionsInfo, StorageKey, StorageValue};

pub const MODULE: &str = "electionsPhragmen";

/// Storage items subscribed to, in combination order.
const ITEMS: [&str; 3] = ["candidates", "members", "runnersUp"];

fn key(item: &str) -> StorageKey {
    StorageKey::new(MODULE, item)
}

// ==============================================================================
// Module Constants
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedBallotConstants {
    pub candidacy_bond: Balance,
    pub desired_members: u32,
    pub term_duration: BlockNumber,
    pub voting_bond: Balance,
}

impl RankedBallotConstants {
    pub fn read<R: ConstantReader + ?Sized>(reader: &R) -> Result<Self, CoreError> {
        Ok(Self {
            candidacy_bond: reader
                .constant(MODULE, "candidacyBond")?
                .into_balance(&key("candidacyBond"))?,
            desired_members: reader
                .constant(MODULE, "desiredMembers")?
                .into_u32(&key("desiredMembers"))?,
            term_duration: reader
                .constant(MODULE, "termDuration")?
                .into_u32(&key("termDuration"))?,
            voting_bond: reader
                .constant(MODULE, "votingBond")?
                .into_balance(&key("votingBond"))?,
        })
    }
}

// ==============================================================================
// Mapper
// ==============================================================================

/// Order by balance, highest first. Stable, so equal balances keep their
/// upstream order.
fn rank(mut entries: Vec<(AccountId, Balance)>) -> Vec<(AccountId, Balance)> {
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

/// Build the derived view from the decoded lists and module constants.
pub fn derive(
    candidates: Vec<AccountId>,
    members: Vec<(AccountId, Balance)>,
    runners_up: Vec<(AccountId, Balance)>,
    constants: &RankedBallotConstants,
) -> DerivedElectionsInfo {
    DerivedElectionsInfo {
        candidate_count: u32::try_from(candidates.len()).unwrap_or(u32::MAX),
        candidates,
        desired_seats: constants.desired_members,
        members: rank(members),
        runners_up: rank(runners_up),
        term_duration: constants.term_duration,
        next_voter_set: None,
        vote_count: None,
        voter_count: None,
        candidacy_bond: Some(constants.candidacy_bond),
        voting_bond: Some(constants.voting_bond),
    }
}

fn derive_from_parts(
    parts: Vec<StorageValue>,
    constants: &RankedBallotConstants,
) -> Result<DerivedElectionsInfo, CoreError> {
    let [candidates, members, runners_up]: [StorageValue; 3] =
        parts.try_into().map_err(|_| CoreError::UnexpectedShape {
            key: key(&ITEMS.join(",")),
            expected: "3 values",
        })?;
    Ok(derive(
        candidates.into_accounts(&key("candidates"))?,
        members.into_account_balances(&key("members"))?,
        runners_up.into_account_balances(&key("runnersUp"))?,
        constants,
    ))
}

/// Read the module constants, then subscribe to candidates, members and
/// runners-up, emitting a fresh `DerivedElectionsInfo` whenever any of them
/// changes.
///
/// A failed constant read is delivered as the only item of the stream.
pub fn query(backend: &dyn ChainBackend) -> LiveStream<DerivedElectionsInfo> {
    let constants = match RankedBallotConstants::read(backend) {
        Ok(constants) => constants,
        Err(err) => return futures::stream::once(futures::future::ready(Err(err))).boxed(),
    };

    let sources = ITEMS
        .iter()
        .map(|item| backend.subscribe(&key(item)))
        .collect();
    map_live(combine_latest(sources), move |parts| {
        derive_from_parts(parts, &constants)
    })
}
