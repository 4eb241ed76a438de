//! Domain types shared across the crate.
//!
//! Contains the chain primitives (`AccountId`, `Balance`, `BlockNumber`),
//! the decoded storage shapes delivered by the collaborator layer
//! (`StorageKey`, `StorageValue`), and the derived election record
//! (`DerivedElectionsInfo`).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ==============================================================================
// Chain Primitives
// ==============================================================================

/// An opaque account identifier, as rendered by the node (e.g. SS58).
///
/// `#[serde(transparent)]` keeps the JSON representation a bare string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A token amount. `Balance::default()` is zero.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Balance(pub u128);

impl From<u128> for Balance {
    fn from(v: u128) -> Self {
        Self(v)
    }
}

impl std::fmt::Display for Balance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

pub type BlockNumber = u32;

// ==============================================================================
// Storage Keys and Values
// ==============================================================================

/// Names a single storage entry (or constant) of a runtime module,
/// e.g. `elections.candidates`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StorageKey {
    pub module: String,
    pub item: String,
}

impl StorageKey {
    pub fn new(module: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            item: item.into(),
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.module, self.item)
    }
}

/// A storage value as already decoded by the collaborator layer.
///
/// `Empty` is the null-like sentinel some queries return in place of an
/// empty list. `Tuple` carries the ordered results of a batched query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageValue {
    Empty,
    U32(u32),
    Balance(Balance),
    Accounts(Vec<AccountId>),
    AccountBlocks(Vec<(AccountId, BlockNumber)>),
    AccountBalances(Vec<(AccountId, Balance)>),
    Tuple(Vec<StorageValue>),
}

impl StorageValue {
    fn shape_error(key: &StorageKey, expected: &'static str) -> CoreError {
        CoreError::UnexpectedShape {
            key: key.clone(),
            expected,
        }
    }

    pub fn into_u32(self, key: &StorageKey) -> Result<u32, CoreError> {
        match self {
            Self::U32(v) => Ok(v),
            _ => Err(Self::shape_error(key, "u32")),
        }
    }

    pub fn into_balance(self, key: &StorageKey) -> Result<Balance, CoreError> {
        match self {
            Self::Balance(v) => Ok(v),
            _ => Err(Self::shape_error(key, "balance")),
        }
    }

    pub fn into_accounts(self, key: &StorageKey) -> Result<Vec<AccountId>, CoreError> {
        match self {
            Self::Accounts(v) => Ok(v),
            _ => Err(Self::shape_error(key, "account list")),
        }
    }

    pub fn into_account_blocks(
        self,
        key: &StorageKey,
    ) -> Result<Vec<(AccountId, BlockNumber)>, CoreError> {
        match self {
            Self::AccountBlocks(v) => Ok(v),
            _ => Err(Self::shape_error(key, "(account, block) list")),
        }
    }

    pub fn into_account_balances(
        self,
        key: &StorageKey,
    ) -> Result<Vec<(AccountId, Balance)>, CoreError> {
        match self {
            Self::AccountBalances(v) => Ok(v),
            _ => Err(Self::shape_error(key, "(account, balance) list")),
        }
    }

    pub fn into_tuple(self, key: &StorageKey) -> Result<Vec<StorageValue>, CoreError> {
        match self {
            Self::Tuple(v) => Ok(v),
            _ => Err(Self::shape_error(key, "tuple")),
        }
    }
}

// ==============================================================================
// Derived Election Info
// ==============================================================================

/// The combined view of the election module, rebuilt on every upstream
/// change.
///
/// Variant-specific fields are `None` when the active module does not carry
/// them: the vote/voter counters only exist on the counted-set module, the
/// bonds only on the ranked-ballot module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedElectionsInfo {
    pub candidates: Vec<AccountId>,
    pub candidate_count: u32,
    pub desired_seats: u32,
    pub members: Vec<(AccountId, Balance)>,
    /// Always empty on the counted-set module.
    pub runners_up: Vec<(AccountId, Balance)>,
    pub term_duration: BlockNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_voter_set: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voter_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidacy_bond: Option<Balance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voting_bond: Option<Balance>,
}
