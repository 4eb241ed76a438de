//! Spec-version dependent type overrides.
//!
//! A runtime's type definitions drift across spec versions. An
//! [`OverrideTable`] records, per inclusive version interval, which concrete
//! decode target each logical type name maps to, on top of a shared base
//! mapping. [`resolve_overrides`] picks the mapping for one version.

mod known;

pub use known::KnownSpecs;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Logical type name to concrete decode target type name.
pub type TypeMap = BTreeMap<String, String>;

// ==============================================================================
// Version Range
// ==============================================================================

/// An inclusive interval of spec versions, optionally open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionRange {
    Bounded { min: u32, max: u32 },
    Unbounded { min: u32 },
}

impl VersionRange {
    pub fn min(&self) -> u32 {
        match *self {
            Self::Bounded { min, .. } | Self::Unbounded { min } => min,
        }
    }

    /// Upper bound, or `None` when open-ended.
    pub fn max(&self) -> Option<u32> {
        match *self {
            Self::Bounded { max, .. } => Some(max),
            Self::Unbounded { .. } => None,
        }
    }

    pub fn contains(&self, version: u32) -> bool {
        version >= self.min() && self.max().map_or(true, |max| version <= max)
    }
}

impl From<(u32, Option<u32>)> for VersionRange {
    fn from((min, max): (u32, Option<u32>)) -> Self {
        match max {
            Some(max) => Self::Bounded { min, max },
            None => Self::Unbounded { min },
        }
    }
}

impl std::fmt::Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bounded { min, max } => write!(f, "[{min}, {max}]"),
            Self::Unbounded { min } => write!(f, "[{min}, ..)"),
        }
    }
}

// ==============================================================================
// Override Table
// ==============================================================================

/// The overrides that apply within one version interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedOverrides {
    pub range: VersionRange,
    pub types: TypeMap,
}

/// A validated, immutable table of versioned overrides.
///
/// Intervals are ascending and contiguous, and only the last may be
/// open-ended. Built once through [`OverrideTable::builder`] or
/// [`OverrideTable::from_json_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideTable {
    base: TypeMap,
    intervals: Vec<VersionedOverrides>,
}

impl OverrideTable {
    pub fn builder() -> OverrideTableBuilder {
        OverrideTableBuilder {
            base: TypeMap::new(),
            intervals: Vec::new(),
        }
    }

    /// Parse the declarative JSON form:
    ///
    /// ```json
    /// {
    ///   "base": { "Address": "AccountId" },
    ///   "versioned": [
    ///     { "minmax": [0, 9], "types": { "RefCount": "RefCountTo259" } },
    ///     { "minmax": [10, null], "types": {} }
    ///   ]
    /// }
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let source: OverrideTableSource = serde_json::from_str(json)?;
        source.versioned.into_iter().fold(
            Self::builder().base(source.base),
            |builder, entry| builder.interval(entry.minmax.into(), entry.types),
        )
        .build()
    }

    pub fn base(&self) -> &TypeMap {
        &self.base
    }

    pub fn intervals(&self) -> &[VersionedOverrides] {
        &self.intervals
    }

    /// The interval containing `version`, if any.
    pub fn interval_for(&self, version: u32) -> Option<&VersionedOverrides> {
        // Intervals are sorted and disjoint: the only candidate is the last
        // one starting at or below `version`.
        let idx = self
            .intervals
            .partition_point(|entry| entry.range.min() <= version);
        let candidate = self.intervals.get(idx.checked_sub(1)?)?;
        candidate.range.contains(version).then_some(candidate)
    }

    /// See [`resolve_overrides`].
    pub fn resolve(&self, version: u32) -> TypeMap {
        let mut resolved = self.base.clone();
        if let Some(entry) = self.interval_for(version) {
            resolved.extend(
                entry
                    .types
                    .iter()
                    .map(|(name, target)| (name.clone(), target.clone())),
            );
        }
        resolved
    }
}

/// The type overrides in force at `version`: the table's base mapping with
/// the entries of the interval containing `version` layered on top.
///
/// A version outside every interval (older or newer than the table knows
/// about) gets the base mapping alone.
pub fn resolve_overrides(table: &OverrideTable, version: u32) -> TypeMap {
    table.resolve(version)
}

// ==============================================================================
// Builder
// ==============================================================================

pub struct OverrideTableBuilder {
    base: TypeMap,
    intervals: Vec<VersionedOverrides>,
}

impl OverrideTableBuilder {
    /// Add entries to the shared base mapping.
    pub fn base<I, K, V>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.base
            .extend(types.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Append an interval. Intervals must be added in ascending order.
    pub fn interval<I, K, V>(mut self, range: VersionRange, types: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.intervals.push(VersionedOverrides {
            range,
            types: types.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        });
        self
    }

    pub fn build(self) -> Result<OverrideTable, CoreError> {
        let last = self.intervals.len().saturating_sub(1);
        for (idx, entry) in self.intervals.iter().enumerate() {
            match entry.range {
                VersionRange::Bounded { min, max } if min > max => {
                    return Err(CoreError::InvalidOverrideTable(format!(
                        "interval {} has min greater than max",
                        entry.range
                    )));
                }
                VersionRange::Unbounded { .. } if idx != last => {
                    return Err(CoreError::InvalidOverrideTable(format!(
                        "open-ended interval {} must be the last one",
                        entry.range
                    )));
                }
                _ => {}
            }

            if let Some(prev) = idx.checked_sub(1).map(|p| &self.intervals[p]) {
                // `prev` is bounded: only the last interval may be open-ended.
                let prev_max = prev.range.max().unwrap_or(u32::MAX);
                if prev_max.checked_add(1) != Some(entry.range.min()) {
                    return Err(CoreError::InvalidOverrideTable(format!(
                        "interval {} does not directly follow {}",
                        entry.range, prev.range
                    )));
                }
            }
        }

        Ok(OverrideTable {
            base: self.base,
            intervals: self.intervals,
        })
    }
}

// ==============================================================================
// Declarative Source
// ==============================================================================

#[derive(Debug, Deserialize, Serialize)]
struct OverrideTableSource {
    #[serde(default)]
    base: TypeMap,
    #[serde(default)]
    versioned: Vec<VersionedSource>,
}

#[derive(Debug, Deserialize, Serialize)]
struct VersionedSource {
    minmax: (u32, Option<u32>),
    #[serde(default)]
    types: TypeMap,
}
