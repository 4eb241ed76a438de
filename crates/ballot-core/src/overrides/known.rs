use std::collections::BTreeMap;

use crate::error::CoreError;

use super::{OverrideTable, TypeMap, VersionRange};

/// Override tables for known runtimes, keyed by spec name.
#[derive(Debug, Clone, Default)]
pub struct KnownSpecs {
    tables: BTreeMap<String, OverrideTable>,
}

impl KnownSpecs {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tables shipped with the crate.
    pub fn builtin() -> Result<Self, CoreError> {
        let mut specs = Self::new();
        specs.insert("rococo", rococo()?);
        Ok(specs)
    }

    pub fn insert(&mut self, spec_name: impl Into<String>, table: OverrideTable) {
        self.tables.insert(spec_name.into(), table);
    }

    /// Parse and register a table in the declarative JSON form.
    pub fn insert_json(&mut self, spec_name: impl Into<String>, json: &str) -> Result<(), CoreError> {
        let table = OverrideTable::from_json_str(json)?;
        self.insert(spec_name, table);
        Ok(())
    }

    pub fn get(&self, spec_name: &str) -> Option<&OverrideTable> {
        self.tables.get(spec_name)
    }

    pub fn spec_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Overrides for `spec_name` at `version`. A runtime without a table
    /// needs no overrides.
    pub fn resolve(&self, spec_name: &str, version: u32) -> TypeMap {
        self.get(spec_name)
            .map(|table| table.resolve(version))
            .unwrap_or_default()
    }
}

/// Rococo: before spec 10 the staking and refcount types used their older
/// encodings.
fn rococo() -> Result<OverrideTable, CoreError> {
    OverrideTable::builder()
        .base([
            ("AccountInfo", "AccountInfoWithRefCount"),
            ("Address", "AccountId"),
            ("Keys", "SessionKeys5"),
            ("LookupSource", "AccountId"),
        ])
        .interval(
            VersionRange::Bounded { min: 0, max: 9 },
            [
                ("CompactAssignments", "CompactAssignmentsTo257"),
                ("RefCount", "RefCountTo259"),
                ("RewardDestination", "RewardDestinationTo257"),
            ],
        )
        .interval(VersionRange::Unbounded { min: 10 }, TypeMap::new())
        .build()
}
