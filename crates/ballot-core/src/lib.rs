pub mod backend;
pub mod elections;
pub mod error;
pub mod live;
pub mod memo;
pub mod overrides;
pub mod types;

#[cfg(test)]
mod test_util;

pub use elections::{ElectionsApi, ElectionsStrategy};
pub use error::CoreError;
pub use overrides::{resolve_overrides, KnownSpecs, OverrideTable, VersionRange};
pub use types::DerivedElectionsInfo;
