use crate::types::StorageKey;

/// Errors surfaced by the core.
///
/// `Clone` because a single upstream failure is delivered to every consumer
/// of a shared live value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("RPC communication failure: {0}")]
    Rpc(String),

    #[error("constant not found: {module}.{name}")]
    MissingConstant { module: String, name: String },

    #[error("unexpected value shape for {key}: expected {expected}")]
    UnexpectedShape {
        key: StorageKey,
        expected: &'static str,
    },

    #[error("invalid override table: {0}")]
    InvalidOverrideTable(String),

    #[error("invalid fixture: {0}")]
    Fixture(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
