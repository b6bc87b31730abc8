use serde::Serialize;
use serde::de::DeserializeOwned;

/// Failure to move a snapshot across the MessagePack boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    Encode(String),
    Decode(String),
    /// Decoded fine but violates a state invariant.
    Invalid(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(m) => write!(f, "snapshot encode failed: {m}"),
            Self::Decode(m) => write!(f, "snapshot decode failed: {m}"),
            Self::Invalid(m) => write!(f, "snapshot rejected: {m}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Encode a snapshot as MessagePack with named fields.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, SnapshotError> {
    rmp_serde::to_vec_named(value).map_err(|e| SnapshotError::Encode(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SnapshotError> {
    rmp_serde::from_slice(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))
}
