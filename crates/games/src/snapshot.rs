//! Opaque byte snapshots of game trees.
//!
//! Several algorithms are compared on the same hidden tree by snapshotting
//! it before each run and restoring it afterwards. Snapshots are MessagePack
//! with named fields and round-trip the full node table exactly.

use pathology_core::{PathologyError, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Encode a value into snapshot bytes.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(value).map_err(|e| PathologyError::Snapshot(e.to_string()))
}

/// Decode snapshot bytes produced by [`encode`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    rmp_serde::from_slice(bytes).map_err(|e| PathologyError::Snapshot(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_rejected() {
        let err = decode::<crate::SyntheticTree>(&[0xc1, 0x00, 0x13]).unwrap_err();
        assert!(matches!(err, PathologyError::Snapshot(_)));
    }
}
