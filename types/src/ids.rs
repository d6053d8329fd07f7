//! Transfer identifiers.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a transfer initiated on a remote chain.
///
/// Reporters observing the same remote event derive the same id (see
/// [`ExternalTransferId::derive`]). The zero id is "unkeyed": such transfers
/// finalize without leaving a settlement completion record behind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalTransferId(u64);

impl ExternalTransferId {
    pub const UNKEYED: Self = Self(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_unkeyed(&self) -> bool {
        self.0 == 0
    }

    /// Derive the id for a remote transfer from the source transaction hash and
    /// the per-chain transfer counter carried in the source event.
    ///
    /// The first 16 hex digits of the hash are read as a big-endian `u64` and
    /// XORed with `source_transfer_id`.
    pub fn derive(source_tx_hash: &str, source_transfer_id: u64) -> Result<Self, TypesError> {
        let prefix = source_tx_hash
            .strip_prefix("0x")
            .unwrap_or(source_tx_hash)
            .get(..16)
            .ok_or_else(|| TypesError::InvalidHash(source_tx_hash.to_string()))?;
        let mut bytes = [0u8; 8];
        hex::decode_to_slice(prefix, &mut bytes)
            .map_err(|e| TypesError::InvalidHash(e.to_string()))?;
        Ok(Self(u64::from_be_bytes(bytes) ^ source_transfer_id))
    }
}

impl fmt::Display for ExternalTransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ExternalTransferId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Sequence number of a locally initiated outbound transfer. Never reused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceId(u64);

impl SequenceId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SequenceId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
