//! Value objects for the seal registry.
//!
//! Identifiers, ordering keys and the opaque byte/string wrappers that
//! entities carry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Issuer identifier, chosen by the issuer at registration.
pub type IssuerId = u64;

/// Per-issuer sequence number of a seal.
pub type SequenceNumber = u64;

/// Workflow identifier, chosen by the issuer.
pub type WorkflowId = u64;

/// Autoincrement primary key of a stored row.
pub type RowId = u64;

/// Unix time in seconds.
pub type Timestamp = u64;

/// Seconds in one day, used to turn `expires_in_days` into a timestamp.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// 128-bit ordering key `(issuer_id << 64) | sequence_number`.
///
/// All per-issuer range lookups (key intervals, workflows, seals) go through
/// this key so that one issuer's rows are contiguous in every ordered index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceKey(u128);

impl SequenceKey {
    /// Packs an issuer id and a sequence number.
    pub const fn pack(issuer_id: IssuerId, sequence_number: SequenceNumber) -> Self {
        Self(((issuer_id as u128) << 64) | sequence_number as u128)
    }

    /// Smallest key belonging to `issuer_id`.
    pub const fn first_of(issuer_id: IssuerId) -> Self {
        Self::pack(issuer_id, 0)
    }

    /// Largest key belonging to `issuer_id`.
    pub const fn last_of(issuer_id: IssuerId) -> Self {
        Self::pack(issuer_id, SequenceNumber::MAX)
    }

    pub const fn issuer_id(self) -> IssuerId {
        (self.0 >> 64) as IssuerId
    }

    pub const fn sequence_number(self) -> SequenceNumber {
        self.0 as SequenceNumber
    }

    pub const fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.issuer_id(), self.sequence_number())
    }
}

/// Opaque account name, validated for existence by an
/// [`AccountDirectory`](crate::ports::AccountDirectory).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountName(String);

impl AccountName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AccountName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Serialized public key bytes (e.g. a 33-byte compressed secp256k1 point).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Parses a hex-encoded key.
    pub fn from_hex(encoded: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(encoded).map(Self)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.0))
    }
}

/// 32-byte public key fingerprint, unique across the store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// SHA-256 of the on-tag signature that a seal attests.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureHash(pub [u8; 32]);

impl fmt::Debug for SignatureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureHash({})", hex::encode(&self.0[..8]))
    }
}

/// Issuer-defined seal status (e.g. `shipped`, `received`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SealStatus(String);

impl SealStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SealStatus {
    fn from(status: &str) -> Self {
        Self::new(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_key_packs_with_or() {
        let key = SequenceKey::pack(100, 10);
        assert_eq!(key.as_u128(), (100u128 << 64) | 10);
        assert_eq!(key.issuer_id(), 100);
        assert_eq!(key.sequence_number(), 10);

        // AND packing would collapse every sequence number to zero.
        assert_ne!(key.as_u128(), (100u128 << 64) & 10);
        assert_ne!(SequenceKey::pack(1, 5), SequenceKey::pack(1, 6));
    }

    #[test]
    fn test_sequence_key_orders_by_issuer_then_sequence() {
        assert!(SequenceKey::pack(1, u64::MAX) < SequenceKey::pack(2, 0));
        assert!(SequenceKey::pack(2, 3) < SequenceKey::pack(2, 4));
        assert_eq!(SequenceKey::first_of(7), SequenceKey::pack(7, 0));
        assert_eq!(SequenceKey::last_of(u64::MAX).as_u128(), u128::MAX);
    }

    #[test]
    fn test_sequence_key_display() {
        assert_eq!(SequenceKey::pack(100, 42).to_string(), "100:42");
    }

    #[test]
    fn test_public_key_from_hex() {
        let key = PublicKey::from_hex("02abcd").unwrap();
        assert_eq!(key.as_bytes(), &[0x02, 0xab, 0xcd]);
        assert!(PublicKey::from_hex("zz").is_err());
    }

    #[test]
    fn test_account_name_conversions() {
        let alice = AccountName::from("alice");
        assert_eq!(alice.as_str(), "alice");
        assert_eq!(alice, AccountName::new(String::from("alice")));
        assert!(!alice.is_empty());
    }
}
