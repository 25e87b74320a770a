//! Signing seed and tag password derivation.
//!
//! The seed ties a label signature to one physical tag: it mixes the tag's
//! factory UID and its vendor originality signature with the seal's
//! `(issuer_id, sequence_number)`. Copying the label to another tag changes
//! the seed and breaks the signature.

use sha2::{Digest, Sha256};

use crate::error::LabelError;

pub const TAG_UID_LEN: usize = 7;
pub const VENDOR_SIGNATURE_LEN: usize = 32;
/// uid (7) | issuer id (8) | sequence number (8) | vendor signature (32)
pub const SEED_LEN: usize = TAG_UID_LEN + 8 + 8 + VENDOR_SIGNATURE_LEN;

/// Bytes a label signature is computed over.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LabelSeed([u8; SEED_LEN]);

impl LabelSeed {
    pub fn new(
        uid: &[u8],
        issuer_id: u64,
        sequence_number: u64,
        vendor_signature: &[u8],
    ) -> Result<Self, LabelError> {
        if uid.len() != TAG_UID_LEN {
            return Err(LabelError::InvalidUid(uid.len()));
        }
        if vendor_signature.len() != VENDOR_SIGNATURE_LEN {
            return Err(LabelError::InvalidVendorSignature(vendor_signature.len()));
        }

        let mut seed = [0u8; SEED_LEN];
        seed[..7].copy_from_slice(uid);
        seed[7..15].copy_from_slice(&issuer_id.to_be_bytes());
        seed[15..23].copy_from_slice(&sequence_number.to_be_bytes());
        seed[23..].copy_from_slice(vendor_signature);
        Ok(Self(seed))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// SHA-256 of the seed; the prehash that gets signed.
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.0).into()
    }
}

impl std::fmt::Debug for LabelSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LabelSeed({})", hex::encode(self.0))
    }
}

/// NTAG write-protection credentials derived from a passphrase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagPassword {
    /// 4-byte PWD written to the tag
    pub password: [u8; 4],
    /// 2-byte PACK the tag answers a correct PWD_AUTH with
    pub pack: [u8; 2],
}

impl TagPassword {
    /// `SHA-256(passphrase | uid)`: bytes 0..4 are the password, 4..6 the PACK.
    pub fn derive(passphrase: &[u8], uid: &[u8]) -> Self {
        let hash = Sha256::new().chain_update(passphrase).chain_update(uid).finalize();
        Self {
            password: [hash[0], hash[1], hash[2], hash[3]],
            pack: [hash[4], hash[5]],
        }
    }
}
