//! # Label Signatures (secp256k1)
//!
//! A label signature is 65 bytes: a recovery header followed by `r | s`.
//! The header is `27 + 4 + recovery_id`, the compressed-key form used by
//! EOSIO-style signatures. The signed message is SHA-256 of the
//! [`LabelSeed`].
//!
//! Verification recovers the signer from the signature and compares it to
//! the expected key, so a header that points at the wrong recovery id fails
//! the same way as a foreign signature.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use tracing::debug;

use crate::error::LabelError;
use crate::seed::LabelSeed;

pub const LABEL_SIGNATURE_LEN: usize = 65;

const HEADER_BASE: u8 = 27;
const HEADER_COMPRESSED: u8 = 4;

/// Recoverable signature as stored on the tag.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LabelSignature(pub [u8; LABEL_SIGNATURE_LEN]);

impl LabelSignature {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LabelError> {
        let bytes: [u8; LABEL_SIGNATURE_LEN] = bytes
            .try_into()
            .map_err(|_| LabelError::InvalidSignatureLength(bytes.len()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn recovery_id(&self) -> Result<RecoveryId, LabelError> {
        let header = self.0[0];
        if !(HEADER_BASE..HEADER_BASE + 8).contains(&header) {
            return Err(LabelError::InvalidRecoveryId(header));
        }
        RecoveryId::try_from((header - HEADER_BASE) & 0x03)
            .map_err(|_| LabelError::InvalidRecoveryId(header))
    }

    fn signature(&self) -> Result<Signature, LabelError> {
        let signature =
            Signature::from_slice(&self.0[1..]).map_err(|_| LabelError::InvalidSignature)?;
        if signature.normalize_s().is_some() {
            return Err(LabelError::MalleableSignature);
        }
        Ok(signature)
    }
}

impl std::fmt::Debug for LabelSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LabelSignature({})", hex::encode(self.0))
    }
}

/// Signs a label seed.
pub fn sign_label(seed: &LabelSeed, signing_key: &SigningKey) -> Result<LabelSignature, LabelError> {
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(&seed.digest())
        .map_err(|_| LabelError::SigningFailed)?;

    let mut out = [0u8; LABEL_SIGNATURE_LEN];
    out[0] = HEADER_BASE + HEADER_COMPRESSED + recovery_id.to_byte();
    out[1..].copy_from_slice(&signature.to_bytes());
    Ok(LabelSignature(out))
}

/// Recovers the key that produced `signature` over `seed`.
pub fn recover_label_key(
    seed: &LabelSeed,
    signature: &LabelSignature,
) -> Result<VerifyingKey, LabelError> {
    let recovery_id = signature.recovery_id()?;
    let sig = signature.signature()?;
    VerifyingKey::recover_from_prehash(&seed.digest(), &sig, recovery_id)
        .map_err(|_| LabelError::RecoveryFailed)
}

/// Checks `signature` over `seed` against a SEC1-encoded public key.
pub fn verify_label(
    seed: &LabelSeed,
    signature: &LabelSignature,
    public_key: &[u8],
) -> Result<(), LabelError> {
    let expected =
        VerifyingKey::from_sec1_bytes(public_key).map_err(|_| LabelError::InvalidPublicKey)?;
    let recovered = recover_label_key(seed, signature)?;
    if recovered != expected {
        debug!(
            expected = %hex::encode(public_key),
            recovered = %hex::encode(compressed_public_key(&recovered)),
            "Label signature from unexpected key"
        );
        return Err(LabelError::SignatureMismatch);
    }
    Ok(())
}

/// 33-byte compressed SEC1 encoding, the form registered as an issuer key.
pub fn compressed_public_key(key: &VerifyingKey) -> Vec<u8> {
    key.to_encoded_point(true).as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signing_key(byte: u8) -> SigningKey {
        SigningKey::from_slice(&[byte; 32]).unwrap()
    }

    fn seed(sequence_number: u64) -> LabelSeed {
        LabelSeed::new(&[4, 1, 2, 3, 4, 5, 6], 100, sequence_number, &[0xAB; 32]).unwrap()
    }

    #[test]
    fn test_sign_and_verify() {
        let key = signing_key(0x11);
        let public_key = compressed_public_key(key.verifying_key());
        assert_eq!(public_key.len(), 33);

        let sig = sign_label(&seed(7), &key).unwrap();
        assert!((31..=34).contains(&sig.0[0]));
        assert_eq!(verify_label(&seed(7), &sig, &public_key), Ok(()));
    }

    #[test]
    fn test_verify_rejects_other_key_and_other_seed() {
        let key = signing_key(0x11);
        let other = compressed_public_key(signing_key(0x22).verifying_key());
        let sig = sign_label(&seed(7), &key).unwrap();

        assert_eq!(
            verify_label(&seed(7), &sig, &other),
            Err(LabelError::SignatureMismatch)
        );
        // Same signature presented for a different sequence number.
        let own = compressed_public_key(key.verifying_key());
        assert!(verify_label(&seed(8), &sig, &own).is_err());
    }

    #[test]
    fn test_recover_matches_signer() {
        let key = signing_key(0x33);
        let sig = sign_label(&seed(1), &key).unwrap();
        let recovered = recover_label_key(&seed(1), &sig).unwrap();
        assert_eq!(&recovered, key.verifying_key());
    }

    #[test]
    fn test_bad_header_and_lengths() {
        let key = signing_key(0x11);
        let mut sig = sign_label(&seed(1), &key).unwrap();
        sig.0[0] = 0x05;
        assert_eq!(
            recover_label_key(&seed(1), &sig).unwrap_err(),
            LabelError::InvalidRecoveryId(0x05)
        );
        for header in [26u8, 35] {
            sig.0[0] = header;
            assert_eq!(
                recover_label_key(&seed(1), &sig).unwrap_err(),
                LabelError::InvalidRecoveryId(header)
            );
        }
        // Both ends of the accepted range parse; 27 is uncompressed, 34 compressed.
        for header in [27u8, 34] {
            sig.0[0] = header;
            assert!(!matches!(
                recover_label_key(&seed(1), &sig),
                Err(LabelError::InvalidRecoveryId(_))
            ));
        }

        assert_eq!(
            LabelSignature::from_slice(&[0; 64]).unwrap_err(),
            LabelError::InvalidSignatureLength(64)
        );
        assert_eq!(
            verify_label(&seed(1), &sig, &[0x02; 5]).unwrap_err(),
            LabelError::InvalidPublicKey
        );
    }

    #[test]
    fn test_zero_signature_rejected() {
        let mut bytes = [0u8; LABEL_SIGNATURE_LEN];
        bytes[0] = 31;
        let sig = LabelSignature(bytes);
        assert_eq!(
            recover_label_key(&seed(1), &sig).unwrap_err(),
            LabelError::InvalidSignature
        );
    }
}
