//! # Seal Label
//!
//! Codec for the NFC labels that bind a physical tag to a registry seal,
//! and the secp256k1 signatures that make a label tamper-evident.
//!
//! ## Layers
//!
//! - `codec`: the 93-byte label payload and its tag framing
//! - `ndef`: NDEF record and TLV block encoding
//! - `seed`: signing seed (tag UID, issuer, sequence, vendor signature) and
//!   tag password derivation
//! - `signature`: recoverable label signatures
//! - `tag`: NTAG chip layout, write protection and PWD_AUTH checks
//!
//! ## Flow
//!
//! ```ignore
//! use seal_label::{issue_label, Label};
//!
//! // Issuer side: sign and write.
//! let label = issue_label(&uid, &vendor_sig, 100, 4, &signing_key)?;
//! reader.write(4, &label.to_tag_bytes()?)?;
//!
//! // Verifier side: read, decode, check against the registered key.
//! let label = Label::from_tag_bytes(&reader.read(4, 144)?)?;
//! label.verify(&uid, &vendor_sig, &registered_key)?;
//! ```

pub mod codec;
pub mod error;
pub mod ndef;
pub mod seed;
pub mod signature;
pub mod tag;

pub use codec::{Label, FORMAT_VERSION, PAYLOAD_LEN, PROJECT_SIGNATURE};
pub use error::LabelError;
pub use seed::{LabelSeed, TagPassword};
pub use signature::{
    compressed_public_key, recover_label_key, sign_label, verify_label, LabelSignature,
};
pub use tag::{NtagChip, TagConfig, LABEL_AREA_LEN, LABEL_START_PAGE};

pub use k256::ecdsa::{SigningKey, VerifyingKey};

/// Signs a new label for the tag identified by `uid` and `vendor_signature`.
pub fn issue_label(
    uid: &[u8],
    vendor_signature: &[u8],
    issuer_id: u64,
    sequence_number: u64,
    signing_key: &SigningKey,
) -> Result<Label, LabelError> {
    let seed = LabelSeed::new(uid, issuer_id, sequence_number, vendor_signature)?;
    let signature = sign_label(&seed, signing_key)?;
    tracing::debug!(issuer_id, sequence_number, "Label signed");
    Ok(Label::new(issuer_id, sequence_number, signature))
}
