//! # Label Payload Codec
//!
//! ```text
//! offset  len  field
//!      0    8  project signature 07 6c f3 1a 2b 7f 35 a3
//!      8    2  format version 00 01
//!     10    8  issuer id (big endian)
//!     18    8  sequence number (big endian)
//!     26   65  label signature
//!     91    2  SHA-256 of bytes 0..91, first two bytes
//! ```
//!
//! The payload travels as an NDEF record whose id is
//! `issuer id | sequence number`, inside a page-padded TLV block.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::LabelError;
use crate::ndef::{unwrap_tlv, wrap_tlv, NdefRecord, TNF_UNKNOWN};
use crate::seed::LabelSeed;
use crate::signature::{verify_label, LabelSignature, LABEL_SIGNATURE_LEN};

pub const PROJECT_SIGNATURE: [u8; 8] = [0x07, 0x6c, 0xf3, 0x1a, 0x2b, 0x7f, 0x35, 0xa3];
pub const FORMAT_VERSION: [u8; 2] = [0x00, 0x01];
pub const CHECKSUM_LEN: usize = 2;
pub const PAYLOAD_LEN: usize = 8 + 2 + 8 + 8 + LABEL_SIGNATURE_LEN + CHECKSUM_LEN;
pub const RECORD_ID_LEN: usize = 16;

const CHECKSUM_OFFSET: usize = PAYLOAD_LEN - CHECKSUM_LEN;

/// Decoded contents of a seal label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Label {
    pub issuer_id: u64,
    pub sequence_number: u64,
    pub signature: LabelSignature,
}

impl Label {
    pub fn new(issuer_id: u64, sequence_number: u64, signature: LabelSignature) -> Self {
        Self {
            issuer_id,
            sequence_number,
            signature,
        }
    }

    /// NDEF record id: `issuer id | sequence number`.
    pub fn record_id(&self) -> [u8; RECORD_ID_LEN] {
        let mut id = [0u8; RECORD_ID_LEN];
        id[..8].copy_from_slice(&self.issuer_id.to_be_bytes());
        id[8..].copy_from_slice(&self.sequence_number.to_be_bytes());
        id
    }

    pub fn encode_payload(&self) -> [u8; PAYLOAD_LEN] {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0..8].copy_from_slice(&PROJECT_SIGNATURE);
        payload[8..10].copy_from_slice(&FORMAT_VERSION);
        payload[10..18].copy_from_slice(&self.issuer_id.to_be_bytes());
        payload[18..26].copy_from_slice(&self.sequence_number.to_be_bytes());
        payload[26..CHECKSUM_OFFSET].copy_from_slice(self.signature.as_bytes());
        let checksum = checksum(&payload[..CHECKSUM_OFFSET]);
        payload[CHECKSUM_OFFSET..].copy_from_slice(&checksum);
        payload
    }

    /// Parses a payload, checking signature bytes, version and checksum in
    /// layout order.
    pub fn decode_payload(payload: &[u8]) -> Result<Self, LabelError> {
        if payload.len() != PAYLOAD_LEN {
            return Err(LabelError::PayloadLength {
                expected: PAYLOAD_LEN,
                actual: payload.len(),
            });
        }

        let project: [u8; 8] = array(&payload[0..8]);
        if project != PROJECT_SIGNATURE {
            return Err(LabelError::WrongProjectSignature(project));
        }
        let version: [u8; 2] = array(&payload[8..10]);
        if version != FORMAT_VERSION {
            return Err(LabelError::WrongFormatVersion(version));
        }

        let issuer_id = u64::from_be_bytes(array(&payload[10..18]));
        let sequence_number = u64::from_be_bytes(array(&payload[18..26]));
        let signature = LabelSignature(array(&payload[26..CHECKSUM_OFFSET]));

        let stored: [u8; CHECKSUM_LEN] = array(&payload[CHECKSUM_OFFSET..]);
        let computed = checksum(&payload[..CHECKSUM_OFFSET]);
        if stored != computed {
            debug!(
                stored = %hex::encode(stored),
                computed = %hex::encode(computed),
                "Label checksum mismatch"
            );
            return Err(LabelError::ChecksumMismatch { stored, computed });
        }

        Ok(Self::new(issuer_id, sequence_number, signature))
    }

    /// Bytes to write at page 4 of the tag.
    pub fn to_tag_bytes(&self) -> Result<Vec<u8>, LabelError> {
        let message = NdefRecord::unknown(&self.record_id(), &self.encode_payload())
            .encode_message()?;
        wrap_tlv(&message)
    }

    /// Parses raw tag memory read from page 4 onwards.
    pub fn from_tag_bytes(raw: &[u8]) -> Result<Self, LabelError> {
        let record = NdefRecord::decode_first(unwrap_tlv(raw)?)?;
        if record.tnf != TNF_UNKNOWN {
            return Err(LabelError::MalformedRecord(format!(
                "unexpected TNF {:#04x}",
                record.tnf
            )));
        }

        let label = Self::decode_payload(&record.payload)?;
        if record.id != label.record_id() {
            return Err(LabelError::MalformedRecord(
                "record id does not match payload".into(),
            ));
        }
        Ok(label)
    }

    /// Signing seed of this label on the tag with `uid` and `vendor_signature`.
    pub fn seed(&self, uid: &[u8], vendor_signature: &[u8]) -> Result<LabelSeed, LabelError> {
        LabelSeed::new(uid, self.issuer_id, self.sequence_number, vendor_signature)
    }

    /// Checks the label signature against `public_key` for the given tag.
    pub fn verify(
        &self,
        uid: &[u8],
        vendor_signature: &[u8],
        public_key: &[u8],
    ) -> Result<(), LabelError> {
        let seed = self.seed(uid, vendor_signature)?;
        verify_label(&seed, &self.signature, public_key)
    }
}

fn checksum(bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(bytes);
    [digest[0], digest[1]]
}

/// Copies a slice whose length the caller has already fixed.
fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}
