//! # Label Errors

use thiserror::Error;

/// Errors raised while encoding, decoding or verifying a seal label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LabelError {
    /// First TLV byte is not the NDEF message type (0x03)
    #[error("Unexpected type in TLV: {0:#04x}")]
    WrongTlvType(u8),

    #[error("Missing TLV terminator")]
    MissingTerminator,

    /// NDEF message does not fit a one-byte TLV length
    #[error("NDEF data too long: {len} bytes, limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("Truncated data: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("Malformed NDEF record: {0}")]
    MalformedRecord(String),

    #[error("Wrong payload length: expected {expected}, got {actual}")]
    PayloadLength { expected: usize, actual: usize },

    #[error("Wrong project signature: {}", hex::encode(.0))]
    WrongProjectSignature([u8; 8]),

    #[error("Wrong format version: {}", hex::encode(.0))]
    WrongFormatVersion([u8; 2]),

    #[error("Incorrect label checksum: on chip {}, should be {}", hex::encode(.stored), hex::encode(.computed))]
    ChecksumMismatch { stored: [u8; 2], computed: [u8; 2] },

    /// Tag UID must be exactly 7 bytes
    #[error("Invalid tag UID length: {0}")]
    InvalidUid(usize),

    /// Vendor originality signature must be exactly 32 bytes
    #[error("Invalid vendor signature length: {0}")]
    InvalidVendorSignature(usize),

    #[error("Invalid label signature length: {0}")]
    InvalidSignatureLength(usize),

    /// Header byte outside 27..=34
    #[error("Invalid recovery header: {0}")]
    InvalidRecoveryId(u8),

    #[error("Invalid signature format")]
    InvalidSignature,

    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// Signature is well-formed but was made by another key
    #[error("Label signature does not match the public key")]
    SignatureMismatch,

    #[error("Signing failed")]
    SigningFailed,

    /// Capability container size byte is not an NTAG213/215/216
    #[error("Unknown tag chip: capability size byte {0:#04x}")]
    UnknownChip(u8),

    #[error("The tag is already password-protected (AUTH0 {auth0:#04x})")]
    AlreadyProtected { auth0: u8 },

    #[error("Tag password authentication failed")]
    AuthenticationFailed,

    #[error("PACK mismatch. Expected: {}, received: {}", hex::encode(.expected), hex::encode(.received))]
    PackMismatch { expected: [u8; 2], received: Vec<u8> },
}
