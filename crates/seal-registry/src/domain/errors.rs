//! Error types for the seal registry.
//!
//! Every failure is synchronous and discards the whole operation. Conditions
//! that can only arise from corrupted state are not errors; they panic via
//! [`invariant_violation`](super::invariants::invariant_violation).

use thiserror::Error;

use super::value_objects::{AccountName, Fingerprint, IssuerId, SequenceNumber, WorkflowId};

/// All errors that registry operations can return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Caller is not the account the operation requires.
    #[error("Unauthorized: {caller} may not {action}")]
    Unauthorized {
        caller: AccountName,
        action: &'static str,
    },

    #[error("Issuer not found: {0}")]
    IssuerNotFound(IssuerId),

    #[error("No key interval of issuer {issuer_id} covers sequence {sequence_number}")]
    KeyNotFound {
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    },

    #[error("Workflow not found: {issuer_id}/{workflow_id}")]
    WorkflowNotFound {
        issuer_id: IssuerId,
        workflow_id: WorkflowId,
    },

    #[error("Seal not found: {issuer_id}:{sequence_number}")]
    SealNotFound {
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    },

    #[error("Issuer ID already exists: {0}")]
    IssuerExists(IssuerId),

    #[error("Workflow ID already exists: {issuer_id}/{workflow_id}")]
    WorkflowExists {
        issuer_id: IssuerId,
        workflow_id: WorkflowId,
    },

    #[error("Invalid sequence range: {0}")]
    InvalidRange(String),

    #[error("Interval {seq_start}..={seq_end} overlaps existing {existing_start}..={existing_end}")]
    OverlappingInterval {
        seq_start: SequenceNumber,
        seq_end: SequenceNumber,
        existing_start: SequenceNumber,
        existing_end: SequenceNumber,
    },

    #[error("Public key already registered: {0}")]
    DuplicateKey(Fingerprint),

    #[error("Sequence number already sealed: {issuer_id}:{sequence_number}")]
    DuplicateSequence {
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    },

    #[error("Account does not exist: {0}")]
    UnknownAccount(AccountName),

    #[error("Unknown workflow: {issuer_id}/{workflow_id}")]
    UnknownWorkflow {
        issuer_id: IssuerId,
        workflow_id: WorkflowId,
    },

    #[error("No key interval of issuer {issuer_id} covers sequence {sequence_number}")]
    NoMatchingKey {
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    },

    #[error("Key covering {issuer_id}:{sequence_number} is revoked")]
    KeyRevoked {
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    },

    #[error("Key covering {issuer_id}:{sequence_number} is already revoked")]
    AlreadyRevoked {
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    },

    #[error("Presented key does not match the key registered for {issuer_id}:{sequence_number}")]
    KeyMismatch {
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    },

    #[error("Workflow {issuer_id}/{workflow_id} has {live_seals} active seals, cannot delete")]
    HasActiveSeals {
        issuer_id: IssuerId,
        workflow_id: WorkflowId,
        live_seals: u64,
    },

    #[error("Status is already {0}")]
    NoOpStatus(String),

    #[error("No expired seals to reap")]
    NothingToReap,

    #[error("Sequence numbers exhausted for issuer {issuer_id}")]
    SequenceOverflow { issuer_id: IssuerId },

    #[error("Expiry of {days} days is out of range")]
    InvalidExpiry { days: u32 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Coarse error taxonomy for callers that dispatch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    AlreadyExists,
    InvalidRange,
    OverlappingInterval,
    DuplicateKey,
    DuplicateSequence,
    UnknownAccount,
    UnknownWorkflow,
    NoMatchingKey,
    KeyRevoked,
    AlreadyRevoked,
    KeyMismatch,
    HasActiveSeals,
    NoOpStatus,
    NothingToReap,
    SequenceOverflow,
    InvalidExpiry,
    InvalidArgument,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::IssuerNotFound(_)
            | Self::KeyNotFound { .. }
            | Self::WorkflowNotFound { .. }
            | Self::SealNotFound { .. } => ErrorKind::NotFound,
            Self::IssuerExists(_) | Self::WorkflowExists { .. } => ErrorKind::AlreadyExists,
            Self::InvalidRange(_) => ErrorKind::InvalidRange,
            Self::OverlappingInterval { .. } => ErrorKind::OverlappingInterval,
            Self::DuplicateKey(_) => ErrorKind::DuplicateKey,
            Self::DuplicateSequence { .. } => ErrorKind::DuplicateSequence,
            Self::UnknownAccount(_) => ErrorKind::UnknownAccount,
            Self::UnknownWorkflow { .. } => ErrorKind::UnknownWorkflow,
            Self::NoMatchingKey { .. } => ErrorKind::NoMatchingKey,
            Self::KeyRevoked { .. } => ErrorKind::KeyRevoked,
            Self::AlreadyRevoked { .. } => ErrorKind::AlreadyRevoked,
            Self::KeyMismatch { .. } => ErrorKind::KeyMismatch,
            Self::HasActiveSeals { .. } => ErrorKind::HasActiveSeals,
            Self::NoOpStatus(_) => ErrorKind::NoOpStatus,
            Self::NothingToReap => ErrorKind::NothingToReap,
            Self::SequenceOverflow { .. } => ErrorKind::SequenceOverflow,
            Self::InvalidExpiry { .. } => ErrorKind::InvalidExpiry,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    pub(crate) fn unauthorized(caller: &AccountName, action: &'static str) -> Self {
        Self::Unauthorized {
            caller: caller.clone(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::OverlappingInterval {
            seq_start: 3,
            seq_end: 9,
            existing_start: 0,
            existing_end: 4,
        };
        assert_eq!(
            err.to_string(),
            "Interval 3..=9 overlaps existing 0..=4"
        );
    }

    #[test]
    fn test_not_found_variants_share_kind() {
        let errs = [
            RegistryError::IssuerNotFound(1),
            RegistryError::KeyNotFound {
                issuer_id: 1,
                sequence_number: 2,
            },
            RegistryError::WorkflowNotFound {
                issuer_id: 1,
                workflow_id: 2,
            },
            RegistryError::SealNotFound {
                issuer_id: 1,
                sequence_number: 2,
            },
        ];
        assert!(errs.iter().all(|e| e.kind() == ErrorKind::NotFound));
    }

    #[test]
    fn test_unauthorized_error() {
        let err = RegistryError::unauthorized(&AccountName::from("mallory"), "add keys");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.to_string(), "Unauthorized: mallory may not add keys");
    }

    #[test]
    fn test_already_exists_kind() {
        assert_eq!(
            RegistryError::IssuerExists(100).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            RegistryError::WorkflowExists {
                issuer_id: 100,
                workflow_id: 1
            }
            .kind(),
            ErrorKind::AlreadyExists
        );
    }
}
