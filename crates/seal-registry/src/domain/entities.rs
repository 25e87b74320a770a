//! Core domain entities for the seal registry.
//!
//! Four tables: issuers, key intervals, workflows and seals. Rows never hold
//! references to each other; relations are identifier fields resolved
//! through the owning store's ordered indexes.

use serde::{Deserialize, Serialize};

use super::value_objects::{
    AccountName, Fingerprint, IssuerId, PublicKey, RowId, SealStatus, SequenceKey,
    SequenceNumber, SignatureHash, Timestamp, WorkflowId,
};

/// An issuer binding. Immutable once registered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    /// Issuer-chosen identifier.
    pub id: IssuerId,
    /// Account that authorizes every mutation on the issuer's sub-resources.
    pub owner: AccountName,
}

/// Inclusive range of sequence numbers signable by one public key.
///
/// INVARIANTS:
/// - `seq_start <= seq_end`
/// - Disjoint from every other interval of the same issuer
/// - `fingerprint` unique across the whole store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInterval {
    pub id: RowId,
    pub issuer_id: IssuerId,
    pub seq_start: SequenceNumber,
    pub seq_end: SequenceNumber,
    pub public_key: PublicKey,
    pub fingerprint: Fingerprint,
    pub revoked: bool,
    /// Set together with `revoked`.
    pub revoked_at: Option<Timestamp>,
    pub revoke_reason: Option<String>,
}

impl KeyInterval {
    /// True if `sequence_number` lies inside `[seq_start, seq_end]`.
    pub fn contains(&self, sequence_number: SequenceNumber) -> bool {
        self.seq_start <= sequence_number && sequence_number <= self.seq_end
    }

    /// True if the interval shares at least one sequence number with
    /// `[seq_start, seq_end]`.
    pub fn overlaps(&self, seq_start: SequenceNumber, seq_end: SequenceNumber) -> bool {
        self.seq_start <= seq_end && seq_start <= self.seq_end
    }

    /// Ordering key used by the `(issuer_id, seq_end)` index.
    pub fn seq_end_key(&self) -> SequenceKey {
        SequenceKey::pack(self.issuer_id, self.seq_end)
    }

    /// Number of sequence numbers covered, saturating at `u64::MAX`.
    pub fn capacity(&self) -> u64 {
        (self.seq_end - self.seq_start).saturating_add(1)
    }
}

/// Issuer-defined grouping of seals moving between a transit and a recipient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: RowId,
    pub issuer_id: IssuerId,
    /// Issuer-chosen workflow number, unique per issuer.
    pub workflow_id: WorkflowId,
    pub description: String,
    /// Account of the transport company.
    pub transit: AccountName,
    /// Account of the receiving party.
    pub recipient: AccountName,
    /// Number of seals currently referencing this workflow.
    pub live_seal_count: u64,
}

impl Workflow {
    pub fn key(&self) -> SequenceKey {
        SequenceKey::pack(self.issuer_id, self.workflow_id)
    }

    pub fn has_active_seals(&self) -> bool {
        self.live_seal_count != 0
    }
}

/// A signed event at one sequence number, with a mutable status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seal {
    pub id: RowId,
    pub issuer_id: IssuerId,
    pub sequence_number: SequenceNumber,
    pub signature_hash: SignatureHash,
    pub expires_at: Timestamp,
    pub workflow_id: WorkflowId,
    pub status: SealStatus,
    pub updated_by: AccountName,
    pub updated_at: Timestamp,
}

impl Seal {
    pub fn key(&self) -> SequenceKey {
        SequenceKey::pack(self.issuer_id, self.sequence_number)
    }

    /// Reapable once the expiry time has been reached.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}
