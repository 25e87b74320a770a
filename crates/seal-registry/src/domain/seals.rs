//! # Seal Store
//!
//! ## Indexes
//!
//! - `by_sequence`: `(issuer_id, sequence_number)`, unique
//! - `by_expiry`: `(expires_at, row id)` ascending, walked by the reaper
//!
//! Both indexes are updated together with `rows`; a divergence is fatal.

use std::collections::{BTreeMap, BTreeSet};

use super::entities::Seal;
use super::errors::RegistryError;
use super::invariants::invariant_violation;
use super::value_objects::{
    AccountName, IssuerId, RowId, SealStatus, SequenceKey, SequenceNumber, SignatureHash,
    Timestamp, WorkflowId,
};

/// Field values for a seal that has passed every cross-store check.
#[derive(Clone, Debug)]
pub struct NewSeal {
    pub issuer_id: IssuerId,
    pub sequence_number: SequenceNumber,
    pub signature_hash: SignatureHash,
    pub expires_at: Timestamp,
    pub workflow_id: WorkflowId,
    pub status: SealStatus,
    pub updated_by: AccountName,
    pub updated_at: Timestamp,
}

#[derive(Debug, Default)]
pub struct SealStore {
    rows: BTreeMap<RowId, Seal>,
    by_sequence: BTreeMap<SequenceKey, RowId>,
    by_expiry: BTreeSet<(Timestamp, RowId)>,
    next_id: RowId,
}

impl SealStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Seal> {
        self.rows.values()
    }

    pub fn contains(&self, issuer_id: IssuerId, sequence_number: SequenceNumber) -> bool {
        self.by_sequence
            .contains_key(&SequenceKey::pack(issuer_id, sequence_number))
    }

    pub fn get(&self, issuer_id: IssuerId, sequence_number: SequenceNumber) -> Option<&Seal> {
        self.by_sequence
            .get(&SequenceKey::pack(issuer_id, sequence_number))
            .map(|id| self.row(*id))
    }

    pub fn find(
        &self,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    ) -> Result<&Seal, RegistryError> {
        self.get(issuer_id, sequence_number)
            .ok_or(RegistryError::SealNotFound {
                issuer_id,
                sequence_number,
            })
    }

    /// Seals with `expires_at <= now`, earliest expiry first.
    pub fn expired(&self, now: Timestamp) -> impl Iterator<Item = &Seal> + '_ {
        self.by_expiry
            .range(..=(now, RowId::MAX))
            .map(move |(_, id)| self.row(*id))
    }

    pub fn insert(&mut self, new: NewSeal) -> Result<&Seal, RegistryError> {
        let key = SequenceKey::pack(new.issuer_id, new.sequence_number);
        if self.by_sequence.contains_key(&key) {
            return Err(RegistryError::DuplicateSequence {
                issuer_id: new.issuer_id,
                sequence_number: new.sequence_number,
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.by_sequence.insert(key, id);
        self.by_expiry.insert((new.expires_at, id));
        Ok(self.rows.entry(id).or_insert(Seal {
            id,
            issuer_id: new.issuer_id,
            sequence_number: new.sequence_number,
            signature_hash: new.signature_hash,
            expires_at: new.expires_at,
            workflow_id: new.workflow_id,
            status: new.status,
            updated_by: new.updated_by,
            updated_at: new.updated_at,
        }))
    }

    /// Moves a seal to `status`, stamping the audit fields.
    ///
    /// # Errors
    /// - `SealNotFound`
    /// - `NoOpStatus` if the seal already has `status`
    pub fn set_status(
        &mut self,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        status: SealStatus,
        updated_by: &AccountName,
        now: Timestamp,
    ) -> Result<&Seal, RegistryError> {
        let id = self.find(issuer_id, sequence_number)?.id;
        let seal = self.row_mut(id);
        if seal.status == status {
            return Err(RegistryError::NoOpStatus(status.as_str().to_string()));
        }
        seal.status = status;
        seal.updated_by = updated_by.clone();
        seal.updated_at = now;
        Ok(&*seal)
    }

    pub fn remove(
        &mut self,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    ) -> Result<Seal, RegistryError> {
        let id = self.find(issuer_id, sequence_number)?.id;
        Ok(self.remove_by_id(id))
    }

    /// Removes a row known to exist, e.g. one yielded by [`expired`](Self::expired).
    pub fn remove_by_id(&mut self, id: RowId) -> Seal {
        let seal = self
            .rows
            .remove(&id)
            .unwrap_or_else(|| invariant_violation(format_args!("seal row {id} missing")));
        let in_sequence = self.by_sequence.remove(&seal.key()).is_some();
        let in_expiry = self.by_expiry.remove(&(seal.expires_at, id));
        if !(in_sequence && in_expiry) {
            invariant_violation(format_args!("seal {} missing from an index", seal.key()));
        }
        seal
    }

    fn row(&self, id: RowId) -> &Seal {
        self.rows
            .get(&id)
            .unwrap_or_else(|| invariant_violation(format_args!("seal row {id} missing")))
    }

    fn row_mut(&mut self, id: RowId) -> &mut Seal {
        self.rows
            .get_mut(&id)
            .unwrap_or_else(|| invariant_violation(format_args!("seal row {id} missing")))
    }
}
