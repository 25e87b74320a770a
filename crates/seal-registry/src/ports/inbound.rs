//! Inbound Ports (Driving Ports / API)

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Issuer, KeyInterval, Seal, Workflow};
use crate::domain::errors::RegistryError;
use crate::domain::value_objects::{
    AccountName, IssuerId, PublicKey, SealStatus, SequenceNumber, SignatureHash, WorkflowId,
};

/// Parameters of [`SealRegistryApi::create_workflow`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWorkflowRequest {
    pub issuer_id: IssuerId,
    pub workflow_id: WorkflowId,
    pub description: String,
    pub transit: AccountName,
    pub recipient: AccountName,
}

/// Parameters of [`SealRegistryApi::create_seal`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSealRequest {
    pub issuer_id: IssuerId,
    pub sequence_number: SequenceNumber,
    pub signature_hash: SignatureHash,
    pub expires_in_days: u32,
    pub workflow_id: WorkflowId,
    pub initial_status: SealStatus,
}

/// Primary seal registry API.
///
/// `caller` is the account the host substrate authenticated for the call.
/// Every mutation either fully applies or returns an error with nothing
/// changed.
pub trait SealRegistryApi {
    /// Binds `issuer_id` to `owner`. The owner must sign.
    fn add_issuer(
        &mut self,
        caller: &AccountName,
        owner: &AccountName,
        issuer_id: IssuerId,
    ) -> Result<Issuer, RegistryError>;

    /// Registers a key over the explicit range `[seq_start, seq_end]`.
    fn add_key(
        &mut self,
        caller: &AccountName,
        issuer_id: IssuerId,
        seq_start: SequenceNumber,
        seq_end: SequenceNumber,
        public_key: PublicKey,
    ) -> Result<KeyInterval, RegistryError>;

    /// Registers a key over the next `max_seals` unallocated numbers.
    fn add_key_auto(
        &mut self,
        caller: &AccountName,
        issuer_id: IssuerId,
        max_seals: u64,
        public_key: PublicKey,
    ) -> Result<KeyInterval, RegistryError>;

    /// Revokes the key covering `sequence_number`. Existing seals stay valid.
    fn revoke_key(
        &mut self,
        caller: &AccountName,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        reason: &str,
    ) -> Result<KeyInterval, RegistryError>;

    /// Operator-only: deletes every key interval. Returns how many were removed.
    fn wipe_all_keys(&mut self, caller: &AccountName) -> Result<usize, RegistryError>;

    fn create_workflow(
        &mut self,
        caller: &AccountName,
        request: CreateWorkflowRequest,
    ) -> Result<Workflow, RegistryError>;

    fn delete_workflow(
        &mut self,
        caller: &AccountName,
        issuer_id: IssuerId,
        workflow_id: WorkflowId,
    ) -> Result<Workflow, RegistryError>;

    fn create_seal(
        &mut self,
        caller: &AccountName,
        request: CreateSealRequest,
    ) -> Result<Seal, RegistryError>;

    /// Advances a seal's status on behalf of `actor`, who must be the caller
    /// and one of the issuer owner, the workflow transit or its recipient.
    fn set_seal_status(
        &mut self,
        caller: &AccountName,
        actor: &AccountName,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        status: SealStatus,
        memo: &str,
    ) -> Result<Seal, RegistryError>;

    /// Removes a seal. Only the workflow's recipient may do this.
    fn delete_seal(
        &mut self,
        caller: &AccountName,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        memo: &str,
    ) -> Result<Seal, RegistryError>;

    /// Removes up to `max_count` expired seals. Anyone may call this.
    fn reap_expired(&mut self, max_count: usize) -> Result<Vec<Seal>, RegistryError>;

    fn issuer(&self, issuer_id: IssuerId) -> Option<&Issuer>;

    fn covering_interval(
        &self,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    ) -> Option<&KeyInterval>;

    fn workflow(&self, issuer_id: IssuerId, workflow_id: WorkflowId) -> Option<&Workflow>;

    fn seal(&self, issuer_id: IssuerId, sequence_number: SequenceNumber) -> Option<&Seal>;
}
