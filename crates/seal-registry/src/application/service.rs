//! Seal Registry Service
//!
//! Implements [`SealRegistryApi`] over the four domain stores. Every
//! operation authorizes, then validates against all stores, then mutates;
//! an error therefore leaves state untouched.

use std::sync::Arc;

use registry_telemetry::log_seal_event;
use tracing::{debug, info, warn};

use crate::adapters::{NoOpNotifier, Sha256Fingerprinter};
use crate::config::RegistryConfig;
use crate::domain::authorization::{can_update_status, require_auth};
use crate::domain::entities::{Issuer, KeyInterval, Seal, Workflow};
use crate::domain::errors::RegistryError;
use crate::domain::events::{Notification, RegistryEvent};
use crate::domain::invariants::{
    invariant_fingerprints_unique, invariant_intervals_disjoint, invariant_seal_counts_match,
    invariant_violation,
};
use crate::domain::issuers::IssuerDirectory;
use crate::domain::key_intervals::KeyIntervalStore;
use crate::domain::reaper::ExpiryReaper;
use crate::domain::seals::{NewSeal, SealStore};
use crate::domain::value_objects::{
    AccountName, IssuerId, PublicKey, SealStatus, SequenceNumber, Timestamp, WorkflowId,
    SECONDS_PER_DAY,
};
use crate::domain::workflows::WorkflowStore;
use crate::ports::inbound::{CreateSealRequest, CreateWorkflowRequest, SealRegistryApi};
use crate::ports::outbound::{AccountDirectory, KeyFingerprinter, NotificationPort, TimeSource};

/// Seal registry service.
///
/// Not internally synchronized: the host serializes calls, or wraps the
/// service in a lock when sharing it.
pub struct SealRegistryService {
    config: RegistryConfig,
    issuers: IssuerDirectory,
    keys: KeyIntervalStore,
    workflows: WorkflowStore,
    seals: SealStore,
    accounts: Arc<dyn AccountDirectory>,
    fingerprinter: Arc<dyn KeyFingerprinter>,
    clock: Arc<dyn TimeSource>,
    notifier: Arc<dyn NotificationPort>,
}

impl SealRegistryService {
    /// Creates an empty registry with SHA-256 fingerprints and no
    /// notification delivery.
    pub fn new(
        config: RegistryConfig,
        accounts: Arc<dyn AccountDirectory>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            issuers: IssuerDirectory::new(),
            keys: KeyIntervalStore::new(),
            workflows: WorkflowStore::new(),
            seals: SealStore::new(),
            accounts,
            fingerprinter: Arc::new(Sha256Fingerprinter),
            clock,
            notifier: Arc::new(NoOpNotifier),
        }
    }

    pub fn with_fingerprinter(mut self, fingerprinter: Arc<dyn KeyFingerprinter>) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationPort>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn issuers(&self) -> &IssuerDirectory {
        &self.issuers
    }

    pub fn keys(&self) -> &KeyIntervalStore {
        &self.keys
    }

    pub fn workflows(&self) -> &WorkflowStore {
        &self.workflows
    }

    pub fn seals(&self) -> &SealStore {
        &self.seals
    }

    /// Confirms that `public_key` is the registered, non-revoked key for
    /// `(issuer_id, sequence_number)`. Used after a label signature has been
    /// checked against that key.
    ///
    /// # Errors
    /// - `IssuerNotFound`
    /// - `NoMatchingKey` if no interval covers the number
    /// - `KeyRevoked`
    /// - `KeyMismatch` if a different key is registered
    pub fn verify_label_key(
        &self,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        public_key: &PublicKey,
    ) -> Result<&KeyInterval, RegistryError> {
        self.issuers.resolve_owner(issuer_id)?;

        let interval = self
            .keys
            .covering_interval(issuer_id, sequence_number)
            .ok_or(RegistryError::NoMatchingKey {
                issuer_id,
                sequence_number,
            })?;
        if interval.revoked {
            return Err(RegistryError::KeyRevoked {
                issuer_id,
                sequence_number,
            });
        }
        if self.fingerprinter.fingerprint(public_key) != interval.fingerprint {
            return Err(RegistryError::KeyMismatch {
                issuer_id,
                sequence_number,
            });
        }
        Ok(interval)
    }

    /// Scans all stores and reports the first invariant that does not hold.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        if !invariant_intervals_disjoint(&self.keys) {
            return Err("key intervals overlap");
        }
        if !invariant_fingerprints_unique(&self.keys) {
            return Err("duplicate key fingerprint");
        }
        if !invariant_seal_counts_match(&self.workflows, &self.seals) {
            return Err("workflow seal counters drifted");
        }
        Ok(())
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    fn check_len(&self, field: &str, value: &str, max: usize) -> Result<(), RegistryError> {
        if value.len() > max {
            return Err(RegistryError::InvalidArgument(format!(
                "{field} is {} bytes, limit is {max}",
                value.len()
            )));
        }
        Ok(())
    }

    fn check_memo(&self, memo: &str) -> Result<(), RegistryError> {
        self.check_len("memo", memo, self.config.max_memo_len)
    }

    fn check_status(&self, status: &SealStatus) -> Result<(), RegistryError> {
        if status.as_str().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "status must not be empty".to_string(),
            ));
        }
        self.check_len("status", status.as_str(), self.config.max_memo_len)
    }

    fn check_account(&self, account: &AccountName) -> Result<(), RegistryError> {
        if !self.accounts.account_exists(account) {
            return Err(RegistryError::UnknownAccount(account.clone()));
        }
        Ok(())
    }

    fn expiry_from(&self, now: Timestamp, days: u32) -> Result<Timestamp, RegistryError> {
        if days == 0 || days > self.config.max_expiry_days {
            return Err(RegistryError::InvalidExpiry { days });
        }
        u64::from(days)
            .checked_mul(SECONDS_PER_DAY)
            .and_then(|secs| now.checked_add(secs))
            .ok_or(RegistryError::InvalidExpiry { days })
    }

    /// Looks up the workflow a stored seal references. A miss means the
    /// seal and workflow tables diverged.
    fn workflow_of(&self, seal: &Seal) -> &Workflow {
        self.workflows
            .get(seal.issuer_id, seal.workflow_id)
            .unwrap_or_else(|| {
                invariant_violation(format_args!(
                    "seal {} references missing workflow {}",
                    seal.key(),
                    seal.workflow_id
                ))
            })
    }

    fn publish(
        &self,
        actor: &AccountName,
        owner: &AccountName,
        workflow: &Workflow,
        event: RegistryEvent,
    ) {
        let notification =
            Notification::new(actor, owner, &workflow.transit, &workflow.recipient, event);
        if let Err(e) = self.notifier.notify(&notification) {
            warn!(
                error = %e,
                correlation_id = %notification.correlation_id,
                "Notification delivery failed"
            );
        }
    }
}

impl SealRegistryApi for SealRegistryService {
    fn add_issuer(
        &mut self,
        caller: &AccountName,
        owner: &AccountName,
        issuer_id: IssuerId,
    ) -> Result<Issuer, RegistryError> {
        let issuer = self.issuers.register(caller, owner, issuer_id)?.clone();
        info!(issuer_id, owner = %owner, "Issuer registered");
        Ok(issuer)
    }

    fn add_key(
        &mut self,
        caller: &AccountName,
        issuer_id: IssuerId,
        seq_start: SequenceNumber,
        seq_end: SequenceNumber,
        public_key: PublicKey,
    ) -> Result<KeyInterval, RegistryError> {
        self.issuers
            .authorize_owner(caller, issuer_id, "add keys for this issuer")?;
        if public_key.as_bytes().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "public key must not be empty".to_string(),
            ));
        }

        let fingerprint = self.fingerprinter.fingerprint(&public_key);
        let interval = self
            .keys
            .add_explicit(issuer_id, seq_start, seq_end, public_key, fingerprint)?
            .clone();

        info!(
            issuer_id,
            seq_start = interval.seq_start,
            seq_end = interval.seq_end,
            fingerprint = %interval.fingerprint,
            "Key interval registered"
        );
        Ok(interval)
    }

    fn add_key_auto(
        &mut self,
        caller: &AccountName,
        issuer_id: IssuerId,
        max_seals: u64,
        public_key: PublicKey,
    ) -> Result<KeyInterval, RegistryError> {
        self.issuers
            .authorize_owner(caller, issuer_id, "add keys for this issuer")?;
        if public_key.as_bytes().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "public key must not be empty".to_string(),
            ));
        }

        let fingerprint = self.fingerprinter.fingerprint(&public_key);
        let interval = self
            .keys
            .add_auto_allocated(issuer_id, max_seals, public_key, fingerprint)?
            .clone();

        info!(
            issuer_id,
            seq_start = interval.seq_start,
            seq_end = interval.seq_end,
            fingerprint = %interval.fingerprint,
            "Key interval auto-allocated"
        );
        Ok(interval)
    }

    fn revoke_key(
        &mut self,
        caller: &AccountName,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        reason: &str,
    ) -> Result<KeyInterval, RegistryError> {
        self.issuers
            .authorize_owner(caller, issuer_id, "revoke keys of this issuer")?;
        self.check_len("revoke reason", reason, self.config.max_memo_len)?;

        let now = self.clock.now();
        let interval = self
            .keys
            .revoke(issuer_id, sequence_number, reason, now)?
            .clone();

        log_seal_event!(
            info,
            "Key interval revoked",
            issuer_id,
            sequence_number,
            seq_start = interval.seq_start,
            seq_end = interval.seq_end,
            reason = reason
        );
        Ok(interval)
    }

    fn wipe_all_keys(&mut self, caller: &AccountName) -> Result<usize, RegistryError> {
        require_auth(caller, &self.config.operator, "wipe all key intervals")?;
        let removed = self.keys.wipe_all();
        warn!(removed, operator = %caller, "All key intervals wiped");
        Ok(removed)
    }

    fn create_workflow(
        &mut self,
        caller: &AccountName,
        request: CreateWorkflowRequest,
    ) -> Result<Workflow, RegistryError> {
        let owner = self
            .issuers
            .authorize_owner(caller, request.issuer_id, "create workflows for this issuer")?
            .clone();
        self.check_len(
            "description",
            &request.description,
            self.config.max_description_len,
        )?;
        self.check_account(&request.transit)?;
        self.check_account(&request.recipient)?;

        let workflow = self
            .workflows
            .create(
                request.issuer_id,
                request.workflow_id,
                request.description,
                request.transit,
                request.recipient,
            )?
            .clone();

        info!(
            issuer_id = workflow.issuer_id,
            workflow_id = workflow.workflow_id,
            transit = %workflow.transit,
            recipient = %workflow.recipient,
            "Workflow created"
        );
        self.publish(
            caller,
            &owner,
            &workflow,
            RegistryEvent::WorkflowCreated {
                issuer_id: workflow.issuer_id,
                workflow_id: workflow.workflow_id,
            },
        );
        Ok(workflow)
    }

    fn delete_workflow(
        &mut self,
        caller: &AccountName,
        issuer_id: IssuerId,
        workflow_id: WorkflowId,
    ) -> Result<Workflow, RegistryError> {
        let owner = self
            .issuers
            .authorize_owner(caller, issuer_id, "delete workflows of this issuer")?
            .clone();

        let workflow = self.workflows.delete(issuer_id, workflow_id)?;

        info!(issuer_id, workflow_id, "Workflow deleted");
        self.publish(
            caller,
            &owner,
            &workflow,
            RegistryEvent::WorkflowDeleted {
                issuer_id,
                workflow_id,
            },
        );
        Ok(workflow)
    }

    fn create_seal(
        &mut self,
        caller: &AccountName,
        request: CreateSealRequest,
    ) -> Result<Seal, RegistryError> {
        let CreateSealRequest {
            issuer_id,
            sequence_number,
            signature_hash,
            expires_in_days,
            workflow_id,
            initial_status,
        } = request;

        let owner = self
            .issuers
            .authorize_owner(caller, issuer_id, "create seals for this issuer")?
            .clone();
        self.check_status(&initial_status)?;

        if self.workflows.get(issuer_id, workflow_id).is_none() {
            return Err(RegistryError::UnknownWorkflow {
                issuer_id,
                workflow_id,
            });
        }
        if self.seals.contains(issuer_id, sequence_number) {
            return Err(RegistryError::DuplicateSequence {
                issuer_id,
                sequence_number,
            });
        }

        let interval = self
            .keys
            .covering_interval(issuer_id, sequence_number)
            .ok_or(RegistryError::NoMatchingKey {
                issuer_id,
                sequence_number,
            })?;
        if interval.revoked {
            debug!(
                issuer_id,
                sequence_number,
                revoked_at = ?interval.revoked_at,
                "Covering key is revoked"
            );
            return Err(RegistryError::KeyRevoked {
                issuer_id,
                sequence_number,
            });
        }

        let now = self.clock.now();
        let expires_at = self.expiry_from(now, expires_in_days)?;

        // All checks passed; nothing below can fail.
        let seal = self
            .seals
            .insert(NewSeal {
                issuer_id,
                sequence_number,
                signature_hash,
                expires_at,
                workflow_id,
                status: initial_status,
                updated_by: owner.clone(),
                updated_at: now,
            })?
            .clone();
        let live_seals = self.workflows.increment_count(issuer_id, workflow_id);

        log_seal_event!(
            info,
            "Seal created",
            issuer_id,
            sequence_number,
            workflow_id = workflow_id,
            status = %seal.status,
            expires_at = expires_at,
            workflow_seals = live_seals
        );
        let workflow = self.workflow_of(&seal);
        self.publish(
            caller,
            &owner,
            workflow,
            RegistryEvent::SealCreated {
                issuer_id,
                sequence_number,
                workflow_id,
                status: seal.status.clone(),
            },
        );
        Ok(seal)
    }

    fn set_seal_status(
        &mut self,
        caller: &AccountName,
        actor: &AccountName,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        status: SealStatus,
        memo: &str,
    ) -> Result<Seal, RegistryError> {
        require_auth(caller, actor, "act on behalf of another account")?;
        self.check_status(&status)?;
        self.check_memo(memo)?;

        let seal = self.seals.find(issuer_id, sequence_number)?;
        let workflow = self.workflow_of(seal);
        let owner = self.issuers.resolve_owner(issuer_id)?;
        if !can_update_status(actor, owner, &workflow.transit, &workflow.recipient) {
            warn!(
                issuer_id,
                sequence_number,
                actor = %actor,
                "Rejected status update from unrelated account"
            );
            return Err(RegistryError::unauthorized(actor, "update this seal's status"));
        }
        let owner = owner.clone();
        let workflow = workflow.clone();

        let now = self.clock.now();
        let seal = self
            .seals
            .set_status(issuer_id, sequence_number, status, actor, now)?
            .clone();

        log_seal_event!(
            info,
            "Seal status updated",
            issuer_id,
            sequence_number,
            status = %seal.status,
            actor = %actor,
            memo = memo
        );
        self.publish(
            actor,
            &owner,
            &workflow,
            RegistryEvent::SealStatusChanged {
                issuer_id,
                sequence_number,
                status: seal.status.clone(),
                memo: memo.to_string(),
            },
        );
        Ok(seal)
    }

    fn delete_seal(
        &mut self,
        caller: &AccountName,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        memo: &str,
    ) -> Result<Seal, RegistryError> {
        self.check_memo(memo)?;

        let seal = self.seals.find(issuer_id, sequence_number)?;
        let workflow = self.workflow_of(seal).clone();
        require_auth(caller, &workflow.recipient, "delete this seal")?;
        let owner = self.issuers.resolve_owner(issuer_id)?.clone();

        let seal = self.seals.remove(issuer_id, sequence_number)?;
        let live_seals = self
            .workflows
            .decrement_count(issuer_id, seal.workflow_id);

        log_seal_event!(
            info,
            "Seal deleted",
            issuer_id,
            sequence_number,
            workflow_id = seal.workflow_id,
            workflow_seals = live_seals,
            memo = memo
        );
        self.publish(
            caller,
            &owner,
            &workflow,
            RegistryEvent::SealDeleted {
                issuer_id,
                sequence_number,
                memo: memo.to_string(),
            },
        );
        Ok(seal)
    }

    fn reap_expired(&mut self, max_count: usize) -> Result<Vec<Seal>, RegistryError> {
        let limit = max_count.min(self.config.max_reap_batch);
        let now = self.clock.now();
        let reaped = ExpiryReaper::reap(&mut self.seals, &mut self.workflows, now, limit)?;

        info!(
            reaped = reaped.len(),
            requested = max_count,
            remaining = self.seals.len(),
            "Expired seals reaped"
        );
        Ok(reaped)
    }

    fn issuer(&self, issuer_id: IssuerId) -> Option<&Issuer> {
        self.issuers.get(issuer_id)
    }

    fn covering_interval(
        &self,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    ) -> Option<&KeyInterval> {
        self.keys.covering_interval(issuer_id, sequence_number)
    }

    fn workflow(&self, issuer_id: IssuerId, workflow_id: WorkflowId) -> Option<&Workflow> {
        self.workflows.get(issuer_id, workflow_id)
    }

    fn seal(&self, issuer_id: IssuerId, sequence_number: SequenceNumber) -> Option<&Seal> {
        self.seals.get(issuer_id, sequence_number)
    }
}
