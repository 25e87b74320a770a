//! Workflow store.
//!
//! Workflows are keyed by `(issuer_id, workflow_id)` and carry the number of
//! seals currently referencing them. The counter is maintained by the seal
//! lifecycle, never set directly.

use std::collections::BTreeMap;

use super::entities::Workflow;
use super::errors::RegistryError;
use super::invariants::invariant_violation;
use super::value_objects::{AccountName, IssuerId, RowId, SequenceKey, WorkflowId};

#[derive(Debug, Default)]
pub struct WorkflowStore {
    rows: BTreeMap<RowId, Workflow>,
    by_key: BTreeMap<SequenceKey, RowId>,
    next_id: RowId,
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workflow> {
        self.rows.values()
    }

    /// Workflows of one issuer, ascending by workflow id.
    pub fn workflows_of(&self, issuer_id: IssuerId) -> impl Iterator<Item = &Workflow> + '_ {
        self.by_key
            .range(SequenceKey::first_of(issuer_id)..=SequenceKey::last_of(issuer_id))
            .filter_map(move |(_, id)| self.rows.get(id))
    }

    pub fn get(&self, issuer_id: IssuerId, workflow_id: WorkflowId) -> Option<&Workflow> {
        self.by_key
            .get(&SequenceKey::pack(issuer_id, workflow_id))
            .map(|id| self.row(*id))
    }

    /// Like [`get`](Self::get) but reports a missing workflow.
    pub fn find(
        &self,
        issuer_id: IssuerId,
        workflow_id: WorkflowId,
    ) -> Result<&Workflow, RegistryError> {
        self.get(issuer_id, workflow_id)
            .ok_or(RegistryError::WorkflowNotFound {
                issuer_id,
                workflow_id,
            })
    }

    /// Inserts a workflow with a zero seal counter.
    ///
    /// Account existence is the caller's concern.
    pub fn create(
        &mut self,
        issuer_id: IssuerId,
        workflow_id: WorkflowId,
        description: String,
        transit: AccountName,
        recipient: AccountName,
    ) -> Result<&Workflow, RegistryError> {
        let key = SequenceKey::pack(issuer_id, workflow_id);
        if self.by_key.contains_key(&key) {
            return Err(RegistryError::WorkflowExists {
                issuer_id,
                workflow_id,
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.by_key.insert(key, id);
        Ok(self.rows.entry(id).or_insert(Workflow {
            id,
            issuer_id,
            workflow_id,
            description,
            transit,
            recipient,
            live_seal_count: 0,
        }))
    }

    /// Removes a workflow that no seal references any more.
    ///
    /// # Errors
    /// - `WorkflowNotFound`
    /// - `HasActiveSeals` while `live_seal_count > 0`
    pub fn delete(
        &mut self,
        issuer_id: IssuerId,
        workflow_id: WorkflowId,
    ) -> Result<Workflow, RegistryError> {
        let workflow = self.find(issuer_id, workflow_id)?;
        if workflow.has_active_seals() {
            return Err(RegistryError::HasActiveSeals {
                issuer_id,
                workflow_id,
                live_seals: workflow.live_seal_count,
            });
        }

        let id = workflow.id;
        self.by_key.remove(&SequenceKey::pack(issuer_id, workflow_id));
        Ok(self
            .rows
            .remove(&id)
            .unwrap_or_else(|| invariant_violation(format_args!("workflow row {id} missing"))))
    }

    /// Records one more seal against the workflow. Returns the new count.
    pub fn increment_count(&mut self, issuer_id: IssuerId, workflow_id: WorkflowId) -> u64 {
        let workflow = self.existing_mut(issuer_id, workflow_id);
        workflow.live_seal_count += 1;
        workflow.live_seal_count
    }

    /// Records one seal fewer. Returns the new count.
    ///
    /// A vanished workflow or a zero counter means the seal and workflow
    /// tables disagree; both are fatal.
    pub fn decrement_count(&mut self, issuer_id: IssuerId, workflow_id: WorkflowId) -> u64 {
        let workflow = self.existing_mut(issuer_id, workflow_id);
        workflow.live_seal_count = workflow.live_seal_count.checked_sub(1).unwrap_or_else(|| {
            invariant_violation(format_args!(
                "seal counter of workflow {issuer_id}/{workflow_id} would go negative"
            ))
        });
        workflow.live_seal_count
    }

    fn existing_mut(&mut self, issuer_id: IssuerId, workflow_id: WorkflowId) -> &mut Workflow {
        let id = match self.by_key.get(&SequenceKey::pack(issuer_id, workflow_id)) {
            Some(id) => *id,
            None => invariant_violation(format_args!(
                "workflow {issuer_id}/{workflow_id} referenced by a seal does not exist"
            )),
        };
        self.rows
            .get_mut(&id)
            .unwrap_or_else(|| invariant_violation(format_args!("workflow row {id} missing")))
    }

    fn row(&self, id: RowId) -> &Workflow {
        self.rows
            .get(&id)
            .unwrap_or_else(|| invariant_violation(format_args!("workflow row {id} missing")))
    }
}
