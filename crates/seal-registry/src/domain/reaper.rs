//! Time-based bulk expiry.

use tracing::debug;

use super::entities::Seal;
use super::errors::RegistryError;
use super::seals::SealStore;
use super::value_objects::{RowId, Timestamp};
use super::workflows::WorkflowStore;

/// Removes expired seals, earliest expiry first.
pub struct ExpiryReaper;

impl ExpiryReaper {
    /// Removes up to `max_count` seals with `expires_at <= now` and
    /// decrements each owning workflow's counter once per removed seal.
    ///
    /// # Errors
    /// - `InvalidArgument` if `max_count == 0`
    /// - `NothingToReap` if no seal is due
    pub fn reap(
        seals: &mut SealStore,
        workflows: &mut WorkflowStore,
        now: Timestamp,
        max_count: usize,
    ) -> Result<Vec<Seal>, RegistryError> {
        if max_count == 0 {
            return Err(RegistryError::InvalidArgument(
                "max_count must be positive".to_string(),
            ));
        }

        let due: Vec<RowId> = seals.expired(now).take(max_count).map(|s| s.id).collect();
        if due.is_empty() {
            return Err(RegistryError::NothingToReap);
        }

        let mut reaped = Vec::with_capacity(due.len());
        for id in due {
            let seal = seals.remove_by_id(id);
            let remaining = workflows.decrement_count(seal.issuer_id, seal.workflow_id);
            debug!(
                issuer_id = seal.issuer_id,
                sequence_number = seal.sequence_number,
                expires_at = seal.expires_at,
                workflow_seals = remaining,
                "Reaped expired seal"
            );
            reaped.push(seal);
        }
        Ok(reaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seals::NewSeal;
    use crate::domain::value_objects::{AccountName, SealStatus, SignatureHash};

    fn setup(expiries: &[u64]) -> (SealStore, WorkflowStore) {
        let mut workflows = WorkflowStore::new();
        workflows
            .create(100, 1, String::new(), "truckco".into(), "carol".into())
            .unwrap();
        let mut seals = SealStore::new();
        for (seq, expires_at) in expiries.iter().enumerate() {
            seals
                .insert(NewSeal {
                    issuer_id: 100,
                    sequence_number: seq as u64,
                    signature_hash: SignatureHash([0; 32]),
                    expires_at: *expires_at,
                    workflow_id: 1,
                    status: SealStatus::from("issued"),
                    updated_by: AccountName::from("alice"),
                    updated_at: 0,
                })
                .unwrap();
            workflows.increment_count(100, 1);
        }
        (seals, workflows)
    }

    #[test]
    fn test_reap_respects_max_count() {
        let (mut seals, mut workflows) = setup(&[10, 20, 30]);

        let reaped = ExpiryReaper::reap(&mut seals, &mut workflows, 100, 2).unwrap();
        let seqs: Vec<_> = reaped.iter().map(|s| s.sequence_number).collect();
        assert_eq!(seqs, vec![0, 1]);
        assert_eq!(seals.len(), 1);
        assert_eq!(workflows.find(100, 1).unwrap().live_seal_count, 1);
    }

    #[test]
    fn test_reap_skips_unexpired() {
        let (mut seals, mut workflows) = setup(&[10, 500]);

        let reaped = ExpiryReaper::reap(&mut seals, &mut workflows, 100, 10).unwrap();
        assert_eq!(reaped.len(), 1);
        assert_eq!(
            ExpiryReaper::reap(&mut seals, &mut workflows, 100, 10).unwrap_err(),
            RegistryError::NothingToReap
        );
        assert_eq!(workflows.find(100, 1).unwrap().live_seal_count, 1);
    }

    #[test]
    fn test_reap_zero_max_count() {
        let (mut seals, mut workflows) = setup(&[10]);
        assert!(matches!(
            ExpiryReaper::reap(&mut seals, &mut workflows, 100, 0),
            Err(RegistryError::InvalidArgument(_))
        ));
        assert_eq!(seals.len(), 1);
    }
}
