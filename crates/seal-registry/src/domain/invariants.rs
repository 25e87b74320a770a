//! Domain invariants for the seal registry.
//!
//! The `invariant_*` checks are whole-store scans used by tests and by
//! [`SealRegistryService::check_invariants`](crate::SealRegistryService::check_invariants).
//! Operations never rely on them; every mutation validates up front.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use tracing::error;

use super::key_intervals::KeyIntervalStore;
use super::seals::SealStore;
use super::value_objects::{IssuerId, WorkflowId};
use super::workflows::WorkflowStore;

/// Aborts on a condition that only corrupted state can produce.
///
/// Logged at `error!` first so the detail reaches structured logs even when
/// the panic message is swallowed by the host.
pub fn invariant_violation(detail: impl Display) -> ! {
    error!(%detail, "Registry invariant violated");
    panic!("registry invariant violated: {detail}");
}

/// Intervals of each issuer are pairwise disjoint and well-formed.
pub fn invariant_intervals_disjoint(store: &KeyIntervalStore) -> bool {
    let mut by_issuer: BTreeMap<IssuerId, Vec<(u64, u64)>> = BTreeMap::new();
    for iv in store.iter() {
        if iv.seq_start > iv.seq_end {
            return false;
        }
        by_issuer
            .entry(iv.issuer_id)
            .or_default()
            .push((iv.seq_start, iv.seq_end));
    }

    by_issuer.values_mut().all(|ranges| {
        ranges.sort_unstable();
        ranges.windows(2).all(|pair| pair[0].1 < pair[1].0)
    })
}

/// No public-key fingerprint is registered twice.
pub fn invariant_fingerprints_unique(store: &KeyIntervalStore) -> bool {
    let mut seen = BTreeSet::new();
    store.iter().all(|iv| seen.insert(iv.fingerprint))
}

/// Every workflow's `live_seal_count` equals the number of seals that
/// reference it, and no seal references a missing workflow.
pub fn invariant_seal_counts_match(workflows: &WorkflowStore, seals: &SealStore) -> bool {
    let mut counts: BTreeMap<(IssuerId, WorkflowId), u64> = BTreeMap::new();
    for seal in seals.iter() {
        *counts.entry((seal.issuer_id, seal.workflow_id)).or_default() += 1;
    }

    if counts
        .keys()
        .any(|(issuer_id, workflow_id)| workflows.get(*issuer_id, *workflow_id).is_none())
    {
        return false;
    }

    workflows.iter().all(|wf| {
        let actual = counts
            .get(&(wf.issuer_id, wf.workflow_id))
            .copied()
            .unwrap_or(0);
        wf.live_seal_count == actual
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seals::NewSeal;
    use crate::domain::value_objects::{
        AccountName, Fingerprint, PublicKey, SealStatus, SignatureHash,
    };

    #[test]
    fn test_disjoint_store_passes() {
        let mut store = KeyIntervalStore::new();
        store
            .add_explicit(1, 0, 4, PublicKey::new(vec![1]), Fingerprint([1; 32]))
            .unwrap();
        store
            .add_explicit(1, 5, 9, PublicKey::new(vec![2]), Fingerprint([2; 32]))
            .unwrap();
        store
            .add_explicit(2, 0, 9, PublicKey::new(vec![3]), Fingerprint([3; 32]))
            .unwrap();

        assert!(invariant_intervals_disjoint(&store));
        assert!(invariant_fingerprints_unique(&store));
    }

    #[test]
    fn test_seal_counts_detect_drift() {
        let mut workflows = WorkflowStore::new();
        workflows
            .create(1, 1, String::new(), "t".into(), "r".into())
            .unwrap();
        let mut seals = SealStore::new();
        seals
            .insert(NewSeal {
                issuer_id: 1,
                sequence_number: 0,
                signature_hash: SignatureHash([0; 32]),
                expires_at: 10,
                workflow_id: 1,
                status: SealStatus::from("issued"),
                updated_by: AccountName::from("alice"),
                updated_at: 0,
            })
            .unwrap();

        assert!(!invariant_seal_counts_match(&workflows, &seals));
        workflows.increment_count(1, 1);
        assert!(invariant_seal_counts_match(&workflows, &seals));
    }

    #[test]
    #[should_panic(expected = "registry invariant violated: index drift")]
    fn test_invariant_violation_panics() {
        invariant_violation("index drift");
    }
}
