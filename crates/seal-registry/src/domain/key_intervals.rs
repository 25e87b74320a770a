//! # Key Interval Store
//!
//! Per-issuer sequence-number intervals, each bound to one public key.
//!
//! ## Indexes
//!
//! - `by_seq_end`: `(issuer_id, seq_end)` packed into a [`SequenceKey`]. All
//!   lookups are range scans bounded by the issuer's key span, so one issuer
//!   never sees another issuer's rows.
//! - `by_fingerprint`: global public-key uniqueness.
//!
//! ## Invariants
//!
//! - `seq_start <= seq_end` for every row
//! - Intervals of one issuer are pairwise disjoint
//! - A fingerprint appears at most once across all issuers
//! - `revoked` flips `false -> true` at most once

use std::collections::BTreeMap;

use tracing::debug;

use super::entities::KeyInterval;
use super::errors::RegistryError;
use super::invariants::invariant_violation;
use super::value_objects::{
    Fingerprint, IssuerId, PublicKey, RowId, SequenceKey, SequenceNumber, Timestamp,
};

/// Ordered store of key intervals.
#[derive(Debug, Default)]
pub struct KeyIntervalStore {
    rows: BTreeMap<RowId, KeyInterval>,
    by_seq_end: BTreeMap<SequenceKey, RowId>,
    by_fingerprint: BTreeMap<Fingerprint, RowId>,
    next_id: RowId,
}

impl KeyIntervalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: RowId) -> Option<&KeyInterval> {
        self.rows.get(&id)
    }

    /// All intervals in primary-key order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyInterval> {
        self.rows.values()
    }

    /// Intervals of one issuer, ascending by `seq_end`.
    pub fn intervals_of(&self, issuer_id: IssuerId) -> impl Iterator<Item = &KeyInterval> + '_ {
        self.by_seq_end
            .range(SequenceKey::first_of(issuer_id)..=SequenceKey::last_of(issuer_id))
            .map(move |(_, id)| self.row(*id))
    }

    pub fn contains_fingerprint(&self, fingerprint: &Fingerprint) -> bool {
        self.by_fingerprint.contains_key(fingerprint)
    }

    /// First interval of `issuer_id` whose `seq_end >= sequence_number`.
    ///
    /// Because intervals are disjoint this is the only candidate that can
    /// contain `sequence_number`.
    pub fn lower_bound(
        &self,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    ) -> Option<&KeyInterval> {
        self.by_seq_end
            .range(
                SequenceKey::pack(issuer_id, sequence_number)..=SequenceKey::last_of(issuer_id),
            )
            .next()
            .map(|(_, id)| self.row(*id))
    }

    /// The interval of `issuer_id` containing `sequence_number`, revoked or not.
    pub fn covering_interval(
        &self,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
    ) -> Option<&KeyInterval> {
        self.lower_bound(issuer_id, sequence_number)
            .filter(|iv| iv.contains(sequence_number))
    }

    /// The issuer's interval with the numerically largest `seq_end`.
    pub fn last_interval(&self, issuer_id: IssuerId) -> Option<&KeyInterval> {
        self.by_seq_end
            .range(SequenceKey::first_of(issuer_id)..=SequenceKey::last_of(issuer_id))
            .next_back()
            .map(|(_, id)| self.row(*id))
    }

    /// Inserts `[seq_start, seq_end]` for `issuer_id`.
    ///
    /// # Errors
    /// - `InvalidRange` if `seq_start > seq_end`
    /// - `OverlappingInterval` if any existing interval of the issuer
    ///   shares a sequence number with the new one
    /// - `DuplicateKey` if the fingerprint is already registered
    pub fn add_explicit(
        &mut self,
        issuer_id: IssuerId,
        seq_start: SequenceNumber,
        seq_end: SequenceNumber,
        public_key: PublicKey,
        fingerprint: Fingerprint,
    ) -> Result<&KeyInterval, RegistryError> {
        if seq_start > seq_end {
            return Err(RegistryError::InvalidRange(format!(
                "start {seq_start} is greater than end {seq_end}"
            )));
        }

        // Earlier intervals end before seq_start; later ones start after
        // this candidate, so it is the only one that can collide.
        if let Some(existing) = self.lower_bound(issuer_id, seq_start) {
            if existing.seq_start <= seq_end {
                debug!(
                    issuer_id,
                    seq_start,
                    seq_end,
                    existing_start = existing.seq_start,
                    existing_end = existing.seq_end,
                    "Interval overlap detected"
                );
                return Err(RegistryError::OverlappingInterval {
                    seq_start,
                    seq_end,
                    existing_start: existing.seq_start,
                    existing_end: existing.seq_end,
                });
            }
        }

        self.check_fingerprint(&fingerprint)?;
        Ok(self.insert(issuer_id, seq_start, seq_end, public_key, fingerprint))
    }

    /// Appends an interval of `max_seals` numbers after the issuer's last one.
    ///
    /// # Errors
    /// - `InvalidRange` if `max_seals == 0`
    /// - `DuplicateKey` if the fingerprint is already registered
    /// - `SequenceOverflow` if the interval would run past `u64::MAX`
    pub fn add_auto_allocated(
        &mut self,
        issuer_id: IssuerId,
        max_seals: u64,
        public_key: PublicKey,
        fingerprint: Fingerprint,
    ) -> Result<&KeyInterval, RegistryError> {
        if max_seals == 0 {
            return Err(RegistryError::InvalidRange(
                "max_seals must be positive".to_string(),
            ));
        }
        self.check_fingerprint(&fingerprint)?;

        let seq_start = match self.last_interval(issuer_id) {
            Some(last) => last
                .seq_end
                .checked_add(1)
                .ok_or(RegistryError::SequenceOverflow { issuer_id })?,
            None => 0,
        };
        let seq_end = seq_start
            .checked_add(max_seals - 1)
            .ok_or(RegistryError::SequenceOverflow { issuer_id })?;

        debug!(issuer_id, seq_start, seq_end, "Auto-allocated sequence range");
        Ok(self.insert(issuer_id, seq_start, seq_end, public_key, fingerprint))
    }

    /// Marks the interval covering `sequence_number` as revoked.
    ///
    /// # Errors
    /// - `KeyNotFound` if no interval of the issuer covers the number
    /// - `AlreadyRevoked` if the covering interval is already revoked
    pub fn revoke(
        &mut self,
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        reason: &str,
        now: Timestamp,
    ) -> Result<&KeyInterval, RegistryError> {
        let id = self
            .covering_interval(issuer_id, sequence_number)
            .ok_or(RegistryError::KeyNotFound {
                issuer_id,
                sequence_number,
            })?
            .id;

        let row = self.row_mut(id);
        if row.revoked {
            return Err(RegistryError::AlreadyRevoked {
                issuer_id,
                sequence_number,
            });
        }
        row.revoked = true;
        row.revoked_at = Some(now);
        row.revoke_reason = Some(reason.to_string());
        Ok(&*row)
    }

    /// Deletes every interval of every issuer. Returns the number removed.
    ///
    /// Row ids keep counting from where they were.
    pub fn wipe_all(&mut self) -> usize {
        let removed = self.rows.len();
        self.rows.clear();
        self.by_seq_end.clear();
        self.by_fingerprint.clear();
        removed
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn check_fingerprint(&self, fingerprint: &Fingerprint) -> Result<(), RegistryError> {
        if self.by_fingerprint.contains_key(fingerprint) {
            return Err(RegistryError::DuplicateKey(*fingerprint));
        }
        Ok(())
    }

    fn insert(
        &mut self,
        issuer_id: IssuerId,
        seq_start: SequenceNumber,
        seq_end: SequenceNumber,
        public_key: PublicKey,
        fingerprint: Fingerprint,
    ) -> &KeyInterval {
        let id = self.next_id;
        self.next_id += 1;

        let interval = KeyInterval {
            id,
            issuer_id,
            seq_start,
            seq_end,
            public_key,
            fingerprint,
            revoked: false,
            revoked_at: None,
            revoke_reason: None,
        };

        if self.by_seq_end.insert(interval.seq_end_key(), id).is_some() {
            invariant_violation(format_args!(
                "key interval index already holds {}",
                interval.seq_end_key()
            ));
        }
        self.by_fingerprint.insert(fingerprint, id);
        self.rows.entry(id).or_insert(interval)
    }

    fn row(&self, id: RowId) -> &KeyInterval {
        self.rows
            .get(&id)
            .unwrap_or_else(|| invariant_violation(format_args!("key interval row {id} missing")))
    }

    fn row_mut(&mut self, id: RowId) -> &mut KeyInterval {
        self.rows
            .get_mut(&id)
            .unwrap_or_else(|| invariant_violation(format_args!("key interval row {id} missing")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> (PublicKey, Fingerprint) {
        (PublicKey::new(vec![n; 33]), Fingerprint([n; 32]))
    }

    fn add(
        store: &mut KeyIntervalStore,
        issuer_id: IssuerId,
        start: u64,
        end: u64,
        n: u8,
    ) -> Result<(u64, u64), RegistryError> {
        let (pk, fp) = key(n);
        store
            .add_explicit(issuer_id, start, end, pk, fp)
            .map(|iv| (iv.seq_start, iv.seq_end))
    }

    fn auto(
        store: &mut KeyIntervalStore,
        issuer_id: IssuerId,
        max_seals: u64,
        n: u8,
    ) -> Result<(u64, u64), RegistryError> {
        let (pk, fp) = key(n);
        store
            .add_auto_allocated(issuer_id, max_seals, pk, fp)
            .map(|iv| (iv.seq_start, iv.seq_end))
    }

    // =========================================================================
    // EXPLICIT RANGES
    // =========================================================================

    #[test]
    fn test_explicit_rejects_inverted_range() {
        let mut store = KeyIntervalStore::new();
        assert!(matches!(
            add(&mut store, 1, 9, 3, 1),
            Err(RegistryError::InvalidRange(_))
        ));
        assert_eq!(add(&mut store, 1, 4, 4, 1), Ok((4, 4)));
    }

    #[test]
    fn test_explicit_overlap_edges() {
        let mut store = KeyIntervalStore::new();
        add(&mut store, 1, 10, 20, 1).unwrap();

        // Touching either endpoint overlaps.
        assert!(matches!(
            add(&mut store, 1, 0, 10, 2),
            Err(RegistryError::OverlappingInterval {
                existing_start: 10,
                existing_end: 20,
                ..
            })
        ));
        assert!(matches!(
            add(&mut store, 1, 20, 30, 2),
            Err(RegistryError::OverlappingInterval { .. })
        ));
        assert!(matches!(
            add(&mut store, 1, 12, 15, 2),
            Err(RegistryError::OverlappingInterval { .. })
        ));
        assert!(matches!(
            add(&mut store, 1, 0, 100, 2),
            Err(RegistryError::OverlappingInterval { .. })
        ));

        // Adjacent ranges are fine.
        assert_eq!(add(&mut store, 1, 0, 9, 2), Ok((0, 9)));
        assert_eq!(add(&mut store, 1, 21, 30, 3), Ok((21, 30)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_explicit_fills_gap_between_intervals() {
        let mut store = KeyIntervalStore::new();
        add(&mut store, 1, 0, 4, 1).unwrap();
        add(&mut store, 1, 10, 14, 2).unwrap();

        assert_eq!(add(&mut store, 1, 5, 9, 3), Ok((5, 9)));
        assert!(matches!(
            add(&mut store, 1, 5, 10, 4),
            Err(RegistryError::OverlappingInterval { .. })
        ));
    }

    #[test]
    fn test_issuers_are_isolated() {
        let mut store = KeyIntervalStore::new();
        add(&mut store, 1, 0, 100, 1).unwrap();
        assert_eq!(add(&mut store, 2, 0, 100, 2), Ok((0, 100)));
        assert_eq!(store.intervals_of(1).count(), 1);
        assert_eq!(store.intervals_of(2).count(), 1);
    }

    #[test]
    fn test_fingerprint_is_global() {
        let mut store = KeyIntervalStore::new();
        add(&mut store, 1, 0, 4, 7).unwrap();

        let err = add(&mut store, 2, 0, 4, 7).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateKey(Fingerprint([7; 32])));
        assert!(matches!(
            auto(&mut store, 1, 5, 7),
            Err(RegistryError::DuplicateKey(_))
        ));
        assert_eq!(store.len(), 1);
    }

    // =========================================================================
    // AUTO-ALLOCATION
    // =========================================================================

    #[test]
    fn test_auto_allocation_appends() {
        let mut store = KeyIntervalStore::new();
        assert_eq!(auto(&mut store, 100, 5, 1), Ok((0, 4)));
        assert_eq!(auto(&mut store, 100, 3, 2), Ok((5, 7)));
        assert_eq!(auto(&mut store, 100, 1, 3), Ok((8, 8)));
    }

    #[test]
    fn test_auto_allocation_follows_numerically_last_interval() {
        let mut store = KeyIntervalStore::new();
        add(&mut store, 1, 50, 59, 1).unwrap();
        add(&mut store, 1, 0, 9, 2).unwrap();
        assert_eq!(auto(&mut store, 1, 10, 3), Ok((60, 69)));
    }

    #[test]
    fn test_auto_allocation_rejects_zero() {
        let mut store = KeyIntervalStore::new();
        assert!(matches!(
            auto(&mut store, 1, 0, 1),
            Err(RegistryError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_auto_allocation_overflow() {
        let mut store = KeyIntervalStore::new();
        add(&mut store, 1, u64::MAX - 1, u64::MAX, 1).unwrap();
        assert_eq!(
            auto(&mut store, 1, 1, 2),
            Err(RegistryError::SequenceOverflow { issuer_id: 1 })
        );

        let mut store = KeyIntervalStore::new();
        add(&mut store, 1, 0, u64::MAX - 10, 1).unwrap();
        assert_eq!(
            auto(&mut store, 1, 12, 2),
            Err(RegistryError::SequenceOverflow { issuer_id: 1 })
        );
        assert_eq!(auto(&mut store, 1, 10, 3), Ok((u64::MAX - 9, u64::MAX)));
    }

    #[test]
    fn test_auto_allocation_at_max_issuer_id() {
        let mut store = KeyIntervalStore::new();
        add(&mut store, u64::MAX - 1, 0, 1_000, 1).unwrap();

        // Nothing of issuer MAX exists yet; the neighbour must not leak in.
        assert_eq!(auto(&mut store, u64::MAX, 4, 2), Ok((0, 3)));
        assert_eq!(auto(&mut store, u64::MAX, 4, 3), Ok((4, 7)));
        assert_eq!(auto(&mut store, u64::MAX - 1, 1, 4), Ok((1_001, 1_001)));
    }

    // =========================================================================
    // LOOKUP AND REVOCATION
    // =========================================================================

    #[test]
    fn test_covering_interval() {
        let mut store = KeyIntervalStore::new();
        add(&mut store, 1, 0, 4, 1).unwrap();
        add(&mut store, 1, 10, 14, 2).unwrap();

        assert_eq!(store.covering_interval(1, 4).map(|iv| iv.seq_start), Some(0));
        assert_eq!(store.covering_interval(1, 10).map(|iv| iv.seq_end), Some(14));
        assert!(store.covering_interval(1, 7).is_none());
        assert!(store.covering_interval(1, 15).is_none());
        assert!(store.covering_interval(2, 0).is_none());
    }

    #[test]
    fn test_revoke_records_reason_once() {
        let mut store = KeyIntervalStore::new();
        add(&mut store, 1, 0, 4, 1).unwrap();

        let iv = store.revoke(1, 2, "key leaked", 1_700_000_000).unwrap();
        assert!(iv.revoked);
        assert_eq!(iv.revoked_at, Some(1_700_000_000));
        assert_eq!(iv.revoke_reason.as_deref(), Some("key leaked"));

        assert_eq!(
            store.revoke(1, 3, "again", 1_700_000_100),
            Err(RegistryError::AlreadyRevoked {
                issuer_id: 1,
                sequence_number: 3
            })
        );
        // First revocation is preserved.
        let iv = store.covering_interval(1, 0).unwrap();
        assert_eq!(iv.revoked_at, Some(1_700_000_000));
    }

    #[test]
    fn test_revoke_uncovered_number() {
        let mut store = KeyIntervalStore::new();
        add(&mut store, 1, 0, 4, 1).unwrap();
        assert_eq!(
            store.revoke(1, 5, "x", 0),
            Err(RegistryError::KeyNotFound {
                issuer_id: 1,
                sequence_number: 5
            })
        );
    }

    #[test]
    fn test_wipe_all() {
        let mut store = KeyIntervalStore::new();
        add(&mut store, 1, 0, 4, 1).unwrap();
        add(&mut store, 2, 0, 4, 2).unwrap();

        assert_eq!(store.wipe_all(), 2);
        assert!(store.is_empty());
        assert!(!store.contains_fingerprint(&Fingerprint([1; 32])));

        // Fingerprints and ranges are free again; ids keep increasing.
        let (pk, fp) = key(1);
        let iv = store.add_explicit(1, 0, 4, pk, fp).unwrap();
        assert_eq!(iv.id, 2);
    }
}
