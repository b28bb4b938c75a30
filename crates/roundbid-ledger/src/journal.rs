//! Append-only audit journal.
//!
//! Conservation invariant checked against the journal:
//! ```text
//! ∀ user: Σ(supply deltas of that user's entries) == available + locked
//! ```
//!
//! Deposits add to a user's held funds, payouts remove them, and
//! lock/unlock/refund only move funds between buckets. If the recorded
//! history ever disagrees with the live balance, something has gone
//! catastrophically wrong and settlement must halt.

use roundbid_types::{
    AuctionError, BalanceEntry, LedgerEntry, Result, UserId,
};
use rust_decimal::Decimal;

/// The append-only entry log. Entries are never mutated or deleted.
#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<LedgerEntry>,
}

impl Journal {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry. This is the only way the journal grows.
    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// All entries, in append order.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Entries for one user, in append order.
    pub fn entries_for(&self, user_id: UserId) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(move |e| e.user_id == user_id)
    }

    /// Net external-supply delta for one user: deposits minus payouts.
    #[must_use]
    pub fn net_supply_delta(&self, user_id: UserId) -> Decimal {
        self.entries_for(user_id)
            .map(|e| e.entry_type.supply_delta(e.amount))
            .sum()
    }

    /// Verify that the journal history for a user matches their live
    /// balance. A user with no entries must hold nothing.
    ///
    /// # Errors
    /// Returns [`AuctionError::InconsistentLedgerState`] if the recorded
    /// deltas disagree with `balance` — a fatal safety condition.
    pub fn verify_conservation(&self, user_id: UserId, balance: &BalanceEntry) -> Result<()> {
        let expected = self.net_supply_delta(user_id);
        let actual = balance.total();
        if actual != expected {
            tracing::warn!(
                user = %user_id,
                %expected,
                %actual,
                "journal conservation violated"
            );
            return Err(AuctionError::InconsistentLedgerState {
                reason: format!(
                    "user {user_id}: held funds {actual} != journal net delta {expected}"
                ),
            });
        }
        Ok(())
    }

    /// Number of entries recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the journal is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
