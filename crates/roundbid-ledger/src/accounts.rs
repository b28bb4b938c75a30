//! Balance accounts — the five ledger operations.
//!
//! All mutations are atomic: either the full operation succeeds and writes
//! exactly one journal entry, or the balance is unchanged and nothing is
//! recorded. No other component touches balance fields.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use roundbid_types::{
    AuctionError, BalanceEntry, EntryId, EntryRef, LedgerEntry, LedgerEntryType, Result, UserId,
};
use rust_decimal::Decimal;

use crate::journal::Journal;

/// The source of truth for all balance state.
///
/// `lock` reserves available funds against a bid; `unlock`/`refund` return
/// them; `payout` removes locked funds from the system (to the auction
/// operator). Shortfalls in the locked bucket are not user errors — they
/// mean a bookkeeping invariant broke, and surface as
/// [`AuctionError::InconsistentLedgerState`].
#[derive(Debug, Default)]
pub struct Ledger {
    balances: HashMap<UserId, BalanceEntry>,
    journal: Journal,
}

impl Ledger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
            journal: Journal::new(),
        }
    }

    /// Deposit external funds (increases available balance).
    ///
    /// # Errors
    /// Returns [`AuctionError::InvalidAmount`] if `amount` is not positive.
    pub fn deposit(
        &mut self,
        user_id: UserId,
        amount: Decimal,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(AuctionError::InvalidAmount(amount));
        }
        let entry = self.balances.entry(user_id).or_default();
        entry.available += amount;
        self.record(
            LedgerEntryType::Deposit,
            user_id,
            amount,
            EntryRef::Operator(reason.to_string()),
            now,
        );
        Ok(())
    }

    /// Lock funds against a bid (available → locked).
    ///
    /// # Errors
    /// - [`AuctionError::InvalidAmount`] if `amount` is not positive
    /// - [`AuctionError::InsufficientBalance`] if available < amount
    pub fn lock(
        &mut self,
        user_id: UserId,
        amount: Decimal,
        reference: EntryRef,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(AuctionError::InvalidAmount(amount));
        }
        let entry = self
            .balances
            .get_mut(&user_id)
            .ok_or(AuctionError::InsufficientBalance {
                needed: amount,
                available: Decimal::ZERO,
            })?;

        if entry.available < amount {
            return Err(AuctionError::InsufficientBalance {
                needed: amount,
                available: entry.available,
            });
        }

        entry.available -= amount;
        entry.locked += amount;
        self.record(LedgerEntryType::Lock, user_id, amount, reference, now);
        Ok(())
    }

    /// Unlock funds (locked → available). The funds may be re-locked later.
    ///
    /// # Errors
    /// Returns [`AuctionError::InconsistentLedgerState`] if locked < amount —
    /// a violated invariant, not a user error.
    pub fn unlock(
        &mut self,
        user_id: UserId,
        amount: Decimal,
        reference: EntryRef,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.release_locked(LedgerEntryType::Unlock, user_id, amount, reference, now)
    }

    /// Pay out locked funds to the auction operator. The funds leave the
    /// system: locked decreases, nothing returns to available.
    ///
    /// # Errors
    /// Returns [`AuctionError::InconsistentLedgerState`] if locked < amount.
    pub fn payout(
        &mut self,
        user_id: UserId,
        amount: Decimal,
        reference: EntryRef,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let entry = self.locked_entry(user_id, amount)?;
        entry.locked -= amount;
        self.record(LedgerEntryType::Payout, user_id, amount, reference, now);
        Ok(())
    }

    /// Refund locked funds at auction end (locked → available).
    ///
    /// Same balance effect as [`Ledger::unlock`], but the REFUND entry marks
    /// finality for the referenced bid in the audit trail.
    ///
    /// # Errors
    /// Returns [`AuctionError::InconsistentLedgerState`] if locked < amount.
    pub fn refund(
        &mut self,
        user_id: UserId,
        amount: Decimal,
        reference: EntryRef,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.release_locked(LedgerEntryType::Refund, user_id, amount, reference, now)
    }

    /// Get the balance for a user.
    #[must_use]
    pub fn balance(&self, user_id: UserId) -> BalanceEntry {
        self.balances.get(&user_id).cloned().unwrap_or_default()
    }

    /// The user's locked balance.
    #[must_use]
    pub fn locked_balance(&self, user_id: UserId) -> Decimal {
        self.balance(user_id).locked
    }

    /// The append-only audit journal.
    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Verify journal conservation for one user against their live balance.
    ///
    /// # Errors
    /// Returns [`AuctionError::InconsistentLedgerState`] on mismatch.
    pub fn verify_conservation(&self, user_id: UserId) -> Result<()> {
        self.journal.verify_conservation(user_id, &self.balance(user_id))
    }

    /// Total funds held across all users (available + locked).
    #[must_use]
    pub fn total_held(&self) -> Decimal {
        self.balances.values().map(BalanceEntry::total).sum()
    }

    // -- internals ----------------------------------------------------------

    fn release_locked(
        &mut self,
        entry_type: LedgerEntryType,
        user_id: UserId,
        amount: Decimal,
        reference: EntryRef,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let entry = self.locked_entry(user_id, amount)?;
        entry.locked -= amount;
        entry.available += amount;
        self.record(entry_type, user_id, amount, reference, now);
        Ok(())
    }

    fn locked_entry(&mut self, user_id: UserId, amount: Decimal) -> Result<&mut BalanceEntry> {
        let entry = self.balances.get_mut(&user_id);
        match entry {
            Some(entry) if entry.locked >= amount => Ok(entry),
            Some(entry) => {
                let locked = entry.locked;
                tracing::warn!(user = %user_id, %amount, %locked, "locked balance shortfall");
                Err(AuctionError::InconsistentLedgerState {
                    reason: format!(
                        "user {user_id}: locked balance {locked} cannot cover {amount}"
                    ),
                })
            }
            None => {
                tracing::warn!(user = %user_id, %amount, "no balance entry for locked release");
                Err(AuctionError::InconsistentLedgerState {
                    reason: format!("user {user_id}: no balance entry to release {amount} from"),
                })
            }
        }
    }

    fn record(
        &mut self,
        entry_type: LedgerEntryType,
        user_id: UserId,
        amount: Decimal,
        reference: EntryRef,
        now: DateTime<Utc>,
    ) {
        let after = self.balance(user_id);
        self.journal.append(LedgerEntry {
            id: EntryId::new(),
            entry_type,
            user_id,
            amount,
            reference,
            available_after: after.available,
            locked_after: after.locked,
            recorded_at: now,
        });
    }
}
