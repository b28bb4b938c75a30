//! Ledger journal types — the append-only audit trail.
//!
//! Every change to a user's `available`/`locked` balance produces exactly
//! one [`LedgerEntry`]. Entries are never mutated or deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionId, BidId, EntryId, UserId};

/// The kind of balance movement an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerEntryType {
    /// External funds entered the system (available increases).
    Deposit,
    /// Available moved to locked against a bid.
    Lock,
    /// Locked moved back to available; funds may be re-locked later.
    Unlock,
    /// Locked funds left the system to the auction operator.
    Payout,
    /// Locked moved back to available at auction end. Same balance effect
    /// as `Unlock`, but marks finality for the referenced bid.
    Refund,
}

impl LedgerEntryType {
    /// Signed effect of this entry on the user's **total** held funds
    /// (available + locked). Lock/unlock/refund only move funds between
    /// the two buckets, so their supply delta is zero.
    #[must_use]
    pub fn supply_delta(&self, amount: Decimal) -> Decimal {
        match self {
            Self::Deposit => amount,
            Self::Payout => -amount,
            Self::Lock | Self::Unlock | Self::Refund => Decimal::ZERO,
        }
    }
}

impl std::fmt::Display for LedgerEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "DEPOSIT"),
            Self::Lock => write!(f, "LOCK"),
            Self::Unlock => write!(f, "UNLOCK"),
            Self::Payout => write!(f, "PAYOUT"),
            Self::Refund => write!(f, "REFUND"),
        }
    }
}

/// What a ledger entry refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryRef {
    /// The bid that caused the movement.
    Bid(BidId),
    /// The auction that caused the movement.
    Auction(AuctionId),
    /// An operator-supplied reason (deposits, manual corrections).
    Operator(String),
}

impl std::fmt::Display for EntryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bid(id) => write!(f, "bid:{id}"),
            Self::Auction(id) => write!(f, "auction:{id}"),
            Self::Operator(reason) => write!(f, "op:{reason}"),
        }
    }
}

/// One immutable journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub entry_type: LedgerEntryType,
    pub user_id: UserId,
    pub amount: Decimal,
    pub reference: EntryRef,
    /// The user's available balance after this entry was applied.
    pub available_after: Decimal,
    /// The user's locked balance after this entry was applied.
    pub locked_after: Decimal,
    pub recorded_at: DateTime<Utc>,
}
