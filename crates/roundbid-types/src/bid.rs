//! Bid types — one bid per (user, auction), increase-only while active.
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐  won a round   ┌─────┐
//!   │ ACTIVE ├───────────────▶│ WON │
//!   └───┬────┘                └─────┘
//!       │ final round, never won
//!       ▼
//!   ┌──────────┐
//!   │ REFUNDED │
//!   └──────────┘
//! ```
//!
//! A bid that loses a non-final round stays `ACTIVE` and carries into the
//! next round unchanged — its funds remain locked.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionError, AuctionId, BidId, Result, UserId};

/// The lifecycle status of a bid.
///
/// Transitions are **monotonic**: `Active → Won` and `Active → Refunded`
/// are the only ones, and both are irreversible. This is what makes a
/// crash-retried settlement unable to pay or refund the same bid twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BidStatus {
    /// In the running. Funds locked for the bid amount.
    Active,
    /// Selected in a round's settlement. Funds paid out to the operator.
    Won,
    /// The auction ended without this bid winning. Funds returned.
    Refunded,
}

impl BidStatus {
    /// Can this status transition to the given target status?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Active, Self::Won | Self::Refunded))
    }
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Won => write!(f, "WON"),
            Self::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// A user's bid in one auction.
///
/// The amount may only be revised upward while `ACTIVE`; `placed_at` keeps
/// the original placement time so an increase does not reset tie-break
/// priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub user_id: UserId,
    pub auction_id: AuctionId,
    pub amount: Decimal,
    pub status: BidStatus,
    /// The round in which this bid won, if it did.
    pub won_round: Option<u32>,
    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bid {
    /// Create a new active bid.
    #[must_use]
    pub fn new(
        user_id: UserId,
        auction_id: AuctionId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BidId::new(),
            user_id,
            auction_id,
            amount,
            status: BidStatus::Active,
            won_round: None,
            placed_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == BidStatus::Active
    }

    /// Mark this bid as having won the given round.
    ///
    /// # Errors
    /// Returns [`AuctionError::BidNotActive`] if the bid is not `ACTIVE`.
    pub fn mark_won(&mut self, round: u32, now: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(BidStatus::Won) {
            return Err(AuctionError::BidNotActive(self.id));
        }
        self.status = BidStatus::Won;
        self.won_round = Some(round);
        self.updated_at = now;
        Ok(())
    }

    /// Mark this bid as refunded at auction end.
    ///
    /// # Errors
    /// Returns [`AuctionError::BidNotActive`] if the bid is not `ACTIVE`.
    pub fn mark_refunded(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(BidStatus::Refunded) {
            return Err(AuctionError::BidNotActive(self.id));
        }
        self.status = BidStatus::Refunded;
        self.updated_at = now;
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Bid {
    pub fn dummy(amount: Decimal) -> Self {
        Self::new(UserId::new(), AuctionId::new(), amount, Utc::now())
    }

    pub fn dummy_for_user(user_id: UserId, auction_id: AuctionId, amount: Decimal) -> Self {
        Self::new(user_id, auction_id, amount, Utc::now())
    }
}
