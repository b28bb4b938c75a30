//! Auction lifecycle types.
//!
//! An auction distributes `total_gifts` units across `total_rounds` timed
//! rounds. Its status moves through a fixed, monotonic cycle:
//!
//! ```text
//!   ┌─────────┐  start   ┌─────────┐  last round   ┌────────────┐  refunds done  ┌───────────┐
//!   │ CREATED ├─────────▶│ RUNNING ├──────────────▶│ FINALIZING ├───────────────▶│ COMPLETED │
//!   └─────────┘          └─────────┘               └────────────┘                └───────────┘
//! ```
//!
//! `COMPLETED` is terminal — nothing mutates the auction afterwards.

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionConfig, AuctionId, GiftId};

/// The lifecycle status of an auction.
///
/// Transitions are **monotonic** (never go backwards), and `RUNNING` is
/// never skipped: bids are only accepted while `RUNNING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuctionStatus {
    /// Created but not yet started. No bids accepted.
    Created,
    /// Rounds are open; bids accumulate and rounds settle on deadlines.
    Running,
    /// The last round has been reached; remaining active bids are refunded.
    Finalizing,
    /// All winners paid out, all non-winners refunded. **Terminal.**
    Completed,
}

impl AuctionStatus {
    /// Can this status transition to the given target status?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Created, Self::Running)
                | (Self::Running, Self::Finalizing)
                | (Self::Finalizing, Self::Completed)
        )
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Running => write!(f, "RUNNING"),
            Self::Finalizing => write!(f, "FINALIZING"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// One round-based auction for a gift.
///
/// Only the state machine and round closer mutate `status`,
/// `current_round`, `gifts_awarded`, and `round_started_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    pub gift_id: GiftId,
    pub status: AuctionStatus,
    /// Units this auction awards in total.
    pub total_gifts: u32,
    /// Number of timed rounds.
    pub total_rounds: u32,
    /// Wall-clock length of one round.
    pub round_duration: Duration,
    /// Minimum amount for any bid.
    pub min_bid: Decimal,
    /// Current round, 0-indexed. Meaningful only while RUNNING/FINALIZING.
    pub current_round: u32,
    /// Units awarded so far across settled rounds.
    pub gifts_awarded: u32,
    /// When the current round started. `None` until the auction starts.
    ///
    /// The round deadline is derived from this field plus `round_duration`,
    /// never from an in-memory timer, so a restarted host recomputes the
    /// same deadline.
    pub round_started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Auction {
    /// Create a new auction in `CREATED` state from a validated config.
    #[must_use]
    pub fn create(gift_id: GiftId, config: &AuctionConfig, now: DateTime<Utc>) -> Self {
        Self {
            id: AuctionId::new(),
            gift_id,
            status: AuctionStatus::Created,
            total_gifts: config.total_gifts,
            total_rounds: config.total_rounds,
            round_duration: config.round_duration,
            min_bid: config.min_bid,
            current_round: 0,
            gifts_awarded: 0,
            round_started_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Units not yet awarded.
    #[must_use]
    pub fn remaining_gifts(&self) -> u32 {
        self.total_gifts - self.gifts_awarded
    }

    /// Whether `round` is the auction's last round.
    #[must_use]
    pub fn is_final_round(&self, round: u32) -> bool {
        round + 1 == self.total_rounds
    }

    /// Number of supply units the given round may award.
    ///
    /// Each round gets the per-round quota (`total_gifts / total_rounds`);
    /// the final round receives everything still unawarded — the quota
    /// remainder plus any units left over from under-subscribed rounds.
    #[must_use]
    pub fn slots_for_round(&self, round: u32) -> u32 {
        let remaining = self.remaining_gifts();
        if self.is_final_round(round) {
            remaining
        } else {
            let quota = self.total_gifts / self.total_rounds;
            quota.min(remaining)
        }
    }

    /// Deadline of the current round, if the auction has started.
    #[must_use]
    pub fn round_deadline(&self) -> Option<DateTime<Utc>> {
        self.round_started_at.map(|start| start + self.round_duration)
    }

    /// Whether the current round's deadline has passed.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == AuctionStatus::Running
            && self.round_deadline().is_some_and(|deadline| deadline <= now)
    }
}
