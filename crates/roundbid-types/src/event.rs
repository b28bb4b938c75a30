//! Notification events emitted by the engine.
//!
//! Events are fire-and-forget: the engine publishes them to a
//! `NotificationPublisher` and never waits for acknowledgement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BidId, BidOutcome, RoundOutcome, UserId};

/// A winner entry inside a `round_closed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundAward {
    pub bid_id: BidId,
    pub user_id: UserId,
    pub amount: Decimal,
}

/// Events broadcast to downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
    /// A bid was accepted (new placement or increase).
    BidPlaced { user_id: UserId, amount: Decimal },
    /// A round settled: winners paid, the rest carried over or refunded.
    RoundClosed {
        round: u32,
        winners: Vec<RoundAward>,
        carried_over: Vec<BidId>,
    },
    /// The auction reached COMPLETED.
    AuctionCompleted,
}

impl AuctionEvent {
    /// Build a `RoundClosed` event from a settlement outcome.
    #[must_use]
    pub fn round_closed(outcome: &RoundOutcome) -> Self {
        Self::RoundClosed {
            round: outcome.round,
            winners: outcome
                .results
                .iter()
                .filter(|r| r.outcome == BidOutcome::Won)
                .map(|r| RoundAward {
                    bid_id: r.bid_id,
                    user_id: r.user_id,
                    amount: r.amount,
                })
                .collect(),
            carried_over: outcome.carried_over(),
        }
    }

    /// Short event name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BidPlaced { .. } => "bid_placed",
            Self::RoundClosed { .. } => "round_closed",
            Self::AuctionCompleted => "auction_completed",
        }
    }
}
