//! Round settlement output — the deterministic result of closing one round.
//!
//! Given the same set of active bids and the same slot count, settlement
//! produces the same `RoundOutcome` on every instance. The outcome is
//! recorded by the round registry and replayed verbatim if the same round
//! is closed again (crash-retry idempotency).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionId, BidId, UserId};

/// What happened to one bid in a round's settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BidOutcome {
    /// Selected as a winner; funds paid out.
    Won,
    /// Did not win a non-final round; stays active with funds locked.
    CarriedOver,
    /// Did not win the final round; funds returned.
    Refunded,
}

impl std::fmt::Display for BidOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Won => write!(f, "WON"),
            Self::CarriedOver => write!(f, "CARRIED_OVER"),
            Self::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// One bid's settlement result, in rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidResult {
    pub bid_id: BidId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub outcome: BidOutcome,
}

/// The full settlement result for one (auction, round).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub auction_id: AuctionId,
    /// The round that was settled, 0-indexed.
    pub round: u32,
    /// Every bid that was active at settlement, highest-ranked first.
    pub results: Vec<BidResult>,
    pub closed_at: DateTime<Utc>,
}

impl RoundOutcome {
    /// The winning results, in rank order.
    pub fn winners(&self) -> impl Iterator<Item = &BidResult> {
        self.results.iter().filter(|r| r.outcome == BidOutcome::Won)
    }

    /// IDs of bids carried into the next round.
    #[must_use]
    pub fn carried_over(&self) -> Vec<BidId> {
        self.results
            .iter()
            .filter(|r| r.outcome == BidOutcome::CarriedOver)
            .map(|r| r.bid_id)
            .collect()
    }

    /// IDs of bids refunded in this round.
    #[must_use]
    pub fn refunded(&self) -> Vec<BidId> {
        self.results
            .iter()
            .filter(|r| r.outcome == BidOutcome::Refunded)
            .map(|r| r.bid_id)
            .collect()
    }

    /// Number of winners (units awarded this round).
    #[must_use]
    pub fn awarded(&self) -> u32 {
        u32::try_from(self.winners().count()).unwrap_or(u32::MAX)
    }

    /// Total amount paid out to the operator this round.
    #[must_use]
    pub fn total_paid(&self) -> Decimal {
        self.winners().map(|r| r.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> RoundOutcome {
        let result = |amount: i64, outcome: BidOutcome| BidResult {
            bid_id: BidId::new(),
            user_id: UserId::new(),
            amount: Decimal::new(amount, 0),
            outcome,
        };
        RoundOutcome {
            auction_id: AuctionId::new(),
            round: 1,
            results: vec![
                result(300, BidOutcome::Won),
                result(200, BidOutcome::Won),
                result(100, BidOutcome::CarriedOver),
                result(50, BidOutcome::Refunded),
            ],
            closed_at: Utc::now(),
        }
    }

    #[test]
    fn winners_in_rank_order() {
        let o = outcome();
        let amounts: Vec<Decimal> = o.winners().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![Decimal::new(300, 0), Decimal::new(200, 0)]);
        assert_eq!(o.awarded(), 2);
    }

    #[test]
    fn carried_and_refunded_split() {
        let o = outcome();
        assert_eq!(o.carried_over().len(), 1);
        assert_eq!(o.refunded().len(), 1);
    }

    #[test]
    fn total_paid_sums_winner_amounts() {
        assert_eq!(outcome().total_paid(), Decimal::new(500, 0));
    }

    #[test]
    fn outcome_serde_roundtrip() {
        let o = outcome();
        let json = serde_json::to_string(&o).unwrap();
        let back: RoundOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(o, back);
    }
}
