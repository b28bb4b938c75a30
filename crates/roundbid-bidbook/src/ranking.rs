//! Pure deterministic bid ranking.
//!
//! The ordering that decides winners:
//! 1. `amount` descending (higher bid wins)
//! 2. `placed_at` ascending (earlier bid wins ties)
//! 3. `user_id` ascending (final deterministic tie-break)
//!
//! Given the same set of bids every instance produces the same ranking —
//! no clock reads, no randomness, no side effects.

use std::cmp::Ordering;

use roundbid_types::{Bid, BidId};

/// Compare two bids by rank (best first).
#[must_use]
pub fn rank_order(a: &Bid, b: &Bid) -> Ordering {
    b.amount
        .cmp(&a.amount)
        .then_with(|| a.placed_at.cmp(&b.placed_at))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Rank bids best-first and return their IDs.
#[must_use]
pub fn ranked_ids(bids: &[Bid]) -> Vec<BidId> {
    let mut sorted: Vec<&Bid> = bids.iter().collect();
    sorted.sort_by(|a, b| rank_order(a, b));
    sorted.into_iter().map(|b| b.id).collect()
}

/// Split ranked bids into (winners, rest) given the slot count.
///
/// Winners are the top `min(slots, bids.len())` by rank; both halves keep
/// rank order.
#[must_use]
pub fn split_winners(bids: &[Bid], slots: usize) -> (Vec<BidId>, Vec<BidId>) {
    let mut ranked = ranked_ids(bids);
    let cut = slots.min(ranked.len());
    let rest = ranked.split_off(cut);
    (ranked, rest)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use roundbid_types::{AuctionId, UserId};
    use rust_decimal::Decimal;

    use super::*;

    fn bid_at(amount: i64, seconds: i64, auction_id: AuctionId) -> Bid {
        let mut bid = Bid::dummy_for_user(UserId::new(), auction_id, Decimal::new(amount, 0));
        bid.placed_at = Utc::now() + Duration::seconds(seconds);
        bid
    }

    #[test]
    fn higher_amount_wins() {
        let auction = AuctionId::new();
        let low = bid_at(100, 0, auction);
        let high = bid_at(200, 10, auction);
        let ranked = ranked_ids(&[low.clone(), high.clone()]);
        assert_eq!(ranked, vec![high.id, low.id]);
    }

    #[test]
    fn amount_tie_broken_by_earlier_placement() {
        // A(100, t=1), B(150, t=2), C(150, t=1): one slot goes to C.
        let auction = AuctionId::new();
        let a = bid_at(100, 1, auction);
        let b = bid_at(150, 2, auction);
        let c = bid_at(150, 1, auction);

        let (winners, rest) = split_winners(&[a.clone(), b.clone(), c.clone()], 1);
        assert_eq!(winners, vec![c.id]);
        assert_eq!(rest, vec![b.id, a.id]);
    }

    #[test]
    fn full_tie_broken_by_user_id() {
        let auction = AuctionId::new();
        let now = Utc::now();
        let mut x = Bid::dummy_for_user(UserId::new(), auction, Decimal::new(100, 0));
        let mut y = Bid::dummy_for_user(UserId::new(), auction, Decimal::new(100, 0));
        x.placed_at = now;
        y.placed_at = now;

        let expected_first = if x.user_id < y.user_id { x.id } else { y.id };
        let ranked = ranked_ids(&[x, y]);
        assert_eq!(ranked[0], expected_first);
    }

    #[test]
    fn ranking_is_deterministic() {
        let auction = AuctionId::new();
        let bids: Vec<Bid> = (0..20).map(|i| bid_at(i % 5, i, auction)).collect();
        let first = ranked_ids(&bids);
        let second = ranked_ids(&bids);
        assert_eq!(first, second);
    }

    #[test]
    fn more_slots_than_bids() {
        let auction = AuctionId::new();
        let a = bid_at(100, 0, auction);
        let b = bid_at(200, 0, auction);
        let (winners, rest) = split_winners(&[a, b], 10);
        assert_eq!(winners.len(), 2);
        assert!(rest.is_empty());
    }

    #[test]
    fn zero_slots_no_winners() {
        let auction = AuctionId::new();
        let a = bid_at(100, 0, auction);
        let (winners, rest) = split_winners(&[a.clone()], 0);
        assert!(winners.is_empty());
        assert_eq!(rest, vec![a.id]);
    }
}
