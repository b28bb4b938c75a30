//! The bid book — one bid per (user, auction), increase-only.
//!
//! Placement locks funds first and creates/updates the bid record only
//! after the lock succeeds. A rejected bid therefore leaves balances and
//! bid state exactly as they were.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use roundbid_ledger::Ledger;
use roundbid_types::{
    Auction, AuctionError, AuctionId, AuctionStatus, Bid, BidId, EntryRef, Result, UserId,
};
use rust_decimal::Decimal;

/// Owns all bid records and their status/amount fields.
#[derive(Debug, Default)]
pub struct BidBook {
    bids: HashMap<BidId, Bid>,
    /// Index enforcing one bid per (user, auction).
    by_user: HashMap<(UserId, AuctionId), BidId>,
}

impl BidBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bids: HashMap::new(),
            by_user: HashMap::new(),
        }
    }

    /// Place a new bid or raise an existing one.
    ///
    /// A first placement locks the full amount; a raise locks only the
    /// delta over the previous amount, so no unlock/relock window exists.
    /// Raising keeps the original `placed_at` (tie-break priority is not
    /// reset).
    ///
    /// # Errors
    /// - [`AuctionError::AuctionNotRunning`] unless the auction is RUNNING
    /// - [`AuctionError::BidTooLow`] below `min_bid`, or not strictly above
    ///   the user's existing active amount
    /// - [`AuctionError::BidNotActive`] if the user's bid already settled
    /// - [`AuctionError::InsufficientBalance`] propagated from the ledger
    pub fn place_bid(
        &mut self,
        ledger: &mut Ledger,
        auction: &Auction,
        user_id: UserId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Bid> {
        if auction.status != AuctionStatus::Running {
            return Err(AuctionError::AuctionNotRunning {
                actual: auction.status,
            });
        }
        if amount < auction.min_bid {
            return Err(AuctionError::BidTooLow {
                amount,
                floor: auction.min_bid,
            });
        }

        if let Some(&bid_id) = self.by_user.get(&(user_id, auction.id)) {
            let existing = self
                .bids
                .get(&bid_id)
                .ok_or(AuctionError::BidNotFound(bid_id))?;
            if !existing.is_active() {
                return Err(AuctionError::BidNotActive(bid_id));
            }
            if amount <= existing.amount {
                return Err(AuctionError::BidTooLow {
                    amount,
                    floor: existing.amount,
                });
            }

            // Lock only the delta; the previous amount stays locked.
            let delta = amount - existing.amount;
            ledger.lock(user_id, delta, EntryRef::Bid(bid_id), now)?;

            let bid = self
                .bids
                .get_mut(&bid_id)
                .ok_or(AuctionError::BidNotFound(bid_id))?;
            bid.amount = amount;
            bid.updated_at = now;
            return Ok(bid.clone());
        }

        // First placement: lock funds, then create the record.
        let bid = Bid::new(user_id, auction.id, amount, now);
        ledger.lock(user_id, amount, EntryRef::Bid(bid.id), now)?;
        self.by_user.insert((user_id, auction.id), bid.id);
        self.bids.insert(bid.id, bid.clone());
        Ok(bid)
    }

    /// Look up a bid by ID.
    #[must_use]
    pub fn bid(&self, bid_id: BidId) -> Option<&Bid> {
        self.bids.get(&bid_id)
    }

    /// The user's bid in an auction, if any (regardless of status).
    #[must_use]
    pub fn bid_for(&self, user_id: UserId, auction_id: AuctionId) -> Option<&Bid> {
        self.by_user
            .get(&(user_id, auction_id))
            .and_then(|id| self.bids.get(id))
    }

    /// Cloned snapshot of the ACTIVE bids for one auction.
    #[must_use]
    pub fn active_snapshot(&self, auction_id: AuctionId) -> Vec<Bid> {
        self.bids
            .values()
            .filter(|b| b.auction_id == auction_id && b.is_active())
            .cloned()
            .collect()
    }

    /// Number of ACTIVE bids for one auction.
    #[must_use]
    pub fn active_count(&self, auction_id: AuctionId) -> usize {
        self.bids
            .values()
            .filter(|b| b.auction_id == auction_id && b.is_active())
            .count()
    }

    /// Sum of one user's ACTIVE bid amounts across all auctions.
    ///
    /// By the locking invariant this must always equal the user's locked
    /// balance.
    #[must_use]
    pub fn active_total(&self, user_id: UserId) -> Decimal {
        self.bids
            .values()
            .filter(|b| b.user_id == user_id && b.is_active())
            .map(|b| b.amount)
            .sum()
    }

    /// Total number of bids tracked (any status).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bids.len()
    }

    /// Whether no bids are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }

    pub(crate) fn bid_mut(&mut self, bid_id: BidId) -> Result<&mut Bid> {
        self.bids
            .get_mut(&bid_id)
            .ok_or(AuctionError::BidNotFound(bid_id))
    }
}

#[cfg(test)]
mod tests {
    use roundbid_types::{AuctionConfig, GiftId};

    use super::*;

    fn running_auction() -> Auction {
        let mut auction = Auction::create(
            GiftId::new(),
            &AuctionConfig {
                min_bid: Decimal::new(10, 0),
                ..AuctionConfig::default()
            },
            Utc::now(),
        );
        auction.status = AuctionStatus::Running;
        auction.round_started_at = Some(Utc::now());
        auction
    }

    fn funded_user(ledger: &mut Ledger, amount: i64) -> UserId {
        let user = UserId::new();
        ledger
            .deposit(user, Decimal::new(amount, 0), "test", Utc::now())
            .unwrap();
        user
    }

    #[test]
    fn first_placement_locks_full_amount() {
        let mut book = BidBook::new();
        let mut ledger = Ledger::new();
        let auction = running_auction();
        let user = funded_user(&mut ledger, 1000);

        let bid = book
            .place_bid(&mut ledger, &auction, user, Decimal::new(300, 0), Utc::now())
            .unwrap();

        assert!(bid.is_active());
        assert_eq!(bid.amount, Decimal::new(300, 0));
        let bal = ledger.balance(user);
        assert_eq!(bal.available, Decimal::new(700, 0));
        assert_eq!(bal.locked, Decimal::new(300, 0));
        assert_eq!(book.active_total(user), Decimal::new(300, 0));
    }

    #[test]
    fn raise_locks_only_the_delta() {
        let mut book = BidBook::new();
        let mut ledger = Ledger::new();
        let auction = running_auction();
        let user = funded_user(&mut ledger, 1000);

        let first = book
            .place_bid(&mut ledger, &auction, user, Decimal::new(100, 0), Utc::now())
            .unwrap();
        let raised = book
            .place_bid(&mut ledger, &auction, user, Decimal::new(150, 0), Utc::now())
            .unwrap();

        // Same bid, raised in place.
        assert_eq!(raised.id, first.id);
        assert_eq!(raised.amount, Decimal::new(150, 0));
        assert_eq!(raised.placed_at, first.placed_at);

        let bal = ledger.balance(user);
        assert_eq!(bal.locked, Decimal::new(150, 0));
        assert_eq!(bal.available, Decimal::new(850, 0));
        // DEPOSIT + LOCK(100) + LOCK(50)
        assert_eq!(ledger.journal().len(), 3);
    }

    #[test]
    fn below_min_bid_rejected() {
        let mut book = BidBook::new();
        let mut ledger = Ledger::new();
        let auction = running_auction();
        let user = funded_user(&mut ledger, 1000);

        let err = book
            .place_bid(&mut ledger, &auction, user, Decimal::new(5, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuctionError::BidTooLow { .. }));
        assert!(book.is_empty());
        assert_eq!(ledger.balance(user).available, Decimal::new(1000, 0));
    }

    #[test]
    fn non_increasing_rebid_rejected() {
        let mut book = BidBook::new();
        let mut ledger = Ledger::new();
        let auction = running_auction();
        let user = funded_user(&mut ledger, 1000);

        book.place_bid(&mut ledger, &auction, user, Decimal::new(100, 0), Utc::now())
            .unwrap();

        // Equal amount rejected.
        let err = book
            .place_bid(&mut ledger, &auction, user, Decimal::new(100, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuctionError::BidTooLow { floor, .. } if floor == Decimal::new(100, 0)));

        // Lower amount rejected, balances untouched.
        let err = book
            .place_bid(&mut ledger, &auction, user, Decimal::new(50, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuctionError::BidTooLow { .. }));
        assert_eq!(ledger.balance(user).locked, Decimal::new(100, 0));
    }

    #[test]
    fn racing_raises_serialize_to_the_higher_amount() {
        let mut book = BidBook::new();
        let mut ledger = Ledger::new();
        let auction = running_auction();
        let user = funded_user(&mut ledger, 1000);

        book.place_bid(&mut ledger, &auction, user, Decimal::new(100, 0), Utc::now())
            .unwrap();

        // Two raises race; they serialize. The one landing second sees the
        // first's amount as its floor.
        book.place_bid(&mut ledger, &auction, user, Decimal::new(150, 0), Utc::now())
            .unwrap();
        let err = book
            .place_bid(&mut ledger, &auction, user, Decimal::new(120, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuctionError::BidTooLow { .. }));

        // Exactly one net delta of 50 was applied on top of the original 100.
        let bid = book.bid_for(user, auction.id).unwrap();
        assert_eq!(bid.amount, Decimal::new(150, 0));
        assert_eq!(ledger.balance(user).locked, Decimal::new(150, 0));
    }

    #[test]
    fn insufficient_balance_leaves_no_bid() {
        let mut book = BidBook::new();
        let mut ledger = Ledger::new();
        let auction = running_auction();
        let user = funded_user(&mut ledger, 50);

        let err = book
            .place_bid(&mut ledger, &auction, user, Decimal::new(100, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuctionError::InsufficientBalance { .. }));
        assert!(book.bid_for(user, auction.id).is_none());
        assert_eq!(ledger.balance(user).available, Decimal::new(50, 0));
    }

    #[test]
    fn bids_rejected_unless_running() {
        let mut book = BidBook::new();
        let mut ledger = Ledger::new();
        let user = funded_user(&mut ledger, 1000);

        let mut auction = running_auction();
        auction.status = AuctionStatus::Created;
        let err = book
            .place_bid(&mut ledger, &auction, user, Decimal::new(100, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            AuctionError::AuctionNotRunning {
                actual: AuctionStatus::Created
            }
        ));

        auction.status = AuctionStatus::Completed;
        assert!(
            book.place_bid(&mut ledger, &auction, user, Decimal::new(100, 0), Utc::now())
                .is_err()
        );
    }

    #[test]
    fn active_snapshot_excludes_settled_bids() {
        let mut book = BidBook::new();
        let mut ledger = Ledger::new();
        let auction = running_auction();
        let alice = funded_user(&mut ledger, 1000);
        let bob = funded_user(&mut ledger, 1000);

        let won = book
            .place_bid(&mut ledger, &auction, alice, Decimal::new(100, 0), Utc::now())
            .unwrap();
        book.place_bid(&mut ledger, &auction, bob, Decimal::new(200, 0), Utc::now())
            .unwrap();

        book.bid_mut(won.id).unwrap().mark_won(0, Utc::now()).unwrap();

        let snapshot = book.active_snapshot(auction.id);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].user_id, bob);
        assert_eq!(book.active_count(auction.id), 1);
        // Alice's WON bid no longer counts toward her active total.
        assert_eq!(book.active_total(alice), Decimal::ZERO);
    }
}
