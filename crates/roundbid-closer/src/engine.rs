//! The auction engine facade — the atomic unit every caller goes through.
//!
//! The engine owns all mutable state: gifts, auctions, the bid book, the
//! ledger, and the round registry. Hosts share it as
//! `Arc<Mutex<AuctionEngine>>`; holding the mutex across one method call is
//! the isolation boundary — it serializes bid placements per user and
//! totally orders round settlement against concurrent bids. No engine
//! method performs I/O or suspends while state is borrowed.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use roundbid_bidbook::BidBook;
use roundbid_ledger::Ledger;
use roundbid_types::{
    Auction, AuctionConfig, AuctionError, AuctionEvent, AuctionId, AuctionStatus, BalanceEntry,
    Bid, Gift, GiftId, Result, UserId,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::publisher::{NotificationPublisher, NullPublisher};
use crate::registry::RoundRegistry;
use crate::state_machine;

/// Read-only view of an auction for API callers.
#[derive(Debug, Clone, Serialize)]
pub struct AuctionSnapshot {
    pub status: AuctionStatus,
    pub current_round: u32,
    pub total_rounds: u32,
    pub min_bid: Decimal,
}

/// Owns all engine state and exposes the operations of the core.
pub struct AuctionEngine {
    pub(crate) gifts: HashMap<GiftId, Gift>,
    pub(crate) auctions: HashMap<AuctionId, Auction>,
    pub(crate) book: BidBook,
    pub(crate) ledger: Ledger,
    pub(crate) registry: RoundRegistry,
    publisher: Arc<dyn NotificationPublisher>,
}

impl AuctionEngine {
    /// Create an engine publishing events to the given publisher.
    #[must_use]
    pub fn new(publisher: Arc<dyn NotificationPublisher>) -> Self {
        Self {
            gifts: HashMap::new(),
            auctions: HashMap::new(),
            book: BidBook::new(),
            ledger: Ledger::new(),
            registry: RoundRegistry::new(),
            publisher,
        }
    }

    /// Register a gift so auctions can reference it.
    pub fn register_gift(&mut self, gift: Gift) -> GiftId {
        let id = gift.id;
        self.gifts.insert(id, gift);
        id
    }

    /// Look up a registered gift.
    #[must_use]
    pub fn gift(&self, gift_id: GiftId) -> Option<&Gift> {
        self.gifts.get(&gift_id)
    }

    /// Deposit external funds into a user's available balance.
    ///
    /// # Errors
    /// Returns [`AuctionError::InvalidAmount`] for non-positive amounts.
    pub fn deposit(
        &mut self,
        user_id: UserId,
        amount: Decimal,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.ledger.deposit(user_id, amount, reason, now)
    }

    /// Create an auction in CREATED state for a registered gift.
    ///
    /// # Errors
    /// - [`AuctionError::InvalidConfig`] if the config fails validation
    /// - [`AuctionError::GiftNotFound`] if the gift is not registered
    pub fn create_auction(
        &mut self,
        gift_id: GiftId,
        config: &AuctionConfig,
        now: DateTime<Utc>,
    ) -> Result<Auction> {
        config.validate()?;
        if !self.gifts.contains_key(&gift_id) {
            return Err(AuctionError::GiftNotFound(gift_id));
        }
        let auction = Auction::create(gift_id, config, now);
        self.auctions.insert(auction.id, auction.clone());
        Ok(auction)
    }

    /// Start a created auction: round 0 opens and its deadline clock begins.
    ///
    /// # Errors
    /// - [`AuctionError::AuctionNotFound`] for an unknown id
    /// - [`AuctionError::WrongAuctionStatus`] unless the auction is CREATED
    pub fn start_auction(&mut self, auction_id: AuctionId, now: DateTime<Utc>) -> Result<()> {
        let auction = self
            .auctions
            .get_mut(&auction_id)
            .ok_or(AuctionError::AuctionNotFound(auction_id))?;
        state_machine::start(auction, now)
    }

    /// Place or raise a bid. Locks funds and upserts the bid atomically;
    /// a rejected bid leaves balances and bid state untouched.
    ///
    /// # Errors
    /// See [`BidBook::place_bid`], plus [`AuctionError::AuctionNotFound`].
    pub fn place_bid(
        &mut self,
        auction_id: AuctionId,
        user_id: UserId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Bid> {
        let auction = self
            .auctions
            .get(&auction_id)
            .ok_or(AuctionError::AuctionNotFound(auction_id))?;
        let bid = self
            .book
            .place_bid(&mut self.ledger, auction, user_id, amount, now)?;
        self.publisher.publish(
            auction_id,
            AuctionEvent::BidPlaced {
                user_id,
                amount: bid.amount,
            },
        );
        Ok(bid)
    }

    /// Read-only auction state for API callers.
    ///
    /// # Errors
    /// Returns [`AuctionError::AuctionNotFound`] for an unknown id.
    pub fn auction_state(&self, auction_id: AuctionId) -> Result<AuctionSnapshot> {
        let auction = self
            .auctions
            .get(&auction_id)
            .ok_or(AuctionError::AuctionNotFound(auction_id))?;
        Ok(AuctionSnapshot {
            status: auction.status,
            current_round: auction.current_round,
            total_rounds: auction.total_rounds,
            min_bid: auction.min_bid,
        })
    }

    /// Full auction record, if present.
    #[must_use]
    pub fn auction(&self, auction_id: AuctionId) -> Option<&Auction> {
        self.auctions.get(&auction_id)
    }

    /// A user's current balance pair.
    #[must_use]
    pub fn balance(&self, user_id: UserId) -> BalanceEntry {
        self.ledger.balance(user_id)
    }

    /// The ledger (balances + journal), read-only.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The bid book, read-only.
    #[must_use]
    pub fn book(&self) -> &BidBook {
        &self.book
    }

    /// The round registry, read-only.
    #[must_use]
    pub fn registry(&self) -> &RoundRegistry {
        &self.registry
    }

    /// RUNNING auctions whose current round deadline has passed.
    #[must_use]
    pub fn due_auctions(&self, now: DateTime<Utc>) -> Vec<AuctionId> {
        self.auctions
            .values()
            .filter(|a| a.is_due(now))
            .map(|a| a.id)
            .collect()
    }

    /// Check the cross-component invariants for one user:
    /// locked balance equals the sum of their ACTIVE bid amounts, and the
    /// journal conserves their held funds.
    ///
    /// # Errors
    /// Returns [`AuctionError::InconsistentLedgerState`] on violation.
    pub fn verify_user_invariants(&self, user_id: UserId) -> Result<()> {
        let locked = self.ledger.locked_balance(user_id);
        let active = self.book.active_total(user_id);
        if locked != active {
            tracing::warn!(user = %user_id, %locked, %active, "lock invariant violated");
            return Err(AuctionError::InconsistentLedgerState {
                reason: format!(
                    "user {user_id}: locked balance {locked} != active bid total {active}"
                ),
            });
        }
        self.ledger.verify_conservation(user_id)
    }

    pub(crate) fn publish(&self, auction_id: AuctionId, event: AuctionEvent) {
        self.publisher.publish(auction_id, event);
    }
}

impl Default for AuctionEngine {
    fn default() -> Self {
        Self::new(Arc::new(NullPublisher))
    }
}
