//! The round closer — settles exactly one round per deadline, cluster-wide.
//!
//! Closing discipline, in order:
//! 1. Acquire the `(auction_id, round)` lock. Contention is expected under
//!    multi-instance deployment: the holder settles the round, everyone
//!    else skips without retrying.
//! 2. Inside the lock (and the engine's atomic unit), consult the round
//!    registry. An already-recorded round replays its stored outcome —
//!    this check alone keeps settlement at-most-once when the lock
//!    service is degraded to [`NullLocker`](crate::locker::NullLocker).
//! 3. Settle, record, advance the state machine, publish events.
//!
//! A fatal [`AuctionError::InconsistentLedgerState`] halts further closing
//! for that auction until an operator intervenes; the failed round is left
//! unrecorded so the intervention can retry it.

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use roundbid_bidbook::settle_round;
use roundbid_types::{
    AuctionError, AuctionEvent, AuctionId, AuctionStatus, Result, RoundOutcome, SchedulerConfig,
};

use crate::engine::AuctionEngine;
use crate::locker::{LockKey, Locker};
use crate::state_machine;

/// Closes due rounds under cluster-wide exclusion.
pub struct RoundCloser {
    locker: Arc<dyn Locker>,
    lock_ttl: Duration,
    /// Auctions whose settlement hit a fatal invariant violation.
    halted: HashSet<AuctionId>,
}

impl RoundCloser {
    /// Create a closer using the given lock service.
    #[must_use]
    pub fn new(locker: Arc<dyn Locker>, lock_ttl: Duration) -> Self {
        Self {
            locker,
            lock_ttl,
            halted: HashSet::new(),
        }
    }

    /// Create a closer from a scheduler config.
    #[must_use]
    pub fn with_config(locker: Arc<dyn Locker>, config: &SchedulerConfig) -> Self {
        Self::new(locker, config.lock_ttl)
    }

    /// Whether settlement for an auction is halted pending operator action.
    #[must_use]
    pub fn is_halted(&self, auction_id: AuctionId) -> bool {
        self.halted.contains(&auction_id)
    }

    /// Clear a halt after operator intervention.
    pub fn resume(&mut self, auction_id: AuctionId) -> bool {
        self.halted.remove(&auction_id)
    }

    /// Close the current round of an auction.
    ///
    /// Returns `Ok(None)` when another instance holds the round lock or the
    /// auction is halted — both are expected, not errors. Returns the
    /// recorded outcome (fresh or replayed) otherwise.
    ///
    /// # Errors
    /// - [`AuctionError::AuctionNotFound`] for an unknown id
    /// - [`AuctionError::AuctionNotRunning`] if there is no round to close
    /// - [`AuctionError::InconsistentLedgerState`] on a fatal ledger
    ///   violation; the auction is halted for operator intervention
    pub fn close_round(
        &mut self,
        engine: &mut AuctionEngine,
        auction_id: AuctionId,
        now: DateTime<Utc>,
    ) -> Result<Option<RoundOutcome>> {
        if self.halted.contains(&auction_id) {
            return Ok(None);
        }
        let round = engine
            .auctions
            .get(&auction_id)
            .ok_or(AuctionError::AuctionNotFound(auction_id))?
            .current_round;

        let key = LockKey::new(auction_id, round);
        if !self.locker.try_acquire(&key, self.lock_ttl) {
            // Another instance owns this round's settlement.
            tracing::debug!(%key, "round lock contention, skipping");
            return Ok(None);
        }

        let result = Self::close_locked(engine, auction_id, round, now);
        self.locker.release(&key);

        if let Err(AuctionError::InconsistentLedgerState { reason }) = &result {
            tracing::warn!(
                auction = %auction_id,
                round,
                reason,
                "settlement halted, operator intervention required"
            );
            self.halted.insert(auction_id);
        }
        result
    }

    fn close_locked(
        engine: &mut AuctionEngine,
        auction_id: AuctionId,
        round: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<RoundOutcome>> {
        // At-most-once marker, checked inside the atomic unit: a
        // crash-retried or lock-degraded invocation replays the recorded
        // outcome instead of settling again.
        if let Some(outcome) = engine.registry.outcome(auction_id, round) {
            return Ok(Some(outcome.clone()));
        }

        let auction = engine
            .auctions
            .get(&auction_id)
            .ok_or(AuctionError::AuctionNotFound(auction_id))?
            .clone();
        if auction.status != AuctionStatus::Running {
            return Err(AuctionError::AuctionNotRunning {
                actual: auction.status,
            });
        }
        if auction.round_started_at.is_none() {
            return Err(AuctionError::RoundNotStarted(auction_id));
        }

        let slots = auction.slots_for_round(round);
        let final_round = auction.is_final_round(round);

        let outcome = settle_round(
            &mut engine.book,
            &mut engine.ledger,
            &auction,
            round,
            slots,
            now,
        )?;
        let awarded = outcome.awarded();
        engine.registry.record(outcome.clone())?;

        // Lifecycle transitions commit only after settlement succeeded: a
        // fatal settlement error leaves the auction RUNNING so the round
        // can be retried once the operator clears the halt.
        let stored = engine
            .auctions
            .get_mut(&auction_id)
            .ok_or(AuctionError::AuctionNotFound(auction_id))?;
        stored.gifts_awarded += awarded;
        if final_round {
            state_machine::begin_finalizing(stored, now)?;
            state_machine::complete(stored, now)?;
        } else {
            state_machine::advance_round(stored, now)?;
        }

        tracing::info!(
            auction = %auction_id,
            round,
            winners = awarded,
            carried = outcome.carried_over().len(),
            refunded = outcome.refunded().len(),
            "round settled"
        );

        engine.publish(auction_id, AuctionEvent::round_closed(&outcome));
        if final_round {
            engine.publish(auction_id, AuctionEvent::AuctionCompleted);
        }
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use roundbid_types::{AuctionConfig, EntryRef, Gift, UserId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::locker::{MemoryLocker, NullLocker};

    fn closer(locker: Arc<dyn Locker>) -> RoundCloser {
        RoundCloser::new(locker, Duration::from_secs(10))
    }

    fn setup(total_gifts: u32, total_rounds: u32) -> (AuctionEngine, AuctionId) {
        let mut engine = AuctionEngine::default();
        let gift_id = engine.register_gift(Gift::new("Plush Pepe", 5000));
        let config = AuctionConfig {
            total_gifts,
            total_rounds,
            min_bid: Decimal::ONE,
            ..AuctionConfig::default()
        };
        let now = Utc::now();
        let auction = engine.create_auction(gift_id, &config, now).unwrap();
        engine.start_auction(auction.id, now).unwrap();
        (engine, auction.id)
    }

    fn bidder(engine: &mut AuctionEngine, auction_id: AuctionId, amount: i64) -> UserId {
        let user = UserId::new();
        engine
            .deposit(user, Decimal::new(1000, 0), "test", Utc::now())
            .unwrap();
        engine
            .place_bid(auction_id, user, Decimal::new(amount, 0), Utc::now())
            .unwrap();
        user
    }

    #[test]
    fn close_advances_non_final_round() {
        let (mut engine, auction_id) = setup(2, 2);
        bidder(&mut engine, auction_id, 300);
        let mut closer = closer(Arc::new(MemoryLocker::new()));

        let outcome = closer
            .close_round(&mut engine, auction_id, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(outcome.round, 0);
        assert_eq!(outcome.awarded(), 1);

        let auction = engine.auction(auction_id).unwrap();
        assert_eq!(auction.status, AuctionStatus::Running);
        assert_eq!(auction.current_round, 1);
        assert_eq!(auction.gifts_awarded, 1);
    }

    #[test]
    fn final_round_completes_auction() {
        let (mut engine, auction_id) = setup(1, 1);
        bidder(&mut engine, auction_id, 300);
        bidder(&mut engine, auction_id, 200);
        let mut closer = closer(Arc::new(MemoryLocker::new()));

        closer
            .close_round(&mut engine, auction_id, Utc::now())
            .unwrap()
            .unwrap();

        let auction = engine.auction(auction_id).unwrap();
        assert_eq!(auction.status, AuctionStatus::Completed);
        assert_eq!(auction.round_started_at, None);
    }

    #[test]
    fn reclose_replays_recorded_outcome() {
        let (mut engine, auction_id) = setup(2, 2);
        let user = bidder(&mut engine, auction_id, 300);
        let mut closer = closer(Arc::new(NullLocker));

        let now = Utc::now();
        let first = closer
            .close_round(&mut engine, auction_id, now)
            .unwrap()
            .unwrap();
        let balance_after_first = engine.balance(user);

        // The auction advanced to round 1; a crash-retry of round 0 must
        // not settle anything. Force the replay path via the registry.
        let replay = RoundCloser::close_locked(&mut engine, auction_id, 0, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(replay, first);
        assert_eq!(engine.balance(user), balance_after_first);
        assert_eq!(engine.auction(auction_id).unwrap().current_round, 1);
    }

    #[test]
    fn lock_contention_skips_quietly() {
        let (mut engine, auction_id) = setup(2, 2);
        bidder(&mut engine, auction_id, 300);

        let locker = Arc::new(MemoryLocker::new());
        let mut closer = RoundCloser::new(locker.clone(), Duration::from_secs(10));

        // Another instance holds round 0.
        let key = LockKey::new(auction_id, 0);
        assert!(locker.try_acquire(&key, Duration::from_secs(10)));

        let result = closer.close_round(&mut engine, auction_id, Utc::now()).unwrap();
        assert!(result.is_none());
        // Nothing settled, nothing advanced.
        assert_eq!(engine.auction(auction_id).unwrap().current_round, 0);
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn degraded_locker_still_at_most_once() {
        let (mut engine, auction_id) = setup(2, 2);
        let user = bidder(&mut engine, auction_id, 300);

        // Two independent closers with no lock service at all.
        let mut closer_a = closer(Arc::new(NullLocker));
        let mut closer_b = closer(Arc::new(NullLocker));

        let now = Utc::now();
        let first = closer_a
            .close_round(&mut engine, auction_id, now)
            .unwrap()
            .unwrap();
        // The auction moved to round 1; closer B now closes round 1, not a
        // duplicate of round 0.
        let second = closer_b
            .close_round(&mut engine, auction_id, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(first.round, 0);
        assert_eq!(second.round, 1);

        // Round 0 paid the user's 300 exactly once.
        let balance = engine.balance(user);
        assert_eq!(balance.available, Decimal::new(700, 0));
        assert_eq!(balance.locked, Decimal::ZERO);
    }

    #[test]
    fn closing_unknown_auction_fails() {
        let mut engine = AuctionEngine::default();
        let mut closer = closer(Arc::new(MemoryLocker::new()));
        let err = closer
            .close_round(&mut engine, AuctionId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuctionError::AuctionNotFound(_)));
    }

    #[test]
    fn closing_unstarted_auction_fails() {
        let mut engine = AuctionEngine::default();
        let gift_id = engine.register_gift(Gift::new("Plush Pepe", 10));
        let auction = engine
            .create_auction(gift_id, &AuctionConfig::default(), Utc::now())
            .unwrap();
        let mut closer = closer(Arc::new(MemoryLocker::new()));

        let err = closer
            .close_round(&mut engine, auction.id, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuctionError::AuctionNotRunning { .. }));
    }

    #[test]
    fn fatal_settlement_error_leaves_round_retryable() {
        let (mut engine, auction_id) = setup(1, 1);
        let user = bidder(&mut engine, auction_id, 300);
        let bid_id = engine.book.bid_for(user, auction_id).unwrap().id;
        let mut closer = closer(Arc::new(MemoryLocker::new()));

        // Corrupt the locked bucket behind the book's back: the winner's
        // payout will find nothing to consume.
        engine
            .ledger
            .unlock(user, Decimal::new(300, 0), EntryRef::Bid(bid_id), Utc::now())
            .unwrap();

        let err = closer
            .close_round(&mut engine, auction_id, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuctionError::InconsistentLedgerState { .. }));
        assert!(closer.is_halted(auction_id));

        // No lifecycle transition committed, no round recorded: the
        // auction is still RUNNING and the round is retryable.
        let auction = engine.auction(auction_id).unwrap();
        assert_eq!(auction.status, AuctionStatus::Running);
        assert_eq!(auction.current_round, 0);
        assert!(engine.registry().is_empty());

        // Operator repairs the ledger and clears the halt; the same round
        // then settles through the normal path.
        engine
            .ledger
            .lock(user, Decimal::new(300, 0), EntryRef::Bid(bid_id), Utc::now())
            .unwrap();
        assert!(closer.resume(auction_id));
        let outcome = closer
            .close_round(&mut engine, auction_id, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(outcome.round, 0);
        assert_eq!(outcome.awarded(), 1);
        assert_eq!(
            engine.auction(auction_id).unwrap().status,
            AuctionStatus::Completed
        );
    }

    #[test]
    fn halt_and_resume() {
        let (mut engine, auction_id) = setup(2, 2);
        let mut closer = closer(Arc::new(MemoryLocker::new()));
        assert!(!closer.is_halted(auction_id));
        closer.halted.insert(auction_id);

        let result = closer.close_round(&mut engine, auction_id, Utc::now()).unwrap();
        assert!(result.is_none());

        assert!(closer.resume(auction_id));
        assert!(!closer.is_halted(auction_id));
    }
}
