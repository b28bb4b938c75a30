//! Round registry — the at-most-once settlement marker.
//!
//! Recording an outcome under `(auction_id, round)` is the uniqueness
//! constraint that makes settlement idempotent: a crash-retried or
//! lock-service-degraded closer finds the round already recorded and
//! replays the stored [`RoundOutcome`] instead of settling again.

use std::collections::HashMap;

use roundbid_types::{AuctionError, AuctionId, Result, RoundOutcome};

/// Stores one settled outcome per (auction, round).
#[derive(Debug, Default)]
pub struct RoundRegistry {
    closed: HashMap<(AuctionId, u32), RoundOutcome>,
}

impl RoundRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            closed: HashMap::new(),
        }
    }

    /// Record a settled round. Fails if the round was already recorded —
    /// the caller must treat that as "someone else settled it".
    ///
    /// # Errors
    /// Returns [`AuctionError::RoundAlreadyClosed`] on a duplicate.
    pub fn record(&mut self, outcome: RoundOutcome) -> Result<()> {
        let key = (outcome.auction_id, outcome.round);
        if self.closed.contains_key(&key) {
            return Err(AuctionError::RoundAlreadyClosed {
                auction_id: outcome.auction_id,
                round: outcome.round,
            });
        }
        self.closed.insert(key, outcome);
        Ok(())
    }

    /// The recorded outcome for a round, if it settled.
    #[must_use]
    pub fn outcome(&self, auction_id: AuctionId, round: u32) -> Option<&RoundOutcome> {
        self.closed.get(&(auction_id, round))
    }

    /// Whether a round has settled.
    #[must_use]
    pub fn is_closed(&self, auction_id: AuctionId, round: u32) -> bool {
        self.closed.contains_key(&(auction_id, round))
    }

    /// Drop all records for a completed auction. Returns how many rounds
    /// were pruned.
    pub fn prune_auction(&mut self, auction_id: AuctionId) -> usize {
        let before = self.closed.len();
        self.closed.retain(|(id, _), _| *id != auction_id);
        before - self.closed.len()
    }

    /// Number of recorded rounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.closed.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty()
    }
}
