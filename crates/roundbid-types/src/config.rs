//! Configuration types for auctions and the round scheduler.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AuctionError, Result, constants};

/// Parameters for one auction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Units to award in total.
    pub total_gifts: u32,
    /// Number of timed rounds.
    pub total_rounds: u32,
    /// Wall-clock length of one round.
    pub round_duration: Duration,
    /// Minimum amount for any bid.
    pub min_bid: Decimal,
}

impl AuctionConfig {
    /// Validate the configuration before an auction is created from it.
    ///
    /// # Errors
    /// Returns [`AuctionError::InvalidConfig`] with the failing field.
    pub fn validate(&self) -> Result<()> {
        if self.total_gifts == 0 || self.total_gifts > constants::MAX_GIFTS_PER_AUCTION {
            return Err(AuctionError::InvalidConfig {
                reason: format!(
                    "total_gifts must be in 1..={}, got {}",
                    constants::MAX_GIFTS_PER_AUCTION,
                    self.total_gifts
                ),
            });
        }
        if self.total_rounds == 0 || self.total_rounds > constants::MAX_ROUNDS_PER_AUCTION {
            return Err(AuctionError::InvalidConfig {
                reason: format!(
                    "total_rounds must be in 1..={}, got {}",
                    constants::MAX_ROUNDS_PER_AUCTION,
                    self.total_rounds
                ),
            });
        }
        if self.round_duration.is_zero() {
            return Err(AuctionError::InvalidConfig {
                reason: "round_duration must be non-zero".to_string(),
            });
        }
        if self.min_bid <= Decimal::ZERO {
            return Err(AuctionError::InvalidConfig {
                reason: format!("min_bid must be positive, got {}", self.min_bid),
            });
        }
        Ok(())
    }
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            total_gifts: 10,
            total_rounds: 5,
            round_duration: Duration::from_millis(constants::DEFAULT_ROUND_DURATION_MS),
            min_bid: Decimal::ONE,
        }
    }
}

/// Configuration for the round-closing scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Interval between deadline scans.
    pub tick: Duration,
    /// TTL handed to the distributed lock on acquisition.
    pub lock_ttl: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(constants::DEFAULT_SCHEDULER_TICK_MS),
            lock_ttl: Duration::from_millis(constants::DEFAULT_LOCK_TTL_MS),
        }
    }
}
