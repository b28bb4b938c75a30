//! Auction state machine — the only code that mutates auction lifecycle
//! fields.
//!
//! `CREATED → RUNNING → FINALIZING → COMPLETED`, with `RUNNING → RUNNING`
//! round advances in between. Every transition checks the current status
//! and refuses anything the cycle does not allow.

use chrono::{DateTime, Utc};
use roundbid_types::{Auction, AuctionError, AuctionStatus, Result};

/// Start a created auction: opens round 0 and records its start time.
///
/// # Errors
/// Returns [`AuctionError::WrongAuctionStatus`] unless the auction is CREATED.
pub fn start(auction: &mut Auction, now: DateTime<Utc>) -> Result<()> {
    if !auction.status.can_transition_to(AuctionStatus::Running) {
        return Err(AuctionError::WrongAuctionStatus {
            expected: AuctionStatus::Created,
            actual: auction.status,
        });
    }
    auction.status = AuctionStatus::Running;
    auction.current_round = 0;
    auction.round_started_at = Some(now);
    auction.updated_at = now;
    Ok(())
}

/// Advance to the next round after a non-final round settled.
///
/// # Errors
/// Returns [`AuctionError::WrongAuctionStatus`] unless the auction is RUNNING.
pub fn advance_round(auction: &mut Auction, now: DateTime<Utc>) -> Result<()> {
    if auction.status != AuctionStatus::Running {
        return Err(AuctionError::WrongAuctionStatus {
            expected: AuctionStatus::Running,
            actual: auction.status,
        });
    }
    auction.current_round += 1;
    auction.round_started_at = Some(now);
    auction.updated_at = now;
    Ok(())
}

/// Enter FINALIZING once the final round's settlement has committed.
///
/// # Errors
/// Returns [`AuctionError::WrongAuctionStatus`] unless the auction is RUNNING.
pub fn begin_finalizing(auction: &mut Auction, now: DateTime<Utc>) -> Result<()> {
    if !auction.status.can_transition_to(AuctionStatus::Finalizing) {
        return Err(AuctionError::WrongAuctionStatus {
            expected: AuctionStatus::Running,
            actual: auction.status,
        });
    }
    auction.status = AuctionStatus::Finalizing;
    auction.updated_at = now;
    Ok(())
}

/// Complete the auction once all winners are paid and all non-winners
/// refunded. Terminal: nothing mutates the auction afterwards.
///
/// # Errors
/// Returns [`AuctionError::WrongAuctionStatus`] unless the auction is FINALIZING.
pub fn complete(auction: &mut Auction, now: DateTime<Utc>) -> Result<()> {
    if !auction.status.can_transition_to(AuctionStatus::Completed) {
        return Err(AuctionError::WrongAuctionStatus {
            expected: AuctionStatus::Finalizing,
            actual: auction.status,
        });
    }
    auction.status = AuctionStatus::Completed;
    auction.round_started_at = None;
    auction.updated_at = now;
    Ok(())
}
