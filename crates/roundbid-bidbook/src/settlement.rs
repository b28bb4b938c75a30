//! Round settlement — pays winners, carries or refunds the rest.
//!
//! Settlement is deterministic over its inputs (active bids, slot count)
//! and produces the ordered [`RoundOutcome`] the round closer records and
//! broadcasts. The caller (the round closer) guarantees at-most-once
//! invocation per (auction, round); the bid status transitions here are
//! monotonic, so a partially-applied retry can never pay or refund a bid
//! twice.

use chrono::{DateTime, Utc};
use roundbid_ledger::Ledger;
use roundbid_types::{Auction, BidId, BidOutcome, BidResult, EntryRef, Result, RoundOutcome};

use crate::book::BidBook;
use crate::ranking::split_winners;

/// Settle one round of an auction.
///
/// Winners (the top `slots` active bids by rank) are paid out and marked
/// WON. Non-winners are refunded and marked REFUNDED on the final round;
/// on any other round they stay ACTIVE with funds locked and carry into
/// the next round unchanged — no ledger event.
///
/// # Errors
/// Propagates ledger failures. A locked-balance shortfall surfaces as
/// [`roundbid_types::AuctionError::InconsistentLedgerState`] and aborts
/// settlement immediately; prior committed state is left untouched for
/// operator inspection.
pub fn settle_round(
    book: &mut BidBook,
    ledger: &mut Ledger,
    auction: &Auction,
    round: u32,
    slots: u32,
    now: DateTime<Utc>,
) -> Result<RoundOutcome> {
    let active = book.active_snapshot(auction.id);
    let (winner_ids, rest_ids) = split_winners(&active, slots as usize);
    let final_round = auction.is_final_round(round);

    let lookup = |id: BidId| active.iter().find(|b| b.id == id);
    let mut results = Vec::with_capacity(active.len());

    for bid_id in &winner_ids {
        let Some(bid) = lookup(*bid_id) else { continue };
        ledger.payout(bid.user_id, bid.amount, EntryRef::Bid(bid.id), now)?;
        book.bid_mut(bid.id)?.mark_won(round, now)?;
        tracing::debug!(
            bid = %bid.id,
            user = %bid.user_id,
            amount = %bid.amount,
            round,
            "bid selected as winner"
        );
        results.push(BidResult {
            bid_id: bid.id,
            user_id: bid.user_id,
            amount: bid.amount,
            outcome: BidOutcome::Won,
        });
    }

    for bid_id in &rest_ids {
        let Some(bid) = lookup(*bid_id) else { continue };
        let outcome = if final_round {
            ledger.refund(bid.user_id, bid.amount, EntryRef::Bid(bid.id), now)?;
            book.bid_mut(bid.id)?.mark_refunded(now)?;
            BidOutcome::Refunded
        } else {
            BidOutcome::CarriedOver
        };
        results.push(BidResult {
            bid_id: bid.id,
            user_id: bid.user_id,
            amount: bid.amount,
            outcome,
        });
    }

    Ok(RoundOutcome {
        auction_id: auction.id,
        round,
        results,
        closed_at: now,
    })
}
