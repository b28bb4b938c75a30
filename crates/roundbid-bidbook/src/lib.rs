//! # roundbid-bidbook
//!
//! The bid book: owns the set of bids per auction, validates placement,
//! and settles rounds.
//!
//! ## Architecture
//!
//! - [`book`]: `BidBook` — one bid per (user, auction), increase-only
//!   re-bids that lock only the delta.
//! - [`ranking`]: pure deterministic ordering and winner selection —
//!   no side effects, same input always produces the same ranking.
//! - [`settlement`]: `settle_round` — pays winners, refunds non-winners on
//!   the final round, carries them otherwise.

pub mod book;
pub mod ranking;
pub mod settlement;

pub use book::BidBook;
pub use settlement::settle_round;
