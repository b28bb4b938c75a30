//! # roundbid-types
//!
//! Shared types, errors, and configuration for the **RoundBid** auction engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`GiftId`], [`AuctionId`], [`BidId`], [`EntryId`]
//! - **Auction model**: [`Auction`], [`AuctionStatus`], [`Gift`]
//! - **Bid model**: [`Bid`], [`BidStatus`]
//! - **Ledger model**: [`BalanceEntry`], [`LedgerEntry`], [`LedgerEntryType`], [`EntryRef`]
//! - **Settlement model**: [`RoundOutcome`], [`BidResult`], [`BidOutcome`]
//! - **Events**: [`AuctionEvent`], [`RoundAward`]
//! - **Configuration**: [`AuctionConfig`], [`SchedulerConfig`]
//! - **Errors**: [`AuctionError`] with `RB_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod auction;
pub mod balance;
pub mod bid;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod gift;
pub mod ids;
pub mod ledger;
pub mod outcome;

// Re-export all primary types at crate root for ergonomic imports:
//   use roundbid_types::{Auction, Bid, BidStatus, LedgerEntry, ...};

pub use auction::*;
pub use balance::*;
pub use bid::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use gift::*;
pub use ids::*;
pub use ledger::*;
pub use outcome::*;

// Constants are accessed via `roundbid_types::constants::FOO`
// (not re-exported to avoid name collisions).
