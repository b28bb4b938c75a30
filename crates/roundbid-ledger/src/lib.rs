//! # roundbid-ledger
//!
//! The fund-locking ledger: the single owner of every user's
//! `available`/`locked` balance pair, with an append-only audit journal.
//!
//! ## Invariants
//!
//! - Money is never created or destroyed by lock/unlock/refund — those
//!   operations only move funds between the two buckets.
//! - Every balance mutation writes exactly one journal entry.
//! - A failed operation leaves the balance exactly as it was.
//! - For every user: net journal supply delta == available + locked.

pub mod accounts;
pub mod journal;

pub use accounts::Ledger;
pub use journal::Journal;
