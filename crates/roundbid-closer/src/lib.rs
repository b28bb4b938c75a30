//! # roundbid-closer
//!
//! The coordination plane: auction lifecycle transitions, the distributed
//! round closer, and the deadline scheduler.
//!
//! ## Architecture
//!
//! A [`RoundScheduler`] scans RUNNING auctions for due round deadlines on a
//! fixed tick, recomputing each deadline from the auction's persisted
//! `round_started_at` — never from an in-memory timer, so a restarted host
//! picks up exactly where it left off.
//!
//! For each due auction the [`RoundCloser`]:
//! 1. acquires the cluster-wide lock keyed by `(auction_id, round)` —
//!    contention means another instance owns the round, and is skipped
//! 2. consults the [`RoundRegistry`] (the always-available at-most-once
//!    marker) — an already-closed round replays its recorded outcome
//! 3. settles the round via the bid book and ledger
//! 4. advances the [`state_machine`] and publishes events
//!
//! The [`Locker`] is an optional optimization: with the degraded
//! [`NullLocker`], the registry check alone still guarantees at-most-once
//! settlement per round.

pub mod closer;
pub mod engine;
pub mod locker;
pub mod publisher;
pub mod registry;
pub mod scheduler;
pub mod state_machine;

pub use closer::RoundCloser;
pub use engine::{AuctionEngine, AuctionSnapshot};
pub use locker::{LockKey, Locker, MemoryLocker, NullLocker};
pub use publisher::{MemoryPublisher, NotificationPublisher, NullPublisher};
pub use registry::RoundRegistry;
pub use scheduler::RoundScheduler;
