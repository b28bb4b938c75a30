//! Cluster-wide round-closing exclusion.
//!
//! The lock is keyed by `(auction_id, round)`: whoever acquires it is
//! responsible for settling that round; everyone else skips. Acquisition
//! is non-blocking and contention is an expected outcome, never an error
//! and never retried by the losing instance.
//!
//! The lock is an optimization, not the correctness mechanism — the round
//! registry's at-most-once marker holds even when the lock service is
//! absent. A deployment without a lock service selects [`NullLocker`] at
//! startup; business logic never branches on which one is in use.

use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use roundbid_types::AuctionId;

/// The identity of one round's closing lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockKey {
    pub auction_id: AuctionId,
    pub round: u32,
}

impl LockKey {
    #[must_use]
    pub fn new(auction_id: AuctionId, round: u32) -> Self {
        Self { auction_id, round }
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auction:{}/round:{}", self.auction_id, self.round)
    }
}

/// Mutual exclusion for round closing, safe to call from multiple
/// processes in a real deployment.
pub trait Locker: Send + Sync {
    /// Try to take the lock. Returns `false` if another holder has it —
    /// the caller must skip, not retry.
    fn try_acquire(&self, key: &LockKey, ttl: Duration) -> bool;

    /// Release a held lock. Releasing an expired or unheld lock is a no-op.
    fn release(&self, key: &LockKey);
}

/// In-process lock table with TTL expiry.
///
/// Multiple closers sharing one `MemoryLocker` get the same exclusion
/// semantics a shared lock service provides, which is what the
/// multi-instance tests exercise. A held entry whose TTL elapsed counts
/// as released (crashed-holder recovery).
#[derive(Debug, Default)]
pub struct MemoryLocker {
    held: Mutex<HashMap<LockKey, Instant>>,
}

impl MemoryLocker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            held: Mutex::new(HashMap::new()),
        }
    }

    /// Number of currently held (unexpired) locks.
    #[must_use]
    pub fn held_count(&self) -> usize {
        let now = Instant::now();
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|expires| **expires > now)
            .count()
    }
}

impl Locker for MemoryLocker {
    fn try_acquire(&self, key: &LockKey, ttl: Duration) -> bool {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        match held.get(key) {
            Some(expires) if *expires > now => false,
            _ => {
                held.insert(*key, now + ttl);
                true
            }
        }
    }

    fn release(&self, key: &LockKey) {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Degraded mode: every acquisition succeeds.
///
/// Correctness then rests entirely on the round registry's at-most-once
/// marker, checked inside the same atomic unit as settlement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLocker;

impl Locker for NullLocker {
    fn try_acquire(&self, _key: &LockKey, _ttl: Duration) -> bool {
        true
    }

    fn release(&self, _key: &LockKey) {}
}
