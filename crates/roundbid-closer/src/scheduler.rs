//! The deadline scheduler — one coordination loop for all auctions.
//!
//! Instead of one timer per auction, a single loop scans RUNNING auctions
//! for due deadlines on a fixed tick. Each deadline is recomputed from the
//! auction's `round_started_at` + `round_duration` on every scan, so a
//! process restart loses nothing: the next tick sees the same deadlines
//! the old process did.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};
use roundbid_types::{RoundOutcome, SchedulerConfig};

use crate::closer::RoundCloser;
use crate::engine::AuctionEngine;

/// Scans for due rounds and drives the [`RoundCloser`].
pub struct RoundScheduler {
    engine: Arc<Mutex<AuctionEngine>>,
    closer: RoundCloser,
    tick: Duration,
}

impl RoundScheduler {
    /// Create a scheduler over a shared engine.
    #[must_use]
    pub fn new(
        engine: Arc<Mutex<AuctionEngine>>,
        closer: RoundCloser,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            engine,
            closer,
            tick: config.tick,
        }
    }

    /// One scan: close every due round. Returns the outcomes settled by
    /// this instance (skipped rounds — contention, halts — are not
    /// included).
    ///
    /// The engine mutex is held for the duration of the scan; this is the
    /// atomic unit that totally orders settlement against bid placement.
    pub fn poll_once(&mut self, now: DateTime<Utc>) -> Vec<RoundOutcome> {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        let due = engine.due_auctions(now);
        let mut closed = Vec::new();
        for auction_id in due {
            match self.closer.close_round(&mut engine, auction_id, now) {
                Ok(Some(outcome)) => closed.push(outcome),
                Ok(None) => {} // contention or halt; not ours to settle
                Err(err) => {
                    tracing::warn!(auction = %auction_id, %err, "round close failed");
                }
            }
        }
        closed
    }

    /// Run the loop forever. Abort the task (or drop the runtime) to stop.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            self.poll_once(Utc::now());
        }
    }

    /// Spawn the loop onto the current tokio runtime.
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
