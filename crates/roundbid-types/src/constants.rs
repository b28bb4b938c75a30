//! System-wide constants for the RoundBid auction engine.

/// Default round duration in milliseconds.
pub const DEFAULT_ROUND_DURATION_MS: u64 = 60_000;

/// Default scheduler tick interval in milliseconds.
pub const DEFAULT_SCHEDULER_TICK_MS: u64 = 250;

/// Default TTL for the round-closing lock in milliseconds. Long enough to
/// cover a slow settlement, short enough that a crashed holder does not
/// stall the auction for long.
pub const DEFAULT_LOCK_TTL_MS: u64 = 10_000;

/// Maximum rounds a single auction may be configured with.
pub const MAX_ROUNDS_PER_AUCTION: u32 = 1_000;

/// Maximum gift units a single auction may award.
pub const MAX_GIFTS_PER_AUCTION: u32 = 1_000_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "RoundBid";
