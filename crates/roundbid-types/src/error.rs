//! Error types for the RoundBid auction engine.
//!
//! All errors use the `RB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Bid errors
//! - 2xx: Balance errors
//! - 3xx: Auction lifecycle errors
//! - 4xx: Round-closing errors
//! - 8xx: Safety invariant errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AuctionId, AuctionStatus, BidId, GiftId};

/// Central error enum for all RoundBid operations.
#[derive(Debug, Error)]
pub enum AuctionError {
    // =================================================================
    // Bid Errors (1xx)
    // =================================================================
    /// The bid is below the auction minimum, or not strictly greater than
    /// the user's existing active bid.
    #[error("RB_ERR_100: Bid too low: {amount} must exceed {floor}")]
    BidTooLow { amount: Decimal, floor: Decimal },

    /// The requested bid was not found.
    #[error("RB_ERR_101: Bid not found: {0}")]
    BidNotFound(BidId),

    /// The bid is no longer ACTIVE (already won or refunded).
    #[error("RB_ERR_102: Bid is not active: {0}")]
    BidNotActive(BidId),

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Not enough available balance to lock for the bid.
    #[error("RB_ERR_200: Insufficient available balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// An operation was given a non-positive amount.
    #[error("RB_ERR_201: Invalid amount: {0} must be positive")]
    InvalidAmount(Decimal),

    // =================================================================
    // Auction Lifecycle Errors (3xx)
    // =================================================================
    /// The requested auction was not found.
    #[error("RB_ERR_300: Auction not found: {0}")]
    AuctionNotFound(AuctionId),

    /// Bids are only accepted while the auction is RUNNING.
    #[error("RB_ERR_301: Auction not running (status {actual})")]
    AuctionNotRunning { actual: AuctionStatus },

    /// A state transition was attempted from the wrong status.
    #[error("RB_ERR_302: Wrong auction status: expected {expected}, got {actual}")]
    WrongAuctionStatus {
        expected: AuctionStatus,
        actual: AuctionStatus,
    },

    /// The auction configuration failed validation.
    #[error("RB_ERR_303: Invalid auction config: {reason}")]
    InvalidConfig { reason: String },

    /// The referenced gift is not registered.
    #[error("RB_ERR_304: Gift not found: {0}")]
    GiftNotFound(GiftId),

    // =================================================================
    // Round-Closing Errors (4xx)
    // =================================================================
    /// The round has already been settled (at-most-once guard).
    #[error("RB_ERR_400: Round {round} already closed for auction {auction_id}")]
    RoundAlreadyClosed { auction_id: AuctionId, round: u32 },

    /// Another instance holds the round-closing lock. Expected under
    /// multi-instance deployment; never retried by the losing instance.
    #[error("RB_ERR_401: Round-closing lock contention on {key}")]
    LockContention { key: String },

    /// The auction has no running round to close.
    #[error("RB_ERR_402: Round not started for auction {0}")]
    RoundNotStarted(AuctionId),

    // =================================================================
    // Safety Invariant Errors (8xx)
    // =================================================================
    /// A ledger invariant was violated — critical safety alert. Settlement
    /// for the affected auction halts until an operator intervenes.
    #[error("RB_ERR_800: Inconsistent ledger state: {reason}")]
    InconsistentLedgerState { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("RB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("RB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("RB_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk, network).
    #[error("RB_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, AuctionError>;

// Conversion from std::io::Error
impl From<std::io::Error> for AuctionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
