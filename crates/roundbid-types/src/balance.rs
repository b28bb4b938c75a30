//! Balance tracking types for the RoundBid fund-locking model.
//!
//! Every user has an `available` balance (spendable on new bids)
//! and a `locked` balance (reserved against active bids).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single user's balance pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    /// Available for new bids / withdrawal.
    pub available: Decimal,
    /// Locked against active bids awaiting settlement.
    pub locked: Decimal,
}

impl BalanceEntry {
    /// Create a zero balance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: Decimal::ZERO,
            locked: Decimal::ZERO,
        }
    }

    /// Total balance (available + locked).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.available + self.locked
    }

    /// Whether this entry has no balance at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.available.is_zero() && self.locked.is_zero()
    }
}

impl Default for BalanceEntry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_entry_default_is_zero() {
        let entry = BalanceEntry::default();
        assert_eq!(entry.available, Decimal::ZERO);
        assert_eq!(entry.locked, Decimal::ZERO);
        assert!(entry.is_zero());
    }

    #[test]
    fn balance_entry_total() {
        let entry = BalanceEntry {
            available: Decimal::new(100, 0),
            locked: Decimal::new(50, 0),
        };
        assert_eq!(entry.total(), Decimal::new(150, 0));
        assert!(!entry.is_zero());
    }

    #[test]
    fn balance_entry_serde_roundtrip() {
        let entry = BalanceEntry {
            available: Decimal::new(12345, 2), // 123.45
            locked: Decimal::new(678, 1),      // 67.8
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: BalanceEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
