//! Gift metadata — the item class a round-based auction distributes.
//!
//! `total_supply` is informational at this layer: the number of units an
//! auction actually awards is `Auction::total_gifts`.

use serde::{Deserialize, Serialize};

use crate::GiftId;

/// Static metadata for a gift.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gift {
    pub id: GiftId,
    /// Human-readable name (e.g., "Plush Pepe").
    pub name: String,
    /// Total supply ever minted across all auctions.
    pub total_supply: u32,
}

impl Gift {
    #[must_use]
    pub fn new(name: impl Into<String>, total_supply: u32) -> Self {
        Self {
            id: GiftId::new(),
            name: name.into(),
            total_supply,
        }
    }
}
