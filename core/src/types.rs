//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A simulated day. Day 0 is the start of the run.
pub type Day = u64;

/// A stable, unique identifier for a simulated customer.
pub type CustomerId = u64;

/// A customer's booking count. Also the key into the stage table.
pub type Stage = u32;

/// New-scheme tier identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Tier1, Tier::Tier2, Tier::Tier3, Tier::Tier4];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tier1 => "Tier1",
            Self::Tier2 => "Tier2",
            Self::Tier3 => "Tier3",
            Self::Tier4 => "Tier4",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Reward currencies granted by new-scheme tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl Currency {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bronze  => "Bronze",
            Self::Silver  => "Silver",
            Self::Gold    => "Gold",
            Self::Diamond => "Diamond",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
