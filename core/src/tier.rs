//! Tier tables for both loyalty schemes.
//!
//! Both tables are ordered lists of inclusive booking-count ranges.
//! They are validated once, at configuration load:
//!   - ranges are contiguous (no gaps) and disjoint (no overlaps)
//!   - the last range is unbounded, so every count above the first
//!     lower bound has exactly one match
//!   - the new-scheme table starts at 0
//!
//! Lookups still scan in order and take the first match.

use crate::{
    error::{SimError, SimResult},
    types::{Currency, Stage, Tier},
};
use serde::{Deserialize, Serialize};

/// One new-scheme tier: a booking-count range granting a currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRange {
    pub tier:         Tier,
    pub min_bookings: Stage,
    /// Inclusive. `None` means unbounded.
    #[serde(default)]
    pub max_bookings: Option<Stage>,
    pub currency:     Currency,
}

impl TierRange {
    pub fn contains(&self, booking_count: Stage) -> bool {
        booking_count >= self.min_bookings
            && self.max_bookings.map_or(true, |max| booking_count <= max)
    }
}

/// One old-scheme bracket: a booking-count range granting a flat rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountBracket {
    pub min_bookings: Stage,
    #[serde(default)]
    pub max_bookings: Option<Stage>,
    pub rate:         f64,
}

impl DiscountBracket {
    pub fn contains(&self, booking_count: Stage) -> bool {
        booking_count >= self.min_bookings
            && self.max_bookings.map_or(true, |max| booking_count <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierTable {
    ranges: Vec<TierRange>,
}

impl TierTable {
    /// Build and validate. The table must start at 0.
    pub fn new(ranges: Vec<TierRange>) -> SimResult<Self> {
        let table = Self { ranges };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> SimResult<()> {
        let bounds: Vec<_> = self
            .ranges
            .iter()
            .map(|r| (r.min_bookings, r.max_bookings))
            .collect();
        check_partition("tier table", &bounds)?;

        if self.ranges[0].min_bookings != 0 {
            return Err(SimError::config(format!(
                "tier table must start at 0 bookings, starts at {}",
                self.ranges[0].min_bookings
            )));
        }

        for (i, range) in self.ranges.iter().enumerate() {
            if self.ranges[..i].iter().any(|r| r.tier == range.tier) {
                return Err(SimError::config(format!(
                    "tier {} defined more than once",
                    range.tier
                )));
            }
        }
        Ok(())
    }

    pub fn ranges(&self) -> &[TierRange] {
        &self.ranges
    }

    /// First tier whose range contains `booking_count`.
    pub fn classify(&self, booking_count: Stage) -> SimResult<Tier> {
        self.ranges
            .iter()
            .find(|r| r.contains(booking_count))
            .map(|r| r.tier)
            .ok_or_else(|| {
                SimError::config(format!("no tier covers {booking_count} bookings"))
            })
    }

    pub fn currency_of(&self, tier: Tier) -> SimResult<Currency> {
        self.ranges
            .iter()
            .find(|r| r.tier == tier)
            .map(|r| r.currency)
            .ok_or_else(|| SimError::config(format!("tier {tier} has no currency")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BracketTable {
    brackets: Vec<DiscountBracket>,
}

impl BracketTable {
    pub fn new(brackets: Vec<DiscountBracket>) -> SimResult<Self> {
        let table = Self { brackets };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> SimResult<()> {
        let bounds: Vec<_> = self
            .brackets
            .iter()
            .map(|b| (b.min_bookings, b.max_bookings))
            .collect();
        check_partition("legacy bracket table", &bounds)?;

        if let Some(b) = self.brackets.iter().find(|b| !(0.0..=1.0).contains(&b.rate)) {
            return Err(SimError::config(format!(
                "legacy bracket starting at {} has rate {} outside [0, 1]",
                b.min_bookings, b.rate
            )));
        }
        Ok(())
    }

    pub fn brackets(&self) -> &[DiscountBracket] {
        &self.brackets
    }

    /// Lowest count any bracket covers.
    pub fn lowest_bound(&self) -> Stage {
        self.brackets.first().map_or(0, |b| b.min_bookings)
    }

    /// Rate of the first bracket containing `booking_count`.
    pub fn rate_for(&self, booking_count: Stage) -> Option<f64> {
        self.brackets
            .iter()
            .find(|b| b.contains(booking_count))
            .map(|b| b.rate)
    }
}

/// Ranges must be non-empty, ordered, contiguous, disjoint and
/// end in an unbounded range.
fn check_partition(what: &str, bounds: &[(Stage, Option<Stage>)]) -> SimResult<()> {
    let Some((_, last_max)) = bounds.last() else {
        return Err(SimError::config(format!("{what} is empty")));
    };
    if let Some(max) = last_max {
        return Err(SimError::config(format!(
            "{what} ends at {max}; the last range must be unbounded"
        )));
    }

    for pair in bounds.windows(2) {
        let (min, max) = pair[0];
        let (next_min, _) = pair[1];
        let Some(max) = max else {
            return Err(SimError::config(format!(
                "{what}: only the last range may be unbounded (range from {min})"
            )));
        };
        if max < min {
            return Err(SimError::config(format!(
                "{what}: range {min}..={max} is inverted"
            )));
        }
        if next_min <= max {
            return Err(SimError::config(format!(
                "{what}: range from {next_min} overlaps {min}..={max}"
            )));
        }
        if next_min != max + 1 {
            return Err(SimError::config(format!(
                "{what}: gap between {max} and {next_min}"
            )));
        }
    }
    Ok(())
}
