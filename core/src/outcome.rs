//! Run results — plain values produced by the simulator and merged
//! by summation. Nothing here is shared mutable state.

use crate::{
    model::{Customer, Standing},
    types::{CustomerId, Tier},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What happened to one customer over the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOutcome {
    pub customer_id:  CustomerId,
    /// Bookings committed under the new scheme.
    pub bookings:     u64,
    pub burned:       f64,
    /// Tier held when the customer churned, if they did.
    pub churned_from: Option<Tier>,
}

impl CustomerOutcome {
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            bookings:     0,
            burned:       0.0,
            churned_from: None,
        }
    }
}

/// Aggregate over any number of customers. `merge` is associative and
/// `RunOutcome::default()` is its identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub customers: u64,
    pub bookings:  u64,
    pub burn:      f64,
    pub churn:     BTreeMap<Tier, u64>,
}

impl RunOutcome {
    pub fn record(&mut self, outcome: &CustomerOutcome) {
        self.customers += 1;
        self.bookings += outcome.bookings;
        self.burn += outcome.burned;
        if let Some(tier) = outcome.churned_from {
            *self.churn.entry(tier).or_insert(0) += 1;
        }
    }

    pub fn merge(mut self, other: RunOutcome) -> RunOutcome {
        self.customers += other.customers;
        self.bookings += other.bookings;
        self.burn += other.burn;
        for (tier, n) in other.churn {
            *self.churn.entry(tier).or_insert(0) += n;
        }
        self
    }

    pub fn churn_for(&self, tier: Tier) -> u64 {
        self.churn.get(&tier).copied().unwrap_or(0)
    }

    pub fn total_churn(&self) -> u64 {
        self.churn.values().sum()
    }
}

/// Head count per tier, plus churned and not-yet-classified customers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub by_tier:    BTreeMap<Tier, u64>,
    pub churned:    u64,
    pub unassigned: u64,
}

impl TierDistribution {
    pub fn of(customers: &[Customer]) -> Self {
        let mut dist = Self::default();
        for tier in Tier::ALL {
            dist.by_tier.insert(tier, 0);
        }
        for customer in customers {
            match customer.standing() {
                Standing::Member { tier } => *dist.by_tier.entry(tier).or_insert(0) += 1,
                Standing::Churned { .. }  => dist.churned += 1,
                Standing::Unassigned      => dist.unassigned += 1,
            }
        }
        dist
    }

    pub fn count(&self, tier: Tier) -> u64 {
        self.by_tier.get(&tier).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.by_tier.values().sum::<u64>() + self.churned + self.unassigned
    }
}
