//! Seeded randomness for booking timelines.
//!
//! A run has one master seed. Every customer's booking clock is driven by
//! its own `SimRng`, derived from that seed and the customer id, so a
//! customer's gaps come out the same whichever order the population is
//! walked in, and the legacy counterfactual can replay the same clock.

use crate::types::CustomerId;
use rand::{RngCore, SeedableRng};
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64Mcg;

/// Golden-ratio multiplier that spreads sequential ids across seed space.
const ID_SPREAD: u64 = 0x9e37_79b9_7f4a_7c15;

/// Random source for one customer's booking clock.
pub struct SimRng {
    inner: Pcg64Mcg,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// One normal deviate. A stdev that is not a positive finite number
    /// collapses to `mean`.
    pub fn normal(&mut self, mean: f64, stdev: f64) -> f64 {
        if !stdev.is_finite() || stdev <= 0.0 {
            return mean;
        }
        match Normal::new(mean, stdev) {
            Ok(dist) => dist.sample(&mut self.inner),
            Err(_) => mean,
        }
    }
}

/// Per-customer streams for one run.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_customer(&self, id: CustomerId) -> SimRng {
        SimRng::new(self.master_seed ^ id.wrapping_mul(ID_SPREAD))
    }
}
