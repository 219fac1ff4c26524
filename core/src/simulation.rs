//! The simulation driver — per-customer stochastic timelines.
//!
//! Each customer is simulated independently:
//!   t = 0
//!   loop:
//!     t += gap drawn for the customer's current stage
//!     if t > horizon: stop (still active)
//!     quote the booking under both schemes
//!     new >= old  → transact under the new scheme
//!     new <  old  → churn (terminal)
//!
//! RULES:
//!   - `run_customer` only reads `self`; all per-run state lives in the
//!     returned outcome, so customers could be fanned out and merged.
//!   - Every customer draws from its own RNG stream (see rng.rs).

use crate::{
    config::SimConfig,
    error::{SimError, SimResult},
    legacy::LegacyDiscountEngine,
    model::{Booking, Customer, IdSequence},
    outcome::{CustomerOutcome, RunOutcome},
    reward::RewardEngine,
    rng::{RngBank, SimRng},
    stats::StageStatistics,
    types::{Day, Stage},
};

pub struct Simulator {
    config: SimConfig,
    stats:  StageStatistics,
    reward: RewardEngine,
    legacy: LegacyDiscountEngine,
}

impl Simulator {
    pub fn new(config: SimConfig, stats: StageStatistics) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            reward: RewardEngine::new(&config),
            legacy: LegacyDiscountEngine::new(&config),
            config,
            stats,
        })
    }

    pub fn config(&self) -> &SimConfig { &self.config }
    pub fn stats(&self) -> &StageStatistics { &self.stats }
    pub fn reward(&self) -> &RewardEngine { &self.reward }
    pub fn legacy(&self) -> &LegacyDiscountEngine { &self.legacy }

    /// Build the starting population: `initial_population` customers per
    /// stage, classified, with a seed accrual for anyone past stage 0.
    pub fn initialize(&self, ids: &mut IdSequence) -> SimResult<Vec<Customer>> {
        let capacity = usize::try_from(self.stats.total_population()).unwrap_or(0);
        let mut customers = Vec::with_capacity(capacity);

        for (stage, stats) in self.stats.iter() {
            let booking_count = stage.min(self.config.booking_cap);
            if booking_count != stage {
                log::warn!(
                    "stage {stage} exceeds booking cap {}; seeding at the cap",
                    self.config.booking_cap
                );
            }

            for _ in 0..stats.initial_population {
                let mut customer = Customer::new(ids.next_id(), booking_count);
                self.reward.retier(&mut customer)?;
                if booking_count > 0 {
                    self.reward.issue_initial_accrual(&mut customer, stats.mean_fare)?;
                }
                customers.push(customer);
            }
        }

        log::info!(
            "initialized {} customers across {} stages",
            customers.len(),
            self.stats.len()
        );
        Ok(customers)
    }

    /// Days until the customer's next booking. Always > 0.
    pub fn next_gap(&self, customer: &Customer, rng: &mut SimRng) -> SimResult<Day> {
        self.gap_for_stage(customer.booking_count(), rng)
    }

    fn gap_for_stage(&self, stage: Stage, rng: &mut SimRng) -> SimResult<Day> {
        let stats = self.stats.for_stage(stage);
        let mean = stats.mean_gap as f64;

        for _ in 0..self.config.max_gap_draws {
            // Truncate toward zero, as a whole-day count.
            let days = rng.normal(mean, stats.stdev_gap).trunc();
            if days >= 1.0 {
                return Ok(days.min(Day::MAX as f64) as Day);
            }
        }

        Err(SimError::config(format!(
            "no positive gap after {} draws for stage {stage} (mean={}, stdev={})",
            self.config.max_gap_draws, stats.mean_gap, stats.stdev_gap
        )))
    }

    /// Simulate one customer to the horizon or to churn.
    pub fn run_customer(
        &self,
        customer: &mut Customer,
        rng: &mut SimRng,
    ) -> SimResult<CustomerOutcome> {
        let mut outcome = CustomerOutcome::new(customer.id());
        if customer.is_churned() {
            return Ok(outcome);
        }
        if customer.tier().is_none() {
            self.reward.retier(customer)?;
        }

        let mut t: Day = 0;
        while !customer.is_churned() {
            t = t.saturating_add(self.next_gap(customer, rng)?);
            if t > self.config.horizon_days {
                break;
            }

            let fare = self.stats.for_stage(customer.booking_count()).mean_fare;
            let booking = Booking::new(t, fare);

            let new_discount = self.reward.quote_discount(customer, &booking)?;
            let old_discount = self.legacy.quote_discount(customer, &booking)?;

            if new_discount >= old_discount {
                if let Some(txn) = self.reward.transact(customer, &booking)? {
                    outcome.bookings += 1;
                    outcome.burned += txn.burned;
                }
            } else if let Some(from) = customer.churn() {
                outcome.churned_from = from;
                log::debug!(
                    "day={t} customer {} churned from {:?} (new={new_discount:.2} < old={old_discount:.2})",
                    customer.id(),
                    from,
                );
            }
        }

        log::debug!(
            "customer {} done: bookings={} burned={:.2} churned={}",
            customer.id(),
            outcome.bookings,
            outcome.burned,
            customer.is_churned(),
        );
        Ok(outcome)
    }

    /// Simulate every customer in order, each on its own RNG stream.
    pub fn run(&self, customers: &mut [Customer], bank: &RngBank) -> SimResult<RunOutcome> {
        let mut total = RunOutcome::default();
        for customer in customers.iter_mut() {
            let mut rng = bank.for_customer(customer.id());
            let outcome = self.run_customer(customer, &mut rng)?;
            total.record(&outcome);
        }

        log::info!(
            "run complete (seed={}): customers={} bookings={} burn={:.2} churn={}",
            bank.master_seed(),
            total.customers,
            total.bookings,
            total.burn,
            total.total_churn(),
        );
        Ok(total)
    }

    /// What the legacy scheme would have paid out over the horizon.
    ///
    /// Walks the same stochastic clock for each customer (same RNG
    /// stream as `run`), summing the legacy discount on every booking.
    /// Nobody churns under the legacy scheme and no customer state is
    /// touched; the booking count advances on a local copy. Pass the
    /// population as it stood before `run`: replaying the post-run
    /// population with frozen counts gives a different sum.
    pub fn estimate_legacy_burn(&self, customers: &[Customer], bank: &RngBank) -> SimResult<f64> {
        let mut burn: f64 = 0.0;
        for customer in customers {
            let mut rng = bank.for_customer(customer.id());
            let mut count = customer.booking_count();
            let mut t: Day = 0;

            loop {
                t = t.saturating_add(self.gap_for_stage(count, &mut rng)?);
                if t > self.config.horizon_days {
                    break;
                }
                let fare = self.stats.for_stage(count).mean_fare;
                burn += self.legacy.quote_for_count(count, fare)?;
                if count < self.config.booking_cap {
                    count += 1;
                }
            }
        }
        log::info!("legacy counterfactual burn={burn:.2}");
        Ok(burn)
    }
}
