//! New-scheme reward engine — currency accruals.
//!
//! Every retained booking:
//!   1. bumps the booking count and records the booking
//!   2. re-tiers the customer
//!   3. redeems live accruals against the fare, oldest first
//!   4. issues a fresh accrual in the (possibly new) tier currency
//!
//! The engine holds only configuration. Burn is returned to the caller
//! so per-customer runs never share mutable state.

use crate::{
    config::{ExchangeRates, SimConfig},
    error::SimResult,
    model::{Accrual, Booking, Customer},
    tier::TierTable,
    types::{Day, Stage, Tier},
};
use serde::{Deserialize, Serialize};

/// What one retained booking did to the books.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Fare-equivalent value redeemed against the booking.
    pub burned:        f64,
    /// Face value of the accrual issued for the booking.
    pub issued_face:   f64,
    pub tier_after:    Tier,
}

#[derive(Debug, Clone)]
pub struct RewardEngine {
    tiers:         TierTable,
    rates:         ExchangeRates,
    lapse_days:    Day,
    accrual_rate:  f64,
    booking_cap:   Stage,
}

impl RewardEngine {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            tiers:        config.tiers.clone(),
            rates:        config.exchange_rates.clone(),
            lapse_days:   config.lapse_days,
            accrual_rate: config.accrual_rate,
            booking_cap:  config.booking_cap,
        }
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    /// Fare-equivalent value of an accrual on `at`. Zero outside its window.
    pub fn valuate(&self, accrual: &Accrual, at: Day) -> SimResult<f64> {
        let rate = self.rates.rate(accrual.currency())?;
        if accrual.is_valid_at(at) {
            Ok(accrual.face_value() * rate)
        } else {
            Ok(0.0)
        }
    }

    /// Discount the customer could take on this booking.
    pub fn quote_discount(&self, customer: &Customer, booking: &Booking) -> SimResult<f64> {
        if customer.accruals().is_empty() {
            return Ok(0.0);
        }
        let mut total: f64 = 0.0;
        for accrual in customer.accruals() {
            total += self.valuate(accrual, booking.time)?;
        }
        Ok(total.min(booking.fare))
    }

    /// Greedy oldest-first redemption. Returns the value burned,
    /// which never exceeds the fare.
    pub fn redeem(&self, customer: &mut Customer, booking: &Booking) -> SimResult<f64> {
        let fare = booking.fare;
        let mut redeemed: f64 = 0.0;

        for accrual in customer.accruals_mut() {
            let value = self.valuate(accrual, booking.time)?;

            if redeemed + value <= fare {
                accrual.exhaust();
                redeemed += value;
                continue;
            }

            // This accrual covers the rest of the fare. Take only the
            // shortfall, converted back into face-value units.
            let shortfall = fare - redeemed;
            let rate = self.rates.rate(accrual.currency())?;
            if rate > 0.0 {
                accrual.reduce_face_value(shortfall / rate);
            }
            redeemed += shortfall;
            break;
        }

        Ok(redeemed)
    }

    /// Re-classify by booking count. Churned customers keep their standing.
    pub fn retier(&self, customer: &mut Customer) -> SimResult<()> {
        if customer.is_churned() {
            log::warn!("retier ignored for churned customer {}", customer.id());
            return Ok(());
        }
        let tier = self.tiers.classify(customer.booking_count())?;
        customer.set_tier(tier);
        Ok(())
    }

    /// Seed accrual for a customer who joins the run with bookings
    /// already behind them. Valid from day 0.
    pub fn issue_initial_accrual(&self, customer: &mut Customer, fare: f64) -> SimResult<()> {
        let accrual = self.issue(customer, fare, 0)?;
        customer.add_accrual(accrual);
        Ok(())
    }

    /// Commit a retained booking. Returns None for churned customers,
    /// whose state never changes again.
    pub fn transact(
        &self,
        customer: &mut Customer,
        booking: &Booking,
    ) -> SimResult<Option<Transaction>> {
        if !customer.add_booking(*booking, self.booking_cap) {
            log::warn!("transact ignored for churned customer {}", customer.id());
            return Ok(None);
        }
        self.retier(customer)?;
        let burned = self.redeem(customer, booking)?;

        let accrual = self.issue(customer, booking.fare, booking.time)?;
        let issued_face = accrual.face_value();
        customer.add_accrual(accrual);

        let tier_after = self.tiers.classify(customer.booking_count())?;
        Ok(Some(Transaction { burned, issued_face, tier_after }))
    }

    fn issue(&self, customer: &Customer, fare: f64, from: Day) -> SimResult<Accrual> {
        let tier = match customer.tier() {
            Some(tier) => tier,
            None => self.tiers.classify(customer.booking_count())?,
        };
        let currency = self.tiers.currency_of(tier)?;
        Ok(Accrual::new(
            fare * self.accrual_rate,
            currency,
            from,
            from.saturating_add(self.lapse_days),
        ))
    }
}
