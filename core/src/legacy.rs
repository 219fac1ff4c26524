//! Old-scheme discount engine — a flat percentage by booking bracket.
//! Read-only: it quotes, it never touches the customer.

use crate::{
    config::SimConfig,
    error::{SimError, SimResult},
    model::{Booking, Customer},
    tier::BracketTable,
    types::Stage,
};

#[derive(Debug, Clone)]
pub struct LegacyDiscountEngine {
    brackets:     BracketTable,
    min_bookings: Stage,
}

impl LegacyDiscountEngine {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            brackets:     config.legacy_brackets.clone(),
            min_bookings: config.legacy_min_bookings,
        }
    }

    pub fn quote_discount(&self, customer: &Customer, booking: &Booking) -> SimResult<f64> {
        self.quote_for_count(customer.booking_count(), booking.fare)
    }

    /// Same quote, keyed directly by booking count.
    pub fn quote_for_count(&self, count: Stage, fare: f64) -> SimResult<f64> {
        if count < self.min_bookings || count < self.brackets.lowest_bound() {
            return Ok(0.0);
        }
        let rate = self.brackets.rate_for(count).ok_or_else(|| {
            SimError::config(format!("no legacy bracket covers {count} bookings"))
        })?;
        Ok(fare * rate)
    }
}
