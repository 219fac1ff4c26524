//! Entity model — accruals, bookings and customers.
//!
//! RULE: Only the reward engine and the simulator mutate customers.
//! Everything here is plain in-memory state for a single run.

use crate::types::{Currency, CustomerId, Day, Stage, Tier};
use serde::{Deserialize, Serialize};

/// A currency-denominated reward balance with a validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accrual {
    face_value: f64,
    currency:   Currency,
    valid_from: Day,
    valid_to:   Day,
}

impl Accrual {
    /// Panics if the window is inverted; the reward engine builds windows
    /// as `[t, t + lapse]` with a saturating add, which cannot invert.
    pub fn new(face_value: f64, currency: Currency, valid_from: Day, valid_to: Day) -> Self {
        assert!(valid_from <= valid_to, "accrual window inverted: {valid_from} > {valid_to}");
        Self {
            face_value: face_value.max(0.0),
            currency,
            valid_from,
            valid_to,
        }
    }

    pub fn face_value(&self) -> f64 { self.face_value }
    pub fn currency(&self) -> Currency { self.currency }
    pub fn valid_from(&self) -> Day { self.valid_from }
    pub fn valid_to(&self) -> Day { self.valid_to }

    pub fn is_valid_at(&self, day: Day) -> bool {
        self.valid_from <= day && day <= self.valid_to
    }

    /// Face value can only go down, and never below zero.
    pub(crate) fn reduce_face_value(&mut self, by: f64) {
        self.face_value = (self.face_value - by.max(0.0)).max(0.0);
    }

    pub(crate) fn exhaust(&mut self) {
        self.face_value = 0.0;
    }
}

/// A single purchase event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub time: Day,
    pub fare: f64,
}

impl Booking {
    pub fn new(time: Day, fare: f64) -> Self {
        Self { time, fare: fare.max(0.0) }
    }
}

/// Where a customer stands in the new scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Standing {
    Unassigned,
    Member { tier: Tier },
    /// Terminal. `from` is the tier held at the moment of churn.
    Churned { from: Option<Tier> },
}

impl Standing {
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::Member { tier } => Some(*tier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    id:            CustomerId,
    standing:      Standing,
    booking_count: Stage,
    accruals:      Vec<Accrual>,
    bookings:      Vec<Booking>,
}

impl Customer {
    pub fn new(id: CustomerId, booking_count: Stage) -> Self {
        Self {
            id,
            standing: Standing::Unassigned,
            booking_count,
            accruals: Vec::new(),
            bookings: Vec::new(),
        }
    }

    pub fn id(&self) -> CustomerId { self.id }
    pub fn standing(&self) -> Standing { self.standing }
    pub fn tier(&self) -> Option<Tier> { self.standing.tier() }
    pub fn booking_count(&self) -> Stage { self.booking_count }

    pub fn is_churned(&self) -> bool {
        matches!(self.standing, Standing::Churned { .. })
    }

    /// Oldest first. Empty when nothing has been issued yet.
    pub fn accruals(&self) -> &[Accrual] { &self.accruals }

    pub fn bookings(&self) -> &[Booking] { &self.bookings }

    pub(crate) fn accruals_mut(&mut self) -> &mut [Accrual] { &mut self.accruals }

    pub fn add_accrual(&mut self, accrual: Accrual) {
        self.accruals.push(accrual);
    }

    /// Append a booking and bump the count, saturating at `cap`.
    /// Returns false (and records nothing) once churned.
    pub(crate) fn add_booking(&mut self, booking: Booking, cap: Stage) -> bool {
        if self.is_churned() {
            return false;
        }
        self.bookings.push(booking);
        if self.booking_count < cap {
            self.booking_count += 1;
        }
        true
    }

    /// Returns false once churned; the standing is terminal.
    pub(crate) fn set_tier(&mut self, tier: Tier) -> bool {
        if self.is_churned() {
            return false;
        }
        self.standing = Standing::Member { tier };
        true
    }

    /// Mark churned. Returns the tier held just before, or None
    /// if the customer had already churned.
    pub fn churn(&mut self) -> Option<Option<Tier>> {
        if self.is_churned() {
            return None;
        }
        let from = self.tier();
        self.standing = Standing::Churned { from };
        Some(from)
    }
}

/// Sequential identifier issuance. The first id is 1.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: CustomerId,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> CustomerId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdSequence {
    fn default() -> Self { Self::new() }
}
