//! Old-scheme bracket discounts.

use loyalty_core::{
    config::SimConfig,
    legacy::LegacyDiscountEngine,
    model::{Accrual, Booking, Customer},
    reward::RewardEngine,
    types::Currency,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn engine() -> LegacyDiscountEngine {
    LegacyDiscountEngine::new(&SimConfig::default())
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Brackets ─────────────────────────────────────────────────────────────────

/// Fare 100 across every bracket edge of the default table.
#[test]
fn default_brackets_on_fare_of_one_hundred() {
    let engine = engine();
    let expected = [
        (0, 0.0),
        (2, 0.0),
        (3, 2.0),
        (10, 2.0),
        (11, 3.0),
        (25, 3.0),
        (26, 4.0),
        (50, 4.0),
        (60, 4.0),
        (61, 5.0),
        (500, 5.0),
    ];

    for (count, discount) in expected {
        let quote = engine.quote_for_count(count, 100.0).unwrap();
        assert!(close(quote, discount), "count={count} quote={quote} expected={discount}");
    }
}

#[test]
fn customer_quote_matches_count_quote() {
    let engine = engine();
    for count in [2, 3, 11, 26, 61] {
        let customer = Customer::new(1, count);
        let booking = Booking::new(7, 480.0);
        assert_eq!(
            engine.quote_discount(&customer, &booking).unwrap(),
            engine.quote_for_count(count, 480.0).unwrap(),
        );
    }
}

/// The minimum-bookings floor wins over a bracket that starts lower.
#[test]
fn min_bookings_floor_above_lowest_bracket() {
    let config = SimConfig { legacy_min_bookings: 5, ..SimConfig::default() };
    config.validate().unwrap();
    let engine = LegacyDiscountEngine::new(&config);

    assert_eq!(engine.quote_for_count(3, 100.0).unwrap(), 0.0);
    assert_eq!(engine.quote_for_count(4, 100.0).unwrap(), 0.0);
    assert!(close(engine.quote_for_count(5, 100.0).unwrap(), 2.0));
}

#[test]
fn discount_never_exceeds_fare() {
    let engine = engine();
    for count in 0..=80 {
        for fare in [0.0, 0.01, 1.0, 99.5, 1_000.0, 25_000.0] {
            let quote = engine.quote_for_count(count, fare).unwrap();
            assert!(quote >= 0.0 && quote <= fare, "count={count} fare={fare} quote={quote}");
        }
    }
}

/// Quoting is read-only: count, bookings and accruals are untouched.
#[test]
fn quote_leaves_customer_unchanged() {
    let config = SimConfig::default();
    let reward = RewardEngine::new(&config);
    let legacy = LegacyDiscountEngine::new(&config);

    let mut customer = Customer::new(1, 12);
    reward.retier(&mut customer).unwrap();
    customer.add_accrual(Accrual::new(40.0, Currency::Gold, 0, 90));
    reward.transact(&mut customer, &Booking::new(5, 300.0)).unwrap();

    let count = customer.booking_count();
    let standing = customer.standing();
    let bookings = customer.bookings().to_vec();
    let accruals = customer.accruals().to_vec();

    for day in [6, 30, 400] {
        legacy.quote_discount(&customer, &Booking::new(day, 250.0)).unwrap();
    }

    assert_eq!(customer.booking_count(), count);
    assert_eq!(customer.standing(), standing);
    assert_eq!(customer.bookings(), bookings.as_slice());
    assert_eq!(customer.accruals(), accruals.as_slice());
}
