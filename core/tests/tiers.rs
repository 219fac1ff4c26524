//! Tier table classification and load-time validation.

use loyalty_core::{
    config::{ExchangeRates, SimConfig},
    tier::{BracketTable, DiscountBracket, TierRange, TierTable},
    types::{Currency, Tier},
    SimError,
};
use std::collections::BTreeMap;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn range(tier: Tier, min: u32, max: Option<u32>, currency: Currency) -> TierRange {
    TierRange { tier, min_bookings: min, max_bookings: max, currency }
}

fn bracket(min: u32, max: Option<u32>, rate: f64) -> DiscountBracket {
    DiscountBracket { min_bookings: min, max_bookings: max, rate }
}

fn assert_config_error<T: std::fmt::Debug>(result: Result<T, SimError>) {
    match result {
        Err(SimError::Configuration(_)) => {}
        other => panic!("Expected a configuration error, got {other:?}"),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn default_tiers_match_booking_ranges() {
    let tiers = SimConfig::default().tiers;

    assert_eq!(tiers.classify(0).unwrap(), Tier::Tier1);
    assert_eq!(tiers.classify(2).unwrap(), Tier::Tier1);
    assert_eq!(tiers.classify(3).unwrap(), Tier::Tier2);
    assert_eq!(tiers.classify(10).unwrap(), Tier::Tier2);
    assert_eq!(tiers.classify(11).unwrap(), Tier::Tier3);
    assert_eq!(tiers.classify(20).unwrap(), Tier::Tier3);
    assert_eq!(tiers.classify(21).unwrap(), Tier::Tier4);
    assert_eq!(tiers.classify(50).unwrap(), Tier::Tier4);
}

/// Every count has exactly one matching range in both default tables.
#[test]
fn default_tables_are_total_and_disjoint() {
    let config = SimConfig::default();

    for n in (0..=500).chain([u32::MAX - 1, u32::MAX]) {
        let tier_hits = config.tiers.ranges().iter().filter(|r| r.contains(n)).count();
        assert_eq!(tier_hits, 1, "count {n} matched {tier_hits} tier ranges");

        let lowest = config.legacy_brackets.lowest_bound();
        let bracket_hits = config
            .legacy_brackets
            .brackets()
            .iter()
            .filter(|b| b.contains(n))
            .count();
        let expected = if n < lowest { 0 } else { 1 };
        assert_eq!(bracket_hits, expected, "count {n} matched {bracket_hits} brackets");
    }
}

#[test]
fn default_config_validates() {
    SimConfig::default().validate().unwrap();
}

#[test]
fn tier_currencies_follow_table() {
    let tiers = SimConfig::default().tiers;
    assert_eq!(tiers.currency_of(Tier::Tier1).unwrap(), Currency::Bronze);
    assert_eq!(tiers.currency_of(Tier::Tier2).unwrap(), Currency::Silver);
    assert_eq!(tiers.currency_of(Tier::Tier3).unwrap(), Currency::Gold);
    assert_eq!(tiers.currency_of(Tier::Tier4).unwrap(), Currency::Diamond);
}

#[test]
fn gap_between_tiers_rejected() {
    assert_config_error(TierTable::new(vec![
        range(Tier::Tier1, 0, Some(2), Currency::Bronze),
        range(Tier::Tier2, 4, None, Currency::Silver),
    ]));
}

/// The shipped defaults once overlapped at 20; overlaps are now a load error.
#[test]
fn overlapping_tiers_rejected() {
    assert_config_error(TierTable::new(vec![
        range(Tier::Tier1, 0, Some(20), Currency::Bronze),
        range(Tier::Tier2, 20, None, Currency::Silver),
    ]));
}

#[test]
fn tier_table_must_start_at_zero() {
    assert_config_error(TierTable::new(vec![
        range(Tier::Tier1, 1, None, Currency::Bronze),
    ]));
}

#[test]
fn bounded_last_tier_rejected() {
    assert_config_error(TierTable::new(vec![
        range(Tier::Tier1, 0, Some(2), Currency::Bronze),
        range(Tier::Tier2, 3, Some(99), Currency::Silver),
    ]));
}

#[test]
fn duplicate_tier_rejected() {
    assert_config_error(TierTable::new(vec![
        range(Tier::Tier1, 0, Some(2), Currency::Bronze),
        range(Tier::Tier1, 3, None, Currency::Silver),
    ]));
}

#[test]
fn empty_tables_rejected() {
    assert_config_error(TierTable::new(vec![]));
    assert_config_error(BracketTable::new(vec![]));
}

#[test]
fn legacy_brackets_may_start_above_zero() {
    let table = BracketTable::new(vec![
        bracket(3, Some(10), 0.02),
        bracket(11, None, 0.03),
    ])
    .unwrap();

    assert_eq!(table.rate_for(2), None);
    assert_eq!(table.rate_for(3), Some(0.02));
    assert_eq!(table.rate_for(11), Some(0.03));
    assert_eq!(table.rate_for(10_000), Some(0.03));
}

#[test]
fn legacy_rate_above_one_rejected() {
    assert_config_error(BracketTable::new(vec![bracket(0, None, 1.5)]));
}

/// A tier whose currency has no exchange rate fails validation up front,
/// not on the first valuation.
#[test]
fn missing_exchange_rate_rejected() {
    let config = SimConfig {
        exchange_rates: ExchangeRates::new(BTreeMap::from([
            (Currency::Bronze, 0.05),
            (Currency::Silver, 0.10),
            (Currency::Gold, 0.15),
        ])),
        ..SimConfig::default()
    };
    assert_config_error(config.validate());
}

#[test]
fn negative_exchange_rate_rejected() {
    let config = SimConfig {
        exchange_rates: ExchangeRates::new(BTreeMap::from([
            (Currency::Bronze, -0.05),
            (Currency::Silver, 0.10),
            (Currency::Gold, 0.15),
            (Currency::Diamond, 0.20),
        ])),
        ..SimConfig::default()
    };
    assert_config_error(config.validate());
}

#[test]
fn partial_json_config_takes_defaults() {
    let config: SimConfig =
        serde_json::from_str(r#"{ "horizon_days": 30, "lapse_days": 45 }"#).unwrap();
    config.validate().unwrap();

    assert_eq!(config.horizon_days, 30);
    assert_eq!(config.lapse_days, 45);
    assert_eq!(config.booking_cap, 50);
    assert_eq!(config.tiers, SimConfig::default().tiers);
}

#[test]
fn json_tier_table_round_trips_through_load() {
    let json = r#"{
        "tiers": [
            { "tier": "Tier1", "min_bookings": 0, "max_bookings": 4, "currency": "Bronze" },
            { "tier": "Tier2", "min_bookings": 5, "currency": "Gold" }
        ],
        "exchange_rates": { "Bronze": 0.5, "Gold": 1.0 },
        "legacy_brackets": [
            { "min_bookings": 5, "rate": 0.1 }
        ]
    }"#;

    let path = std::env::temp_dir().join(format!("loyalty-config-{}.json", std::process::id()));
    std::fs::write(&path, json).unwrap();
    let config = SimConfig::load(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.tiers.classify(4).unwrap(), Tier::Tier1);
    assert_eq!(config.tiers.classify(5).unwrap(), Tier::Tier2);
    assert_eq!(config.exchange_rates.rate(Currency::Gold).unwrap(), 1.0);
    assert_eq!(config.legacy_brackets.rate_for(7), Some(0.1));
}

#[test]
fn load_missing_file_is_io_error() {
    match SimConfig::load("/nonexistent/loyalty/config.json") {
        Err(SimError::Io(_)) => {}
        other => panic!("Expected Io error, got {other:?}"),
    }
}
