use crate::{
    error::{SimError, SimResult},
    tier::{BracketTable, DiscountBracket, TierRange, TierTable},
    types::{Currency, Day, Stage, Tier},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Days an accrual stays valid after issue.
pub const DEFAULT_LAPSE_DAYS: Day = 90;
/// Simulation horizon in days.
pub const DEFAULT_HORIZON_DAYS: Day = 365;
pub const DEFAULT_BOOKING_CAP: Stage = 50;
/// Share of the fare issued back as a new accrual.
pub const DEFAULT_ACCRUAL_RATE: f64 = 0.10;
/// Legacy discounts start at this many bookings.
pub const DEFAULT_LEGACY_MIN_BOOKINGS: Stage = 3;
pub const DEFAULT_MAX_GAP_DRAWS: u32 = 10_000;

/// Conversion from each reward currency to fare-equivalent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRates {
    rates: BTreeMap<Currency, f64>,
}

impl ExchangeRates {
    pub fn new(rates: BTreeMap<Currency, f64>) -> Self {
        Self { rates }
    }

    pub fn rate(&self, currency: Currency) -> SimResult<f64> {
        self.rates
            .get(&currency)
            .copied()
            .ok_or_else(|| SimError::config(format!("no exchange rate for {currency}")))
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self::new(BTreeMap::from([
            (Currency::Bronze,  0.05),
            (Currency::Silver,  0.10),
            (Currency::Gold,    0.15),
            (Currency::Diamond, 0.20),
        ]))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub lapse_days:          Day,
    pub horizon_days:        Day,
    pub booking_cap:         Stage,
    pub accrual_rate:        f64,
    pub legacy_min_bookings: Stage,
    /// Rejection-sampling budget for one inter-booking gap.
    pub max_gap_draws:       u32,
    pub tiers:               TierTable,
    pub exchange_rates:      ExchangeRates,
    pub legacy_brackets:     BracketTable,
}

impl SimConfig {
    /// Load a JSON config file. Missing keys take their defaults.
    pub fn load(path: &str) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config from {path}");
        Ok(config)
    }

    /// Fail fast on anything the simulation would otherwise trip
    /// over mid-run.
    pub fn validate(&self) -> SimResult<()> {
        self.tiers.validate()?;
        self.legacy_brackets.validate()?;

        for range in self.tiers.ranges() {
            let rate = self.exchange_rates.rate(range.currency)?;
            if !rate.is_finite() || rate < 0.0 {
                return Err(SimError::config(format!(
                    "exchange rate for {} must be a non-negative number, got {rate}",
                    range.currency
                )));
            }
        }

        if self.booking_cap == 0 {
            return Err(SimError::config("booking_cap must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.accrual_rate) {
            return Err(SimError::config(format!(
                "accrual_rate must be within [0, 1], got {}",
                self.accrual_rate
            )));
        }
        if self.max_gap_draws == 0 {
            return Err(SimError::config("max_gap_draws must be at least 1"));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            lapse_days:          DEFAULT_LAPSE_DAYS,
            horizon_days:        DEFAULT_HORIZON_DAYS,
            booking_cap:         DEFAULT_BOOKING_CAP,
            accrual_rate:        DEFAULT_ACCRUAL_RATE,
            legacy_min_bookings: DEFAULT_LEGACY_MIN_BOOKINGS,
            max_gap_draws:       DEFAULT_MAX_GAP_DRAWS,
            tiers:               default_tiers(),
            exchange_rates:      ExchangeRates::default(),
            legacy_brackets:     default_legacy_brackets(),
        }
    }
}

fn default_tiers() -> TierTable {
    let range = |tier, min, max, currency| TierRange {
        tier,
        min_bookings: min,
        max_bookings: max,
        currency,
    };
    // Known-good literal; validated by tests.
    TierTable::new(vec![
        range(Tier::Tier1, 0,  Some(2),  Currency::Bronze),
        range(Tier::Tier2, 3,  Some(10), Currency::Silver),
        range(Tier::Tier3, 11, Some(20), Currency::Gold),
        range(Tier::Tier4, 21, None,     Currency::Diamond),
    ])
    .unwrap_or_else(|e| unreachable!("default tier table is invalid: {e}"))
}

fn default_legacy_brackets() -> BracketTable {
    let bracket = |min, max, rate| DiscountBracket {
        min_bookings: min,
        max_bookings: max,
        rate,
    };
    BracketTable::new(vec![
        bracket(3,  Some(10), 0.02),
        bracket(11, Some(25), 0.03),
        bracket(26, Some(60), 0.04),
        bracket(61, None,     0.05),
    ])
    .unwrap_or_else(|e| unreachable!("default legacy brackets are invalid: {e}"))
}
