//! sim-runner: headless runner for the loyalty scheme simulator.
//!
//! Usage:
//!   sim-runner --stages stages.csv --seed 12345
//!   sim-runner --stages stages.csv --config scheme.json --horizon 730 --json
//!
//! "legacy burn" replays each customer's clock from the initial population
//! with the booking count advancing per booking. A replay over the final
//! population with counts held fixed would report a different figure.

use anyhow::{Context, Result};
use loyalty_core::{
    model::{Customer, IdSequence},
    outcome::{RunOutcome, TierDistribution},
    rng::RngBank,
    stats::StageStatistics,
    types::Tier,
    SimConfig, Simulator,
};
use std::collections::BTreeMap;
use std::env;

#[derive(serde::Serialize)]
struct RunReport {
    seed:                u64,
    horizon_days:        u64,
    customers:           u64,
    bookings:            u64,
    new_burn:            f64,
    legacy_burn:         f64,
    churn:               BTreeMap<Tier, u64>,
    tiers_before:        TierDistribution,
    tiers_after:         TierDistribution,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", wall_clock_seed());
    let horizon = parse_arg(&args, "--horizon", 0u64);
    let json_mode = args.iter().any(|a| a == "--json");
    let stages_path = string_arg(&args, "--stages");
    let config_path = string_arg(&args, "--config");

    let mut config = match config_path {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {path}"))?,
        None => SimConfig::default(),
    };
    if horizon > 0 {
        config.horizon_days = horizon;
    }

    let stages = match stages_path {
        Some(path) => StageStatistics::load(path)
            .with_context(|| format!("loading stage table {path}"))?,
        None => {
            log::warn!("no --stages given; running the synthetic stage-0 population only");
            StageStatistics::new()
        }
    };

    if !json_mode {
        println!("Loyalty scheme simulator — sim-runner");
        println!("  seed:      {seed}");
        println!("  horizon:   {} days", config.horizon_days);
        println!("  lapse:     {} days", config.lapse_days);
        println!("  stages:    {}", stages_path.unwrap_or("(synthetic)"));
        println!("  config:    {}", config_path.unwrap_or("(defaults)"));
        println!();
    }

    let horizon_days = config.horizon_days;
    let sim = Simulator::new(config, stages)?;
    let bank = RngBank::new(seed);

    let mut customers = sim.initialize(&mut IdSequence::new())?;
    let tiers_before = TierDistribution::of(&customers);
    let snapshot: Vec<Customer> = customers.clone();

    let outcome = sim.run(&mut customers, &bank)?;
    let legacy_burn = sim.estimate_legacy_burn(&snapshot, &bank)?;
    let tiers_after = TierDistribution::of(&customers);

    let report = RunReport {
        seed,
        horizon_days,
        customers: outcome.customers,
        bookings: outcome.bookings,
        new_burn: outcome.burn,
        legacy_burn,
        churn: full_churn_table(&outcome),
        tiers_before,
        tiers_after,
    };

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

/// Every tier appears, even with zero churn.
fn full_churn_table(outcome: &RunOutcome) -> BTreeMap<Tier, u64> {
    Tier::ALL.iter().map(|t| (*t, outcome.churn_for(*t))).collect()
}

fn print_summary(report: &RunReport) {
    println!("=== TIERS BEFORE ===");
    print_distribution(&report.tiers_before);

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  customers:      {}", report.customers);
    println!("  bookings:       {}", report.bookings);
    println!("  new burn:       {:.2}", report.new_burn);
    println!("  legacy burn:    {:.2}  (initial population, counts advance)", report.legacy_burn);
    println!("  churn:");
    for (tier, n) in &report.churn {
        println!("    {tier:<8} {n}");
    }

    println!();
    println!("=== TIERS AFTER ===");
    print_distribution(&report.tiers_after);
}

fn print_distribution(dist: &TierDistribution) {
    for (tier, n) in &dist.by_tier {
        println!("  {tier:<8} {n}");
    }
    println!("  {:<8} {}", "churned", dist.churned);
    if dist.unassigned > 0 {
        println!("  {:<8} {}", "unset", dist.unassigned);
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

/// Default seed when none is given: wall-clock seconds.
fn wall_clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
