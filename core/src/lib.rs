//! Loyalty scheme simulator — compares a legacy percentage-discount
//! program against a currency-accrual program by simulating each
//! customer's booking timeline, estimating burn and churn.

pub mod config;
pub mod error;
pub mod legacy;
pub mod model;
pub mod outcome;
pub mod reward;
pub mod rng;
pub mod simulation;
pub mod stats;
pub mod tier;
pub mod types;

pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use simulation::Simulator;
