//! Per-stage behavioural statistics.
//!
//! Source format: one CSV record per line,
//!   stage, mean_gap_days, stdev_gap_days, mean_fare, initial_population
//!
//! Each field is cleaned by keeping only digits and '.', so quoted or
//! padded values ("12", " 30 ") read fine. A field that cleans down to
//! nothing, or does not parse, is a DataFormat error, as is a record
//! with more or fewer than five fields.

use crate::{
    error::{SimError, SimResult},
    types::Stage,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FIELDS_PER_RECORD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub mean_gap:           i64,
    pub stdev_gap:          f64,
    pub mean_fare:          f64,
    pub initial_population: u64,
}

impl StageStats {
    /// Synthetic record for customers with no bookings yet.
    pub const STAGE_ZERO: StageStats = StageStats {
        mean_gap:           30,
        stdev_gap:          30.0,
        mean_fare:          1000.0,
        initial_population: 500,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStatistics {
    stages: BTreeMap<Stage, StageStats>,
}

impl StageStatistics {
    /// A table holding only the synthetic stage-0 record.
    pub fn new() -> Self {
        Self {
            stages: BTreeMap::from([(0, StageStats::STAGE_ZERO)]),
        }
    }

    /// Insert or replace a stage. Stage 0 may be overridden.
    pub fn insert(&mut self, stage: Stage, stats: StageStats) {
        self.stages.insert(stage, stats);
    }

    pub fn load(path: &str) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::parse(&content)?;
        log::debug!("Loaded {} stage records from {path}", table.stages.len());
        Ok(table)
    }

    pub fn parse(content: &str) -> SimResult<Self> {
        let mut table = Self::new();
        let mut seen_record = false;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<String> = line.split(',').map(clean_field).collect();

            // A header line carries no digits at all.
            if !seen_record && fields.iter().all(|f| f.is_empty()) {
                continue;
            }
            seen_record = true;

            let (stage, stats) = parse_record(&fields, line_no)?;
            table.insert(stage, stats);
        }
        Ok(table)
    }

    /// Exact lookup.
    pub fn get(&self, stage: Stage) -> Option<&StageStats> {
        self.stages.get(&stage)
    }

    /// Nearest stage at or below `stage`. Always succeeds because
    /// stage 0 is always present.
    pub fn for_stage(&self, stage: Stage) -> &StageStats {
        self.stages
            .range(..=stage)
            .next_back()
            .map(|(_, s)| s)
            .unwrap_or(&StageStats::STAGE_ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, &StageStats)> {
        self.stages.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn total_population(&self) -> u64 {
        self.stages.values().map(|s| s.initial_population).sum()
    }
}

impl Default for StageStatistics {
    fn default() -> Self { Self::new() }
}

fn clean_field(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

fn parse_record(fields: &[String], line: usize) -> SimResult<(Stage, StageStats)> {
    // Trailing commas are tolerated; anything else off-count is not.
    let used = fields.iter().rposition(|f| !f.is_empty()).map_or(0, |i| i + 1);
    let count = used.max(FIELDS_PER_RECORD.min(fields.len()));
    if count != FIELDS_PER_RECORD {
        return Err(SimError::DataFormat {
            line,
            reason: format!("expected {FIELDS_PER_RECORD} fields, found {count}"),
        });
    }

    let stage = parse_field::<Stage>(&fields[0], "stage", line)?;
    let stats = StageStats {
        mean_gap:           parse_field(&fields[1], "mean_gap", line)?,
        stdev_gap:          parse_field(&fields[2], "stdev_gap", line)?,
        mean_fare:          parse_field(&fields[3], "mean_fare", line)?,
        initial_population: parse_field(&fields[4], "initial_population", line)?,
    };
    Ok((stage, stats))
}

fn parse_field<T: std::str::FromStr>(field: &str, name: &str, line: usize) -> SimResult<T> {
    if field.is_empty() {
        return Err(SimError::DataFormat {
            line,
            reason: format!("{name} is missing or non-numeric"),
        });
    }
    field.parse().map_err(|_| SimError::DataFormat {
        line,
        reason: format!("{name} '{field}' is not a valid number"),
    })
}
