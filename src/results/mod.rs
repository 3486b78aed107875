//! Persisted optimization results.
//!
//! The external optimization driver scores trials through
//! [`crate::metrics::calculate_metrics`]; this module owns the JSON
//! artifact it leaves behind, one file per strategy.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;

/// One completed trial: the suggested parameters and the objective value
/// they scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    pub number: usize,
    pub params: BTreeMap<String, Value>,
    pub value: f64,
}

/// The per-strategy results file: metadata about the study plus every
/// finite-valued trial. Metric values originate from
/// [`crate::metrics::PerformanceMetrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub date: String,
    pub strategy: String,
    pub metric: String,
    pub trials: usize,
    pub best_value: f64,
    pub best_params: BTreeMap<String, Value>,
    pub direction: String,
    pub trial_records: Vec<TrialRecord>,
}

impl OptimizationSummary {
    /// Empty summary for a study maximizing `metric`.
    pub fn new(strategy: impl Into<String>, metric: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            date: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            strategy: strategy.into(),
            metric: metric.into(),
            trials: 0,
            best_value: 0.0,
            best_params: BTreeMap::new(),
            direction: direction.into(),
            trial_records: Vec::new(),
        }
    }

    /// Record a completed trial. Non-finite objective values are counted
    /// but not kept, so the file always loads into finite numbers.
    pub fn record_trial(&mut self, params: BTreeMap<String, Value>, value: f64) {
        let number = self.trials;
        self.trials += 1;
        if !value.is_finite() {
            tracing::warn!(trial = number, "dropping trial with non-finite objective");
            return;
        }
        self.trial_records.push(TrialRecord {
            number,
            params,
            value,
        });
        self.refresh_best();
    }

    fn refresh_best(&mut self) {
        let maximize = self.direction != "minimize";
        let best = self.trial_records.iter().max_by(|a, b| {
            let ord = a.value.total_cmp(&b.value);
            if maximize {
                ord
            } else {
                ord.reverse()
            }
        });
        if let Some(best) = best {
            self.best_value = best.value;
            self.best_params = best.params.clone();
        }
    }

    /// Conventional file name for a strategy's results inside `dir`.
    pub fn path_for(dir: &Path, strategy: &str) -> PathBuf {
        dir.join(format!("{}_optimization_results.json", strategy))
    }

    /// Write the summary to `dir`, creating it when needed, and return
    /// the file path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = Self::path_for(dir, &self.strategy);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        tracing::info!(path = %path.display(), "saved optimization results");
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
