//! Run configuration record.
//!
//! Models the original's boolean switches (OH on/off, "OH at last",
//! partition on/off, "top region for feature weighting") as an enumerated
//! record rather than loose flags.

use crate::domain::Domain;
use serde::{Deserialize, Serialize};

/// When one-hot refinement is applied during abstract evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OhMode {
    Off,
    /// Tier-aware arithmetic applied at every kernel operation.
    PerOp,
    /// Plain arithmetic throughout; tier minimization/maximization deferred
    /// to the final score summation (`tierize_raf`).
    AtLast,
}

/// The full run configuration, serializable for `--debug-output` dumps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub domain: Domain,
    pub oh: OhMode,
    pub partition: bool,
    pub report_feature_weights: bool,
    pub counterexamples_file: Option<String>,
    pub debug_output: bool,
    pub is_binary: bool,
    /// Minimum fraction (percent) of the original region below which
    /// partition-and-rerun gives up rather than recursing further.
    pub min_partition_pct: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            domain: Domain::Interval,
            oh: OhMode::Off,
            partition: false,
            report_feature_weights: false,
            counterexamples_file: None,
            debug_output: false,
            is_binary: false,
            min_partition_pct: 6.0,
        }
    }
}
