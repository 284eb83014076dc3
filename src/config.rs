//! Configuration and defaults for tesmatch.
//!
//! This module contains the configuration structure and default values
//! that control TES overlap detection and reporting.

use anyhow::{bail, Result};

/// Default TES tolerance in bp.
pub const DEFAULT_TOLERANCE: i64 = 100;

/// Label written in the flag column for rows with a match.
pub const DEFAULT_FOUND_LABEL: &str = "Found";

/// Configuration for the overlap run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum distance in bp between two TES values to count as overlapping.
    pub tolerance: i64,
    /// Number of worker threads (0 = auto-detect).
    pub threads: usize,
    /// Flag value for matched rows; unmatched rows are left empty.
    pub found_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tolerance: DEFAULT_TOLERANCE,
            threads: 0,
            found_label: DEFAULT_FOUND_LABEL.to_string(),
        }
    }
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tolerance in bp. Negative values are rejected.
    pub fn set_tolerance(&mut self, tolerance: i64) -> Result<()> {
        if tolerance < 0 {
            bail!("The tolerance cannot be lower than 0 bps.");
        }
        self.tolerance = tolerance;
        Ok(())
    }

    /// Resolve the thread count, auto-detecting when set to 0.
    pub fn num_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}
