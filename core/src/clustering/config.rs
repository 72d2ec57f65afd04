use crate::prelude::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};

/// Tolerances and switches for single-pulse candidate clustering.
///
/// The tolerances are the per-axis scale factors of the normalized
/// (time, DM, width) search space; `linking_length` is the Euclidean
/// distance inside which candidates are considered part of the same
/// cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Start-time tolerance in seconds.
    pub time_tolerance: f64,
    /// DM tolerance in pc cm^-3.
    pub dm_tolerance: f64,
    /// Pulse width tolerance in seconds.
    pub pulse_width_tolerance: f64,
    /// Linking length in the normalized space.
    pub linking_length: f64,
    /// Master enable switch; when false clustering is a pass-through.
    pub active: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            time_tolerance: 0.1,
            dm_tolerance: 1.0,
            pulse_width_tolerance: 0.005,
            linking_length: 1.7,
            active: true,
        }
    }
}

impl ClusteringConfig {
    /// Zero or negative tolerances produce a degenerate metric and are
    /// rejected as pipeline wiring errors.
    pub fn validate(&self) -> SearchResult<()> {
        if self.time_tolerance <= 0.0 {
            return Err(SearchError::Configuration(format!(
                "time_tolerance must be positive, got {}",
                self.time_tolerance
            )));
        }
        if self.dm_tolerance <= 0.0 {
            return Err(SearchError::Configuration(format!(
                "dm_tolerance must be positive, got {}",
                self.dm_tolerance
            )));
        }
        if self.pulse_width_tolerance <= 0.0 {
            return Err(SearchError::Configuration(format!(
                "pulse_width_tolerance must be positive, got {}",
                self.pulse_width_tolerance
            )));
        }
        if self.linking_length <= 0.0 {
            return Err(SearchError::Configuration(format!(
                "linking_length must be positive, got {}",
                self.linking_length
            )));
        }
        Ok(())
    }
}
