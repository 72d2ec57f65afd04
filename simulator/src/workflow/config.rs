use anyhow::Context;
use serde::{Deserialize, Serialize};
use spscore::prelude::{BruteForcePlan, ClusteringConfig, DedispersionPlan, FixedPlan};
use std::fs;
use std::path::Path;

/// Dedispersion backend selected at runtime.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    BruteForce,
    Fixed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub channels: usize,
    pub spectra_per_block: usize,
    pub blocks: usize,
    pub sample_interval_ms: f64,
    pub start_frequency_mhz: f64,
    pub channel_width_mhz: f64,
    pub max_buffer_size: usize,
    pub samples_per_pass: usize,
    pub max_dm: f64,
    pub backend: Backend,
    pub fixed_overlap: usize,
    pub clustering: ClusteringConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            channels: 16,
            spectra_per_block: 256,
            blocks: 12,
            sample_interval_ms: 1.0,
            start_frequency_mhz: 1400.0,
            channel_width_mhz: -20.0,
            max_buffer_size: 1024,
            samples_per_pass: 1024,
            max_dm: 100.0,
            backend: Backend::BruteForce,
            fixed_overlap: 16,
            clustering: ClusteringConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(channels: usize, spectra_per_block: usize, blocks: usize) -> Self {
        Self {
            channels,
            spectra_per_block,
            blocks,
            ..Default::default()
        }
    }

    /// Sample interval in seconds.
    pub fn sample_interval(&self) -> f64 {
        self.sample_interval_ms / 1000.0
    }

    pub fn to_plan(&self) -> Box<dyn DedispersionPlan + Send> {
        match self.backend {
            Backend::BruteForce => {
                Box::new(BruteForcePlan::new(self.max_dm, self.samples_per_pass))
            }
            Backend::Fixed => Box::new(FixedPlan::new(self.samples_per_pass, self.fixed_overlap)),
        }
    }

    pub fn to_clustering_config(&self) -> ClusteringConfig {
        self.clustering.clone()
    }
}
