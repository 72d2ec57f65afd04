use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use spscore::prelude::{Candidate, CandidateList, TimeFrequency};
use std::sync::Arc;

/// Configuration for generating a synthetic observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub channels: usize,
    pub spectra_per_block: usize,
    pub blocks: usize,
    pub sample_interval_ms: f64,
    pub start_frequency_mhz: f64,
    pub channel_width_mhz: f64,
    pub noise: f32,
    pub seed: u64,
    /// Number of dispersed pulses injected into the observation.
    pub pulses: usize,
    /// DM the injected pulses are centred on.
    pub pulse_dm: f64,
    /// Peak significance of each injected pulse.
    pub pulse_sigma: f32,
    /// Spurious low-DM candidates sprinkled across the observation.
    pub interference_candidates: usize,
    pub description: Option<String>,
    pub scenario: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            channels: 16,
            spectra_per_block: 256,
            blocks: 12,
            sample_interval_ms: 1.0,
            start_frequency_mhz: 1400.0,
            channel_width_mhz: -20.0,
            noise: 0.05,
            seed: 0,
            pulses: 4,
            pulse_dm: 60.0,
            pulse_sigma: 25.0,
            interference_candidates: 20,
            description: None,
            scenario: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_workflow(config: &WorkflowConfig) -> Self {
        Self {
            channels: config.channels,
            spectra_per_block: config.spectra_per_block,
            blocks: config.blocks,
            sample_interval_ms: config.sample_interval_ms,
            start_frequency_mhz: config.start_frequency_mhz,
            channel_width_mhz: config.channel_width_mhz,
            ..Default::default()
        }
    }

    fn normalized_channels(&self) -> usize {
        self.channels.max(1)
    }

    fn normalized_spectra(&self) -> usize {
        self.spectra_per_block.max(1)
    }
}

/// A synthetic observation: the streaming blocks and the candidate list
/// the single-pulse search would have produced for them.
pub struct Scenario {
    pub blocks: Vec<Arc<TimeFrequency>>,
    pub candidates: CandidateList,
}

fn build_blocks(config: &GeneratorConfig, rng: &mut StdRng) -> anyhow::Result<Vec<Arc<TimeFrequency>>> {
    let channels = config.normalized_channels();
    let spectra = config.normalized_spectra();
    spectra
        .checked_mul(channels)
        .and_then(|n| n.checked_mul(config.blocks.max(1)))
        .context("overflow computing sample count for generator")?;

    let tsamp = config.sample_interval_ms / 1000.0;
    let mut blocks = Vec::with_capacity(config.blocks);
    for block_index in 0..config.blocks.max(1) {
        let mut tf = TimeFrequency::new(spectra, channels);
        tf.set_sample_interval(tsamp);
        tf.set_start_time(block_index as f64 * spectra as f64 * tsamp);
        tf.set_channel_frequencies_const_width(config.start_frequency_mhz, config.channel_width_mhz);
        for t in 0..spectra {
            for c in 0..channels {
                let jitter: f32 = rng.gen_range(-config.noise..=config.noise);
                tf.set_sample(t, c, 1.0 + jitter);
            }
        }
        blocks.push(Arc::new(tf));
    }
    Ok(blocks)
}

fn build_candidates(
    config: &GeneratorConfig,
    blocks: &[Arc<TimeFrequency>],
    rng: &mut StdRng,
) -> CandidateList {
    let tsamp = config.sample_interval_ms / 1000.0;
    let duration =
        config.blocks.max(1) as f64 * config.normalized_spectra() as f64 * tsamp;
    let mut list = CandidateList::with_blocks(blocks.to_vec());
    let mut index = 0;

    // each injected pulse is reported at several neighboring DM trials and
    // widths, the way a real search smears one event across the grid
    for pulse in 0..config.pulses {
        let pulse_time = duration * (pulse as f64 + 0.5) / config.pulses.max(1) as f64;
        for echo in 0..8 {
            let dt = rng.gen_range(-2.0..2.0) * tsamp;
            let ddm = rng.gen_range(-0.4..0.4);
            let sigma_falloff = (echo as f32) * 1.5;
            list.push(Candidate::new(
                pulse_time + dt,
                config.pulse_dm + ddm,
                tsamp * (1 << (echo % 3)) as f64,
                config.pulse_sigma - sigma_falloff,
                index,
            ));
            index += 1;
        }
    }

    // broadband interference shows up as scattered candidates at the very
    // bottom of the DM grid
    for _ in 0..config.interference_candidates {
        list.push(Candidate::new(
            rng.gen_range(0.0..duration),
            rng.gen_range(0.0..0.8),
            tsamp,
            rng.gen_range(8.0..12.0),
            index,
        ));
        index += 1;
    }
    list
}

pub fn build_scenario_from_config(config: &GeneratorConfig) -> anyhow::Result<Scenario> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let blocks = build_blocks(config, &mut rng)?;
    let candidates = build_candidates(config, &blocks, &mut rng);
    Ok(Scenario { blocks, candidates })
}

pub fn build_scenario(channels: usize, spectra_per_block: usize, blocks: usize) -> anyhow::Result<Scenario> {
    let config = GeneratorConfig {
        channels,
        spectra_per_block,
        blocks,
        ..Default::default()
    };
    build_scenario_from_config(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_expected_geometry() {
        let scenario = build_scenario(8, 128, 4).unwrap();
        assert_eq!(scenario.blocks.len(), 4);
        assert_eq!(scenario.blocks[0].number_of_spectra(), 128);
        assert_eq!(scenario.blocks[0].number_of_channels(), 8);
        assert_eq!(scenario.candidates.tf_blocks().len(), 4);
    }

    #[test]
    fn blocks_tile_the_observation_in_time() {
        let scenario = build_scenario(4, 100, 3).unwrap();
        let tsamp = scenario.blocks[0].sample_interval();
        assert!((scenario.blocks[1].start_time() - 100.0 * tsamp).abs() < 1e-9);
        assert!((scenario.blocks[2].start_time() - 200.0 * tsamp).abs() < 1e-9);
    }

    #[test]
    fn candidates_include_pulses_and_interference() {
        let config = GeneratorConfig {
            pulses: 3,
            interference_candidates: 10,
            ..Default::default()
        };
        let scenario = build_scenario_from_config(&config).unwrap();
        assert_eq!(scenario.candidates.len(), 3 * 8 + 10);
        let (dm_lo, dm_hi) = scenario.candidates.dm_range();
        assert!(dm_lo < 1.0);
        assert!(dm_hi > 50.0);
    }
}
