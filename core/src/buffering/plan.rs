use crate::data::TimeFrequency;
use crate::prelude::DedispersionPlan;

/// Dispersion constant in MHz^2 pc^-1 cm^3 s.
pub const DISPERSION_CONSTANT: f64 = 4.148808e3;

/// Plan for the brute-force dedispersion backend: the buffer overlap is the
/// dispersion delay of the highest trial DM across the block's band,
/// rounded up to whole spectra.
pub struct BruteForcePlan {
    max_dm: f64,
    samples_per_pass: usize,
    overlap: usize,
}

impl BruteForcePlan {
    /// `max_dm` in pc cm^-3; `samples_per_pass` is the spectra budget the
    /// backend can dedisperse in one invocation.
    pub fn new(max_dm: f64, samples_per_pass: usize) -> Self {
        Self {
            max_dm,
            samples_per_pass,
            overlap: 0,
        }
    }

    fn delay_samples(&self, block: &TimeFrequency) -> usize {
        let freqs = block.channel_frequencies();
        let tsamp = block.sample_interval();
        if freqs.is_empty() || tsamp <= 0.0 {
            return 0;
        }
        let f_lo = freqs.iter().cloned().fold(f64::INFINITY, f64::min);
        let f_hi = freqs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if f_lo <= 0.0 {
            return 0;
        }
        let delay = DISPERSION_CONSTANT * self.max_dm * (f_lo.powi(-2) - f_hi.powi(-2));
        (delay / tsamp).ceil() as usize
    }
}

impl DedispersionPlan for BruteForcePlan {
    fn buffer_overlap(&self) -> usize {
        self.overlap
    }

    fn dedispersion_strategy(&mut self, block: &TimeFrequency) -> usize {
        self.overlap = self.delay_samples(block);
        self.samples_per_pass
    }
}

/// Plan with externally supplied sizing, independent of block geometry.
pub struct FixedPlan {
    samples_per_pass: usize,
    overlap: usize,
}

impl FixedPlan {
    pub fn new(samples_per_pass: usize, overlap: usize) -> Self {
        Self {
            samples_per_pass,
            overlap,
        }
    }
}

impl DedispersionPlan for FixedPlan {
    fn buffer_overlap(&self) -> usize {
        self.overlap
    }

    fn dedispersion_strategy(&mut self, _block: &TimeFrequency) -> usize {
        self.samples_per_pass
    }
}
