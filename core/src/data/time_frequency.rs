use ndarray::{s, Array2, ArrayView1, ArrayView2};

/// A channelized block of streaming power data, stored time-major: one row
/// per spectrum, one column per frequency channel.
///
/// Blocks are produced upstream (receiver, file reader, generator) and are
/// read-only to the buffering layer, which copies spectra out of them.
#[derive(Debug, Clone)]
pub struct TimeFrequency {
    data: Array2<f32>,
    sample_interval: f64,
    start_time: f64,
    channel_frequencies: Vec<f64>,
}

impl TimeFrequency {
    /// Allocates a zero-filled block of the given geometry.
    pub fn new(number_of_spectra: usize, number_of_channels: usize) -> Self {
        Self {
            data: Array2::zeros((number_of_spectra, number_of_channels)),
            sample_interval: 0.0,
            start_time: 0.0,
            channel_frequencies: Vec::new(),
        }
    }

    pub fn number_of_spectra(&self) -> usize {
        self.data.nrows()
    }

    pub fn number_of_channels(&self) -> usize {
        self.data.ncols()
    }

    /// Sample interval in seconds.
    pub fn sample_interval(&self) -> f64 {
        self.sample_interval
    }

    pub fn set_sample_interval(&mut self, seconds: f64) {
        self.sample_interval = seconds;
    }

    /// Absolute start time of the first spectrum, in seconds.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn set_start_time(&mut self, seconds: f64) {
        self.start_time = seconds;
    }

    /// Absolute time the spectrum at `offset` corresponds to.
    pub fn start_time_at(&self, offset: usize) -> f64 {
        self.start_time + offset as f64 * self.sample_interval
    }

    /// Channel centre frequencies in MHz, one per column.
    pub fn channel_frequencies(&self) -> &[f64] {
        &self.channel_frequencies
    }

    /// Sets evenly spaced channel frequencies from `start` with step `delta`
    /// (MHz). `delta` is negative for descending bands.
    pub fn set_channel_frequencies_const_width(&mut self, start: f64, delta: f64) {
        self.channel_frequencies = (0..self.number_of_channels())
            .map(|c| start + c as f64 * delta)
            .collect();
    }

    /// One time-sample's vector of per-channel values.
    pub fn spectrum(&self, index: usize) -> ArrayView1<'_, f32> {
        self.data.row(index)
    }

    pub fn data(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// A view of `count` spectra of a single channel starting at `offset`.
    pub fn channel_slice(&self, channel: usize, offset: usize, count: usize) -> ArrayView1<'_, f32> {
        self.data.slice(s![offset..offset + count, channel])
    }

    pub fn set_sample(&mut self, spectrum: usize, channel: usize, value: f32) {
        self.data[[spectrum, channel]] = value;
    }
}
