use crate::data::TimeFrequency;
use ndarray::{s, Array2, ArrayView1};

/// Fixed-capacity accumulator that aggregates streaming spectra into a
/// block sized for one dedispersion pass.
///
/// Storage is channel-major (one contiguous row of spectra per channel),
/// which is the layout the dedispersion kernels consume. Incoming
/// [`TimeFrequency`] blocks are time-major, so a push performs the corner
/// turn while copying.
///
/// ```text
/// channel 0  [ s0 s1 s2 .. | free ........ ]
/// channel 1  [ s0 s1 s2 .. | free ........ ]
///                          ^ data_size()   capacity()
/// ```
#[derive(Debug)]
pub struct AggregationBuffer {
    data: Array2<f32>,
    number_of_spectra: usize,
    number_of_channels: usize,
    current_time: usize,
    sample_interval: f64,
    start_time: f64,
    channel_frequencies: Vec<f64>,
}

impl AggregationBuffer {
    pub fn new(number_of_spectra: usize, number_of_channels: usize) -> Self {
        Self {
            data: Array2::zeros((number_of_channels, number_of_spectra)),
            number_of_spectra,
            number_of_channels,
            current_time: 0,
            sample_interval: 0.0,
            start_time: 0.0,
            channel_frequencies: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(0, 0)
    }

    /// Reallocates storage for the given geometry. Any buffered, unconsumed
    /// spectra are destroyed; callers must have drained first.
    pub fn resize(&mut self, number_of_spectra: usize, number_of_channels: usize) {
        self.data = Array2::zeros((number_of_channels, number_of_spectra));
        self.number_of_spectra = number_of_spectra;
        self.number_of_channels = number_of_channels;
        self.current_time = 0;
        self.channel_frequencies.clear();
    }

    /// Total spectra the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.number_of_spectra
    }

    pub fn number_of_spectra(&self) -> usize {
        self.number_of_spectra
    }

    pub fn number_of_channels(&self) -> usize {
        self.number_of_channels
    }

    /// Spectra inserted in the current generation.
    pub fn data_size(&self) -> usize {
        self.current_time
    }

    /// Spectra slots still free in the current generation.
    pub fn remaining_capacity(&self) -> usize {
        self.number_of_spectra - self.current_time
    }

    /// Copies spectra from `block` starting at `offset` into the current
    /// fill position, consuming at most the remaining capacity. Returns the
    /// number of spectra absorbed; the caller retains the remainder for the
    /// next buffer generation.
    pub fn push(&mut self, block: &TimeFrequency, offset: usize) -> usize {
        debug_assert_eq!(block.number_of_channels(), self.number_of_channels);

        if self.current_time == 0 {
            self.adopt_metadata(block, offset);
        }

        let available = block.number_of_spectra().saturating_sub(offset);
        let absorbed = available.min(self.remaining_capacity());
        if absorbed == 0 {
            return 0;
        }

        for channel in 0..self.number_of_channels {
            let src = block.channel_slice(channel, offset, absorbed);
            self.data
                .slice_mut(s![
                    channel,
                    self.current_time..self.current_time + absorbed
                ])
                .assign(&src);
        }
        self.current_time += absorbed;
        absorbed
    }

    /// Copies the trailing `count` spectra of a filled buffer into `dest`,
    /// together with the shifted start time, so the next generation begins
    /// with the tail of this one.
    pub fn transfer(&self, count: usize, dest: &mut AggregationBuffer) {
        debug_assert!(count <= self.capacity());
        let tail = self.capacity() - count;

        dest.sample_interval = self.sample_interval;
        dest.channel_frequencies = self.channel_frequencies.clone();
        dest.start_time = self.start_time_at(tail);

        for channel in 0..dest.number_of_channels() {
            let src = self.data.slice(s![channel, tail..self.capacity()]);
            dest.data
                .slice_mut(s![channel, dest.current_time..dest.current_time + count])
                .assign(&src);
        }
        dest.current_time += count;
    }

    /// All spectra of one channel, including any unfilled tail.
    pub fn channel(&self, channel: usize) -> ArrayView1<'_, f32> {
        self.data.row(channel)
    }

    /// Sample interval in seconds, adopted from the first block pushed.
    pub fn sample_interval(&self) -> f64 {
        self.sample_interval
    }

    /// Absolute time of the first spectrum in this generation.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn start_time_at(&self, offset: usize) -> f64 {
        self.start_time + offset as f64 * self.sample_interval
    }

    pub fn channel_frequencies(&self) -> &[f64] {
        &self.channel_frequencies
    }

    fn adopt_metadata(&mut self, block: &TimeFrequency, offset: usize) {
        self.sample_interval = block.sample_interval();
        self.start_time = block.start_time_at(offset);
        self.channel_frequencies = block.channel_frequencies().to_vec();
    }
}
