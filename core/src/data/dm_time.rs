use crate::prelude::{SearchError, SearchResult};
use ndarray::{s, Array2, ArrayView1, ArrayViewMut1};

/// Dedispersed trial time series: one row per trial DM, stored in a single
/// owned block.
///
/// Windows into the series are expressed as (offset, length) ranges via
/// [`DmTimeSlice`] rather than reference-counted sub-containers, so there
/// is no parent back-reference graph to manage.
#[derive(Debug, Clone)]
pub struct DmTime {
    data: Array2<f32>,
    dms: Vec<f64>,
    sample_interval: f64,
    start_time: f64,
}

impl DmTime {
    pub fn new(
        dms: Vec<f64>,
        number_of_samples: usize,
        sample_interval: f64,
        start_time: f64,
    ) -> Self {
        Self {
            data: Array2::zeros((dms.len(), number_of_samples)),
            dms,
            sample_interval,
            start_time,
        }
    }

    pub fn number_of_trials(&self) -> usize {
        self.dms.len()
    }

    pub fn number_of_samples(&self) -> usize {
        self.data.ncols()
    }

    pub fn dm(&self, trial: usize) -> f64 {
        self.dms[trial]
    }

    pub fn sample_interval(&self) -> f64 {
        self.sample_interval
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn trial(&self, index: usize) -> ArrayView1<'_, f32> {
        self.data.row(index)
    }

    pub fn trial_mut(&mut self, index: usize) -> ArrayViewMut1<'_, f32> {
        self.data.row_mut(index)
    }

    /// A non-owning window of `len` samples of every trial starting at
    /// `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> SearchResult<DmTimeSlice<'_>> {
        if offset + len > self.number_of_samples() {
            return Err(SearchError::InvalidInput(format!(
                "slice [{}..{}] exceeds {} samples",
                offset,
                offset + len,
                self.number_of_samples()
            )));
        }
        Ok(DmTimeSlice {
            parent: self,
            offset,
            len,
        })
    }
}

/// Index-based view over a contiguous sample range of every DM trial.
#[derive(Debug, Clone, Copy)]
pub struct DmTimeSlice<'a> {
    parent: &'a DmTime,
    offset: usize,
    len: usize,
}

impl<'a> DmTimeSlice<'a> {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn number_of_trials(&self) -> usize {
        self.parent.number_of_trials()
    }

    pub fn dm(&self, trial: usize) -> f64 {
        self.parent.dm(trial)
    }

    /// Absolute time of the first sample in the window.
    pub fn start_time(&self) -> f64 {
        self.parent.start_time + self.offset as f64 * self.parent.sample_interval
    }

    pub fn trial(&self, index: usize) -> ArrayView1<'a, f32> {
        self.parent
            .data
            .slice(s![index, self.offset..self.offset + self.len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_windows_every_trial() {
        let mut dm_time = DmTime::new(vec![0.0, 10.0, 20.0], 64, 0.001, 5.0);
        dm_time.trial_mut(1).fill(3.0);
        let slice = dm_time.slice(16, 8).unwrap();
        assert_eq!(slice.number_of_trials(), 3);
        assert_eq!(slice.trial(1).len(), 8);
        assert_eq!(slice.trial(1)[0], 3.0);
        assert!((slice.start_time() - 5.016).abs() < 1e-9);
    }

    #[test]
    fn out_of_bounds_slice_is_rejected() {
        let dm_time = DmTime::new(vec![0.0], 32, 0.001, 0.0);
        assert!(dm_time.slice(30, 8).is_err());
    }
}
