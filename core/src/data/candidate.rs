use crate::data::TimeFrequency;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use std::sync::Arc;

/// A single-pulse detection emitted by the search stage.
///
/// Candidates are immutable once produced; clustering only copies or
/// selects them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Start time of the pulse relative to the observation, in seconds.
    pub start_time: f64,
    /// Trial dispersion measure, in pc cm^-3.
    pub dm: f64,
    /// Pulse width in seconds.
    pub width: f64,
    /// Detection significance.
    pub sigma: f32,
    /// Identifier assigned by the search stage.
    pub index: usize,
}

impl Candidate {
    pub fn new(start_time: f64, dm: f64, width: f64, sigma: f32, index: usize) -> Self {
        Self {
            start_time,
            dm,
            width,
            sigma,
            index,
        }
    }
}

/// An ordered list of candidates together with the time-frequency blocks
/// they were derived from.
///
/// The source blocks supply the sample interval used to normalize the
/// clustering metric; a list without source blocks cannot be clustered and
/// is passed through unchanged. Insertion order is preserved so equal
/// candidates produce deterministic output.
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    candidates: Vec<Candidate>,
    tf_blocks: Vec<Arc<TimeFrequency>>,
}

impl CandidateList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(tf_blocks: Vec<Arc<TimeFrequency>>) -> Self {
        Self {
            candidates: Vec::new(),
            tf_blocks,
        }
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn tf_blocks(&self) -> &[Arc<TimeFrequency>] {
        &self.tf_blocks
    }

    /// Lowest and highest DM over the list members; (0, 0) when empty.
    pub fn dm_range(&self) -> (f64, f64) {
        let mut iter = self.candidates.iter();
        match iter.next() {
            None => (0.0, 0.0),
            Some(first) => iter.fold((first.dm, first.dm), |(lo, hi), c| {
                (lo.min(c.dm), hi.max(c.dm))
            }),
        }
    }

    /// Sample interval of the first source block, in seconds; 0 when the
    /// list carries no blocks.
    pub fn sample_interval(&self) -> f64 {
        self.tf_blocks
            .first()
            .map(|b| b.sample_interval())
            .unwrap_or(0.0)
    }
}

impl Index<usize> for CandidateList {
    type Output = Candidate;

    fn index(&self, index: usize) -> &Candidate {
        &self.candidates[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(sample_interval: f64) -> Arc<TimeFrequency> {
        let mut tf = TimeFrequency::new(16, 4);
        tf.set_sample_interval(sample_interval);
        Arc::new(tf)
    }

    #[test]
    fn dm_range_spans_members() {
        let mut list = CandidateList::new();
        list.push(Candidate::new(0.0, 12.0, 0.001, 10.0, 0));
        list.push(Candidate::new(0.1, 3.0, 0.001, 11.0, 1));
        list.push(Candidate::new(0.2, 40.0, 0.001, 9.0, 2));
        assert_eq!(list.dm_range(), (3.0, 40.0));
    }

    #[test]
    fn empty_list_has_zero_dm_range_and_interval() {
        let list = CandidateList::new();
        assert_eq!(list.dm_range(), (0.0, 0.0));
        assert_eq!(list.sample_interval(), 0.0);
    }

    #[test]
    fn sample_interval_comes_from_first_block() {
        let list = CandidateList::with_blocks(vec![block(0.001), block(0.064)]);
        assert_eq!(list.sample_interval(), 0.001);
    }

    #[test]
    fn candidate_serializes_for_the_monitor_wire_format() {
        let candidate = Candidate::new(2.0, 12.0, 0.001, 10.0, 7);
        let json = serde_json::to_string(&candidate).unwrap();
        let parsed: Candidate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.index, 7);
        assert_eq!(parsed.dm, 12.0);
    }
}
