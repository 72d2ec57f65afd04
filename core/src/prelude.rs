/// Common error type for the buffering and clustering stages.
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("allocation failure: {0}")]
    Allocation(String),
}

pub type SearchResult<T> = Result<T, SearchError>;

/// Sizing contract supplied by a dedispersion backend.
///
/// The buffering layer queries the plan only when the channel count of the
/// incoming stream changes: `dedispersion_strategy` first (the maximum
/// number of spectra the selected algorithm can process in one pass, given
/// the block geometry), then `buffer_overlap` (the trailing spectra that
/// consecutive aggregated blocks must share so dedispersion has history at
/// block boundaries). Backends are selected at runtime, not compiled in.
pub trait DedispersionPlan {
    fn buffer_overlap(&self) -> usize;
    fn dedispersion_strategy(&mut self, block: &crate::data::TimeFrequency) -> usize;
}

pub use crate::buffering::{
    AggregationBuffer, AggregationBufferFiller, BruteForcePlan, Buffering, FixedPlan,
};
pub use crate::clustering::{ClusteringConfig, Fof, SpsClustering};
pub use crate::data::{Candidate, CandidateList, DmTime, DmTimeSlice, TimeFrequency};
pub use crate::telemetry::{LogManager, MetricsRecorder};
