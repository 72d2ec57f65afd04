use serde::{Deserialize, Serialize};
use spscore::prelude::Candidate;

#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SummaryModel {
    pub buffers_emitted: usize,
    pub input_candidates: usize,
    pub groups_kept: usize,
    pub survivors: Vec<Candidate>,
    pub notes: Vec<String>,
}

#[allow(dead_code)]
impl SummaryModel {
    pub fn new() -> Self {
        Self {
            buffers_emitted: 0,
            input_candidates: 0,
            groups_kept: 0,
            survivors: Vec::new(),
            notes: Vec::new(),
        }
    }
}
