use crate::clustering::{ClusteringConfig, Fof};
use crate::data::CandidateList;
use crate::prelude::SearchResult;
use crate::telemetry::LogManager;

/// Reduces each friends-of-friends group to its brightest member and
/// filters out low-DM representatives.
///
/// Candidates at the very bottom of the trial DM grid are dominated by
/// broadband interference, so representatives within one DM unit of the
/// lowest trial are discarded outright.
pub struct SpsClustering {
    config: ClusteringConfig,
    logger: LogManager,
}

impl SpsClustering {
    pub fn new(config: ClusteringConfig) -> Self {
        Self {
            config,
            logger: LogManager::new(),
        }
    }

    /// Clusters the list and returns a new one holding only the surviving
    /// representatives, still associated with the original source blocks.
    ///
    /// Clustering is bypassed (the input is returned unchanged) when the
    /// stage is disabled, the list is empty, or the list carries no source
    /// blocks and the metric cannot be normalized.
    pub fn run(&self, candidates: &CandidateList) -> SearchResult<CandidateList> {
        if !self.config.active || candidates.is_empty() || candidates.tf_blocks().is_empty() {
            return Ok(candidates.clone());
        }

        let fof = Fof::new(&self.config)?;
        let groups = fof.cluster(candidates)?;

        let (dm_lo, _) = candidates.dm_range();
        let dm_floor = dm_lo + 1.0;

        let mut merged = CandidateList::with_blocks(candidates.tf_blocks().to_vec());
        for group in &groups {
            let mut best = group[0];
            for &member in group {
                if candidates[member].sigma > candidates[best].sigma {
                    best = member;
                }
            }
            let representative = &candidates[best];
            if representative.dm < dm_floor {
                continue;
            }
            merged.push(representative.clone());
        }

        self.logger.record(&format!(
            "merged {} candidates into {} groups, {} kept",
            candidates.len(),
            groups.len(),
            merged.len()
        ));
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Candidate, TimeFrequency};
    use std::sync::Arc;

    fn list_with_block() -> CandidateList {
        let mut tf = TimeFrequency::new(100, 16);
        tf.set_sample_interval(0.001);
        CandidateList::with_blocks(vec![Arc::new(tf)])
    }

    fn wide_config() -> ClusteringConfig {
        ClusteringConfig {
            time_tolerance: 1.0,
            dm_tolerance: 5.0,
            pulse_width_tolerance: 0.01,
            linking_length: 1.0,
            active: true,
        }
    }

    #[test]
    fn brightest_member_represents_the_group() {
        let mut list = list_with_block();
        // representative sits more than one DM unit above the lowest
        // member, clear of the guard band
        list.push(Candidate::new(2.0, 40.0, 0.001, 10.0, 0));
        list.push(Candidate::new(2.001, 41.5, 0.001, 25.0, 1));
        list.push(Candidate::new(2.002, 42.0, 0.001, 15.0, 2));

        let merged = SpsClustering::new(wide_config()).run(&list).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].sigma, 25.0);
        assert_eq!(merged[0].index, 1);
    }

    #[test]
    fn first_member_wins_sigma_ties() {
        let mut list = list_with_block();
        list.push(Candidate::new(2.0, 12.0, 0.001, 25.0, 0));
        list.push(Candidate::new(2.001, 12.5, 0.001, 25.0, 1));
        // distant low-DM anchor keeps the tied pair above the guard band
        list.push(Candidate::new(200.0, 5.0, 0.001, 1.0, 99));

        let merged = SpsClustering::new(wide_config()).run(&list).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].index, 0);
    }

    #[test]
    fn representative_inside_the_guard_band_is_dropped() {
        let mut list = list_with_block();
        // lone far cluster sets dm_range.first = 12.0
        list.push(Candidate::new(100.0, 12.0, 0.001, 10.0, 0));
        // brighter cluster whose representative sits 0.5 above the floor
        list.push(Candidate::new(2.0, 12.5, 0.001, 30.0, 1));
        list.push(Candidate::new(2.001, 12.6, 0.001, 20.0, 2));

        let merged = SpsClustering::new(wide_config()).run(&list).unwrap();
        // both representatives have dm < 12.0 + 1.0 and vanish
        assert_eq!(merged.len(), 0);
    }

    #[test]
    fn surviving_representatives_keep_source_blocks() {
        let mut list = list_with_block();
        list.push(Candidate::new(2.0, 50.0, 0.001, 10.0, 0));
        list.push(Candidate::new(30.0, 12.0, 0.001, 9.0, 1));

        let merged = SpsClustering::new(wide_config()).run(&list).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].dm, 50.0);
        assert_eq!(merged.tf_blocks().len(), 1);
    }

    #[test]
    fn disabled_clustering_passes_input_through() {
        let mut config = wide_config();
        config.active = false;
        let mut list = list_with_block();
        for i in 0..10 {
            list.push(Candidate::new(2.0, 12.0, 0.001, 10.0, i));
        }
        let merged = SpsClustering::new(config).run(&list).unwrap();
        assert_eq!(merged.len(), 10);
    }

    #[test]
    fn list_without_source_blocks_passes_through() {
        let mut list = CandidateList::new();
        for i in 0..10 {
            list.push(Candidate::new(
                2.0 + i as f64 * 0.05,
                12.0 + i as f64,
                0.001,
                10.0,
                i,
            ));
        }
        let merged = SpsClustering::new(wide_config()).run(&list).unwrap();
        assert_eq!(merged.len(), 10);
    }
}
