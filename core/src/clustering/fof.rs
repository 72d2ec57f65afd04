use crate::clustering::{CellGrid, ClusteringConfig};
use crate::data::CandidateList;
use crate::prelude::{SearchError, SearchResult};
use crate::telemetry::LogManager;

/// Friends-of-friends clustering over single-pulse candidates.
///
/// Each candidate is mapped to a point in a dimensionless 3-D space,
///
/// ```text
/// x = tstart / time_tolerance
/// y = dm / dm_tolerance
/// z = log2(width / tsamp) / log2(pulse_width_tolerance / tsamp)
/// ```
///
/// so a single Euclidean linking length applies uniformly across the
/// time, DM and width axes. Membership chains: if A links to B and B
/// links to C, all three form one cluster regardless of the A-C distance.
pub struct Fof {
    config: ClusteringConfig,
    linking_length: f64,
    logger: LogManager,
}

impl Fof {
    pub fn new(config: &ClusteringConfig) -> SearchResult<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            linking_length: config.linking_length,
            logger: LogManager::new(),
        })
    }

    /// Partitions the candidates into groups of indices. Every candidate
    /// appears in exactly one group; groups are emitted in index-removal
    /// order. An empty list, or a list without source blocks, yields no
    /// groups.
    pub fn cluster(&self, candidates: &CandidateList) -> SearchResult<Vec<Vec<usize>>> {
        let mut groups = Vec::new();
        if candidates.is_empty() || candidates.tf_blocks().is_empty() {
            return Ok(groups);
        }

        let tsamp = candidates.sample_interval();
        if tsamp <= 0.0 {
            return Err(SearchError::InvalidInput(
                "source blocks carry no positive sample interval".to_string(),
            ));
        }

        let (dm_lo, dm_hi) = candidates.dm_range();
        let mut dm_step = (dm_hi - dm_lo) / usize::MAX as f64;
        if dm_step == 0.0 {
            self.logger
                .warn("candidate list has zero DM spread, substituting minimum step");
            dm_step = 1.0;
        }
        self.logger.record(&format!(
            "clustering {} candidates over DM range [{}, {}] (resolution {:e})",
            candidates.len(),
            dm_lo,
            dm_hi,
            dm_step
        ));

        let width_scale = (self.config.pulse_width_tolerance / tsamp).log2();
        let points: Vec<[f64; 3]> = candidates
            .iter()
            .map(|c| {
                [
                    c.start_time / self.config.time_tolerance,
                    c.dm / self.config.dm_tolerance,
                    (c.width / tsamp).log2() / width_scale,
                ]
            })
            .collect();

        let mut grid = CellGrid::new(&points, self.linking_length);
        while let Some(seed) = grid.take_seed() {
            let mut group = vec![seed];
            let mut frontier = 0;
            // flood fill: every found point joins the frontier so its own
            // friends are located as well
            while frontier < group.len() {
                let found = grid.take_within(points[group[frontier]], self.linking_length);
                group.extend(found);
                frontier += 1;
                if grid.is_empty() {
                    break;
                }
            }
            groups.push(group);
        }
        Ok(groups)
    }
}
