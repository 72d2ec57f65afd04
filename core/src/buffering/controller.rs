use crate::buffering::{AggregationBufferFiller, FullBufferHandler};
use crate::data::TimeFrequency;
use crate::prelude::{DedispersionPlan, SearchError, SearchResult};
use crate::telemetry::LogManager;

/// Buffering layer that collects sufficient data for the dedispersion
/// algorithm to run.
///
/// Sizing is re-derived from the dedispersion plan whenever the channel
/// count of the incoming stream changes (a reconfiguration event, not a
/// per-block occurrence). Each block is then fed through the aggregation
/// filler, and the registered handler receives every completed buffer
/// synchronously on the calling thread.
pub struct Buffering {
    max_spectra: usize,
    current_number_of_channels: usize,
    filler: AggregationBufferFiller,
    plan: Box<dyn DedispersionPlan + Send>,
    logger: LogManager,
}

impl Buffering {
    /// `max_buffer_size` is a ceiling on the buffer size in spectra; zero
    /// means the plan's request is taken as-is.
    pub fn new(
        handler: FullBufferHandler,
        plan: Box<dyn DedispersionPlan + Send>,
        max_buffer_size: usize,
    ) -> Self {
        Self {
            max_spectra: max_buffer_size,
            current_number_of_channels: 0,
            filler: AggregationBufferFiller::new(handler),
            plan,
            logger: LogManager::new(),
        }
    }

    /// Accepts the next streaming block, reconfiguring the aggregation
    /// buffer first if the block geometry changed.
    pub fn on_new_block(&mut self, block: &TimeFrequency) -> SearchResult<()> {
        self.configure(block)?;
        self.filler.insert(block)
    }

    /// Replaces the dedispersion plan; sizing is re-derived on the next
    /// block.
    pub fn set_plan(&mut self, plan: Box<dyn DedispersionPlan + Send>) {
        self.plan = plan;
        self.current_number_of_channels = 0;
    }

    pub fn remaining_capacity(&self) -> usize {
        self.filler.remaining_capacity()
    }

    /// Drains the partially-filled buffer to the handler (end of stream).
    pub fn flush(&mut self) -> bool {
        self.filler.flush()
    }

    fn configure(&mut self, block: &TimeFrequency) -> SearchResult<()> {
        if block.number_of_channels() == self.current_number_of_channels {
            return Ok(());
        }

        let requested = self.plan.dedispersion_strategy(block);
        let mut number_of_spectra = requested;
        if requested > self.max_spectra && self.max_spectra != 0 {
            // truncation is a fallback, not an optimum picked by the plan
            self.logger.warn(&format!(
                "dedispersion plan requested {} spectra, clamping to the configured maximum of {}",
                requested, self.max_spectra
            ));
            number_of_spectra = self.max_spectra;
        }

        let overlap = self.plan.buffer_overlap();
        if overlap == 0 {
            self.logger
                .warn("dedispersion plan requires no buffer overlap");
        }
        if overlap + 1 >= number_of_spectra {
            return Err(SearchError::Configuration(format!(
                "dedispersion plan requires at least {} spectra per buffer, only {} available",
                overlap + 2,
                number_of_spectra
            )));
        }

        self.logger.record(&format!(
            "setting dedispersion buffer size to {} spectra",
            number_of_spectra
        ));
        self.filler
            .resize(number_of_spectra, block.number_of_channels());
        self.logger
            .record(&format!("setting buffer overlap to {} spectra", overlap));
        self.filler.set_overlap(overlap)?;

        self.current_number_of_channels = block.number_of_channels();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffering::FixedPlan;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn block(spectra: usize, channels: usize) -> TimeFrequency {
        let mut tf = TimeFrequency::new(spectra, channels);
        tf.set_sample_interval(0.05);
        tf.set_channel_frequencies_const_width(1000.0, -30.0);
        tf
    }

    fn counting_buffering(
        strategy: usize,
        overlap: usize,
        max_buffer_size: usize,
    ) -> (Buffering, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let buffering = Buffering::new(
            Box::new(move |buffer| {
                if buffer.data_size() == 0 {
                    return;
                }
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            Box::new(FixedPlan::new(strategy, overlap)),
            max_buffer_size,
        );
        (buffering, calls)
    }

    #[test]
    fn full_buffer_handler_fires_once_for_a_large_block() {
        let (mut buffering, calls) = counting_buffering(1024, 16, 1024);
        buffering.on_new_block(&block(1500, 10)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn overlap_carry_counts_toward_the_next_emission() {
        let (mut buffering, calls) = counting_buffering(1024, 16, 1024);
        buffering.on_new_block(&block(1024, 10)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // 16 carried spectra + 1008 new spectra fill the second buffer
        buffering.on_new_block(&block(1008, 10)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn small_blocks_partially_fill_without_firing() {
        let (mut buffering, calls) = counting_buffering(256, 8, 0);
        buffering.on_new_block(&block(100, 4)).unwrap();
        buffering.on_new_block(&block(100, 4)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(buffering.remaining_capacity(), 56);
    }

    #[test]
    fn channel_count_change_rederives_sizing() {
        let (mut buffering, calls) = counting_buffering(64, 4, 0);
        buffering.on_new_block(&block(10, 2)).unwrap();
        assert_eq!(buffering.remaining_capacity(), 54);
        // geometry change drops the partial fill and resizes
        buffering.on_new_block(&block(64, 8)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn overlap_exceeding_buffer_size_is_fatal() {
        let (mut buffering, _) = counting_buffering(16, 20, 0);
        assert!(matches!(
            buffering.on_new_block(&block(32, 4)),
            Err(SearchError::Configuration(_))
        ));
    }

    #[test]
    fn plan_request_clamped_to_the_configured_ceiling() {
        let (mut buffering, calls) = counting_buffering(4096, 8, 128);
        buffering.on_new_block(&block(128, 4)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // buffer restarts from the 8-spectra overlap tail
        assert_eq!(buffering.remaining_capacity(), 120);
    }
}
