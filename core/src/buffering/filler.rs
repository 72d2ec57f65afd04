use crate::buffering::AggregationBuffer;
use crate::data::TimeFrequency;
use crate::prelude::{SearchError, SearchResult};
use crate::telemetry::LogManager;

/// Callback invoked with ownership of each filled buffer. It runs
/// synchronously on the inserting thread; handing the block to a worker
/// pool is the handler's business.
pub type FullBufferHandler = Box<dyn FnMut(AggregationBuffer) + Send>;

/// Fills successive [`AggregationBuffer`] generations from streaming
/// blocks, invoking the full-buffer handler on each completed generation
/// and seeding the next one with the configured trailing overlap.
pub struct AggregationBufferFiller {
    handler: FullBufferHandler,
    overlap: usize,
    current: AggregationBuffer,
    logger: LogManager,
}

impl AggregationBufferFiller {
    pub fn new(handler: FullBufferHandler) -> Self {
        Self {
            handler,
            overlap: 0,
            current: AggregationBuffer::empty(),
            logger: LogManager::new(),
        }
    }

    /// Copies all spectra of `block` into the buffer, flushing each time it
    /// fills. No input samples are lost: spectra that do not fit the
    /// current generation open the next one.
    pub fn insert(&mut self, block: &TimeFrequency) -> SearchResult<()> {
        if self.current.capacity() == 0 {
            return Err(SearchError::Configuration(
                "aggregation buffer has not been sized".to_string(),
            ));
        }

        let mut offset = 0;
        while offset < block.number_of_spectra() {
            offset += self.current.push(block, offset);
            if self.current.remaining_capacity() == 0 {
                self.flush();
            }
        }
        Ok(())
    }

    /// Hands the current buffer to the handler without waiting for it to
    /// fill, seeding the replacement with the overlap tail. Returns whether
    /// the handler was called (it is skipped for an empty buffer).
    pub fn flush(&mut self) -> bool {
        let mut full = AggregationBuffer::new(
            self.current.number_of_spectra(),
            self.current.number_of_channels(),
        );
        std::mem::swap(&mut full, &mut self.current);

        if self.overlap != 0 {
            full.transfer(self.overlap, &mut self.current);
        }

        if full.data_size() > 0 {
            (self.handler)(full);
            return true;
        }
        false
    }

    /// Sets the number of trailing spectra consecutive buffers share.
    pub fn set_overlap(&mut self, overlap: usize) -> SearchResult<()> {
        if self.current.capacity() != 0 && overlap >= self.current.capacity() {
            return Err(SearchError::Configuration(format!(
                "buffer of {} spectra is too small for an overlap of {}",
                self.current.capacity(),
                overlap
            )));
        }
        if overlap == 0 {
            self.logger
                .warn("buffer overlap is zero; dedispersion will lack boundary context");
        }
        self.overlap = overlap;
        Ok(())
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn resize(&mut self, number_of_spectra: usize, number_of_channels: usize) {
        self.current.resize(number_of_spectra, number_of_channels);
    }

    /// Capacity of the buffer being filled, in spectra.
    pub fn size(&self) -> usize {
        self.current.capacity()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.current.remaining_capacity()
    }

    pub fn full_buffer_handler(&mut self, handler: FullBufferHandler) {
        self.handler = handler;
    }
}
