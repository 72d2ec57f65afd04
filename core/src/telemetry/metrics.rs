use std::sync::Mutex;

/// Pipeline counters shared between the buffering and clustering stages.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub buffers_emitted: usize,
    pub groups_formed: usize,
    pub candidates_kept: usize,
    pub errors: usize,
}

#[derive(Default)]
struct Metrics {
    buffers_emitted: usize,
    groups_formed: usize,
    candidates_kept: usize,
    errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_buffer_emitted(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.buffers_emitted += 1;
        }
    }

    pub fn record_groups(&self, groups: usize, kept: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.groups_formed += groups;
            metrics.candidates_kept += kept;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                buffers_emitted: metrics.buffers_emitted,
                groups_formed: metrics.groups_formed,
                candidates_kept: metrics.candidates_kept,
                errors: metrics.errors,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
