use crate::event::{Histogram, TelemetryEvent};

/// Read-only view over an aggregated histogram snapshot.
///
/// Snapshots are submitted as `Arc<S>`. The scheduler keeps a clone of that
/// handle from a successful `submit` until the drain cycle clears the slot,
/// so the referent must stay unmodified for that whole interval. Types with
/// interior mutability that change their histograms while pending break the
/// contract; that is a caller bug.
pub trait HistogramSource: Send + Sync {
    /// Copies the snapshot's histograms into `event`.
    fn fill_histograms(&self, event: &mut TelemetryEvent);
}

/// Plain snapshot of per-instrument histograms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProngCache {
    histograms: Vec<Histogram>,
}

impl ProngCache {
    pub fn builder() -> ProngCacheBuilder {
        ProngCacheBuilder::default()
    }

    pub fn histograms(&self) -> &[Histogram] {
        &self.histograms
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }
}

impl HistogramSource for ProngCache {
    fn fill_histograms(&self, event: &mut TelemetryEvent) {
        event.histograms.extend(self.histograms.iter().cloned());
    }
}

impl From<Vec<Histogram>> for ProngCache {
    fn from(histograms: Vec<Histogram>) -> Self {
        Self { histograms }
    }
}

/// Accumulates samples into fixed-width buckets before freezing them into a
/// [`ProngCache`].
#[derive(Debug, Clone)]
pub struct ProngCacheBuilder {
    bucket_count: usize,
    bucket_width_us: u64,
    histograms: Vec<Histogram>,
}

impl Default for ProngCacheBuilder {
    fn default() -> Self {
        Self {
            bucket_count: 32,
            bucket_width_us: 1_000,
            histograms: Vec::new(),
        }
    }
}

impl ProngCacheBuilder {
    pub fn buckets(mut self, bucket_count: usize, bucket_width_us: u64) -> Self {
        self.bucket_count = bucket_count.max(1);
        self.bucket_width_us = bucket_width_us.max(1);
        self
    }

    /// Adds one timing sample. Samples past the last bucket land in it.
    pub fn record(&mut self, instrument_id: u32, annotation: u64, sample_us: u64) -> &mut Self {
        let bucket_count = self.bucket_count;
        let index = match self
            .histograms
            .iter()
            .position(|h| h.instrument_id == instrument_id && h.annotation == annotation)
        {
            Some(index) => index,
            None => {
                self.histograms.push(Histogram::new(
                    instrument_id,
                    annotation,
                    vec![0; bucket_count],
                ));
                self.histograms.len() - 1
            }
        };
        let bucket = ((sample_us / self.bucket_width_us) as usize).min(bucket_count - 1);
        let slot = &mut self.histograms[index].counts[bucket];
        *slot = slot.saturating_add(1);
        self
    }

    pub fn build(self) -> ProngCache {
        ProngCache {
            histograms: self.histograms,
        }
    }
}
