use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of the fidelity-parameter set active while histograms were
/// being collected.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FidelityParamsId(pub u64);

impl From<u64> for FidelityParamsId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for FidelityParamsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fp-{}", self.0)
    }
}

/// Performance-tuning configuration handed out by backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FidelityParams {
    pub id: FidelityParamsId,
    #[serde(default)]
    pub settings: BTreeMap<String, i64>,
}

impl FidelityParams {
    pub fn new(id: impl Into<FidelityParamsId>) -> Self {
        Self {
            id: id.into(),
            settings: BTreeMap::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: i64) -> Self {
        self.settings.insert(key.into(), value);
        self
    }
}

/// Bucketed timing counts for one instrument/annotation pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    pub instrument_id: u32,
    pub annotation: u64,
    pub counts: Vec<u32>,
}

impl Histogram {
    pub fn new(instrument_id: u32, annotation: u64, counts: Vec<u32>) -> Self {
        Self {
            instrument_id,
            annotation,
            counts,
        }
    }

    /// Total number of samples across every bucket.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&count| u64::from(count)).sum()
    }
}

/// Event assembled by the upload worker for a single delivery attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub fidelity_params: FidelityParamsId,
    pub histograms: Vec<Histogram>,
}

impl TelemetryEvent {
    pub fn new(fidelity_params: FidelityParamsId) -> Self {
        Self {
            fidelity_params,
            histograms: Vec::new(),
        }
    }

    pub fn push_histogram(&mut self, histogram: Histogram) {
        self.histograms.push(histogram);
    }
}
