//! Single-slot asynchronous delivery of performance histogram snapshots to a
//! pluggable telemetry backend.

pub mod app;
pub mod backend;
pub mod config;
pub mod event;
pub mod logging;
pub mod metrics;
pub mod scheduler;
pub mod serialization;
pub mod slot;
pub mod snapshot;

pub use backend::{Backend, BackendError, DiagnosticBackend};
pub use config::{ConfigError, UploadConfig, DEFAULT_THREAD_NAME, DEFAULT_TICK_INTERVAL};
pub use event::{FidelityParams, FidelityParamsId, Histogram, TelemetryEvent};
pub use logging::{
    DiagnosticLog, JsonLineLogger, LogFile, LogLevel, LogRotationPolicy, LoggingError,
};
pub use metrics::{UploadMetrics, UploadMetricsSnapshot};
pub use scheduler::{SchedulerError, SchedulerState, UploadScheduler, UploadSchedulerBuilder};
pub use serialization::{
    JsonSerialization, Serialization, SerializationBridge, SerializationError,
};
pub use slot::{SlotWake, SubmissionSlot};
pub use snapshot::{HistogramSource, ProngCache, ProngCacheBuilder};
