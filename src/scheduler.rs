use crate::backend::{Backend, BackendError, DiagnosticBackend};
use crate::config::{ConfigError, UploadConfig};
use crate::event::{FidelityParams, FidelityParamsId, TelemetryEvent};
use crate::logging::{DiagnosticLog, JsonLineLogger};
use crate::metrics::UploadMetrics;
use crate::serialization::{JsonSerialization, SerializationBridge, SerializationError};
use crate::slot::{SlotWake, SubmissionSlot};
use crate::snapshot::HistogramSource;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use thiserror::Error;

const TARGET: &str = "prong_uplink::scheduler";

/// Lifecycle state of an [`UploadScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerState::Stopped => f.write_str("stopped"),
            SchedulerState::Running => f.write_str("running"),
        }
    }
}

/// Errors surfaced by the scheduler's lifecycle and bootstrap paths.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn upload worker: {0}")]
    Spawn(#[source] io::Error),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

/// Builder for an [`UploadScheduler`] with optional overrides.
pub struct UploadSchedulerBuilder {
    config: UploadConfig,
    backend: Option<Arc<dyn Backend>>,
    bridge: Arc<dyn SerializationBridge>,
    log: Option<DiagnosticLog>,
    fidelity_params: FidelityParamsId,
}

impl Default for UploadSchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSchedulerBuilder {
    pub fn new() -> Self {
        Self {
            config: UploadConfig::default(),
            backend: None,
            bridge: Arc::new(JsonSerialization),
            log: None,
            fidelity_params: FidelityParamsId::default(),
        }
    }

    pub fn config(mut self, config: UploadConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tick_interval(mut self, tick: Duration) -> Self {
        self.config.tick_interval_ms = tick.as_millis().max(1) as u64;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn serialization(mut self, bridge: Arc<dyn SerializationBridge>) -> Self {
        self.bridge = bridge;
        self
    }

    /// Routes diagnostics to an existing log instead of a fresh one built
    /// from the config.
    pub fn diagnostic_log(mut self, log: DiagnosticLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn fidelity_params(mut self, id: impl Into<FidelityParamsId>) -> Self {
        self.fidelity_params = id.into();
        self
    }

    /// Validates the config and builds a stopped scheduler.
    pub fn build(self) -> Result<UploadScheduler, SchedulerError> {
        self.config.validate()?;
        Ok(self.assemble())
    }

    fn assemble(self) -> UploadScheduler {
        let log = self.log.unwrap_or_else(|| {
            let mut logger = JsonLineLogger::new(self.config.log_rotation);
            logger.set_level(self.config.log_level);
            DiagnosticLog::new(self.config.thread_name.clone(), logger)
        });
        let backend = self.backend.unwrap_or_else(|| {
            Arc::new(DiagnosticBackend::with_bridge(
                log.clone(),
                self.bridge.clone(),
            ))
        });
        UploadScheduler {
            shared: Arc::new(WorkerShared {
                slot: SubmissionSlot::new(),
                backend,
                bridge: self.bridge,
                fidelity_params: AtomicU64::new(self.fidelity_params.0),
                metrics: UploadMetrics::default(),
                log,
            }),
            tick: self.config.tick_interval(),
            thread_name: self.config.thread_name,
            join: Mutex::new(None),
        }
    }

    /// Builds the scheduler and starts its worker.
    pub fn spawn(self) -> Result<UploadScheduler, SchedulerError> {
        let scheduler = self.build()?;
        scheduler.start()?;
        Ok(scheduler)
    }
}

/// State reachable from both the producer handle and the worker thread.
struct WorkerShared {
    slot: SubmissionSlot,
    backend: Arc<dyn Backend>,
    bridge: Arc<dyn SerializationBridge>,
    fidelity_params: AtomicU64,
    metrics: UploadMetrics,
    log: DiagnosticLog,
}

impl WorkerShared {
    fn run(&self, tick: Duration) {
        loop {
            match self.slot.wait(tick) {
                SlotWake::Pending(snapshot) => {
                    self.process_histogram_cache(&*snapshot);
                    drop(snapshot);
                    self.slot.clear();
                }
                SlotWake::Idle => {}
                SlotWake::Shutdown => break,
            }
        }
    }

    /// One drain cycle. The slot stays occupied throughout, so concurrent
    /// submissions are rejected rather than blocked.
    fn process_histogram_cache(&self, snapshot: &dyn HistogramSource) {
        let mut event = TelemetryEvent::default();
        snapshot.fill_histograms(&mut event);
        let fidelity_params = FidelityParamsId(self.fidelity_params.load(Ordering::Acquire));
        event.fidelity_params = fidelity_params;
        let encoded = match self.bridge.encode_event(&event) {
            Ok(encoded) => encoded,
            Err(err) => {
                self.metrics.record_encode_failure();
                self.metrics.record_drain();
                self.log
                    .error(TARGET, &format!("dropping snapshot: {err}"));
                return;
            }
        };
        drop(event);
        let delivered = self.backend.process(&encoded);
        self.metrics.record_delivery(delivered);
        self.metrics.record_drain();
        if !delivered {
            self.log.warn(
                TARGET,
                &format!(
                    "backend rejected telemetry event ({} bytes) for {fidelity_params}",
                    encoded.len()
                ),
            );
        }
    }
}

/// Hands performance snapshots from a producer to a background upload worker.
///
/// At most one snapshot is pending at a time. [`UploadScheduler::submit`]
/// never waits on delivery; a busy slot rejects the submission instead.
pub struct UploadScheduler {
    shared: Arc<WorkerShared>,
    tick: Duration,
    thread_name: String,
    join: Mutex<Option<thread::JoinHandle<()>>>,
}

impl UploadScheduler {
    pub fn builder() -> UploadSchedulerBuilder {
        UploadSchedulerBuilder::new()
    }

    /// Builds a stopped scheduler with the default config, falling back to a
    /// [`DiagnosticBackend`] when `backend` is `None`.
    pub fn new(backend: Option<Arc<dyn Backend>>) -> Self {
        let builder = UploadSchedulerBuilder::new();
        match backend {
            Some(backend) => builder.backend(backend).assemble(),
            None => builder.assemble(),
        }
    }

    /// Offers a snapshot for upload. Returns `false` if one is still pending;
    /// the caller keeps its handle and may resubmit later.
    pub fn submit(&self, snapshot: Arc<dyn HistogramSource>) -> bool {
        let accepted = self.shared.slot.try_submit(snapshot);
        self.shared.metrics.record_submit(accepted);
        accepted
    }

    pub fn start(&self) -> Result<(), SchedulerError> {
        let mut join = self.lock_join();
        if join.is_some() {
            self.shared
                .log
                .warn(TARGET, "can't start an already running upload worker");
            return Ok(());
        }
        self.shared.slot.reset();
        let shared = Arc::clone(&self.shared);
        let tick = self.tick;
        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || shared.run(tick))
            .map_err(SchedulerError::Spawn)?;
        *join = Some(handle);
        self.shared.metrics.record_worker_start();
        self.shared.log.info(TARGET, "upload worker started");
        Ok(())
    }

    /// Signals the worker and blocks until it has exited. A snapshot still
    /// pending at this point is not delivered.
    pub fn stop(&self) {
        let mut join = self.lock_join();
        let Some(handle) = join.take() else {
            self.shared
                .log
                .warn(TARGET, "can't stop an upload worker that's not started");
            return;
        };
        self.shared.slot.request_shutdown();
        if handle.join().is_err() {
            self.shared
                .log
                .error(TARGET, "upload worker panicked before shutdown");
        } else {
            self.shared.log.info(TARGET, "upload worker stopped");
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.lock_join().is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    pub fn is_pending(&self) -> bool {
        self.shared.slot.is_occupied()
    }

    /// Updates the identifier stamped onto events. Drains read it at drain
    /// time, not at submission time.
    pub fn set_fidelity_params_id(&self, id: impl Into<FidelityParamsId>) {
        self.shared
            .fidelity_params
            .store(id.into().0, Ordering::Release);
    }

    pub fn fidelity_params_id(&self) -> FidelityParamsId {
        FidelityParamsId(self.shared.fidelity_params.load(Ordering::Acquire))
    }

    /// Asks the backend for its default configuration and decodes it.
    pub fn fetch_default_fidelity_params(
        &self,
        timeout: Duration,
    ) -> Result<FidelityParams, SchedulerError> {
        let encoded = self.shared.backend.default_fidelity_params(timeout)?;
        Ok(self.shared.bridge.decode_configuration(&encoded)?)
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.shared.backend
    }

    pub fn metrics(&self) -> &UploadMetrics {
        &self.shared.metrics
    }

    pub fn diagnostic_log(&self) -> &DiagnosticLog {
        &self.shared.log
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick
    }

    fn lock_join(&self) -> MutexGuard<'_, Option<thread::JoinHandle<()>>> {
        self.join.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for UploadScheduler {
    fn drop(&mut self) {
        if self.state() == SchedulerState::Running {
            self.stop();
        }
    }
}
