use crate::event::FidelityParams;
use crate::logging::{DiagnosticLog, LogLevel};
use crate::serialization::{
    JsonSerialization, Serialization, SerializationBridge, SerializationError,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const TARGET: &str = "prong_uplink::backend";

/// Errors surfaced when a backend cannot supply a default configuration.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

/// Delivery target driven by the upload worker.
///
/// Implementations must not panic. A delivery that fails should report
/// `false` from [`Backend::process`]; the scheduler never retries it.
pub trait Backend: Send + Sync {
    /// Accepts one encoded event. The result is best-effort.
    fn process(&self, event: &Serialization) -> bool;

    /// Returns an encoded default configuration within `timeout`.
    fn default_fidelity_params(&self, timeout: Duration) -> Result<Serialization, BackendError>;
}

/// Fallback backend that writes decoded events to the diagnostic log.
pub struct DiagnosticBackend {
    log: DiagnosticLog,
    bridge: Arc<dyn SerializationBridge>,
    defaults: FidelityParams,
}

impl DiagnosticBackend {
    pub fn new(log: DiagnosticLog) -> Self {
        Self::with_bridge(log, Arc::new(JsonSerialization))
    }

    pub fn with_bridge(log: DiagnosticLog, bridge: Arc<dyn SerializationBridge>) -> Self {
        Self {
            log,
            bridge,
            defaults: FidelityParams::default(),
        }
    }

    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }
}

impl Backend for DiagnosticBackend {
    fn process(&self, event: &Serialization) -> bool {
        let decoded = match self.bridge.decode_event(event) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.log
                    .error(TARGET, &format!("undecodable telemetry event: {err}"));
                return false;
            }
        };
        let payload = match serde_json::to_value(&decoded) {
            Ok(payload) => payload,
            Err(err) => {
                self.log
                    .error(TARGET, &format!("telemetry event not loggable: {err}"));
                return false;
            }
        };
        let message = format!(
            "telemetry event {} with {} histograms",
            decoded.fidelity_params,
            decoded.histograms.len()
        );
        self.log
            .record(LogLevel::Info, TARGET, &message, Some(&payload));
        true
    }

    fn default_fidelity_params(&self, _timeout: Duration) -> Result<Serialization, BackendError> {
        Ok(self.bridge.encode_configuration(&self.defaults)?)
    }
}
