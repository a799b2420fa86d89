use crate::event::{FidelityParams, TelemetryEvent};
use std::fmt;
use thiserror::Error;

/// Opaque encoded payload exchanged with backends.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Serialization(Vec<u8>);

impl Serialization {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Serialization {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Serialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Serialization({} bytes)", self.0.len())
    }
}

/// Errors surfaced while converting domain objects to or from bytes.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        source: serde_json::Error,
    },
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        source: serde_json::Error,
    },
}

/// Converts events and configurations to the opaque form backends accept.
pub trait SerializationBridge: Send + Sync {
    fn encode_event(&self, event: &TelemetryEvent) -> Result<Serialization, SerializationError>;

    fn decode_event(&self, bytes: &Serialization) -> Result<TelemetryEvent, SerializationError>;

    fn encode_configuration(
        &self,
        params: &FidelityParams,
    ) -> Result<Serialization, SerializationError>;

    fn decode_configuration(
        &self,
        bytes: &Serialization,
    ) -> Result<FidelityParams, SerializationError>;
}

/// JSON encoding backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerialization;

impl SerializationBridge for JsonSerialization {
    fn encode_event(&self, event: &TelemetryEvent) -> Result<Serialization, SerializationError> {
        serde_json::to_vec(event)
            .map(Serialization)
            .map_err(|source| SerializationError::Encode {
                what: "telemetry event",
                source,
            })
    }

    fn decode_event(&self, bytes: &Serialization) -> Result<TelemetryEvent, SerializationError> {
        serde_json::from_slice(bytes.as_bytes()).map_err(|source| SerializationError::Decode {
            what: "telemetry event",
            source,
        })
    }

    fn encode_configuration(
        &self,
        params: &FidelityParams,
    ) -> Result<Serialization, SerializationError> {
        serde_json::to_vec(params)
            .map(Serialization)
            .map_err(|source| SerializationError::Encode {
                what: "fidelity params",
                source,
            })
    }

    fn decode_configuration(
        &self,
        bytes: &Serialization,
    ) -> Result<FidelityParams, SerializationError> {
        serde_json::from_slice(bytes.as_bytes()).map_err(|source| SerializationError::Decode {
            what: "fidelity params",
            source,
        })
    }
}
