use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Severity levels accepted by the diagnostic log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the canonical uppercase representation.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory rotation policy (default 256 KiB x 4 segments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogRotationPolicy {
    pub max_bytes: usize,
    pub max_files: usize,
}

impl Default for LogRotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 256 << 10,
            max_files: 4,
        }
    }
}

/// Accumulated log lines for one rotated segment.
#[derive(Debug, Default, Clone)]
pub struct LogFile {
    lines: Vec<String>,
    bytes_written: usize,
}

impl LogFile {
    /// Lines contained within the segment.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Total bytes recorded before rotation.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }
}

/// JSON-line logger with deterministic rotation semantics.
#[derive(Debug, Clone)]
pub struct JsonLineLogger {
    policy: LogRotationPolicy,
    current_level: LogLevel,
    files: VecDeque<LogFile>,
    active: LogFile,
    next_seq: u64,
}

impl JsonLineLogger {
    /// Creates a logger anchored to the provided rotation policy.
    pub fn new(policy: LogRotationPolicy) -> Self {
        Self {
            policy,
            current_level: LogLevel::Info,
            files: VecDeque::new(),
            active: LogFile::default(),
            next_seq: 0,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.current_level
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.current_level = level;
    }

    /// Emits a JSON-line entry. Entries below the current level are dropped
    /// without consuming a sequence number.
    pub fn log(
        &mut self,
        ts_ms: u64,
        level: LogLevel,
        target: &str,
        scheduler: &str,
        message: &str,
        payload: Option<&Value>,
    ) -> Result<(), LoggingError> {
        if level < self.current_level {
            return Ok(());
        }
        let record = LogRecord {
            ts: ts_ms,
            level: level.as_str(),
            target,
            scheduler,
            seq: self.next_seq,
            message,
            payload,
        };
        let line = serde_json::to_string(&record)?;
        self.next_seq += 1;
        self.rotate_if_needed(line.len());
        self.active.bytes_written = self.active.bytes_written.saturating_add(line.len());
        self.active.lines.push(line);
        Ok(())
    }

    /// Returns the rotated history followed by the active segment.
    pub fn files(&self) -> impl Iterator<Item = &LogFile> {
        self.files.iter().chain(std::iter::once(&self.active))
    }

    fn rotate_if_needed(&mut self, next_line_len: usize) {
        if self.active.bytes_written + next_line_len <= self.policy.max_bytes {
            return;
        }
        if !self.active.lines.is_empty() {
            self.files.push_back(std::mem::take(&mut self.active));
            while self.files.len() > self.policy.max_files {
                self.files.pop_front();
            }
        }
        self.active = LogFile::default();
    }
}

/// Errors surfaced while serializing JSON-line logs.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    ts: u64,
    level: &'a str,
    target: &'a str,
    scheduler: &'a str,
    seq: u64,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a Value>,
}

/// Shared handle to a [`JsonLineLogger`], tagged with the owning scheduler's
/// name. Every record is mirrored to `tracing`.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    scheduler: Arc<str>,
    logger: Arc<Mutex<JsonLineLogger>>,
}

impl DiagnosticLog {
    pub fn new(scheduler: impl Into<String>, logger: JsonLineLogger) -> Self {
        Self {
            scheduler: Arc::from(scheduler.into()),
            logger: Arc::new(Mutex::new(logger)),
        }
    }

    pub fn scheduler(&self) -> &str {
        &self.scheduler
    }

    pub fn info(&self, target: &str, message: &str) {
        self.record(LogLevel::Info, target, message, None);
    }

    pub fn warn(&self, target: &str, message: &str) {
        self.record(LogLevel::Warn, target, message, None);
    }

    pub fn error(&self, target: &str, message: &str) {
        self.record(LogLevel::Error, target, message, None);
    }

    /// Writes one record. Serialization failures of the record itself are
    /// reported through `tracing` only.
    pub fn record(&self, level: LogLevel, target: &str, message: &str, payload: Option<&Value>) {
        emit_tracing(level, target, &self.scheduler, message);
        let result = self
            .lock()
            .log(now_ms(), level, target, &self.scheduler, message, payload);
        if let Err(err) = result {
            tracing::error!(scheduler = %self.scheduler, %err, "diagnostic log write failed");
        }
    }

    pub fn set_level(&self, level: LogLevel) {
        self.lock().set_level(level);
    }

    /// Copies every retained line, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lock()
            .files()
            .flat_map(|file| file.lines().iter().cloned())
            .collect()
    }

    /// Parses retained lines back into JSON values.
    pub fn entries(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, JsonLineLogger> {
        self.logger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new("prong-uplink", JsonLineLogger::new(LogRotationPolicy::default()))
    }
}

fn emit_tracing(level: LogLevel, component: &str, scheduler: &str, message: &str) {
    match level {
        LogLevel::Trace => tracing::trace!(component, scheduler, "{message}"),
        LogLevel::Debug => tracing::debug!(component, scheduler, "{message}"),
        LogLevel::Info => tracing::info!(component, scheduler, "{message}"),
        LogLevel::Warn => tracing::warn!(component, scheduler, "{message}"),
        LogLevel::Error => tracing::error!(component, scheduler, "{message}"),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis().min(u128::from(u64::MAX)) as u64)
        .unwrap_or(0)
}
