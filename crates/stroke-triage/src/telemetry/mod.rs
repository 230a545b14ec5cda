//! Decision audit for stroke triage
//!
//! Every assessment made through the triage service produces one
//! `EligibilityDecisionEvent`. The emitter fans it out to the configured
//! sinks:
//!
//! - `TracingSink` - structured log line per decision
//! - `JsonLinesSink` - append-only JSON-lines audit file
//! - `MemorySink` - in-process buffer, for embedding and tests
//!
//! A failing sink is logged and skipped; it never changes a verdict.

mod sinks;

pub use sinks::{JsonLinesSink, MemorySink, TracingSink};

use std::sync::Arc;
use thiserror::Error;

use crate::config::AuditConfig;
use crate::contracts::EligibilityDecisionEvent;

/// Telemetry errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to write decision event: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize event: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Sink '{0}' is unavailable after a panic in another writer")]
    SinkPoisoned(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Destination for decision events
pub trait DecisionSink: Send + Sync {
    fn name(&self) -> &str;

    fn record(&self, event: &EligibilityDecisionEvent) -> Result<()>;
}

/// Fans decision events out to every registered sink
#[derive(Clone, Default)]
pub struct DecisionEventEmitter {
    sinks: Vec<Arc<dyn DecisionSink>>,
}

impl DecisionEventEmitter {
    /// Emitter with no sinks; events are dropped
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn DecisionSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Build the sinks named by the audit configuration
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        let mut emitter = Self::disabled();
        if !config.enabled {
            return Ok(emitter);
        }

        if config.log_decisions {
            emitter = emitter.with_sink(Arc::new(TracingSink));
        }
        if let Some(path) = &config.path {
            emitter = emitter.with_sink(Arc::new(JsonLinesSink::open(path)?));
        }
        Ok(emitter)
    }

    pub fn is_enabled(&self) -> bool {
        !self.sinks.is_empty()
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Record the event on every sink, returning how many accepted it
    pub fn emit(&self, event: &EligibilityDecisionEvent) -> usize {
        let mut delivered = 0;
        for sink in &self.sinks {
            match sink.record(event) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        sink = sink.name(),
                        event_id = %event.event_id,
                        error = %e,
                        "Failed to record decision event"
                    );
                }
            }
        }
        delivered
    }
}
