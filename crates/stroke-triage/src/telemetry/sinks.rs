//! Decision event sinks

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

use super::{DecisionSink, Result, TelemetryError};
use crate::contracts::EligibilityDecisionEvent;

/// Logs each decision as a structured tracing event
pub struct TracingSink;

impl DecisionSink for TracingSink {
    fn name(&self) -> &str {
        "tracing"
    }

    fn record(&self, event: &EligibilityDecisionEvent) -> Result<()> {
        info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            subject_id = event.subject_id.as_deref().unwrap_or("-"),
            eligible = event.outputs.eligible,
            first_failed = event.outputs.first_failed.as_deref().unwrap_or("-"),
            inputs_hash = %event.inputs_hash,
            "{}",
            event.summary()
        );
        Ok(())
    }
}

/// Appends one JSON document per line
pub struct JsonLinesSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesSink {
    /// Open for appending, creating the file and its directory if needed
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DecisionSink for JsonLinesSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn record(&self, event: &EligibilityDecisionEvent) -> Result<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut file = self
            .file
            .lock()
            .map_err(|_| TelemetryError::SinkPoisoned(self.path.display().to_string()))?;
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }
}

/// Keeps events in memory
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<EligibilityDecisionEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<EligibilityDecisionEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl DecisionSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn record(&self, event: &EligibilityDecisionEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| TelemetryError::SinkPoisoned("memory".to_string()))?
            .push(event.clone());
        Ok(())
    }
}
