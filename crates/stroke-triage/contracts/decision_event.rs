//! DecisionEvent for tPA eligibility decisions
//!
//! One event is recorded per assessment so every recommendation can be
//! traced back to the exact inputs that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::EligibilityAssessment;

/// Audit record of one eligibility decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityDecisionEvent {
    /// Unique event identifier
    pub event_id: Uuid,

    /// Agent identifier
    pub agent_id: String,

    /// Agent version
    pub agent_version: String,

    /// Event type (always "tpa_eligibility_decision")
    pub event_type: String,

    /// Hash of inputs for deduplication
    pub inputs_hash: String,

    /// Structured outputs
    pub outputs: DecisionOutputs,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,

    /// Who asked for the evaluation
    pub requested_by: String,

    /// Execution reference (request ID)
    pub execution_ref: String,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,

    /// Correlation IDs for distributed tracing
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub correlation_ids: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl EligibilityDecisionEvent {
    pub const AGENT_ID: &'static str = "stroke-triage";

    pub const AGENT_VERSION: &'static str = env!("CARGO_PKG_VERSION");

    pub const EVENT_TYPE: &'static str = "tpa_eligibility_decision";

    /// Create from an assessment
    pub fn from_assessment(
        inputs_hash: String,
        assessment: &EligibilityAssessment,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            agent_id: Self::AGENT_ID.to_string(),
            agent_version: Self::AGENT_VERSION.to_string(),
            event_type: Self::EVENT_TYPE.to_string(),
            inputs_hash,
            outputs: DecisionOutputs::from_assessment(assessment),
            subject_id: assessment.subject_id.clone(),
            requested_by: requested_by.into(),
            execution_ref: assessment.request_id.to_string(),
            timestamp: Utc::now(),
            performance: Some(PerformanceMetrics {
                duration_us: assessment.duration_us,
                criteria_evaluated: assessment.outcomes.len() as u32,
            }),
            correlation_ids: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Add correlation ID
    pub fn with_correlation_id(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.correlation_ids.insert(key.into(), value.into());
        self
    }

    /// Get summary for logging
    pub fn summary(&self) -> String {
        format!(
            "[{}] {} - eligible={}, first_failed={}, failed={}, absent_permitted={}",
            self.agent_id,
            self.event_type,
            self.outputs.eligible,
            self.outputs.first_failed.as_deref().unwrap_or("-"),
            self.outputs.failed_criteria.len(),
            self.outputs.passed_on_absence.len(),
        )
    }
}

/// Structured outputs for analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOutputs {
    pub eligible: bool,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_failed: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_criteria: Vec<String>,

    /// Criteria that passed with no recorded data
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passed_on_absence: Vec<String>,
}

impl DecisionOutputs {
    pub fn from_assessment(assessment: &EligibilityAssessment) -> Self {
        Self {
            eligible: assessment.verdict.eligible,
            message: assessment.verdict.message.clone(),
            first_failed: assessment.first_failed.clone(),
            failed_criteria: assessment
                .failed()
                .map(|o| o.criterion_id.clone())
                .collect(),
            passed_on_absence: assessment
                .passed_on_absence()
                .map(|o| o.criterion_id.clone())
                .collect(),
        }
    }
}

/// Performance metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub duration_us: u64,
    pub criteria_evaluated: u32,
}
