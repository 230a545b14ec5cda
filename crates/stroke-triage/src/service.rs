//! Triage service
//!
//! Entry point for a clinician asking about one subject. Order matters:
//! the role gate runs first, then the three record lookups, then the
//! engine, then the audit. A missing record surfaces as
//! `TriageError::MissingDependency` and is never reported as ineligible.

use std::sync::Arc;
use tracing::{debug, info};

use crate::access::{AccessPolicy, ClinicalRole};
use crate::config::TriageConfig;
use crate::contracts::*;
use crate::engine::EligibilityEngine;
use crate::error::Result;
use crate::records::ClinicalRecords;
use crate::telemetry::DecisionEventEmitter;

pub struct TriageService {
    engine: EligibilityEngine,
    records: Arc<dyn ClinicalRecords>,
    access: AccessPolicy,
    emitter: DecisionEventEmitter,
}

impl TriageService {
    pub fn new(
        records: Arc<dyn ClinicalRecords>,
        access: AccessPolicy,
        emitter: DecisionEventEmitter,
    ) -> Self {
        Self {
            engine: EligibilityEngine::new(),
            records,
            access,
            emitter,
        }
    }

    /// Build the access policy and audit sinks from configuration
    pub fn from_config(records: Arc<dyn ClinicalRecords>, config: &TriageConfig) -> Result<Self> {
        let emitter = DecisionEventEmitter::from_config(&config.audit)?;
        Ok(Self::new(records, config.access_policy(), emitter))
    }

    pub fn engine(&self) -> &EligibilityEngine {
        &self.engine
    }

    /// Resolve the subject's current records into a case
    pub fn resolve_case(&self, subject_id: &str) -> Result<EligibilityCase> {
        let subject = self.records.subject(subject_id)?;
        let vitals = self.records.current_vitals(subject_id)?;
        let lab = self.records.current_lab(subject_id)?;
        Ok(EligibilityCase {
            subject,
            vitals,
            lab,
        })
    }

    /// Assess one subject on behalf of a caller holding `role`
    pub fn assess_subject(
        &self,
        role: ClinicalRole,
        subject_id: &str,
        requested_by: &str,
    ) -> Result<EligibilityAssessment> {
        self.access.authorize(role)?;

        let case = self.resolve_case(subject_id)?;
        debug!(subject_id, "Resolved clinical records");

        let inputs_hash = EligibilityEngine::compute_inputs_hash(&case);
        let mut input = EligibilityInput::new(case, requested_by);
        input.context.insert("role".to_string(), role.to_string());

        let assessment = self.engine.assess(&input);

        let consultations = self.records.consultations(subject_id).len();
        let event = EligibilityDecisionEvent::from_assessment(inputs_hash, &assessment, requested_by)
            .with_correlation_id("request_id", input.request_id.to_string())
            .with_metadata("role", serde_json::json!(role.as_str()))
            .with_metadata("consultations_on_file", serde_json::json!(consultations));
        self.emitter.emit(&event);

        info!(
            subject_id,
            role = %role,
            eligible = assessment.is_eligible(),
            first_failed = assessment.first_failed.as_deref().unwrap_or("-"),
            "tPA eligibility assessed"
        );

        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriageError;
    use crate::records::{InMemoryRecords, RecordsError};
    use crate::telemetry::MemorySink;

    fn records_with(vitals: bool, lab: bool) -> InMemoryRecords {
        let mut records = InMemoryRecords::new();
        records.insert_subject(Subject::new("p-1").with_age(62));
        if vitals {
            records.insert_vitals(
                "p-1",
                VitalsSnapshot {
                    nihss_score: Some(8),
                    oxygen_saturation: Some(97),
                    ..Default::default()
                },
            );
        }
        if lab {
            records.insert_lab("p-1", LabSnapshot::default());
        }
        records
    }

    fn service(records: InMemoryRecords) -> (TriageService, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let emitter = DecisionEventEmitter::disabled().with_sink(sink.clone());
        let service = TriageService::new(Arc::new(records), AccessPolicy::default(), emitter);
        (service, sink)
    }

    #[test]
    fn test_assess_subject_emits_event() {
        let (service, sink) = service(records_with(true, true));
        let assessment = service
            .assess_subject(ClinicalRole::Doctor, "p-1", "dr-house")
            .unwrap();

        assert!(assessment.is_eligible());
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].requested_by, "dr-house");
        assert_eq!(
            events[0].correlation_ids.get("request_id"),
            Some(&assessment.request_id.to_string())
        );
    }

    #[test]
    fn test_unauthorized_role_checked_before_lookup() {
        let (service, sink) = service(InMemoryRecords::new());
        let err = service
            .assess_subject(ClinicalRole::Patient, "nobody", "self")
            .unwrap_err();
        assert!(matches!(err, TriageError::Unauthorized { .. }));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_missing_lab_is_not_ineligible() {
        let (service, sink) = service(records_with(true, false));
        let err = service
            .assess_subject(ClinicalRole::Neurologist, "p-1", "dr-a")
            .unwrap_err();
        assert!(matches!(
            err,
            TriageError::MissingDependency(RecordsError::LabNotFound(_))
        ));
        assert!(sink.events().is_empty());
    }
}
