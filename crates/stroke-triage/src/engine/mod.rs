//! tPA eligibility engine
//!
//! Deterministic, side-effect-free evaluation of the eight eligibility
//! criteria against one subject's records.

pub mod criteria;

pub use criteria::*;

use crate::contracts::*;
use crate::error::{Result, TriageError};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use std::time::Instant;

/// Borrowed view over the three records of one subject
#[derive(Debug, Clone, Copy)]
pub struct ClinicalSnapshot<'a> {
    pub subject: &'a Subject,
    pub vitals: &'a VitalsSnapshot,
    pub lab: &'a LabSnapshot,
}

impl<'a> ClinicalSnapshot<'a> {
    pub fn from_case(case: &'a EligibilityCase) -> Self {
        Self {
            subject: &case.subject,
            vitals: &case.vitals,
            lab: &case.lab,
        }
    }
}

/// Trait for eligibility criteria
pub trait EligibilityCriterion: Send + Sync {
    /// Criterion identifier
    fn id(&self) -> &'static str;

    /// Criterion name
    fn name(&self) -> &'static str;

    /// Condition required to pass
    fn expected(&self) -> String;

    /// How an unrecorded value is treated
    fn absence_policy(&self) -> AbsencePolicy;

    /// Evaluate the records
    fn evaluate(&self, snapshot: &ClinicalSnapshot<'_>) -> CriterionOutcome;
}

/// Eligibility engine holding the criteria in evaluation order
pub struct EligibilityEngine {
    criteria: Vec<Box<dyn EligibilityCriterion>>,
}

impl Default for EligibilityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EligibilityEngine {
    /// Create the engine with the standard tPA criteria
    pub fn new() -> Self {
        Self {
            criteria: vec![
                Box::new(AgeCriterion),
                Box::new(StrokeSeverityCriterion),
                Box::new(OxygenationCriterion),
                Box::new(ExclusionHistoryCriterion),
                Box::new(BloodPressureCriterion),
                Box::new(GlucoseCriterion),
                Box::new(CoagulationCriterion),
                Box::new(PlateletCriterion),
            ],
        }
    }

    /// Describe the criteria in evaluation order
    pub fn criteria(&self) -> Vec<CriterionDescriptor> {
        self.criteria
            .iter()
            .enumerate()
            .map(|(i, c)| CriterionDescriptor {
                order: (i + 1) as u8,
                criterion_id: c.id().to_string(),
                name: c.name().to_string(),
                expected: c.expected(),
                absence_policy: c.absence_policy(),
            })
            .collect()
    }

    /// Binary verdict. Stops at the first failing criterion.
    pub fn evaluate(
        &self,
        subject: &Subject,
        vitals: &VitalsSnapshot,
        lab: &LabSnapshot,
    ) -> EligibilityVerdict {
        let snapshot = ClinicalSnapshot {
            subject,
            vitals,
            lab,
        };
        let eligible = self
            .criteria
            .iter()
            .all(|criterion| criterion.evaluate(&snapshot).passed);

        EligibilityVerdict::from_eligibility(eligible)
    }

    /// Verdict plus every criterion outcome
    pub fn assess(&self, input: &EligibilityInput) -> EligibilityAssessment {
        let start = Instant::now();
        let snapshot = ClinicalSnapshot::from_case(&input.case);

        let outcomes: Vec<CriterionOutcome> = self
            .criteria
            .iter()
            .enumerate()
            .map(|(i, criterion)| {
                let mut outcome = criterion.evaluate(&snapshot);
                outcome.order = (i + 1) as u8;
                outcome
            })
            .collect();

        let first_failed = outcomes
            .iter()
            .find(|o| !o.passed)
            .map(|o| o.criterion_id.clone());

        if let Some(id) = &first_failed {
            tracing::debug!(
                request_id = %input.request_id,
                criterion = %id,
                "tPA eligibility criterion failed"
            );
        }

        EligibilityAssessment {
            request_id: input.request_id,
            subject_id: Some(input.case.subject.id.clone()).filter(|id| !id.is_empty()),
            verdict: EligibilityVerdict::from_eligibility(first_failed.is_none()),
            outcomes,
            first_failed,
            completed_at: chrono::Utc::now(),
            duration_us: start.elapsed().as_micros() as u64,
        }
    }

    /// Compute deterministic hash of inputs
    pub fn compute_inputs_hash(case: &EligibilityCase) -> String {
        let mut hasher = Sha256::new();
        for part in [
            serde_json::to_string(&case.subject),
            serde_json::to_string(&case.vitals),
            serde_json::to_string(&case.lab),
        ]
        .into_iter()
        .flatten()
        {
            hasher.update(part.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Create an assessment input from case JSON
    pub fn create_input(case_json: serde_json::Value, requested_by: String) -> Result<EligibilityInput> {
        let case: EligibilityCase = serde_json::from_value(case_json)
            .map_err(|e| TriageError::invalid_input(format!("Invalid case JSON: {}", e)))?;

        Ok(EligibilityInput::new(case, requested_by))
    }
}

static STANDARD_ENGINE: OnceLock<EligibilityEngine> = OnceLock::new();

/// Evaluate tPA eligibility with the standard criteria
pub fn evaluate(subject: &Subject, vitals: &VitalsSnapshot, lab: &LabSnapshot) -> EligibilityVerdict {
    STANDARD_ENGINE
        .get_or_init(EligibilityEngine::new)
        .evaluate(subject, vitals, lab)
}
