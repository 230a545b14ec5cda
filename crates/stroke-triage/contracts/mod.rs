//! Stroke Triage Contracts
//!
//! Input records, verdicts and per-criterion outcomes shared by the engine,
//! the triage service and the CLI.

pub mod decision_event;
mod records;

pub use decision_event::*;
pub use records::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Message returned with an eligible verdict
pub const ELIGIBLE_MESSAGE: &str = "administer tPA and admit to ICU";

/// Message returned with an ineligible verdict
pub const INELIGIBLE_MESSAGE: &str = "do not administer tPA";

/// Input for one eligibility assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityInput {
    /// Unique request identifier
    pub request_id: Uuid,

    /// Records under evaluation
    pub case: EligibilityCase,

    /// Request context (free-form, not evaluated)
    #[serde(default)]
    pub context: HashMap<String, String>,

    /// Request timestamp
    pub requested_at: DateTime<Utc>,

    /// Requester identity
    pub requested_by: String,
}

impl EligibilityInput {
    pub fn new(case: EligibilityCase, requested_by: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            case,
            context: HashMap::new(),
            requested_at: Utc::now(),
            requested_by: requested_by.into(),
        }
    }
}

/// Binary outcome of the evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub message: String,
}

impl EligibilityVerdict {
    pub fn eligible() -> Self {
        Self {
            eligible: true,
            message: ELIGIBLE_MESSAGE.to_string(),
        }
    }

    pub fn ineligible() -> Self {
        Self {
            eligible: false,
            message: INELIGIBLE_MESSAGE.to_string(),
        }
    }

    pub fn from_eligibility(eligible: bool) -> Self {
        if eligible {
            Self::eligible()
        } else {
            Self::ineligible()
        }
    }
}

/// How a criterion treats a value that was never recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsencePolicy {
    /// Unknown value blocks eligibility
    Fails,
    /// Unknown value does not exclude
    Permitted,
}

impl fmt::Display for AbsencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbsencePolicy::Fails => write!(f, "absent fails"),
            AbsencePolicy::Permitted => write!(f, "absent passes"),
        }
    }
}

/// What an outcome was decided on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeBasis {
    /// Every value the criterion reads was recorded
    Measured,
    /// Some values recorded, the rest missing
    PartiallyAbsent,
    /// Nothing recorded and the criterion requires data
    AbsentFailed,
    /// Nothing recorded and the criterion tolerates that
    AbsentPermitted,
}

/// Result of a single criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionOutcome {
    /// Position in evaluation order, starting at 1
    pub order: u8,

    pub criterion_id: String,

    pub name: String,

    pub passed: bool,

    pub basis: OutcomeBasis,

    /// Condition required to pass, e.g. ">= 18"
    pub expected: String,

    /// Values seen, rendered for humans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
}

/// Static description of a criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionDescriptor {
    pub order: u8,
    pub criterion_id: String,
    pub name: String,
    pub expected: String,
    pub absence_policy: AbsencePolicy,
}

/// Verdict plus the full criterion breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityAssessment {
    /// Request ID correlation
    pub request_id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,

    pub verdict: EligibilityVerdict,

    /// Every criterion, in evaluation order
    pub outcomes: Vec<CriterionOutcome>,

    /// Lowest-ordered failing criterion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_failed: Option<String>,

    /// Completion timestamp
    pub completed_at: DateTime<Utc>,

    /// Evaluation time in microseconds
    pub duration_us: u64,
}

impl EligibilityAssessment {
    pub fn is_eligible(&self) -> bool {
        self.verdict.eligible
    }

    /// Failing outcomes, in evaluation order
    pub fn failed(&self) -> impl Iterator<Item = &CriterionOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    /// Passing outcomes with some or all of their data missing
    pub fn passed_on_absence(&self) -> impl Iterator<Item = &CriterionOutcome> {
        self.outcomes.iter().filter(|o| match o.basis {
            OutcomeBasis::AbsentPermitted => true,
            OutcomeBasis::PartiallyAbsent => o.passed,
            OutcomeBasis::Measured | OutcomeBasis::AbsentFailed => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_messages() {
        assert_eq!(EligibilityVerdict::eligible().message, ELIGIBLE_MESSAGE);
        assert_eq!(EligibilityVerdict::ineligible().message, INELIGIBLE_MESSAGE);
        assert!(EligibilityVerdict::from_eligibility(true).eligible);
        assert!(!EligibilityVerdict::from_eligibility(false).eligible);
    }

    #[test]
    fn test_absence_policy_serializes_snake_case() {
        let json = serde_json::to_string(&AbsencePolicy::Permitted).unwrap();
        assert_eq!(json, "\"permitted\"");
    }
}
