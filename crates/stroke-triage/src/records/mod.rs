//! Record lookups for the triage service
//!
//! The evaluator never touches storage. A `ClinicalRecords` implementation
//! resolves the subject, the current vitals and the current lab panel, and
//! fails with a distinct error for each record that does not exist.

mod memory;

pub use memory::InMemoryRecords;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contracts::{LabSnapshot, NeurologistConsultation, Subject, VitalsSnapshot};

/// A record the evaluator depends on could not be found
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordsError {
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Vitals not found for subject {0}")]
    VitalsNotFound(String),

    #[error("Lab results not found for subject {0}")]
    LabNotFound(String),
}

impl RecordsError {
    /// Which record was missing
    pub fn record_kind(&self) -> &'static str {
        match self {
            RecordsError::SubjectNotFound(_) => "subject",
            RecordsError::VitalsNotFound(_) => "vitals",
            RecordsError::LabNotFound(_) => "lab",
        }
    }

    pub fn subject_id(&self) -> &str {
        match self {
            RecordsError::SubjectNotFound(id)
            | RecordsError::VitalsNotFound(id)
            | RecordsError::LabNotFound(id) => id,
        }
    }
}

/// Result type for record lookups
pub type RecordsResult<T> = std::result::Result<T, RecordsError>;

/// Source of the records the evaluator consumes
///
/// Implementations must be thread-safe; the triage service shares one
/// instance across all requests.
pub trait ClinicalRecords: Send + Sync {
    /// Demographic record of a subject
    fn subject(&self, subject_id: &str) -> RecordsResult<Subject>;

    /// The single current vitals snapshot of a subject
    fn current_vitals(&self, subject_id: &str) -> RecordsResult<VitalsSnapshot>;

    /// The single current lab snapshot of a subject
    fn current_lab(&self, subject_id: &str) -> RecordsResult<LabSnapshot>;

    /// Neurologist consultations recorded for a subject, oldest first
    fn consultations(&self, _subject_id: &str) -> Vec<NeurologistConsultation> {
        Vec::new()
    }
}

/// Row as read from a bundle: the subject key plus every other column
///
/// The columns are handed to the strict snapshot type afterwards, so an
/// unrecognised key fails the load instead of reading as "not recorded".
#[derive(Deserialize)]
pub struct KeyedRow {
    #[serde(alias = "patient_id")]
    subject_id: String,

    #[serde(flatten)]
    columns: serde_json::Map<String, serde_json::Value>,
}

impl KeyedRow {
    fn into_parts<T: DeserializeOwned>(self) -> Result<(String, T), String> {
        let record = serde_json::from_value(serde_json::Value::Object(self.columns))
            .map_err(|e| format!("row for subject '{}': {}", self.subject_id, e))?;
        Ok((self.subject_id, record))
    }
}

/// Vitals row keyed by subject
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KeyedRow")]
pub struct VitalsEntry {
    pub subject_id: String,

    #[serde(flatten)]
    pub vitals: VitalsSnapshot,
}

impl TryFrom<KeyedRow> for VitalsEntry {
    type Error = String;

    fn try_from(row: KeyedRow) -> Result<Self, Self::Error> {
        let (subject_id, vitals) = row.into_parts()?;
        Ok(Self { subject_id, vitals })
    }
}

/// Lab row keyed by subject
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KeyedRow")]
pub struct LabEntry {
    pub subject_id: String,

    #[serde(flatten)]
    pub lab: LabSnapshot,
}

impl TryFrom<KeyedRow> for LabEntry {
    type Error = String;

    fn try_from(row: KeyedRow) -> Result<Self, Self::Error> {
        let (subject_id, lab) = row.into_parts()?;
        Ok(Self { subject_id, lab })
    }
}

/// File format for a set of records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordBundle {
    #[serde(default)]
    pub subjects: Vec<Subject>,

    #[serde(default)]
    pub vitals: Vec<VitalsEntry>,

    #[serde(default, alias = "lab_results")]
    pub labs: Vec<LabEntry>,

    #[serde(default)]
    pub consultations: Vec<NeurologistConsultation>,
}
