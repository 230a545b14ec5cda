//! In-memory record store
//!
//! Loaded from a JSON or YAML `RecordBundle`. When a subject has several
//! vitals or lab rows, the last row in the bundle is the current one.

use std::collections::HashMap;
use std::path::Path;

use super::{ClinicalRecords, RecordBundle, RecordsError, RecordsResult};
use crate::contracts::{LabSnapshot, NeurologistConsultation, Subject, VitalsSnapshot};
use crate::error::{Result, TriageError};

#[derive(Debug, Default)]
pub struct InMemoryRecords {
    subjects: HashMap<String, Subject>,
    vitals: HashMap<String, VitalsSnapshot>,
    labs: HashMap<String, LabSnapshot>,
    consultations: HashMap<String, Vec<NeurologistConsultation>>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bundle(bundle: RecordBundle) -> Self {
        let mut records = Self::new();
        for subject in bundle.subjects {
            records.insert_subject(subject);
        }
        for entry in bundle.vitals {
            records.insert_vitals(entry.subject_id, entry.vitals);
        }
        for entry in bundle.labs {
            records.insert_lab(entry.subject_id, entry.lab);
        }
        for consultation in bundle.consultations {
            records.add_consultation(consultation);
        }
        records
    }

    /// Load a bundle file, choosing the parser by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TriageError::file_error(format!(
                "Failed to read records file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let bundle: RecordBundle = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") | None => serde_json::from_str(&content)?,
            Some(other) => {
                return Err(TriageError::invalid_input(format!(
                    "Unsupported records format: .{}",
                    other
                )))
            }
        };

        let records = Self::from_bundle(bundle);
        tracing::info!(
            path = %path.display(),
            subjects = records.subjects.len(),
            "Loaded clinical records"
        );
        Ok(records)
    }

    pub fn insert_subject(&mut self, subject: Subject) {
        self.subjects.insert(subject.id.clone(), subject);
    }

    /// Replaces any previous vitals for the subject
    pub fn insert_vitals(&mut self, subject_id: impl Into<String>, vitals: VitalsSnapshot) {
        self.vitals.insert(subject_id.into(), vitals);
    }

    /// Replaces any previous lab panel for the subject
    pub fn insert_lab(&mut self, subject_id: impl Into<String>, lab: LabSnapshot) {
        self.labs.insert(subject_id.into(), lab);
    }

    pub fn add_consultation(&mut self, consultation: NeurologistConsultation) {
        self.consultations
            .entry(consultation.subject_id.clone())
            .or_default()
            .push(consultation);
    }

    /// Subject identifiers, sorted
    pub fn subject_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.subjects.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl ClinicalRecords for InMemoryRecords {
    fn subject(&self, subject_id: &str) -> RecordsResult<Subject> {
        self.subjects
            .get(subject_id)
            .cloned()
            .ok_or_else(|| RecordsError::SubjectNotFound(subject_id.to_string()))
    }

    fn current_vitals(&self, subject_id: &str) -> RecordsResult<VitalsSnapshot> {
        self.vitals
            .get(subject_id)
            .cloned()
            .ok_or_else(|| RecordsError::VitalsNotFound(subject_id.to_string()))
    }

    fn current_lab(&self, subject_id: &str) -> RecordsResult<LabSnapshot> {
        self.labs
            .get(subject_id)
            .cloned()
            .ok_or_else(|| RecordsError::LabNotFound(subject_id.to_string()))
    }

    fn consultations(&self, subject_id: &str) -> Vec<NeurologistConsultation> {
        self.consultations
            .get(subject_id)
            .cloned()
            .unwrap_or_default()
    }
}
