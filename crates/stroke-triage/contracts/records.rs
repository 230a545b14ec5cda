//! Clinical input records
//!
//! Immutable snapshots handed to the evaluator. Every measurement is
//! optional: absence is data, and each criterion decides what it means.

use serde::{Deserialize, Serialize};

/// Recorded gender of a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(alias = "male")]
    Male,
    #[serde(alias = "female")]
    Female,
}

/// Demographic record of the patient being triaged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Subject {
    /// Subject identifier
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Age in years
    #[serde(default)]
    pub age: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl Subject {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }
}

/// Bedside measurements and history flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VitalsSnapshot {
    /// NIH Stroke Scale score
    #[serde(default)]
    pub nihss_score: Option<i32>,

    /// SpO2 in percent
    #[serde(default)]
    pub oxygen_saturation: Option<i32>,

    /// Systolic blood pressure, mmHg
    #[serde(default)]
    pub blood_pressure_systolic: Option<i32>,

    /// Diastolic blood pressure, mmHg
    #[serde(default, alias = "blodd_pressure_diastolic")]
    pub blood_pressure_diastolic: Option<i32>,

    /// Platelets per microliter
    #[serde(default)]
    pub platelet_count: Option<i64>,

    /// International Normalized Ratio
    #[serde(default)]
    pub inr_score: Option<f64>,

    #[serde(default)]
    pub significant_head_trauma: Option<bool>,

    #[serde(default)]
    pub recent_surgery: Option<bool>,

    #[serde(default)]
    pub recent_myocardial_infarction: Option<bool>,

    #[serde(default)]
    pub recent_hemorrhage: Option<bool>,

    /// Beats per minute. Recorded but not evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i32>,

    /// Breaths per minute. Recorded but not evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<i32>,
}

impl VitalsSnapshot {
    fn exclusion_flags(&self) -> [(&'static str, Option<bool>); 4] {
        [
            ("significant_head_trauma", self.significant_head_trauma),
            ("recent_surgery", self.recent_surgery),
            ("recent_myocardial_infarction", self.recent_myocardial_infarction),
            ("recent_hemorrhage", self.recent_hemorrhage),
        ]
    }

    /// Names of the exclusion flags that are set, in fixed order
    pub fn active_exclusions(&self) -> Vec<&'static str> {
        self.exclusion_flags()
            .into_iter()
            .filter(|(_, flag)| flag.unwrap_or(false))
            .map(|(name, _)| name)
            .collect()
    }

    /// Names of the exclusion flags that were never recorded, in fixed order
    pub fn unrecorded_exclusions(&self) -> Vec<&'static str> {
        self.exclusion_flags()
            .into_iter()
            .filter(|(_, flag)| flag.is_none())
            .map(|(name, _)| name)
            .collect()
    }

    /// True when none of the four exclusion flags was recorded at all
    pub fn exclusions_unrecorded(&self) -> bool {
        self.exclusion_flags().iter().all(|(_, flag)| flag.is_none())
    }
}

/// Laboratory panel results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabSnapshot {
    /// Blood glucose from the basic metabolic panel, mg/dL
    #[serde(default)]
    pub bmp_glucose: Option<f64>,

    /// Coagulation panel summary, expected "normal" or "abnormal"
    #[serde(default)]
    pub coagulation: Option<String>,

    /// Complete blood count summary. Recorded but not evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cbc: Option<String>,

    /// Creatinine, mg/dL. Recorded but not evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creatinine: Option<f64>,
}

impl LabSnapshot {
    /// Whether the coagulation summary reads "abnormal", ignoring case
    pub fn coagulation_abnormal(&self) -> bool {
        self.coagulation
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case("abnormal"))
            .unwrap_or(false)
    }
}

/// Notes left by the consulting neurologist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeurologistConsultation {
    #[serde(alias = "patient_id")]
    pub subject_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neurologist_notes: Option<String>,

    /// E.g. ischemic stroke, hemorrhagic stroke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,

    /// E.g. tPA, admit to ICU
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpa_approval: Option<bool>,
}

/// The three records the evaluator consumes for one subject
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EligibilityCase {
    pub subject: Subject,
    #[serde(default)]
    pub vitals: VitalsSnapshot,
    #[serde(default)]
    pub lab: LabSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize_as_absent() {
        let vitals: VitalsSnapshot = serde_json::from_str(r#"{"nihss_score": 6}"#).unwrap();
        assert_eq!(vitals.nihss_score, Some(6));
        assert!(vitals.oxygen_saturation.is_none());
        assert!(vitals.exclusions_unrecorded());
    }

    #[test]
    fn test_active_exclusions() {
        let vitals = VitalsSnapshot {
            recent_surgery: Some(true),
            recent_hemorrhage: Some(false),
            ..Default::default()
        };
        assert_eq!(vitals.active_exclusions(), vec!["recent_surgery"]);
        assert_eq!(
            vitals.unrecorded_exclusions(),
            vec!["significant_head_trauma", "recent_myocardial_infarction"]
        );
        assert!(!vitals.exclusions_unrecorded());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let vitals = serde_json::from_str::<VitalsSnapshot>(r#"{"platelets": 20000}"#);
        assert!(vitals.is_err());

        let lab = serde_json::from_str::<LabSnapshot>(r#"{"glucose": 900.0}"#);
        assert!(lab.is_err());

        let case = serde_json::from_str::<EligibilityCase>(
            r#"{"subject": {"age": 50}, "vitals": {}, "labs": {}}"#,
        );
        assert!(case.is_err());
    }

    #[test]
    fn test_legacy_diastolic_column_name() {
        let vitals: VitalsSnapshot =
            serde_json::from_str(r#"{"blodd_pressure_diastolic": 130}"#).unwrap();
        assert_eq!(vitals.blood_pressure_diastolic, Some(130));
    }

    #[test]
    fn test_coagulation_abnormal_ignores_case() {
        for value in ["abnormal", "Abnormal", "ABNORMAL"] {
            let lab = LabSnapshot {
                coagulation: Some(value.to_string()),
                ..Default::default()
            };
            assert!(lab.coagulation_abnormal(), "{value}");
        }
        let normal = LabSnapshot {
            coagulation: Some("normal".to_string()),
            ..Default::default()
        };
        assert!(!normal.coagulation_abnormal());
        assert!(!LabSnapshot::default().coagulation_abnormal());
    }

    #[test]
    fn test_consultation_accepts_patient_id() {
        let c: NeurologistConsultation =
            serde_json::from_str(r#"{"patient_id": "p-1", "diagnosis": "ischemic stroke"}"#)
                .unwrap();
        assert_eq!(c.subject_id, "p-1");
        assert_eq!(c.diagnosis.as_deref(), Some("ischemic stroke"));
    }
}
