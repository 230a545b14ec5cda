//! tPA eligibility criteria
//!
//! Eight fixed criteria, each a pure check over one subject's records.
//! Criteria 1-3 require their value to be recorded; criteria 4-8 only
//! exclude on a recorded value.

use crate::contracts::*;
use crate::engine::{ClinicalSnapshot, EligibilityCriterion};

pub const MIN_AGE_YEARS: i32 = 18;
pub const MIN_NIHSS_SCORE: i32 = 4;
pub const MIN_OXYGEN_SATURATION: i32 = 95;
pub const MAX_SYSTOLIC_MMHG: i32 = 185;
pub const MAX_DIASTOLIC_MMHG: i32 = 110;
pub const MIN_GLUCOSE_MG_DL: f64 = 50.0;
pub const MAX_GLUCOSE_MG_DL: f64 = 400.0;
/// INR at or above this value excludes
pub const INR_CEILING: f64 = 3.0;
pub const MIN_PLATELET_COUNT: i64 = 100_000;

/// Numeric bounds for a measured value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericBounds {
    /// Minimum value (inclusive)
    pub min: Option<f64>,
    /// Maximum value
    pub max: Option<f64>,
    /// Whether max is exclusive
    pub max_exclusive: bool,
}

impl NumericBounds {
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
            max_exclusive: false,
        }
    }

    /// Set minimum value (inclusive)
    pub const fn min(mut self, value: f64) -> Self {
        self.min = Some(value);
        self
    }

    /// Set maximum value (inclusive)
    pub const fn max(mut self, value: f64) -> Self {
        self.max = Some(value);
        self.max_exclusive = false;
        self
    }

    /// Set maximum value (exclusive)
    pub const fn max_exclusive(mut self, value: f64) -> Self {
        self.max = Some(value);
        self.max_exclusive = true;
        self
    }

    /// Check if a value is within bounds
    pub fn check(&self, value: f64) -> BoundsCheckResult {
        if let Some(min) = self.min {
            if value < min {
                return BoundsCheckResult::BelowMinimum { value, min };
            }
        }

        if let Some(max) = self.max {
            let too_high = if self.max_exclusive {
                value >= max
            } else {
                value > max
            };
            if too_high {
                return BoundsCheckResult::AboveMaximum { value, max };
            }
        }

        BoundsCheckResult::WithinBounds
    }

    pub fn contains(&self, value: f64) -> bool {
        matches!(self.check(value), BoundsCheckResult::WithinBounds)
    }

    /// Get a description of the bounds
    pub fn describe(&self) -> String {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => {
                let max_bracket = if self.max_exclusive { ")" } else { "]" };
                format!("[{}, {}{}", min, max, max_bracket)
            }
            (Some(min), None) => format!(">= {}", min),
            (None, Some(max)) => {
                if self.max_exclusive {
                    format!("< {}", max)
                } else {
                    format!("<= {}", max)
                }
            }
            (None, None) => "unbounded".to_string(),
        }
    }
}

/// Result of a bounds check
#[derive(Debug, Clone, PartialEq)]
pub enum BoundsCheckResult {
    WithinBounds,
    BelowMinimum { value: f64, min: f64 },
    AboveMaximum { value: f64, max: f64 },
}

pub const AGE_BOUNDS: NumericBounds = NumericBounds::unbounded().min(MIN_AGE_YEARS as f64);
pub const NIHSS_BOUNDS: NumericBounds = NumericBounds::unbounded().min(MIN_NIHSS_SCORE as f64);
pub const OXYGEN_BOUNDS: NumericBounds =
    NumericBounds::unbounded().min(MIN_OXYGEN_SATURATION as f64);
pub const SYSTOLIC_BOUNDS: NumericBounds =
    NumericBounds::unbounded().max(MAX_SYSTOLIC_MMHG as f64);
pub const DIASTOLIC_BOUNDS: NumericBounds =
    NumericBounds::unbounded().max(MAX_DIASTOLIC_MMHG as f64);
pub const GLUCOSE_BOUNDS: NumericBounds = NumericBounds::unbounded()
    .min(MIN_GLUCOSE_MG_DL)
    .max(MAX_GLUCOSE_MG_DL);
pub const INR_BOUNDS: NumericBounds = NumericBounds::unbounded().max_exclusive(INR_CEILING);
pub const PLATELET_BOUNDS: NumericBounds =
    NumericBounds::unbounded().min(MIN_PLATELET_COUNT as f64);

fn outcome(
    criterion: &dyn EligibilityCriterion,
    passed: bool,
    basis: OutcomeBasis,
    observed: Option<String>,
) -> CriterionOutcome {
    CriterionOutcome {
        order: 0,
        criterion_id: criterion.id().to_string(),
        name: criterion.name().to_string(),
        passed,
        basis,
        expected: criterion.expected(),
        observed,
    }
}

/// Single value that must be present and within bounds
fn required_value(
    criterion: &dyn EligibilityCriterion,
    label: &str,
    value: Option<f64>,
    bounds: &NumericBounds,
) -> CriterionOutcome {
    match value {
        Some(v) => outcome(
            criterion,
            bounds.contains(v),
            OutcomeBasis::Measured,
            Some(format!("{}={}", label, v)),
        ),
        None => outcome(criterion, false, OutcomeBasis::AbsentFailed, None),
    }
}

/// Values that only exclude when recorded and out of bounds
fn optional_values(
    criterion: &dyn EligibilityCriterion,
    values: &[(&str, Option<f64>, &NumericBounds)],
) -> CriterionOutcome {
    if values.iter().all(|(_, v, _)| v.is_none()) {
        return outcome(criterion, true, OutcomeBasis::AbsentPermitted, None);
    }

    let passed = values
        .iter()
        .all(|(_, v, bounds)| v.map_or(true, |v| bounds.contains(v)));
    let observed = values
        .iter()
        .map(|(label, v, _)| match v {
            Some(v) => format!("{}={}", label, v),
            None => format!("{}=absent", label),
        })
        .collect::<Vec<_>>()
        .join(", ");

    outcome(
        criterion,
        passed,
        recorded_basis(values.iter().all(|(_, v, _)| v.is_some())),
        Some(observed),
    )
}

fn recorded_basis(complete: bool) -> OutcomeBasis {
    if complete {
        OutcomeBasis::Measured
    } else {
        OutcomeBasis::PartiallyAbsent
    }
}

/// Patient must be an adult
pub struct AgeCriterion;

impl EligibilityCriterion for AgeCriterion {
    fn id(&self) -> &'static str {
        "age"
    }

    fn name(&self) -> &'static str {
        "Adult patient"
    }

    fn expected(&self) -> String {
        format!("age {}", AGE_BOUNDS.describe())
    }

    fn absence_policy(&self) -> AbsencePolicy {
        AbsencePolicy::Fails
    }

    fn evaluate(&self, snapshot: &ClinicalSnapshot<'_>) -> CriterionOutcome {
        required_value(self, "age", snapshot.subject.age.map(f64::from), &AGE_BOUNDS)
    }
}

/// Deficit must be severe enough to justify thrombolysis
pub struct StrokeSeverityCriterion;

impl EligibilityCriterion for StrokeSeverityCriterion {
    fn id(&self) -> &'static str {
        "stroke_severity"
    }

    fn name(&self) -> &'static str {
        "Stroke severity (NIHSS)"
    }

    fn expected(&self) -> String {
        format!("nihss {}", NIHSS_BOUNDS.describe())
    }

    fn absence_policy(&self) -> AbsencePolicy {
        AbsencePolicy::Fails
    }

    fn evaluate(&self, snapshot: &ClinicalSnapshot<'_>) -> CriterionOutcome {
        required_value(
            self,
            "nihss",
            snapshot.vitals.nihss_score.map(f64::from),
            &NIHSS_BOUNDS,
        )
    }
}

pub struct OxygenationCriterion;

impl EligibilityCriterion for OxygenationCriterion {
    fn id(&self) -> &'static str {
        "oxygenation"
    }

    fn name(&self) -> &'static str {
        "Oxygen saturation"
    }

    fn expected(&self) -> String {
        format!("spo2 {}", OXYGEN_BOUNDS.describe())
    }

    fn absence_policy(&self) -> AbsencePolicy {
        AbsencePolicy::Fails
    }

    fn evaluate(&self, snapshot: &ClinicalSnapshot<'_>) -> CriterionOutcome {
        required_value(
            self,
            "spo2",
            snapshot.vitals.oxygen_saturation.map(f64::from),
            &OXYGEN_BOUNDS,
        )
    }
}

/// Head trauma, recent surgery, recent MI or recent hemorrhage
pub struct ExclusionHistoryCriterion;

impl EligibilityCriterion for ExclusionHistoryCriterion {
    fn id(&self) -> &'static str {
        "exclusion_history"
    }

    fn name(&self) -> &'static str {
        "Trauma, surgery, MI and hemorrhage history"
    }

    fn expected(&self) -> String {
        "no exclusion flag set".to_string()
    }

    fn absence_policy(&self) -> AbsencePolicy {
        AbsencePolicy::Permitted
    }

    fn evaluate(&self, snapshot: &ClinicalSnapshot<'_>) -> CriterionOutcome {
        let vitals = snapshot.vitals;
        if vitals.exclusions_unrecorded() {
            return outcome(self, true, OutcomeBasis::AbsentPermitted, None);
        }

        let active = vitals.active_exclusions();
        let unrecorded = vitals.unrecorded_exclusions();
        let mut observed = if active.is_empty() {
            "none".to_string()
        } else {
            active.join(", ")
        };
        if !unrecorded.is_empty() {
            observed.push_str(&format!("; unrecorded: {}", unrecorded.join(", ")));
        }
        outcome(
            self,
            active.is_empty(),
            recorded_basis(unrecorded.is_empty()),
            Some(observed),
        )
    }
}

pub struct BloodPressureCriterion;

impl EligibilityCriterion for BloodPressureCriterion {
    fn id(&self) -> &'static str {
        "blood_pressure"
    }

    fn name(&self) -> &'static str {
        "Blood pressure"
    }

    fn expected(&self) -> String {
        format!(
            "systolic {} and diastolic {}",
            SYSTOLIC_BOUNDS.describe(),
            DIASTOLIC_BOUNDS.describe()
        )
    }

    fn absence_policy(&self) -> AbsencePolicy {
        AbsencePolicy::Permitted
    }

    fn evaluate(&self, snapshot: &ClinicalSnapshot<'_>) -> CriterionOutcome {
        let vitals = snapshot.vitals;
        optional_values(
            self,
            &[
                (
                    "systolic",
                    vitals.blood_pressure_systolic.map(f64::from),
                    &SYSTOLIC_BOUNDS,
                ),
                (
                    "diastolic",
                    vitals.blood_pressure_diastolic.map(f64::from),
                    &DIASTOLIC_BOUNDS,
                ),
            ],
        )
    }
}

pub struct GlucoseCriterion;

impl EligibilityCriterion for GlucoseCriterion {
    fn id(&self) -> &'static str {
        "glucose"
    }

    fn name(&self) -> &'static str {
        "Blood glucose"
    }

    fn expected(&self) -> String {
        format!("glucose mg/dL in {}", GLUCOSE_BOUNDS.describe())
    }

    fn absence_policy(&self) -> AbsencePolicy {
        AbsencePolicy::Permitted
    }

    fn evaluate(&self, snapshot: &ClinicalSnapshot<'_>) -> CriterionOutcome {
        optional_values(
            self,
            &[("glucose", snapshot.lab.bmp_glucose, &GLUCOSE_BOUNDS)],
        )
    }
}

/// Coagulation panel and INR
pub struct CoagulationCriterion;

impl EligibilityCriterion for CoagulationCriterion {
    fn id(&self) -> &'static str {
        "coagulation"
    }

    fn name(&self) -> &'static str {
        "Coagulation status"
    }

    fn expected(&self) -> String {
        format!("coagulation not abnormal and inr {}", INR_BOUNDS.describe())
    }

    fn absence_policy(&self) -> AbsencePolicy {
        AbsencePolicy::Permitted
    }

    fn evaluate(&self, snapshot: &ClinicalSnapshot<'_>) -> CriterionOutcome {
        let coagulation = snapshot.lab.coagulation.as_deref();
        let inr = snapshot.vitals.inr_score;

        if coagulation.is_none() && inr.is_none() {
            return outcome(self, true, OutcomeBasis::AbsentPermitted, None);
        }

        let passed = !snapshot.lab.coagulation_abnormal()
            && inr.map_or(true, |v| INR_BOUNDS.contains(v));
        let observed = format!(
            "coagulation={}, inr={}",
            coagulation.unwrap_or("absent"),
            inr.map(|v| v.to_string()).unwrap_or_else(|| "absent".to_string()),
        );

        outcome(
            self,
            passed,
            recorded_basis(coagulation.is_some() && inr.is_some()),
            Some(observed),
        )
    }
}

pub struct PlateletCriterion;

impl EligibilityCriterion for PlateletCriterion {
    fn id(&self) -> &'static str {
        "platelets"
    }

    fn name(&self) -> &'static str {
        "Platelet count"
    }

    fn expected(&self) -> String {
        format!("platelets/uL {}", PLATELET_BOUNDS.describe())
    }

    fn absence_policy(&self) -> AbsencePolicy {
        AbsencePolicy::Permitted
    }

    fn evaluate(&self, snapshot: &ClinicalSnapshot<'_>) -> CriterionOutcome {
        optional_values(
            self,
            &[(
                "platelets",
                snapshot.vitals.platelet_count.map(|v| v as f64),
                &PLATELET_BOUNDS,
            )],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(
        criterion: &dyn EligibilityCriterion,
        subject: &Subject,
        vitals: &VitalsSnapshot,
        lab: &LabSnapshot,
    ) -> CriterionOutcome {
        criterion.evaluate(&ClinicalSnapshot {
            subject,
            vitals,
            lab,
        })
    }

    fn vitals_check(criterion: &dyn EligibilityCriterion, vitals: VitalsSnapshot) -> CriterionOutcome {
        check(criterion, &Subject::default(), &vitals, &LabSnapshot::default())
    }

    fn lab_check(criterion: &dyn EligibilityCriterion, lab: LabSnapshot) -> CriterionOutcome {
        check(criterion, &Subject::default(), &VitalsSnapshot::default(), &lab)
    }

    #[test]
    fn test_bounds_inclusive_and_exclusive() {
        assert!(GLUCOSE_BOUNDS.contains(50.0));
        assert!(GLUCOSE_BOUNDS.contains(400.0));
        assert!(matches!(
            GLUCOSE_BOUNDS.check(49.0),
            BoundsCheckResult::BelowMinimum { .. }
        ));
        assert!(matches!(
            GLUCOSE_BOUNDS.check(401.0),
            BoundsCheckResult::AboveMaximum { .. }
        ));
        assert!(INR_BOUNDS.contains(2.999));
        assert!(!INR_BOUNDS.contains(3.0));
    }

    #[test]
    fn test_bounds_describe() {
        assert_eq!(AGE_BOUNDS.describe(), ">= 18");
        assert_eq!(SYSTOLIC_BOUNDS.describe(), "<= 185");
        assert_eq!(GLUCOSE_BOUNDS.describe(), "[50, 400]");
        assert_eq!(INR_BOUNDS.describe(), "< 3");
    }

    #[test]
    fn test_age_boundary() {
        let pass = check(
            &AgeCriterion,
            &Subject::new("s").with_age(18),
            &VitalsSnapshot::default(),
            &LabSnapshot::default(),
        );
        assert!(pass.passed);
        assert_eq!(pass.observed.as_deref(), Some("age=18"));

        let fail = check(
            &AgeCriterion,
            &Subject::new("s").with_age(17),
            &VitalsSnapshot::default(),
            &LabSnapshot::default(),
        );
        assert!(!fail.passed);
        assert_eq!(fail.basis, OutcomeBasis::Measured);
    }

    #[test]
    fn test_negative_age_is_compared_as_given() {
        let outcome = check(
            &AgeCriterion,
            &Subject::new("s").with_age(-3),
            &VitalsSnapshot::default(),
            &LabSnapshot::default(),
        );
        assert!(!outcome.passed);
    }

    #[test]
    fn test_required_criteria_fail_when_absent() {
        let subject = Subject::default();
        let vitals = VitalsSnapshot::default();
        let lab = LabSnapshot::default();
        for criterion in [
            &AgeCriterion as &dyn EligibilityCriterion,
            &StrokeSeverityCriterion,
            &OxygenationCriterion,
        ] {
            let outcome = check(criterion, &subject, &vitals, &lab);
            assert!(!outcome.passed, "{}", criterion.id());
            assert_eq!(outcome.basis, OutcomeBasis::AbsentFailed);
            assert_eq!(criterion.absence_policy(), AbsencePolicy::Fails);
        }
    }

    #[test]
    fn test_permissive_criteria_pass_when_absent() {
        let subject = Subject::default();
        let vitals = VitalsSnapshot::default();
        let lab = LabSnapshot::default();
        for criterion in [
            &ExclusionHistoryCriterion as &dyn EligibilityCriterion,
            &BloodPressureCriterion,
            &GlucoseCriterion,
            &CoagulationCriterion,
            &PlateletCriterion,
        ] {
            let outcome = check(criterion, &subject, &vitals, &lab);
            assert!(outcome.passed, "{}", criterion.id());
            assert_eq!(outcome.basis, OutcomeBasis::AbsentPermitted);
            assert_eq!(criterion.absence_policy(), AbsencePolicy::Permitted);
        }
    }

    #[test]
    fn test_nihss_and_spo2_boundaries() {
        let at = |nihss, spo2| VitalsSnapshot {
            nihss_score: Some(nihss),
            oxygen_saturation: Some(spo2),
            ..Default::default()
        };
        assert!(vitals_check(&StrokeSeverityCriterion, at(4, 95)).passed);
        assert!(!vitals_check(&StrokeSeverityCriterion, at(3, 95)).passed);
        assert!(vitals_check(&OxygenationCriterion, at(4, 95)).passed);
        assert!(!vitals_check(&OxygenationCriterion, at(4, 94)).passed);
    }

    #[test]
    fn test_blood_pressure_boundaries() {
        let bp = |systolic, diastolic| VitalsSnapshot {
            blood_pressure_systolic: systolic,
            blood_pressure_diastolic: diastolic,
            ..Default::default()
        };
        assert!(vitals_check(&BloodPressureCriterion, bp(Some(185), Some(110))).passed);
        assert!(!vitals_check(&BloodPressureCriterion, bp(Some(186), Some(110))).passed);
        assert!(!vitals_check(&BloodPressureCriterion, bp(Some(185), Some(111))).passed);
        assert_eq!(
            vitals_check(&BloodPressureCriterion, bp(Some(150), Some(90))).basis,
            OutcomeBasis::Measured
        );
        // one side recorded, the other not: only the recorded side counts
        let partial = vitals_check(&BloodPressureCriterion, bp(Some(150), None));
        assert!(partial.passed);
        assert_eq!(partial.basis, OutcomeBasis::PartiallyAbsent);
        assert_eq!(
            partial.observed.as_deref(),
            Some("systolic=150, diastolic=absent")
        );
        assert!(!vitals_check(&BloodPressureCriterion, bp(None, Some(111))).passed);
    }

    #[test]
    fn test_glucose_boundaries() {
        let glucose = |v: f64| LabSnapshot {
            bmp_glucose: Some(v),
            ..Default::default()
        };
        assert!(lab_check(&GlucoseCriterion, glucose(50.0)).passed);
        assert!(lab_check(&GlucoseCriterion, glucose(400.0)).passed);
        assert!(!lab_check(&GlucoseCriterion, glucose(49.0)).passed);
        assert!(!lab_check(&GlucoseCriterion, glucose(401.0)).passed);
    }

    #[test]
    fn test_coagulation_and_inr() {
        let inr = |v: f64| VitalsSnapshot {
            inr_score: Some(v),
            ..Default::default()
        };
        let inr_only = vitals_check(&CoagulationCriterion, inr(2.999));
        assert!(inr_only.passed);
        assert_eq!(inr_only.basis, OutcomeBasis::PartiallyAbsent);
        assert_eq!(
            inr_only.observed.as_deref(),
            Some("coagulation=absent, inr=2.999")
        );
        assert!(!vitals_check(&CoagulationCriterion, inr(3.0)).passed);

        let both = check(
            &CoagulationCriterion,
            &Subject::default(),
            &inr(1.1),
            &LabSnapshot {
                coagulation: Some("normal".to_string()),
                ..Default::default()
            },
        );
        assert!(both.passed);
        assert_eq!(both.basis, OutcomeBasis::Measured);

        let coag = |s: &str| LabSnapshot {
            coagulation: Some(s.to_string()),
            ..Default::default()
        };
        assert!(!lab_check(&CoagulationCriterion, coag("Abnormal")).passed);
        assert!(lab_check(&CoagulationCriterion, coag("normal")).passed);
        assert!(lab_check(&CoagulationCriterion, coag("pending")).passed);
    }

    #[test]
    fn test_platelet_boundary() {
        let platelets = |v: i64| VitalsSnapshot {
            platelet_count: Some(v),
            ..Default::default()
        };
        assert!(vitals_check(&PlateletCriterion, platelets(100_000)).passed);
        assert!(!vitals_check(&PlateletCriterion, platelets(99_999)).passed);
    }

    #[test]
    fn test_each_exclusion_flag_fails() {
        let flags: [fn(&mut VitalsSnapshot); 4] = [
            |v| v.significant_head_trauma = Some(true),
            |v| v.recent_surgery = Some(true),
            |v| v.recent_myocardial_infarction = Some(true),
            |v| v.recent_hemorrhage = Some(true),
        ];
        for set in flags {
            let mut vitals = VitalsSnapshot::default();
            set(&mut vitals);
            assert!(!vitals_check(&ExclusionHistoryCriterion, vitals).passed);
        }

        let partly_clear = VitalsSnapshot {
            significant_head_trauma: Some(false),
            recent_surgery: Some(false),
            ..Default::default()
        };
        let outcome = vitals_check(&ExclusionHistoryCriterion, partly_clear);
        assert!(outcome.passed);
        assert_eq!(outcome.basis, OutcomeBasis::PartiallyAbsent);
        assert_eq!(
            outcome.observed.as_deref(),
            Some("none; unrecorded: recent_myocardial_infarction, recent_hemorrhage")
        );

        let clear = VitalsSnapshot {
            significant_head_trauma: Some(false),
            recent_surgery: Some(false),
            recent_myocardial_infarction: Some(false),
            recent_hemorrhage: Some(false),
            ..Default::default()
        };
        let outcome = vitals_check(&ExclusionHistoryCriterion, clear);
        assert_eq!(outcome.basis, OutcomeBasis::Measured);
        assert_eq!(outcome.observed.as_deref(), Some("none"));
    }
}
