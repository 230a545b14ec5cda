//! Output formatting for the stroke triage CLI
//!
//! JSON and YAML for machines, a colored table for people at the bedside.

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::io::{self, Write as _};

use crate::contracts::{CriterionDescriptor, EligibilityAssessment, OutcomeBasis};
use crate::error::{Result, TriageError};

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

/// Destination for rendered output; prints nothing when quiet
pub struct Printer<W> {
    out: W,
    quiet: bool,
}

impl Printer<io::Stdout> {
    pub fn stdout(quiet: bool) -> Self {
        Self::new(io::stdout(), quiet)
    }
}

impl<W: io::Write> Printer<W> {
    pub fn new(out: W, quiet: bool) -> Self {
        Self { out, quiet }
    }

    pub fn print(&mut self, text: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn to_string_in<T: Serialize>(value: &T, format: OutputFormat) -> Result<Option<String>> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(Some)
            .map_err(|e| TriageError::SerializationError(e.to_string())),
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map(Some)
            .map_err(|e| TriageError::SerializationError(e.to_string())),
        OutputFormat::Table => Ok(None),
    }
}

/// Verdict as printed by `evaluate` and `assess`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictOutput {
    pub eligible: bool,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_failed: Option<String>,

    /// Criteria that passed with some or all of their values unrecorded
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub passed_on_absence: Vec<String>,

    /// Per-criterion rows, present when explaining
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<CriterionRow>,

    pub request_id: String,
    pub duration_us: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionRow {
    pub order: u8,
    pub criterion_id: String,
    pub passed: bool,
    pub expected: String,
    pub observed: String,
}

impl VerdictOutput {
    pub fn from_assessment(assessment: &EligibilityAssessment, explain: bool) -> Self {
        let criteria = if explain {
            assessment
                .outcomes
                .iter()
                .map(|o| CriterionRow {
                    order: o.order,
                    criterion_id: o.criterion_id.clone(),
                    passed: o.passed,
                    expected: o.expected.clone(),
                    observed: match o.basis {
                        OutcomeBasis::Measured | OutcomeBasis::PartiallyAbsent => {
                            o.observed.clone().unwrap_or_default()
                        }
                        OutcomeBasis::AbsentFailed | OutcomeBasis::AbsentPermitted => {
                            "not recorded".to_string()
                        }
                    },
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            eligible: assessment.verdict.eligible,
            message: assessment.verdict.message.clone(),
            subject_id: assessment.subject_id.clone(),
            first_failed: assessment.first_failed.clone(),
            passed_on_absence: assessment
                .passed_on_absence()
                .map(|o| o.criterion_id.clone())
                .collect(),
            criteria,
            request_id: assessment.request_id.to_string(),
            duration_us: assessment.duration_us,
        }
    }

    pub fn render<W: io::Write>(
        &self,
        format: OutputFormat,
        printer: &mut Printer<W>,
    ) -> Result<()> {
        printer.print(&self.to_string_in(format)?)
    }

    pub fn to_string_in(&self, format: OutputFormat) -> Result<String> {
        match to_string_in(self, format)? {
            Some(s) => Ok(s),
            None => Ok(self.table()),
        }
    }

    fn table(&self) -> String {
        let mut out = String::new();
        writeln!(out, "{}", "tPA Eligibility".cyan().bold()).ok();
        writeln!(out, "{}", "=".repeat(60)).ok();
        if let Some(subject) = &self.subject_id {
            writeln!(out, "Subject: {}", subject).ok();
        }

        let verdict = if self.eligible {
            format!("+ ELIGIBLE: {}", self.message).green().bold()
        } else {
            format!("x INELIGIBLE: {}", self.message).red().bold()
        };
        writeln!(out, "{}", verdict).ok();

        if let Some(failed) = &self.first_failed {
            writeln!(out, "First failed criterion: {}", failed.yellow()).ok();
        }

        if !self.criteria.is_empty() {
            writeln!(out).ok();
            writeln!(out, "{}", "Criteria:".cyan().bold()).ok();
            writeln!(out, "{}", "-".repeat(60)).ok();
            for row in &self.criteria {
                let mark = if row.passed { "+".green() } else { "x".red() };
                writeln!(
                    out,
                    "  {} {}. {:<18} expected {:<22} observed {}",
                    mark, row.order, row.criterion_id, row.expected, row.observed
                )
                .ok();
            }
        }

        if !self.passed_on_absence.is_empty() {
            writeln!(out).ok();
            writeln!(
                out,
                "{} passed with unrecorded values: {}",
                "!".yellow(),
                self.passed_on_absence.join(", ")
            )
            .ok();
        }
        out
    }
}

/// Criteria catalog as printed by `criteria`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriteriaOutput {
    pub criteria: Vec<CriterionDescriptor>,
}

impl CriteriaOutput {
    pub fn new(criteria: Vec<CriterionDescriptor>) -> Self {
        Self { criteria }
    }

    pub fn render<W: io::Write>(
        &self,
        format: OutputFormat,
        printer: &mut Printer<W>,
    ) -> Result<()> {
        printer.print(&self.to_string_in(format)?)
    }

    pub fn to_string_in(&self, format: OutputFormat) -> Result<String> {
        if let Some(s) = to_string_in(self, format)? {
            return Ok(s);
        }

        let mut out = String::new();
        writeln!(out, "{}", "tPA Eligibility Criteria".cyan().bold()).ok();
        writeln!(out, "{}", "=".repeat(60)).ok();
        for c in &self.criteria {
            writeln!(
                out,
                "  {}. {:<18} {:<22} {}",
                c.order,
                c.criterion_id.bold(),
                c.expected,
                c.absence_policy.to_string().dimmed()
            )
            .ok();
            writeln!(out, "     {}", c.name).ok();
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{EligibilityCase, EligibilityInput, Subject};
    use crate::engine::EligibilityEngine;

    fn assessment(age: i32) -> EligibilityAssessment {
        let case = EligibilityCase {
            subject: Subject::new("p-1").with_age(age),
            ..Default::default()
        };
        EligibilityEngine::new().assess(&EligibilityInput::new(case, "test"))
    }

    #[test]
    fn test_json_output_without_explain_omits_rows() {
        let output = VerdictOutput::from_assessment(&assessment(17), false);
        let json: serde_json::Value =
            serde_json::from_str(&output.to_string_in(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["eligible"], false);
        assert_eq!(json["first_failed"], "age");
        assert!(json.get("criteria").is_none());
    }

    #[test]
    fn test_explain_marks_unrecorded_values() {
        let output = VerdictOutput::from_assessment(&assessment(50), true);
        assert_eq!(output.criteria.len(), 8);
        assert_eq!(output.criteria[1].criterion_id, "stroke_severity");
        assert_eq!(output.criteria[1].observed, "not recorded");
        assert!(output.passed_on_absence.contains(&"platelets".to_string()));
    }

    #[test]
    fn test_table_mentions_verdict() {
        colored::control::set_override(false);
        let table = VerdictOutput::from_assessment(&assessment(17), true)
            .to_string_in(OutputFormat::Table)
            .unwrap();
        assert!(table.contains("INELIGIBLE: do not administer tPA"));
        assert!(table.contains("First failed criterion: age"));
    }

    #[test]
    fn test_explain_shows_half_recorded_values() {
        let case = EligibilityCase {
            subject: Subject::new("p-1").with_age(50),
            vitals: crate::contracts::VitalsSnapshot {
                blood_pressure_systolic: Some(150),
                ..Default::default()
            },
            ..Default::default()
        };
        let assessment = EligibilityEngine::new().assess(&EligibilityInput::new(case, "test"));
        let output = VerdictOutput::from_assessment(&assessment, true);
        assert_eq!(output.criteria[4].criterion_id, "blood_pressure");
        assert_eq!(output.criteria[4].observed, "systolic=150, diastolic=absent");
        assert!(output.passed_on_absence.contains(&"blood_pressure".to_string()));
    }

    #[test]
    fn test_quiet_printer_writes_nothing() {
        let output = VerdictOutput::from_assessment(&assessment(17), false);

        let mut quiet = Printer::new(Vec::new(), true);
        output.render(OutputFormat::Json, &mut quiet).unwrap();
        assert!(quiet.into_inner().is_empty());

        let mut loud = Printer::new(Vec::new(), false);
        output.render(OutputFormat::Json, &mut loud).unwrap();
        let written = String::from_utf8(loud.into_inner()).unwrap();
        assert!(written.contains("\"first_failed\": \"age\""));
    }

    #[test]
    fn test_criteria_yaml_lists_all() {
        let output = CriteriaOutput::new(EligibilityEngine::new().criteria());
        let yaml = output.to_string_in(OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("criterion_id: platelets"));
        assert!(yaml.contains("absence_policy: permitted"));
    }
}
