//! CLI command definitions for stroke triage

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::output::{CriteriaOutput, OutputFormat, Printer, VerdictOutput};
use super::ExitCode;
use crate::access::ClinicalRole;
use crate::config::TriageConfig;
use crate::contracts::{EligibilityCase, EligibilityInput};
use crate::engine::EligibilityEngine;
use crate::error::{Result, TriageError};
use crate::records::InMemoryRecords;
use crate::service::TriageService;

/// Stroke triage CLI
///
/// Decide whether a stroke patient may receive tPA.
#[derive(Parser, Debug)]
#[command(name = "stroke-triage")]
#[command(about = "Stroke triage - tPA eligibility evaluation", long_about = None)]
#[command(version)]
pub struct TriageCli {
    /// Configuration file (TOML or YAML)
    #[arg(long, global = true, env = "STROKE_TRIAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print nothing but errors; the exit code still carries the verdict
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: TriageCommands,
}

#[derive(Subcommand, Debug)]
pub enum TriageCommands {
    /// Evaluate a case file
    ///
    /// The file holds `subject`, `vitals` and `lab` objects (JSON or YAML).
    Evaluate {
        /// Path to the case file
        #[arg(short, long)]
        case: PathBuf,

        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,

        /// Show the outcome of every criterion
        #[arg(long)]
        explain: bool,
    },

    /// Assess a subject from a record bundle
    ///
    /// Runs the role check, resolves the current vitals and lab panel,
    /// evaluates and records a decision event.
    Assess {
        /// Path to the record bundle (JSON or YAML)
        #[arg(short, long)]
        records: PathBuf,

        /// Subject identifier
        #[arg(short, long)]
        subject: String,

        /// Role of the caller (patient, doctor, neurologist)
        #[arg(long)]
        role: ClinicalRole,

        /// Caller identity recorded on the decision event
        #[arg(long, default_value = "cli")]
        requested_by: String,

        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },

    /// List the eligibility criteria in evaluation order
    Criteria {
        #[arg(long, value_enum, default_value = "table")]
        format: Option<OutputFormat>,
    },
}

/// Execute the evaluate command
pub fn execute_evaluate(
    case: PathBuf,
    format: Option<OutputFormat>,
    explain: bool,
    quiet: bool,
) -> Result<ExitCode> {
    let case = load_case(&case)?;

    let engine = EligibilityEngine::new();
    let assessment = engine.assess(&EligibilityInput::new(case, "cli"));

    VerdictOutput::from_assessment(&assessment, explain)
        .render(format.unwrap_or_default(), &mut Printer::stdout(quiet))?;

    Ok(ExitCode::from_verdict(assessment.is_eligible()))
}

/// Execute the assess command
pub fn execute_assess(
    records: PathBuf,
    subject: String,
    role: ClinicalRole,
    requested_by: String,
    format: Option<OutputFormat>,
    config: &TriageConfig,
    quiet: bool,
) -> Result<ExitCode> {
    let records = InMemoryRecords::load(&records)?;
    let service = TriageService::from_config(Arc::new(records), config)?;

    let assessment = service.assess_subject(role, &subject, &requested_by)?;

    VerdictOutput::from_assessment(&assessment, true)
        .render(format.unwrap_or_default(), &mut Printer::stdout(quiet))?;

    Ok(ExitCode::from_verdict(assessment.is_eligible()))
}

/// Execute the criteria command
pub fn execute_criteria(format: Option<OutputFormat>, quiet: bool) -> Result<ExitCode> {
    let output = CriteriaOutput::new(EligibilityEngine::new().criteria());
    output.render(format.unwrap_or_default(), &mut Printer::stdout(quiet))?;
    Ok(ExitCode::Success)
}

/// Parse a case file based on its extension
pub fn load_case(path: &Path) -> Result<EligibilityCase> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TriageError::file_error(format!(
            "Failed to read case file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "json" => serde_json::from_str(&content)
            .map_err(|e| TriageError::parse_error(format!("Invalid case JSON: {}", e))),
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .map_err(|e| TriageError::parse_error(format!("Invalid case YAML: {}", e))),
        _ => Err(TriageError::invalid_input(format!(
            "Unsupported file format: {}. Supported formats: json, yaml, yml",
            extension
        ))),
    }
}
