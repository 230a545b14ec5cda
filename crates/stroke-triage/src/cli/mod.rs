//! CLI module for stroke triage
//!
//! Evaluate a single case file, assess a subject out of a record bundle
//! through the full service path, or list the criteria.

pub mod commands;
pub mod output;

pub use commands::{TriageCli, TriageCommands};
pub use output::{CriteriaOutput, OutputFormat, Printer, VerdictOutput};

use crate::config::TriageConfig;
use crate::error::{Result, TriageError};

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Eligible, or a listing succeeded
    Success = 0,
    /// Evaluated and not eligible
    Ineligible = 1,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// A subject, vitals or lab record is missing
    MissingDependency = 5,
    /// Caller role may not request an evaluation
    Unauthorized = 6,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    pub fn from_verdict(eligible: bool) -> Self {
        if eligible {
            ExitCode::Success
        } else {
            ExitCode::Ineligible
        }
    }

    pub fn from_error(err: &TriageError) -> Self {
        match err {
            TriageError::FileError(_) => ExitCode::FileError,
            TriageError::MissingDependency(_) => ExitCode::MissingDependency,
            TriageError::Unauthorized { .. } => ExitCode::Unauthorized,
            e if e.is_user_error() => ExitCode::InvalidInput,
            _ => ExitCode::InternalError,
        }
    }

    /// Exit code for an error that reached the binary's top level
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        err.downcast_ref::<TriageError>()
            .map_or(ExitCode::InternalError, ExitCode::from_error)
    }
}

/// Run the CLI with a loaded configuration and return the exit code
pub fn run(cli: TriageCli, config: &TriageConfig) -> Result<ExitCode> {
    let quiet = cli.quiet;
    match cli.command {
        TriageCommands::Evaluate {
            case,
            format,
            explain,
        } => commands::execute_evaluate(case, format, explain, quiet),
        TriageCommands::Assess {
            records,
            subject,
            role,
            requested_by,
            format,
        } => commands::execute_assess(
            records,
            subject,
            role,
            requested_by,
            format,
            config,
            quiet,
        ),
        TriageCommands::Criteria { format } => commands::execute_criteria(format, quiet),
    }
}
