//! Stroke Triage
//!
//! Deterministic tPA eligibility evaluation for acute stroke patients.
//!
//! ## Architecture
//!
//! 1. **Contracts** (`contracts/`): subject, vitals and lab records, the
//!    verdict, per-criterion outcomes and the decision event.
//!
//! 2. **Engine** (`engine/`): the eight ordered criteria. Pure; a verdict
//!    depends only on the three records passed in.
//!
//! 3. **Records** (`records/`): lookups for the subject, current vitals and
//!    current lab panel, with a file-loaded in-memory store.
//!
//! 4. **Service** (`service`): role gate, lookups, engine and audit in one
//!    call.
//!
//! 5. **Telemetry** (`telemetry/`): decision event sinks.
//!
//! 6. **CLI** (`cli/`): `evaluate`, `assess` and `criteria` commands.
//!
//! ## Example
//!
//! ```rust
//! use stroke_triage::{evaluate, LabSnapshot, Subject, VitalsSnapshot};
//!
//! let subject = Subject::new("p-1").with_age(64);
//! let vitals = VitalsSnapshot {
//!     nihss_score: Some(9),
//!     oxygen_saturation: Some(97),
//!     ..Default::default()
//! };
//! let verdict = evaluate(&subject, &vitals, &LabSnapshot::default());
//! assert!(verdict.eligible);
//! assert_eq!(verdict.message, "administer tPA and admit to ICU");
//! ```

pub mod access;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod records;
pub mod service;
pub mod telemetry;

// Contracts module - located at ../contracts relative to src/
#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use access::{AccessPolicy, ClinicalRole};
pub use cli::{ExitCode, OutputFormat, TriageCli, TriageCommands};
pub use config::{AuditConfig, LogFormat, LoggingConfig, TriageConfig};
pub use contracts::{
    AbsencePolicy, CriterionDescriptor, CriterionOutcome, EligibilityAssessment,
    EligibilityCase, EligibilityDecisionEvent, EligibilityInput, EligibilityVerdict, Gender,
    LabSnapshot, NeurologistConsultation, OutcomeBasis, Subject, VitalsSnapshot,
    ELIGIBLE_MESSAGE, INELIGIBLE_MESSAGE,
};
pub use engine::{evaluate, EligibilityCriterion, EligibilityEngine};
pub use error::{Result, TriageError};
pub use records::{ClinicalRecords, InMemoryRecords, RecordBundle, RecordsError};
pub use service::TriageService;
pub use telemetry::{DecisionEventEmitter, DecisionSink, MemorySink, TelemetryError};

/// Crate version (from Cargo.toml)
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Identifier stamped on decision events
pub const AGENT_ID: &str = EligibilityDecisionEvent::AGENT_ID;

/// Run the CLI application and map the outcome to an exit code
pub fn run_cli(cli: TriageCli, config: &TriageConfig) -> ExitCode {
    match cli::run(cli, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from_error(&e)
        }
    }
}
