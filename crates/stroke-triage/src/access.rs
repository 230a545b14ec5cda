//! Clinical role gate
//!
//! Only clinicians may ask for a tPA recommendation. The check runs before
//! any record is resolved or any criterion is evaluated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TriageError};

/// Role held by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClinicalRole {
    #[serde(alias = "patient")]
    Patient,
    #[serde(alias = "doctor")]
    Doctor,
    #[serde(alias = "neurologist")]
    Neurologist,
}

impl ClinicalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClinicalRole::Patient => "Patient",
            ClinicalRole::Doctor => "Doctor",
            ClinicalRole::Neurologist => "Neurologist",
        }
    }
}

impl fmt::Display for ClinicalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClinicalRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "patient" => Ok(ClinicalRole::Patient),
            "doctor" => Ok(ClinicalRole::Doctor),
            "neurologist" => Ok(ClinicalRole::Neurologist),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Roles allowed to request an eligibility evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed: Vec<ClinicalRole>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            allowed: vec![ClinicalRole::Doctor, ClinicalRole::Neurologist],
        }
    }
}

impl AccessPolicy {
    pub fn new(allowed: impl IntoIterator<Item = ClinicalRole>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn allowed(&self) -> &[ClinicalRole] {
        &self.allowed
    }

    pub fn permits(&self, role: ClinicalRole) -> bool {
        self.allowed.contains(&role)
    }

    pub fn authorize(&self, role: ClinicalRole) -> Result<()> {
        if self.permits(role) {
            Ok(())
        } else {
            tracing::warn!(role = %role, "tPA eligibility request denied");
            Err(TriageError::Unauthorized { role })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_ignores_case() {
        assert_eq!("Doctor".parse::<ClinicalRole>(), Ok(ClinicalRole::Doctor));
        assert_eq!("NEUROLOGIST".parse::<ClinicalRole>(), Ok(ClinicalRole::Neurologist));
        assert!("nurse".parse::<ClinicalRole>().is_err());
    }

    #[test]
    fn test_default_policy_allows_clinicians_only() {
        let policy = AccessPolicy::default();
        assert!(policy.authorize(ClinicalRole::Doctor).is_ok());
        assert!(policy.authorize(ClinicalRole::Neurologist).is_ok());
        assert!(matches!(
            policy.authorize(ClinicalRole::Patient),
            Err(TriageError::Unauthorized {
                role: ClinicalRole::Patient
            })
        ));
    }

    #[test]
    fn test_custom_policy() {
        let policy = AccessPolicy::new([ClinicalRole::Neurologist]);
        assert!(!policy.permits(ClinicalRole::Doctor));
        assert_eq!(policy.allowed(), &[ClinicalRole::Neurologist]);
    }
}
