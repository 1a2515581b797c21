//! Analysis types, options and exit status

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PileError;

/// Stepping scheme for the static analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisType {
    /// Increment applied forces; converge on the unbalanced force
    LoadControl,
    /// Increment imposed displacements; converge on the displacement increment
    DisplacementControl,
}

impl Default for AnalysisType {
    fn default() -> Self {
        Self::LoadControl
    }
}

impl FromStr for AnalysisType {
    type Err = PileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "load-control" | "loadcontrol" | "load" | "static" => Ok(Self::LoadControl),
            "displacement-control" | "displacementcontrol" | "displacement"
            | "static-displacement" => Ok(Self::DisplacementControl),
            other => Err(PileError::InvalidInput(format!(
                "unknown analysis type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadControl => write!(f, "load-control"),
            Self::DisplacementControl => write!(f, "displacement-control"),
        }
    }
}

/// Options forwarded to the static solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Stepping scheme
    pub analysis_type: AnalysisType,
    /// Number of load/displacement increments
    pub num_increments: usize,
    /// Convergence tolerance (relative)
    pub tolerance: f64,
    /// Maximum Newton iterations per increment
    pub max_iterations: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            analysis_type: AnalysisType::LoadControl,
            num_increments: 10,
            tolerance: 1e-8,
            max_iterations: 50,
        }
    }
}

impl AnalysisOptions {
    /// Options for load-controlled stepping
    pub fn load_control() -> Self {
        Self::default()
    }

    /// Options for displacement-controlled stepping
    pub fn displacement_control() -> Self {
        Self {
            analysis_type: AnalysisType::DisplacementControl,
            ..Self::default()
        }
    }

    /// Set number of increments
    pub fn with_increments(mut self, n: usize) -> Self {
        self.num_increments = n;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Reject options the solver cannot run with
    pub fn validate(&self) -> Result<(), PileError> {
        if self.num_increments == 0 {
            return Err(PileError::InvalidInput(
                "number of increments must be at least 1".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(PileError::InvalidInput(
                "maximum iterations must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(PileError::InvalidInput(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Outcome of the last analysis attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitStatus {
    /// No analysis has been attempted
    NotRun,
    /// Analysis completed the full load history
    Success,
    /// Newton iterations failed to converge
    DidNotConverge,
    /// Tangent stiffness could not be factorised
    SingularSystem,
    /// Mesh or loads were not built when the analysis was requested
    NotReady,
}

impl ExitStatus {
    /// Integer status code for status-reporting collaborators
    pub fn code(&self) -> i32 {
        match self {
            Self::NotRun => -100,
            Self::Success => 0,
            Self::NotReady => -1,
            Self::SingularSystem => -2,
            Self::DidNotConverge => -3,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == Self::Success
    }
}

impl Default for ExitStatus {
    fn default() -> Self {
        Self::NotRun
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotRun => "not run",
            Self::Success => "success",
            Self::DidNotConverge => "did not converge",
            Self::SingularSystem => "singular system",
            Self::NotReady => "not ready",
        };
        write!(f, "{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analysis_type() {
        assert_eq!(
            "Load-Control".parse::<AnalysisType>().unwrap(),
            AnalysisType::LoadControl
        );
        assert_eq!(
            "displacement".parse::<AnalysisType>().unwrap(),
            AnalysisType::DisplacementControl
        );
        assert!("arc-length".parse::<AnalysisType>().is_err());
    }

    #[test]
    fn test_exit_codes_distinct() {
        let all = [
            ExitStatus::NotRun,
            ExitStatus::Success,
            ExitStatus::DidNotConverge,
            ExitStatus::SingularSystem,
            ExitStatus::NotReady,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
        assert_eq!(ExitStatus::default(), ExitStatus::NotRun);
    }

    #[test]
    fn test_options_validation() {
        assert!(AnalysisOptions::default().validate().is_ok());
        assert!(AnalysisOptions::default().with_increments(0).validate().is_err());
        assert!(AnalysisOptions::default().with_tolerance(-1.0).validate().is_err());
    }
}
