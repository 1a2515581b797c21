//! Load cases - cap forces, cap displacements and soil displacement profiles

mod builder;
mod profile;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PileError, PileResult};

pub use builder::LoadBuilder;
pub use profile::DispProfile;

/// Active load-control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadControlType {
    /// Force and moment at the pile cap
    Force,
    /// Prescribed cap displacement
    Displacement,
    /// Prescribed free-field soil displacement over depth
    SoilProfile,
}

impl fmt::Display for LoadControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Force => write!(f, "force"),
            Self::Displacement => write!(f, "displacement"),
            Self::SoilProfile => write!(f, "soil profile"),
        }
    }
}

/// How a cap force is shared between free pile heads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeadLoadDistribution {
    /// Every head receives the same fraction
    #[default]
    EqualSplit,
}

impl HeadLoadDistribution {
    /// Fraction of the cap load taken by each of `heads` pile heads
    pub fn share(&self, heads: usize) -> f64 {
        match self {
            Self::EqualSplit => 1.0 / heads.max(1) as f64,
        }
    }
}

/// The single load configuration of the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoadCase {
    /// Horizontal force `p` (kN), vertical force `pv` (kN, positive
    /// downward) and moment (kN·m) at the cap
    Force { p: f64, pv: f64, moment: f64 },
    /// Cap displacement: horizontal `ux` and vertical `uz` (m, positive up)
    Displacement { ux: f64, uz: f64 },
    /// Soil displacement profile imposed on the lateral springs
    SoilProfile(DispProfile),
}

impl Default for LoadCase {
    fn default() -> Self {
        Self::zero(LoadControlType::Force)
    }
}

impl LoadCase {
    /// Zero-valued configuration of a mode
    pub fn zero(mode: LoadControlType) -> Self {
        match mode {
            LoadControlType::Force => Self::Force {
                p: 0.0,
                pv: 0.0,
                moment: 0.0,
            },
            LoadControlType::Displacement => Self::Displacement { ux: 0.0, uz: 0.0 },
            LoadControlType::SoilProfile => Self::SoilProfile(DispProfile::default()),
        }
    }

    pub fn control_type(&self) -> LoadControlType {
        match self {
            Self::Force { .. } => LoadControlType::Force,
            Self::Displacement { .. } => LoadControlType::Displacement,
            Self::SoilProfile(_) => LoadControlType::SoilProfile,
        }
    }

    /// Reject non-finite load values
    pub fn validate(&self) -> PileResult<()> {
        let values: Vec<f64> = match self {
            Self::Force { p, pv, moment } => vec![*p, *pv, *moment],
            Self::Displacement { ux, uz } => vec![*ux, *uz],
            Self::SoilProfile(profile) => vec![
                profile.surface_disp,
                profile.percentage_12,
                profile.percentage_23,
                profile.percentage_base,
            ],
        };
        if values.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(PileError::InvalidInput(format!(
                "{} load contains a non-finite value",
                self.control_type()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_configuration_per_mode() {
        for mode in [
            LoadControlType::Force,
            LoadControlType::Displacement,
            LoadControlType::SoilProfile,
        ] {
            let load = LoadCase::zero(mode);
            assert_eq!(load.control_type(), mode);
            assert!(load.validate().is_ok());
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let load = LoadCase::Displacement {
            ux: f64::NAN,
            uz: 0.0,
        };
        assert!(matches!(load.validate(), Err(PileError::InvalidInput(_))));
    }

    #[test]
    fn test_tagged_json() {
        let load: LoadCase =
            serde_json::from_str(r#"{"type": "force", "p": 100.0, "pv": 0.0, "moment": 0.0}"#)
                .unwrap();
        assert_eq!(
            load,
            LoadCase::Force {
                p: 100.0,
                pv: 0.0,
                moment: 0.0
            }
        );

        let profile: LoadCase = serde_json::from_str(
            r#"{"type": "soil_profile", "surface_disp": 0.05, "percentage_12": 50.0,
                "percentage_23": 20.0, "percentage_base": 0.0}"#,
        )
        .unwrap();
        assert_eq!(profile.control_type(), LoadControlType::SoilProfile);
    }

    #[test]
    fn test_equal_split() {
        assert_eq!(HeadLoadDistribution::EqualSplit.share(4), 0.25);
        assert_eq!(HeadLoadDistribution::default().share(1), 1.0);
    }
}
