use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the three diagonal gain kinds of a PID controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainKind {
    Proportional,
    Integral,
    Derivative,
}

impl GainKind {
    /// Conventional short name (`"kp"`, `"ki"`, `"kd"`).
    pub fn short_name(self) -> &'static str {
        match self {
            GainKind::Proportional => "kp",
            GainKind::Integral => "ki",
            GainKind::Derivative => "kd",
        }
    }
}

/// A gain as written in configuration: either one scalar broadcast to every
/// variable, or an explicit per-variable list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GainValue {
    Uniform(f64),
    PerVariable(Vec<f64>),
}

impl Default for GainValue {
    fn default() -> Self {
        GainValue::Uniform(0.0)
    }
}

impl GainValue {
    /// Expand into exactly `dimension` per-variable gains.
    ///
    /// # Errors
    ///
    /// Returns [`PidError::DimensionMismatch`] if a per-variable list does not
    /// hold exactly `dimension` entries.
    pub fn expand(&self, kind: GainKind, dimension: usize) -> Result<Vec<f64>, PidError> {
        match self {
            GainValue::Uniform(g) => Ok(vec![*g; dimension]),
            GainValue::PerVariable(values) if values.len() == dimension => Ok(values.clone()),
            GainValue::PerVariable(values) => Err(PidError::DimensionMismatch {
                argument: kind.short_name().to_string(),
                expected: dimension,
                actual: values.len(),
            }),
        }
    }
}

/// Serialisable description of a multi-variable PID controller.
///
/// `kd` may be omitted, which yields a PI controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Number of independently controlled variables.
    pub dimension: usize,
    pub kp: GainValue,
    pub ki: GainValue,
    #[serde(default)]
    pub kd: GainValue,
}

/// Per-variable gain vectors produced by [`ControllerConfig::expand`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedGains {
    pub kp: Vec<f64>,
    pub ki: Vec<f64>,
    pub kd: Vec<f64>,
}

impl ControllerConfig {
    /// Configuration with the same scalar gains for every variable.
    pub fn uniform(dimension: usize, kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            dimension,
            kp: GainValue::Uniform(kp),
            ki: GainValue::Uniform(ki),
            kd: GainValue::Uniform(kd),
        }
    }

    /// Expand all three gains to per-variable vectors of length `dimension`.
    pub fn expand(&self) -> Result<ExpandedGains, PidError> {
        Ok(ExpandedGains {
            kp: self.kp.expand(GainKind::Proportional, self.dimension)?,
            ki: self.ki.expand(GainKind::Integral, self.dimension)?,
            kd: self.kd.expand(GainKind::Derivative, self.dimension)?,
        })
    }
}

/// Failures reported by the hardened controller step and by configuration
/// expansion.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PidError {
    /// A scalar argument is outside its contract, e.g. `dt <= 0`.
    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("Dimension Mismatch on {argument}: expected {expected} components, got {actual}")]
    DimensionMismatch {
        argument: String,
        expected: usize,
        actual: usize,
    },

    /// A non-finite value was supplied or would have been produced.
    #[error("Numeric Overflow in {quantity}: non-finite value at index {index}")]
    NumericOverflow { quantity: String, index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_gain_expands_to_every_variable() {
        let g = GainValue::Uniform(2.5);
        assert_eq!(g.expand(GainKind::Integral, 3).unwrap(), vec![2.5, 2.5, 2.5]);
    }

    #[test]
    fn per_variable_gain_with_wrong_length_is_rejected() {
        let g = GainValue::PerVariable(vec![1.0, 2.0]);
        let err = g.expand(GainKind::Proportional, 3).unwrap_err();
        assert_eq!(
            err,
            PidError::DimensionMismatch {
                argument: "kp".to_string(),
                expected: 3,
                actual: 2,
            }
        );
    }

    #[test]
    fn config_without_kd_is_a_pi_controller() {
        let json = r#"{ "dimension": 2, "kp": 1.0, "ki": [0.5, 0.25] }"#;
        let cfg: ControllerConfig = serde_json::from_str(json).unwrap();
        let gains = cfg.expand().unwrap();
        assert_eq!(gains.kp, vec![1.0, 1.0]);
        assert_eq!(gains.ki, vec![0.5, 0.25]);
        assert_eq!(gains.kd, vec![0.0, 0.0]);
    }

    #[test]
    fn config_serialization_roundtrip() {
        let cfg = ControllerConfig {
            dimension: 3,
            kp: GainValue::PerVariable(vec![1.0, 2.0, 3.0]),
            ki: GainValue::Uniform(0.1),
            kd: GainValue::Uniform(0.0),
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ControllerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn gain_kind_short_names() {
        assert_eq!(GainKind::Proportional.short_name(), "kp");
        assert_eq!(GainKind::Integral.short_name(), "ki");
        assert_eq!(GainKind::Derivative.short_name(), "kd");
    }

    #[test]
    fn pid_error_display() {
        let err = PidError::InvalidArgument("dt must be positive".to_string());
        assert!(err.to_string().contains("Invalid Argument"));

        let err2 = PidError::NumericOverflow {
            quantity: "integral".to_string(),
            index: 4,
        };
        assert!(err2.to_string().contains("integral"));
        assert!(err2.to_string().contains('4'));
    }
}
