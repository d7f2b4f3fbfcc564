//! Simulation configuration – reads/writes `multipid.toml`.

use multipid_types::{ControllerConfig, GainValue};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Closed-loop simulation settings stored in `multipid.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Sampling period handed to the controller on every step (seconds).
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Number of control cycles to run.
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// Time constant of the simulated first-order plant (seconds).
    #[serde(default = "default_time_constant")]
    pub time_constant: f64,

    /// Target value for each variable.
    pub set_point: Vec<f64>,

    /// Initial plant state; empty means all zeros.
    #[serde(default)]
    pub initial_value: Vec<f64>,

    pub controller: ControllerConfig,
}

fn default_dt() -> f64 {
    0.01
}
fn default_steps() -> usize {
    2000
}
fn default_time_constant() -> f64 {
    0.5
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            steps: default_steps(),
            time_constant: default_time_constant(),
            set_point: vec![1.0, -0.5, 2.0],
            initial_value: Vec::new(),
            controller: ControllerConfig {
                dimension: 3,
                kp: GainValue::Uniform(2.0),
                ki: GainValue::PerVariable(vec![1.0, 1.0, 1.5]),
                kd: GainValue::Uniform(0.05),
            },
        }
    }
}

impl SimulationConfig {
    /// Initial plant state, expanded to the controller dimension.
    pub fn initial_state(&self) -> Vec<f64> {
        if self.initial_value.is_empty() {
            vec![0.0; self.controller.dimension]
        } else {
            self.initial_value.clone()
        }
    }

    /// Check the settings that the controller itself does not check.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.controller.dimension;
        if self.set_point.len() != n {
            return Err(format!(
                "set_point has {} entries but controller.dimension is {}",
                self.set_point.len(),
                n
            ));
        }
        if !self.initial_value.is_empty() && self.initial_value.len() != n {
            return Err(format!(
                "initial_value has {} entries but controller.dimension is {}",
                self.initial_value.len(),
                n
            ));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(format!("dt must be positive, got {}", self.dt));
        }
        if !(self.time_constant.is_finite() && self.time_constant > 0.0) {
            return Err(format!("time_constant must be positive, got {}", self.time_constant));
        }
        self.controller.expand().map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Default location: `./multipid.toml`.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("multipid.toml")
}

/// Load the config from `path`.  Returns `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<SimulationConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: SimulationConfig =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `MULTIPID_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `MULTIPID_DT` | `dt` |
/// | `MULTIPID_STEPS` | `steps` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut SimulationConfig) {
    if let Ok(v) = std::env::var("MULTIPID_DT") {
        if let Ok(dt) = v.parse::<f64>() {
            cfg.dt = dt;
        }
    }
    if let Ok(v) = std::env::var("MULTIPID_STEPS") {
        if let Ok(steps) = v.parse::<usize>() {
            cfg.steps = steps;
        }
    }
}

/// Save the config to `path`, creating parent directories if necessary.
pub fn save_to(cfg: &SimulationConfig, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("nested").join("multipid.toml");

        let cfg = SimulationConfig::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.controller, cfg.controller);
        assert_eq!(loaded.set_point, cfg.set_point);
        assert!((loaded.time_constant - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let result = load_from(&dir.path().join("multipid.toml")).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn minimal_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("multipid.toml");
        std::fs::write(
            &path,
            "set_point = [1.0]\n\n[controller]\ndimension = 1\nkp = 1.5\nki = [0.2]\n",
        )
        .expect("write");

        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.controller.kp, GainValue::Uniform(1.5));
        assert_eq!(cfg.controller.ki, GainValue::PerVariable(vec![0.2]));
        assert_eq!(cfg.controller.kd, GainValue::Uniform(0.0));
        assert_eq!(cfg.initial_state(), vec![0.0]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("multipid.toml");
        std::fs::write(&path, "dt = \"fast\"").expect("write");
        let err = load_from(&path).unwrap_err();
        assert!(err.contains("Failed to parse config"));
    }

    #[test]
    fn validate_rejects_set_point_length() {
        let mut cfg = SimulationConfig::default();
        cfg.set_point.pop();
        assert!(cfg.validate().unwrap_err().contains("set_point"));
    }

    #[test]
    fn validate_rejects_gain_length() {
        let mut cfg = SimulationConfig::default();
        cfg.controller.ki = GainValue::PerVariable(vec![1.0]);
        assert!(cfg.validate().unwrap_err().contains("Dimension Mismatch"));
    }

    #[test]
    fn validate_rejects_non_positive_dt() {
        let cfg = SimulationConfig {
            dt: 0.0,
            ..SimulationConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn apply_env_overrides_changes_steps_and_dt() {
        // Both variables are exercised in one test so parallel tests never
        // observe each other's values.
        // SAFETY: no other test reads or writes MULTIPID_* variables.
        unsafe {
            std::env::set_var("MULTIPID_STEPS", "42");
            std::env::set_var("MULTIPID_DT", "0.002");
        }
        let mut cfg = SimulationConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.steps, 42);
        assert!((cfg.dt - 0.002).abs() < f64::EPSILON);

        unsafe {
            std::env::set_var("MULTIPID_STEPS", "many");
            std::env::remove_var("MULTIPID_DT");
        }
        let mut cfg = SimulationConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.steps, default_steps());
        assert!((cfg.dt - default_dt()).abs() < f64::EPSILON);

        unsafe { std::env::remove_var("MULTIPID_STEPS") };
    }
}
