//! Engine configuration: GA knobs, B&B node budget, and the RNG seed.
//!
//! This is ambient infrastructure, not the out-of-scope HTTP command
//! surface described in the spec §6 — it is the validation primitive a
//! future wrapper around that surface would call into.

use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::EngineError;

/// Genetic algorithm knobs (spec §4.4).
#[pyclass]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GaConfig {
    #[pyo3(get, set)]
    pub population_size: usize,
    #[pyo3(get, set)]
    pub generations: usize,
    #[pyo3(get, set)]
    pub crossover_probability: f64,
    #[pyo3(get, set)]
    pub mutation_probability: f64,
    #[pyo3(get, set)]
    pub tournament_size: usize,
}

#[pymethods]
impl GaConfig {
    #[new]
    #[pyo3(signature = (
        population_size=100, generations=50, crossover_probability=0.8,
        mutation_probability=0.1, tournament_size=3
    ))]
    pub fn new(
        population_size: usize,
        generations: usize,
        crossover_probability: f64,
        mutation_probability: f64,
        tournament_size: usize,
    ) -> Self {
        Self {
            population_size,
            generations,
            crossover_probability,
            mutation_probability,
            tournament_size,
        }
    }
}

impl Default for GaConfig {
    fn default() -> Self {
        Self::new(100, 50, 0.8, 0.1, 3)
    }
}

impl GaConfig {
    /// Mirrors the command-surface ranges from spec §6: `population_size`
    /// in `[20, 500]`, `generations` in `[10, 200]`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(20..=500).contains(&self.population_size) {
            return Err(EngineError::InvalidConfig(format!(
                "population_size {} out of range [20, 500]",
                self.population_size
            )));
        }
        if !(10..=200).contains(&self.generations) {
            return Err(EngineError::InvalidConfig(format!(
                "generations {} out of range [10, 200]",
                self.generations
            )));
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return Err(EngineError::InvalidConfig(
                "crossover_probability must be within [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(EngineError::InvalidConfig(
                "mutation_probability must be within [0, 1]".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(EngineError::InvalidConfig(
                "tournament_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Branch-and-bound knobs (spec §4.5).
#[pyclass]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BbConfig {
    #[pyo3(get, set)]
    pub max_nodes: u64,
}

#[pymethods]
impl BbConfig {
    #[new]
    #[pyo3(signature = (max_nodes=10_000))]
    pub fn new(max_nodes: u64) -> Self {
        Self { max_nodes }
    }
}

impl Default for BbConfig {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl BbConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_nodes == 0 {
            return Err(EngineError::InvalidConfig(
                "max_nodes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Top-level engine configuration, loadable from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub ga: GaConfigData,
    #[serde(default)]
    pub branch_and_bound: BbConfigData,
    /// `None` means system-randomized; `Some(seed)` means reproducible.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Converted to hours at validation time (1-90 days, per spec §6).
    #[serde(default = "default_planning_horizon_days")]
    pub planning_horizon_days: u32,
}

fn default_planning_horizon_days() -> u32 {
    30
}

/// Plain serde-friendly mirror of [`GaConfig`] (pyo3 classes cannot derive
/// `Deserialize` directly).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GaConfigData {
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    #[serde(default = "default_generations")]
    pub generations: usize,
    #[serde(default = "default_crossover_probability")]
    pub crossover_probability: f64,
    #[serde(default = "default_mutation_probability")]
    pub mutation_probability: f64,
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
}

fn default_population_size() -> usize {
    100
}
fn default_generations() -> usize {
    50
}
fn default_crossover_probability() -> f64 {
    0.8
}
fn default_mutation_probability() -> f64 {
    0.1
}
fn default_tournament_size() -> usize {
    3
}

impl Default for GaConfigData {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            generations: default_generations(),
            crossover_probability: default_crossover_probability(),
            mutation_probability: default_mutation_probability(),
            tournament_size: default_tournament_size(),
        }
    }
}

impl From<GaConfigData> for GaConfig {
    fn from(data: GaConfigData) -> Self {
        GaConfig::new(
            data.population_size,
            data.generations,
            data.crossover_probability,
            data.mutation_probability,
            data.tournament_size,
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BbConfigData {
    #[serde(default = "default_max_nodes")]
    pub max_nodes: u64,
}

fn default_max_nodes() -> u64 {
    10_000
}

impl Default for BbConfigData {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
        }
    }
}

impl From<BbConfigData> for BbConfig {
    fn from(data: BbConfigData) -> Self {
        BbConfig::new(data.max_nodes)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ga: GaConfigData::default(),
            branch_and_bound: BbConfigData::default(),
            rng_seed: None,
            planning_horizon_days: default_planning_horizon_days(),
        }
    }
}

impl EngineConfig {
    /// Parses an `EngineConfig` from a TOML document, falling back to
    /// defaults for any field left unset.
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        toml::from_str(contents).map_err(|e| EngineError::InvalidConfig(e.to_string()))
    }

    /// Validates every field, mirroring the ranges the out-of-scope
    /// command-surface wrapper would enforce (spec §6).
    pub fn validate(&self) -> Result<(), EngineError> {
        GaConfig::from(self.ga).validate()?;
        BbConfig::from(self.branch_and_bound).validate()?;
        if !(1..=90).contains(&self.planning_horizon_days) {
            return Err(EngineError::InvalidConfig(format!(
                "planning_horizon_days {} out of range [1, 90]",
                self.planning_horizon_days
            )));
        }
        Ok(())
    }

    pub fn planning_horizon_hours(&self) -> f64 {
        self.planning_horizon_days as f64 * 24.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn population_size_out_of_range_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.ga.population_size = 5;
        assert!(matches!(
            cfg.validate(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn generations_out_of_range_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.ga.generations = 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn planning_horizon_out_of_range_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.planning_horizon_days = 0;
        assert!(cfg.validate().is_err());
        cfg.planning_horizon_days = 200;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_a_typed_error_not_a_panic() {
        let result = EngineConfig::from_toml_str("not = [valid toml");
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn toml_roundtrip_applies_defaults() {
        let cfg = EngineConfig::from_toml_str("rng_seed = 42\n").unwrap();
        assert_eq!(cfg.rng_seed, Some(42));
        assert_eq!(cfg.ga.population_size, 100);
    }
}
