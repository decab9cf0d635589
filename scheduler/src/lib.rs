//! Packaging-Plant Production Scheduling Optimizer
//!
//! Assigns production orders to machines under process-family compatibility
//! constraints, minimizing material-transition waste and processing time.
//! Exposes a genetic search, an exact branch-and-bound search (with greedy
//! fallback), and a hybrid driver that picks between them by order count.

use pyo3::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub mod branch_bound;
pub mod config;
pub mod cost;
pub mod decoder;
pub mod evaluator;
pub mod genetic;
pub mod hybrid;
pub mod types;

pub use config::{BbConfig, GaConfig};
pub use types::{EngineError, Machine, Order, OptimizationResult, ScheduleItem, Task};

/// Top-level entry point. Holds the GA and B&B knobs and routes
/// `optimize` calls to the genetic search, the exact search, or the
/// hybrid driver between them.
#[pyclass]
pub struct ScheduleOptimizer {
    ga_config: GaConfig,
    bb_config: BbConfig,
}

#[pymethods]
impl ScheduleOptimizer {
    #[new]
    #[pyo3(signature = (ga_config=None, bb_config=None))]
    pub fn new(ga_config: Option<GaConfig>, bb_config: Option<BbConfig>) -> Self {
        Self {
            ga_config: ga_config.unwrap_or_default(),
            bb_config: bb_config.unwrap_or_default(),
        }
    }

    /// Routes to branch-and-bound (`|orders| <= 15`) or the genetic search
    /// otherwise.
    #[pyo3(signature = (task, rng_seed=None))]
    pub fn optimize(&self, task: &Task, rng_seed: Option<u64>) -> PyResult<OptimizationResult> {
        Ok(hybrid::optimize(task, &self.ga_config, &self.bb_config, rng_seed)?)
    }

    #[pyo3(signature = (task, rng_seed=None))]
    pub fn optimize_genetic(&self, task: &Task, rng_seed: Option<u64>) -> PyResult<OptimizationResult> {
        let mut rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(genetic::optimize(task, &self.ga_config, &mut rng)?)
    }

    #[pyo3(signature = (task, rng_seed=None))]
    pub fn optimize_branch_bound(&self, task: &Task, rng_seed: Option<u64>) -> PyResult<OptimizationResult> {
        Ok(branch_bound::optimize(task, &self.bb_config, rng_seed)?)
    }

    #[getter]
    fn ga_config(&self) -> GaConfig {
        self.ga_config
    }

    #[getter]
    fn bb_config(&self) -> BbConfig {
        self.bb_config
    }
}

/// Python module initialization.
#[pymodule]
fn packplan_scheduler(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Order>()?;
    m.add_class::<Machine>()?;
    m.add_class::<Task>()?;
    m.add_class::<ScheduleItem>()?;
    m.add_class::<OptimizationResult>()?;
    m.add_class::<GaConfig>()?;
    m.add_class::<BbConfig>()?;
    m.add_class::<ScheduleOptimizer>()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        let orders = vec![
            Order::new(1, "extrusion", 1, 100.0, 1, "2026-01-05", Some("red".into()), None, None).unwrap(),
            Order::new(2, "extrusion", 1, 100.0, 1, "2026-01-06", Some("red".into()), None, None).unwrap(),
        ];
        let machines = vec![Machine::new(1, "extrusion", Some(100.0), Some(30), true).unwrap()];
        Task::new(orders, machines, "2026-01-01T08:00:00Z", 168.0).unwrap()
    }

    #[test]
    fn optimizer_exposes_a_scheduled_result() {
        let optimizer = ScheduleOptimizer::new(None, None);
        let task = sample_task();
        let result = optimizer.optimize(&task, Some(1)).unwrap();
        assert_eq!(result.schedule.len(), 2);
    }

    #[test]
    fn direct_branch_bound_matches_hybrid_for_small_task() {
        let optimizer = ScheduleOptimizer::new(None, None);
        let task = sample_task();
        let hybrid_result = optimizer.optimize(&task, Some(1)).unwrap();
        let bb_result = optimizer.optimize_branch_bound(&task, Some(1)).unwrap();
        assert_eq!(hybrid_result.total_waste_kg, bb_result.total_waste_kg);
    }

    #[test]
    fn order_parses_process_family_case_insensitively() {
        let order = Order::new(1, "EXTRUSION", 1, 50.0, 1, "2026-01-01", None, None, None).unwrap();
        assert_eq!(order.delivery_date(), "2026-01-01");
    }
}
