//! Core value types for the packaging-plant scheduling engine.
//!
//! Orders and machines are immutable once an optimization run starts; the
//! engine only ever produces fresh `ScheduleItem`s, never mutates its inputs.

use chrono::{DateTime, NaiveDate, Utc};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The four production process families. Machines and orders of different
/// families are strictly incompatible with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ProcessFamily {
    Extrusion,
    Ringing,
    CorrugationSoft,
    CorrugationHard,
}

impl FromStr for ProcessFamily {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extrusion" => Ok(Self::Extrusion),
            "ringing" => Ok(Self::Ringing),
            "corrugation_soft" => Ok(Self::CorrugationSoft),
            "corrugation_hard" => Ok(Self::CorrugationHard),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown process family: {other}"
            ))),
        }
    }
}

impl fmt::Display for ProcessFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Extrusion => "extrusion",
            Self::Ringing => "ringing",
            Self::CorrugationSoft => "corrugation_soft",
            Self::CorrugationHard => "corrugation_hard",
        };
        write!(f, "{s}")
    }
}

/// A single open production order.
#[pyclass]
#[derive(Debug, Clone)]
pub struct Order {
    #[pyo3(get)]
    pub id: i64,
    pub process_family: ProcessFamily,
    #[pyo3(get)]
    pub material_id: i64,
    #[pyo3(get)]
    pub color: Option<String>,
    #[pyo3(get)]
    pub caliber: Option<String>,
    #[pyo3(get)]
    pub thickness_mm: Option<f64>,
    #[pyo3(get)]
    pub quantity_kg: f64,
    #[pyo3(get)]
    pub priority: i32,
    pub delivery_date: NaiveDate,
}

#[pymethods]
impl Order {
    #[new]
    #[pyo3(signature = (
        id, process_family, material_id, quantity_kg, priority, delivery_date,
        color=None, caliber=None, thickness_mm=None
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        process_family: &str,
        material_id: i64,
        quantity_kg: f64,
        priority: i32,
        delivery_date: &str,
        color: Option<String>,
        caliber: Option<String>,
        thickness_mm: Option<f64>,
    ) -> PyResult<Self> {
        let process_family = ProcessFamily::from_str(process_family)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let delivery_date = NaiveDate::parse_from_str(delivery_date, "%Y-%m-%d")
            .map_err(|e| PyValueError::new_err(format!("invalid delivery_date: {e}")))?;
        Ok(Self {
            id,
            process_family,
            material_id,
            color,
            caliber,
            thickness_mm,
            quantity_kg,
            priority,
            delivery_date,
        })
    }

    #[getter]
    fn process_family(&self) -> String {
        self.process_family.to_string()
    }

    #[getter]
    fn delivery_date(&self) -> String {
        self.delivery_date.format("%Y-%m-%d").to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "Order(id={}, family={}, qty={:.2}kg, priority={})",
            self.id, self.process_family, self.quantity_kg, self.priority
        )
    }
}

/// Default throughput used when a machine's capacity is missing or zero.
pub const DEFAULT_CAPACITY_KG_PER_HOUR: f64 = 60.0;
/// Default changeover time used when a machine's base setup is missing.
pub const DEFAULT_BASE_SETUP_MINUTES: i64 = 30;

/// A production machine belonging to exactly one process family.
#[pyclass]
#[derive(Debug, Clone)]
pub struct Machine {
    #[pyo3(get)]
    pub id: i64,
    pub process_family: ProcessFamily,
    pub capacity_kg_per_hour: f64,
    pub base_setup_minutes: i64,
    #[pyo3(get)]
    pub is_available: bool,
}

#[pymethods]
impl Machine {
    #[new]
    #[pyo3(signature = (id, process_family, capacity_kg_per_hour=None, base_setup_minutes=None, is_available=true))]
    pub fn new(
        id: i64,
        process_family: &str,
        capacity_kg_per_hour: Option<f64>,
        base_setup_minutes: Option<i64>,
        is_available: bool,
    ) -> PyResult<Self> {
        let process_family = ProcessFamily::from_str(process_family)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let capacity_kg_per_hour = match capacity_kg_per_hour {
            Some(c) if c > 0.0 => c,
            _ => DEFAULT_CAPACITY_KG_PER_HOUR,
        };
        let base_setup_minutes = match base_setup_minutes {
            Some(m) if m >= 0 => m,
            _ => DEFAULT_BASE_SETUP_MINUTES,
        };
        Ok(Self {
            id,
            process_family,
            capacity_kg_per_hour,
            base_setup_minutes,
            is_available,
        })
    }

    #[getter]
    fn process_family(&self) -> String {
        self.process_family.to_string()
    }

    #[getter]
    fn capacity_kg_per_hour(&self) -> f64 {
        self.capacity_kg_per_hour
    }

    #[getter]
    fn base_setup_minutes(&self) -> i64 {
        self.base_setup_minutes
    }

    fn __repr__(&self) -> String {
        format!(
            "Machine(id={}, family={}, capacity={:.1}kg/h, available={})",
            self.id, self.process_family, self.capacity_kg_per_hour, self.is_available
        )
    }
}

/// The input bundle for one `optimize` call: the orders to place, the fleet
/// to place them on, and the planning window.
#[pyclass]
#[derive(Debug, Clone)]
pub struct Task {
    #[pyo3(get)]
    pub orders: Vec<Order>,
    #[pyo3(get)]
    pub machines: Vec<Machine>,
    pub start_time: DateTime<Utc>,
    #[pyo3(get)]
    pub planning_horizon_hours: f64,
}

#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (orders, machines, start_time, planning_horizon_hours=720.0))]
    pub fn new(
        orders: Vec<Order>,
        machines: Vec<Machine>,
        start_time: &str,
        planning_horizon_hours: f64,
    ) -> PyResult<Self> {
        let start_time = DateTime::parse_from_rfc3339(start_time)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| PyValueError::new_err(format!("invalid start_time: {e}")))?;
        Ok(Self {
            orders,
            machines,
            start_time,
            planning_horizon_hours,
        })
    }

    #[getter]
    fn start_time(&self) -> String {
        self.start_time.to_rfc3339()
    }
}

impl Task {
    /// Only the machines the engine is allowed to see: unavailable machines
    /// are invisible per the spec.
    pub fn available_machines(&self) -> impl Iterator<Item = &Machine> {
        self.machines.iter().filter(|m| m.is_available)
    }

    pub fn order_lookup(&self) -> HashMap<i64, &Order> {
        self.orders.iter().map(|o| (o.id, o)).collect()
    }

    pub fn machine_lookup(&self) -> HashMap<i64, &Machine> {
        self.machines.iter().map(|m| (m.id, m)).collect()
    }

    /// Available machines whose process family matches `family`.
    pub fn compatible_machines(&self, family: ProcessFamily) -> Vec<&Machine> {
        self.available_machines()
            .filter(|m| m.process_family == family)
            .collect()
    }
}

/// One placed order on one machine, with the concrete time window it occupies.
#[pyclass]
#[derive(Debug, Clone)]
pub struct ScheduleItem {
    #[pyo3(get)]
    pub order_id: i64,
    #[pyo3(get)]
    pub machine_id: i64,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    #[pyo3(get)]
    pub setup_minutes: i64,
    #[pyo3(get)]
    pub processing_minutes: i64,
}

#[pymethods]
impl ScheduleItem {
    #[getter]
    fn scheduled_start(&self) -> String {
        self.scheduled_start.to_rfc3339()
    }

    #[getter]
    fn scheduled_end(&self) -> String {
        self.scheduled_end.to_rfc3339()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleItem(order={}, machine={}, start={}, end={})",
            self.order_id,
            self.machine_id,
            self.scheduled_start.to_rfc3339(),
            self.scheduled_end.to_rfc3339()
        )
    }
}

/// The outcome of one `optimize` call: a concrete schedule plus aggregate
/// metrics. `waste_reduction_percentage` is reserved and always 0.0 in this
/// version (see DESIGN.md).
#[pyclass]
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    #[pyo3(get)]
    pub schedule: Vec<ScheduleItem>,
    #[pyo3(get)]
    pub total_waste_kg: f64,
    #[pyo3(get)]
    pub total_processing_hours: f64,
    #[pyo3(get)]
    pub equipment_utilization: HashMap<i64, f64>,
    #[pyo3(get)]
    pub waste_reduction_percentage: f64,
    #[pyo3(get)]
    pub makespan_hours: f64,
    #[pyo3(get)]
    pub optimization_time_seconds: f64,
}

#[pymethods]
impl OptimizationResult {
    fn __repr__(&self) -> String {
        format!(
            "OptimizationResult({} items, waste={:.6}kg, makespan={:.2}h, time={:.3}s)",
            self.schedule.len(),
            self.total_waste_kg,
            self.makespan_hours,
            self.optimization_time_seconds
        )
    }
}

/// Round a metric to 6 digits for clean boundary output, per the spec's
/// numeric re-architecture guidance (floats internally, fixed precision at
/// the boundary).
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Fatal engine errors. Non-fatal conditions (dropped orders, degenerate
/// machines, B&B fallback) never raise — they are absorbed into a
/// well-formed `OptimizationResult` instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("assignment references unknown order or machine id: {0}")]
    UnknownReference(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<EngineError> for PyErr {
    fn from(err: EngineError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
