//! Scores a decoded schedule: waste, processing time, utilization, makespan.

use std::collections::HashMap;

use crate::cost::waste;
use crate::types::{ScheduleItem, Task};

/// Aggregate metrics for one decoded schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_waste_kg: f64,
    pub total_processing_hours: f64,
    pub equipment_utilization: HashMap<i64, f64>,
    pub makespan_hours: f64,
}

/// The GA fitness: minimized lexicographically via dominance (both terms
/// weighted negative, i.e. lower is always better).
pub type Fitness = (f64, f64);

/// Evaluates a schedule against its task, computing waste/time/utilization/
/// makespan. Orders referenced by `schedule` are assumed present in
/// `task` — callers only ever pass schedules `decode` itself produced.
pub fn evaluate(schedule: &[ScheduleItem], task: &Task) -> Metrics {
    let order_lookup = task.order_lookup();

    let mut by_machine: HashMap<i64, Vec<&ScheduleItem>> = HashMap::new();
    for item in schedule {
        by_machine.entry(item.machine_id).or_default().push(item);
    }

    let mut total_waste_kg = 0.0;
    for items in by_machine.values_mut() {
        items.sort_by_key(|i| i.scheduled_start);
        let mut prev_order_id: Option<i64> = None;
        for item in items.iter() {
            let order = order_lookup.get(&item.order_id);
            if let (Some(prev_id), Some(order)) = (prev_order_id, order) {
                if let Some(prev) = order_lookup.get(&prev_id) {
                    total_waste_kg += order.quantity_kg * waste(prev, order);
                }
            }
            prev_order_id = Some(item.order_id);
        }
    }

    let total_processing_hours: f64 = schedule
        .iter()
        .map(|item| (item.scheduled_end - item.scheduled_start).num_minutes() as f64 / 60.0)
        .sum();

    let mut equipment_utilization = HashMap::new();
    for (machine_id, items) in &by_machine {
        let working_hours: f64 = items
            .iter()
            .map(|item| (item.scheduled_end - item.scheduled_start).num_minutes() as f64 / 60.0)
            .sum();
        let utilization = if task.planning_horizon_hours > 0.0 {
            (working_hours / task.planning_horizon_hours).min(1.0)
        } else {
            0.0
        };
        equipment_utilization.insert(*machine_id, utilization);
    }
    for machine in task.available_machines() {
        equipment_utilization.entry(machine.id).or_insert(0.0);
    }

    let makespan_hours = schedule
        .iter()
        .map(|item| item.scheduled_end)
        .max()
        .map(|end| (end - task.start_time).num_minutes() as f64 / 60.0)
        .unwrap_or(0.0);

    Metrics {
        total_waste_kg,
        total_processing_hours,
        equipment_utilization,
        makespan_hours,
    }
}

/// The GA's fitness tuple: `(total_waste_kg, total_processing_hours)`,
/// dominance-ordered, both minimized.
pub fn fitness(metrics: &Metrics) -> Fitness {
    (metrics.total_waste_kg, metrics.total_processing_hours)
}

/// True if `a` dominates `b`: at least as good on both terms, strictly
/// better on one.
pub fn dominates(a: Fitness, b: Fitness) -> bool {
    (a.0 <= b.0 && a.1 <= b.1) && (a.0 < b.0 || a.1 < b.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use crate::types::{Machine, Order, ProcessFamily};
    use chrono::{DateTime, NaiveDate, Utc};

    fn task_with(orders: Vec<Order>, machines: Vec<Machine>) -> Task {
        Task {
            orders,
            machines,
            start_time: DateTime::parse_from_rfc3339("2026-01-01T08:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            planning_horizon_hours: 24.0,
        }
    }

    fn order(id: i64, family: ProcessFamily, qty: f64, color: &str) -> Order {
        Order {
            id,
            process_family: family,
            material_id: 1,
            color: Some(color.into()),
            caliber: None,
            thickness_mm: None,
            quantity_kg: qty,
            priority: 1,
            delivery_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        }
    }

    fn machine(id: i64, family: ProcessFamily, capacity: f64, setup: i64) -> Machine {
        Machine {
            id,
            process_family: family,
            capacity_kg_per_hour: capacity,
            base_setup_minutes: setup,
            is_available: true,
        }
    }

    #[test]
    fn scenario_b_waste_on_transition() {
        let o1 = order(1, ProcessFamily::Extrusion, 100.0, "red");
        let o2 = order(2, ProcessFamily::Extrusion, 100.0, "red");
        let m = machine(1, ProcessFamily::Extrusion, 100.0, 30);
        let task = task_with(vec![o1, o2], vec![m]);

        let schedule = decode(&[(1, 1), (2, 1)], &task).unwrap();
        let metrics = evaluate(&schedule, &task);
        assert!((metrics.total_waste_kg - 2.0).abs() < 1e-9);
    }

    #[test]
    fn scenario_c_cross_family_independent_machines() {
        let o1 = order(1, ProcessFamily::Extrusion, 100.0, "red");
        let o2 = order(2, ProcessFamily::Ringing, 100.0, "red");
        let m1 = machine(1, ProcessFamily::Extrusion, 100.0, 30);
        let m2 = machine(2, ProcessFamily::Ringing, 100.0, 30);
        let task = task_with(vec![o1, o2], vec![m1, m2]);

        let schedule = decode(&[(1, 1), (2, 2)], &task).unwrap();
        let metrics = evaluate(&schedule, &task);
        assert_eq!(metrics.total_waste_kg, 0.0);
    }

    #[test]
    fn utilization_is_bounded() {
        let o1 = order(1, ProcessFamily::Extrusion, 100.0, "red");
        let m = machine(1, ProcessFamily::Extrusion, 10.0, 30);
        let task = task_with(vec![o1], vec![m]);
        let schedule = decode(&[(1, 1)], &task).unwrap();
        let metrics = evaluate(&schedule, &task);
        for util in metrics.equipment_utilization.values() {
            assert!(*util >= 0.0 && *util <= 1.0);
        }
    }

    #[test]
    fn dominance_requires_strict_improvement() {
        assert!(!dominates((1.0, 1.0), (1.0, 1.0)));
        assert!(dominates((1.0, 1.0), (1.0, 2.0)));
        assert!(dominates((0.5, 2.0), (1.0, 2.0)));
        assert!(!dominates((1.0, 2.0), (0.5, 2.0)));
    }
}
