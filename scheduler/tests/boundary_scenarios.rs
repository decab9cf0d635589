//! Literal boundary scenarios from the scheduling specification.

use packplan_scheduler::config::{BbConfig, GaConfig};
use packplan_scheduler::types::{Machine, Order, Task};
use packplan_scheduler::{branch_bound, hybrid};

fn order(
    id: i64,
    family: &str,
    material_id: i64,
    qty: f64,
    priority: i32,
    delivery_date: &str,
    color: Option<&str>,
    caliber: Option<&str>,
) -> Order {
    Order::new(
        id,
        family,
        material_id,
        qty,
        priority,
        delivery_date,
        color.map(str::to_string),
        caliber.map(str::to_string),
        None,
    )
    .unwrap()
}

fn machine(id: i64, family: &str, capacity: f64, setup: i64) -> Machine {
    Machine::new(id, family, Some(capacity), Some(setup), true).unwrap()
}

#[test]
fn scenario_a_single_order_single_machine() {
    let task = Task::new(
        vec![order(1, "extrusion", 1, 100.0, 1, "2026-02-01", Some("red"), None)],
        vec![machine(1, "extrusion", 100.0, 30)],
        "2026-01-01T00:00:00Z",
        720.0,
    )
    .unwrap();

    let result = branch_bound::optimize(&task, &BbConfig::default(), None).unwrap();
    assert_eq!(result.schedule.len(), 1);
    let item = &result.schedule[0];
    assert_eq!(item.setup_minutes, 30);
    assert_eq!(item.processing_minutes, 60);
    assert_eq!(result.total_waste_kg, 0.0);
    assert!((result.makespan_hours - 1.5).abs() < 1e-9);
}

#[test]
fn scenario_b_same_material_and_color_back_to_back() {
    let task = Task::new(
        vec![
            order(1, "extrusion", 1, 100.0, 1, "2026-02-01", Some("red"), None),
            order(2, "extrusion", 1, 100.0, 1, "2026-02-02", Some("red"), None),
        ],
        vec![machine(1, "extrusion", 100.0, 30)],
        "2026-01-01T00:00:00Z",
        720.0,
    )
    .unwrap();

    let result = branch_bound::optimize(&task, &BbConfig::default(), None).unwrap();
    assert!((result.total_waste_kg - 2.0).abs() < 1e-9);
    let second = result
        .schedule
        .iter()
        .find(|i| i.order_id == 2)
        .unwrap();
    assert_eq!(second.setup_minutes, 30);
}

#[test]
fn scenario_c_cross_family_orders_are_independent() {
    let task = Task::new(
        vec![
            order(1, "extrusion", 1, 100.0, 1, "2026-02-01", Some("red"), None),
            order(2, "ringing", 1, 100.0, 1, "2026-02-01", Some("red"), Some("D100")),
        ],
        vec![
            machine(1, "extrusion", 100.0, 30),
            machine(2, "ringing", 100.0, 30),
        ],
        "2026-01-01T00:00:00Z",
        720.0,
    )
    .unwrap();

    let result = branch_bound::optimize(&task, &BbConfig::default(), None).unwrap();
    assert_eq!(result.total_waste_kg, 0.0);
    assert_eq!(result.schedule.len(), 2);
}

#[test]
fn scenario_d_ringing_caliber_deltas() {
    let task = Task::new(
        vec![
            order(1, "ringing", 1, 100.0, 1, "2026-02-01", None, Some("D100")),
            order(2, "ringing", 1, 100.0, 1, "2026-02-02", None, Some("D140")),
            order(3, "ringing", 1, 100.0, 1, "2026-02-03", None, Some("D300")),
        ],
        vec![machine(1, "ringing", 100.0, 20)],
        "2026-01-01T00:00:00Z",
        720.0,
    )
    .unwrap();

    let result = branch_bound::optimize(&task, &BbConfig::default(), None).unwrap();
    assert!((result.total_waste_kg - 9.0).abs() < 1e-9);

    // decode() processes orders in (priority, delivery_date) order and pushes
    // schedule items in that same order, so the vector is already sequenced.
    assert_eq!(result.schedule[1].setup_minutes, 20);
    assert_eq!(result.schedule[2].setup_minutes, 21);
}

#[test]
fn scenario_e_branch_and_bound_never_loses_to_greedy() {
    let orders = vec![
        order(1, "extrusion", 1, 100.0, 1, "2026-02-05", Some("red"), None),
        order(2, "extrusion", 2, 100.0, 1, "2026-02-06", Some("blue"), None),
        order(3, "extrusion", 1, 100.0, 2, "2026-02-07", Some("red"), None),
        order(4, "extrusion", 2, 100.0, 2, "2026-02-08", Some("blue"), None),
    ];
    let task = Task::new(orders, vec![machine(1, "extrusion", 100.0, 30)], "2026-01-01T00:00:00Z", 720.0).unwrap();

    let bb_config = BbConfig::default();
    let ga_config = GaConfig::default();
    let exact = branch_bound::optimize(&task, &bb_config, None).unwrap();
    let routed = hybrid::optimize(&task, &ga_config, &bb_config, Some(7)).unwrap();

    assert!(exact.total_waste_kg <= routed.total_waste_kg + 1e-6);
    assert_eq!(routed.schedule.len(), 4);
}

#[test]
fn scenario_f_order_with_no_compatible_machine_is_dropped() {
    let orders = vec![
        order(1, "extrusion", 1, 100.0, 1, "2026-02-01", Some("red"), None),
        order(2, "corrugation_hard", 1, 100.0, 1, "2026-02-01", Some("red"), None),
    ];
    let task = Task::new(orders, vec![machine(1, "extrusion", 100.0, 30)], "2026-01-01T00:00:00Z", 720.0).unwrap();

    let result = branch_bound::optimize(&task, &BbConfig::default(), None).unwrap();
    assert_eq!(result.schedule.len(), 1);
    assert_eq!(result.schedule[0].order_id, 1);
}
