//! Exact search for small jobs, with a greedy fallback for everything else
//! (spec §4.5).

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};

use crate::config::BbConfig;
use crate::cost::{setup_minutes, waste};
use crate::decoder::processing_minutes;
use crate::evaluator::evaluate;
use crate::types::{EngineError, Order, OptimizationResult, ScheduleItem, Task};

/// Orders beyond this size skip the exact search entirely and go straight
/// to the greedy heuristic — the exponential blow-up makes exhaustive
/// search impractical regardless of the node budget.
const EXACT_SEARCH_ORDER_LIMIT: usize = 20;

struct SearchState {
    assigned: Vec<(i64, i64)>,
    remaining: Vec<i64>,
    machines: HashSet<i64>,
}

pub fn optimize(
    task: &Task,
    config: &BbConfig,
    rng_seed: Option<u64>,
) -> Result<OptimizationResult, EngineError> {
    config.validate()?;
    let start = Instant::now();

    if task.orders.len() > EXACT_SEARCH_ORDER_LIMIT {
        tracing::warn!(
            order_count = task.orders.len(),
            limit = EXACT_SEARCH_ORDER_LIMIT,
            "order count exceeds exact search limit, falling back to greedy heuristic"
        );
        return greedy_solve(task, start.elapsed().as_secs_f64());
    }

    let order_lookup = task.order_lookup();
    let initial = SearchState {
        assigned: Vec::new(),
        remaining: task.orders.iter().map(|o| o.id).collect(),
        machines: task.available_machines().map(|m| m.id).collect(),
    };

    let mut explorer = Explorer {
        task,
        order_lookup: &order_lookup,
        max_nodes: config.max_nodes,
        nodes_explored: 0,
        best_solution: None,
        best_value: f64::INFINITY,
    };
    explorer.search(initial);

    let optimization_time_seconds = start.elapsed().as_secs_f64();

    let Some(best_solution) = explorer.best_solution else {
        tracing::warn!(
            nodes_explored = explorer.nodes_explored,
            "branch and bound exhausted its node budget without a complete solution, falling back to greedy heuristic"
        );
        return greedy_solve(task, optimization_time_seconds);
    };

    let _ = rng_seed; // exact search is deterministic; seed is accepted for interface symmetry with the GA.

    tracing::info!(
        nodes_explored = explorer.nodes_explored,
        best_value = explorer.best_value,
        optimization_time_seconds,
        "branch and bound finished"
    );

    // Built directly from the search's own per-machine insertion order
    // (the same order `assigned_waste` used to accept this node), not
    // re-sorted by `(priority, delivery_date)` — keeping the reported
    // metrics identical to the ones the search selected this solution on.
    let schedule = build_schedule_in_assigned_order(&best_solution, task);
    let metrics = evaluate(&schedule, task);

    Ok(OptimizationResult {
        schedule,
        total_waste_kg: crate::types::round6(metrics.total_waste_kg),
        total_processing_hours: crate::types::round6(metrics.total_processing_hours),
        equipment_utilization: metrics.equipment_utilization,
        waste_reduction_percentage: 0.0,
        makespan_hours: crate::types::round6(metrics.makespan_hours),
        optimization_time_seconds,
    })
}

struct Explorer<'a> {
    task: &'a Task,
    order_lookup: &'a HashMap<i64, &'a Order>,
    max_nodes: u64,
    nodes_explored: u64,
    best_solution: Option<Vec<(i64, i64)>>,
    best_value: f64,
}

impl<'a> Explorer<'a> {
    fn search(&mut self, state: SearchState) {
        self.nodes_explored += 1;
        if self.nodes_explored > self.max_nodes {
            return;
        }

        if state.remaining.is_empty() {
            let value = evaluate_state(&state, self.order_lookup);
            if value < self.best_value {
                self.best_value = value;
                self.best_solution = Some(state.assigned.clone());
            }
            return;
        }

        let next_order_id = *state
            .remaining
            .iter()
            .min_by_key(|id| (self.order_lookup[id].delivery_date, **id))
            .expect("remaining is non-empty");
        let next_order = self.order_lookup[&next_order_id];

        let mut candidates = self.task.compatible_machines(next_order.process_family);
        candidates.sort_by_key(|m| m.id);

        if candidates.is_empty() {
            // No compatible machine exists for this order at all: drop it
            // from `remaining` and keep searching the rest, rather than
            // dead-ending the branch.
            let remaining = state
                .remaining
                .iter()
                .copied()
                .filter(|id| *id != next_order_id)
                .collect();
            self.search(SearchState {
                assigned: state.assigned.clone(),
                remaining,
                machines: state.machines.clone(),
            });
            return;
        }

        for machine in candidates {
            if !state.machines.contains(&machine.id) {
                continue;
            }
            let child = create_child_state(&state, next_order, machine.id);
            let lower_bound = lower_bound(&child, self.order_lookup);
            if lower_bound < self.best_value {
                self.search(child);
            }
        }
    }
}

fn create_child_state(state: &SearchState, order: &Order, machine_id: i64) -> SearchState {
    let mut assigned = state.assigned.clone();
    assigned.push((order.id, machine_id));
    let remaining = state.remaining.iter().copied().filter(|id| *id != order.id).collect();

    SearchState {
        assigned,
        remaining,
        machines: state.machines.clone(),
    }
}

/// Sum of waste already committed plus a floor of 1% of each remaining
/// order's quantity. Matches the original's minimal-waste-per-remaining
/// heuristic exactly — intentionally ignores setup time.
fn lower_bound(state: &SearchState, order_lookup: &HashMap<i64, &Order>) -> f64 {
    let mut total = assigned_waste(state, order_lookup);
    for order_id in &state.remaining {
        total += order_lookup[order_id].quantity_kg * 0.01;
    }
    total
}

fn evaluate_state(state: &SearchState, order_lookup: &HashMap<i64, &Order>) -> f64 {
    assigned_waste(state, order_lookup)
}

fn assigned_waste(state: &SearchState, order_lookup: &HashMap<i64, &Order>) -> f64 {
    let mut by_machine: HashMap<i64, Vec<i64>> = HashMap::new();
    for (order_id, machine_id) in &state.assigned {
        by_machine.entry(*machine_id).or_default().push(*order_id);
    }
    let mut total = 0.0;
    for order_ids in by_machine.values() {
        let mut prev: Option<&Order> = None;
        for order_id in order_ids {
            let order = order_lookup[order_id];
            if let Some(prev) = prev {
                total += order.quantity_kg * waste(prev, order);
            }
            prev = Some(order);
        }
    }
    total
}

/// Replays an assignment vector in its own given order — unlike
/// `decoder::decode`, this never re-sorts by `(priority, delivery_date)`.
/// The exact search's `assigned_waste`/`lower_bound` score each node by
/// walking `assigned` in the order orders were branched on (earliest
/// delivery date), so the returned schedule has to keep that same order
/// to report the waste figure the search actually selected on.
fn build_schedule_in_assigned_order(assigned: &[(i64, i64)], task: &Task) -> Vec<ScheduleItem> {
    let order_lookup = task.order_lookup();
    let machine_lookup = task.machine_lookup();

    struct Cursor {
        last_end: DateTime<Utc>,
        last_order_id: Option<i64>,
    }
    let mut cursors: HashMap<i64, Cursor> = HashMap::new();
    let mut schedule = Vec::with_capacity(assigned.len());

    for &(order_id, machine_id) in assigned {
        let order = order_lookup[&order_id];
        let machine = machine_lookup[&machine_id];
        let cursor = cursors.entry(machine_id).or_insert(Cursor {
            last_end: task.start_time,
            last_order_id: None,
        });
        let prev_order = cursor.last_order_id.and_then(|id| order_lookup.get(&id).copied());

        let setup = setup_minutes(order, machine, prev_order);
        let processing = processing_minutes(order.quantity_kg, machine.capacity_kg_per_hour);

        let scheduled_start = cursor.last_end + Duration::minutes(setup);
        let scheduled_end = scheduled_start + Duration::minutes(processing);

        schedule.push(ScheduleItem {
            order_id,
            machine_id,
            scheduled_start,
            scheduled_end,
            setup_minutes: setup,
            processing_minutes: processing,
        });

        cursor.last_end = scheduled_end;
        cursor.last_order_id = Some(order_id);
    }

    schedule
}

/// Sorts by `(priority, delivery_date, id)` and assigns each order to
/// whichever compatible machine's real projected completion time is
/// earliest (ties: lowest machine id). Used both as the B&B fallback and
/// directly for jobs above [`EXACT_SEARCH_ORDER_LIMIT`].
fn greedy_solve(task: &Task, optimization_time_seconds: f64) -> Result<OptimizationResult, EngineError> {
    let mut sorted_orders: Vec<&Order> = task.orders.iter().collect();
    sorted_orders.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.delivery_date.cmp(&b.delivery_date))
            .then(a.id.cmp(&b.id))
    });

    let order_lookup = task.order_lookup();
    let machine_lookup = task.machine_lookup();

    struct Cursor {
        last_end: DateTime<Utc>,
        last_order_id: Option<i64>,
    }
    let mut cursors: HashMap<i64, Cursor> = task
        .available_machines()
        .map(|m| (m.id, Cursor { last_end: task.start_time, last_order_id: None }))
        .collect();

    let mut schedule = Vec::with_capacity(sorted_orders.len());
    for order in sorted_orders {
        let mut suitable = task.compatible_machines(order.process_family);
        if suitable.is_empty() {
            tracing::warn!(order_id = order.id, "no compatible available machine, order dropped");
            continue;
        }
        suitable.sort_by_key(|m| m.id);
        let best_id = suitable
            .iter()
            .min_by_key(|m| (cursors[&m.id].last_end, m.id))
            .expect("non-empty")
            .id;

        let machine = machine_lookup[&best_id];
        let cursor = cursors.get_mut(&best_id).expect("best_id came from cursors' own keys");
        let prev_order = cursor.last_order_id.and_then(|id| order_lookup.get(&id).copied());

        let setup = setup_minutes(order, machine, prev_order);
        let processing = processing_minutes(order.quantity_kg, machine.capacity_kg_per_hour);

        let scheduled_start = cursor.last_end + Duration::minutes(setup);
        let scheduled_end = scheduled_start + Duration::minutes(processing);

        schedule.push(ScheduleItem {
            order_id: order.id,
            machine_id: best_id,
            scheduled_start,
            scheduled_end,
            setup_minutes: setup,
            processing_minutes: processing,
        });

        cursor.last_end = scheduled_end;
        cursor.last_order_id = Some(order.id);
    }

    let metrics = evaluate(&schedule, task);

    tracing::info!(
        order_count = schedule.len(),
        optimization_time_seconds,
        "greedy heuristic finished"
    );

    Ok(OptimizationResult {
        schedule,
        total_waste_kg: crate::types::round6(metrics.total_waste_kg),
        total_processing_hours: crate::types::round6(metrics.total_processing_hours),
        equipment_utilization: metrics.equipment_utilization,
        waste_reduction_percentage: 0.0,
        makespan_hours: crate::types::round6(metrics.makespan_hours),
        optimization_time_seconds,
    })
}
