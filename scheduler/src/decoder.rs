//! Turns an assignment vector (one `(order_id, machine_id)` pair per order)
//! into a concrete, time-ordered schedule by simulating per-machine queues.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::cost::setup_minutes;
use crate::types::{EngineError, Order, ScheduleItem, Task};

struct MachineCursor {
    last_end: DateTime<Utc>,
    last_order_id: Option<i64>,
}

/// Decodes an assignment vector into a schedule.
///
/// The pairs are stable-sorted by `(priority, delivery_date)` before
/// decoding so that sequencing is reproducible regardless of the order the
/// caller's assignment vector happened to list orders in. An assignment
/// referencing an order or machine id absent from `task` is an internal
/// consistency violation and returns `Err`.
pub fn decode(
    assignment: &[(i64, i64)],
    task: &Task,
) -> Result<Vec<ScheduleItem>, EngineError> {
    let order_lookup = task.order_lookup();
    let machine_lookup = task.machine_lookup();

    for (order_id, machine_id) in assignment {
        if !order_lookup.contains_key(order_id) {
            return Err(EngineError::UnknownReference(format!("order {order_id}")));
        }
        if !machine_lookup.contains_key(machine_id) {
            return Err(EngineError::UnknownReference(format!("machine {machine_id}")));
        }
    }

    let mut sorted: Vec<(usize, (i64, i64))> =
        assignment.iter().copied().enumerate().collect();
    sorted.sort_by(|(_, (a_order, _)), (_, (b_order, _))| {
        let a = *order_lookup.get(a_order).expect("validated above");
        let b = *order_lookup.get(b_order).expect("validated above");
        a.priority
            .cmp(&b.priority)
            .then(a.delivery_date.cmp(&b.delivery_date))
    });

    let mut cursors: HashMap<i64, MachineCursor> = HashMap::new();
    let mut schedule = Vec::with_capacity(assignment.len());

    for (_, (order_id, machine_id)) in sorted {
        let order: &Order = *order_lookup.get(&order_id).expect("validated above");
        let machine = *machine_lookup.get(&machine_id).expect("validated above");

        let cursor = cursors.entry(machine_id).or_insert(MachineCursor {
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

    Ok(schedule)
}

pub(crate) fn processing_minutes(quantity_kg: f64, capacity_kg_per_hour: f64) -> i64 {
    let capacity = if capacity_kg_per_hour > 0.0 {
        capacity_kg_per_hour
    } else {
        crate::types::DEFAULT_CAPACITY_KG_PER_HOUR
    };
    let minutes = ((quantity_kg / capacity) * 60.0).trunc() as i64;
    minutes.max(1)
}
