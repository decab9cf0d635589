//! Standalone demo: builds a synthetic task and runs the hybrid optimizer
//! once, printing the resulting schedule.

use packplan_scheduler::config::{BbConfig, GaConfig};
use packplan_scheduler::types::{Machine, Order, Task};
use packplan_scheduler::{branch_bound, genetic, hybrid};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("packplan_scheduler=info")
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║         PACKPLAN SCHEDULER — demo optimization run        ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let task = synthetic_task()?;
    info!(orders = task.orders.len(), machines = task.machines.len(), "built synthetic task");

    let ga_config = GaConfig::default();
    let bb_config = BbConfig::default();

    let result = hybrid::optimize(&task, &ga_config, &bb_config, Some(42))?;
    info!(
        waste_kg = result.total_waste_kg,
        processing_hours = result.total_processing_hours,
        makespan_hours = result.makespan_hours,
        optimization_time_seconds = result.optimization_time_seconds,
        "hybrid optimizer complete"
    );

    for item in &result.schedule {
        println!("{item:?}");
    }

    // Run the two algorithms directly too, to show the knobs are independently reachable.
    let mut rng = StdRng::seed_from_u64(42);
    let ga_only = genetic::optimize(&task, &ga_config, &mut rng)?;
    info!(waste_kg = ga_only.total_waste_kg, "genetic-only run complete");

    let bb_only = branch_bound::optimize(&task, &bb_config, Some(42))?;
    info!(waste_kg = bb_only.total_waste_kg, "branch-and-bound-only run complete");

    Ok(())
}

fn synthetic_task() -> anyhow::Result<Task> {
    let colors = ["red", "blue", "green"];
    let families = ["extrusion", "ringing", "corrugation_soft", "corrugation_hard"];

    let mut orders = Vec::new();
    for i in 1..=12_i64 {
        let family = families[(i as usize - 1) % families.len()];
        let color = colors[(i as usize) % colors.len()];
        let caliber = if family == "ringing" {
            Some(format!("D{}", 80 + (i * 20) % 300))
        } else {
            None
        };
        let order = Order::new(
            i,
            family,
            (i % 3) + 1,
            80.0 + (i as f64) * 5.0,
            ((i % 3) + 1) as i32,
            &format!("2026-02-{:02}", 1 + (i as u32 % 27)),
            Some(color.to_string()),
            caliber,
            None,
        )?;
        orders.push(order);
    }

    let mut machines = Vec::new();
    for (idx, family) in families.iter().enumerate() {
        machines.push(Machine::new((idx as i64) + 1, family, Some(90.0), Some(30), true)?);
    }

    Ok(Task::new(orders, machines, "2026-02-01T06:00:00Z", 720.0)?)
}
