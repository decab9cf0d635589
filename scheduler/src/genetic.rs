//! Population-based search over assignment vectors (spec §4.4).
//!
//! The positional encoding carries only machine assignment, not sequence —
//! the decoder's `(priority, delivery_date)` sort is the sole source of
//! ordering (see DESIGN.md for the open-question resolution).

use rand::Rng;
use std::time::Instant;

use crate::config::GaConfig;
use crate::decoder::decode;
use crate::evaluator::{evaluate, fitness, Fitness};
use crate::types::{EngineError, OptimizationResult, Task};

/// One candidate schedule: a machine id per order, positionally aligned to
/// `task.orders`.
type Individual = Vec<(i64, i64)>;

/// Runs the genetic search and returns a fully-formed result. `rng` is
/// caller-supplied so runs are reproducible with a seeded generator.
pub fn optimize(
    task: &Task,
    config: &GaConfig,
    rng: &mut impl Rng,
) -> Result<OptimizationResult, EngineError> {
    config.validate()?;
    let start = Instant::now();

    let mut population: Vec<Individual> = (0..config.population_size)
        .map(|_| create_individual(task, rng))
        .collect();

    for generation in 0..config.generations {
        let evaluated: Vec<(Individual, Fitness)> = population
            .iter()
            .map(|ind| {
                let schedule = decode(ind, task).expect("GA only ever assigns known ids");
                let metrics = evaluate(&schedule, task);
                (ind.clone(), fitness(&metrics))
            })
            .collect();

        if let Some((_, best_fit)) = evaluated
            .iter()
            .min_by(|(_, a), (_, b)| compare_fitness(*a, *b))
        {
            tracing::debug!(generation, waste = best_fit.0, hours = best_fit.1, "ga generation scored");
        }

        let mut next_population = Vec::with_capacity(config.population_size);
        while next_population.len() < config.population_size {
            let parent1 = tournament_select(&evaluated, config.tournament_size, rng);
            let parent2 = tournament_select(&evaluated, config.tournament_size, rng);

            let (mut child1, mut child2) = if rng.gen::<f64>() < config.crossover_probability {
                crossover(parent1, parent2, rng)
            } else {
                (parent1.clone(), parent2.clone())
            };

            mutate(&mut child1, task, config.mutation_probability, rng);
            mutate(&mut child2, task, config.mutation_probability, rng);

            next_population.push(child1);
            if next_population.len() < config.population_size {
                next_population.push(child2);
            }
        }
        population = next_population;
    }

    // The final answer is the best individual in the final population only
    // (no cross-generation elitism, matching the source).
    let (best_individual, _) = population
        .iter()
        .map(|ind| {
            let schedule = decode(ind, task).expect("GA only ever assigns known ids");
            let metrics = evaluate(&schedule, task);
            (ind.clone(), fitness(&metrics))
        })
        .min_by(|(_, a), (_, b)| compare_fitness(*a, *b))
        .expect("population_size >= 1 guarantees a best individual");

    let schedule = decode(&best_individual, task)?;
    let metrics = evaluate(&schedule, task);

    let optimization_time_seconds = start.elapsed().as_secs_f64();
    tracing::info!(
        population_size = config.population_size,
        generations = config.generations,
        optimization_time_seconds,
        "genetic optimizer finished"
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

fn compare_fitness(a: Fitness, b: Fitness) -> std::cmp::Ordering {
    a.0.partial_cmp(&b.0)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

fn create_individual(task: &Task, rng: &mut impl Rng) -> Individual {
    let mut individual = Vec::with_capacity(task.orders.len());
    let available: Vec<&crate::types::Machine> = task.available_machines().collect();

    for order in &task.orders {
        let suitable = task.compatible_machines(order.process_family);
        let chosen = if !suitable.is_empty() {
            suitable[rng.gen_range(0..suitable.len())]
        } else if !available.is_empty() {
            available[0]
        } else {
            continue;
        };
        individual.push((order.id, chosen.id));
    }
    individual
}

fn tournament_select<'a>(
    evaluated: &'a [(Individual, Fitness)],
    tournament_size: usize,
    rng: &mut impl Rng,
) -> &'a Individual {
    let n = evaluated.len();
    let k = tournament_size.min(n).max(1);

    let mut indices: Vec<usize> = (0..n).collect();
    // Fisher-Yates partial shuffle: draw k distinct contestants without replacement.
    for i in 0..k {
        let j = rng.gen_range(i..n);
        indices.swap(i, j);
    }

    indices[..k]
        .iter()
        .map(|&i| &evaluated[i])
        .min_by(|(_, a), (_, b)| compare_fitness(*a, *b))
        .map(|(ind, _)| ind)
        .expect("tournament_size >= 1 and population non-empty")
}

fn crossover(
    parent1: &Individual,
    parent2: &Individual,
    rng: &mut impl Rng,
) -> (Individual, Individual) {
    if parent1.len() != parent2.len() || parent1.len() < 2 {
        return (parent1.clone(), parent2.clone());
    }
    let cx = rng.gen_range(1..parent1.len());
    let mut child1 = parent1[..cx].to_vec();
    child1.extend_from_slice(&parent2[cx..]);
    let mut child2 = parent2[..cx].to_vec();
    child2.extend_from_slice(&parent1[cx..]);
    (child1, child2)
}

fn mutate(individual: &mut Individual, task: &Task, mutation_probability: f64, rng: &mut impl Rng) {
    let order_lookup = task.order_lookup();
    for gene in individual.iter_mut() {
        if rng.gen::<f64>() >= mutation_probability {
            continue;
        }
        let Some(order) = order_lookup.get(&gene.0) else {
            continue;
        };
        let suitable = task.compatible_machines(order.process_family);
        let alternatives: Vec<&crate::types::Machine> = suitable
            .into_iter()
            .filter(|m| m.id != gene.1)
            .collect();
        if !alternatives.is_empty() {
            gene.1 = alternatives[rng.gen_range(0..alternatives.len())].id;
        }
    }
}
