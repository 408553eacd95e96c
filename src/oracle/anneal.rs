//! Simulated annealing over bias lattices.
//!
//! Used when a lattice is too large to scan. Each move shifts one bias by
//! one lattice level; the cost is the total violation reported by
//! [`Lattice::evaluate`], so any zero-cost point is a valid realization.

use super::config::AnnealConfig;
use super::lattice::{Lattice, EPS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

const DEFAULT_SEED: u64 = 42;

/// Result of an annealing search.
#[derive(Debug, Clone)]
pub(crate) struct AnnealResult {
    /// Lattice digits of the lowest-cost point found.
    pub best: Vec<usize>,

    /// Cost of `best`; zero when a valid realization was found.
    pub best_cost: f64,

    /// Moves tried across all restarts.
    pub iterations: usize,

    /// Accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Improving moves.
    pub improving_moves: usize,
}

impl AnnealResult {
    pub fn is_valid(&self) -> bool {
        self.best_cost <= EPS
    }
}

/// Anneals `lattice` with `config.restarts` independent runs, stopping at
/// the first zero-cost point.
pub(crate) fn anneal(lattice: &Lattice, config: &AnnealConfig) -> AnnealResult {
    let seed = config.seed.unwrap_or(DEFAULT_SEED);

    let mut result = AnnealResult {
        best: vec![0; lattice.num_params()],
        best_cost: f64::INFINITY,
        iterations: 0,
        accepted_moves: 0,
        improving_moves: 0,
    };

    for restart in 0..config.restarts.max(1) {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(restart as u64));

        let mut current: Vec<usize> = lattice
            .levels()
            .iter()
            .map(|&n| rng.random_range(0..n))
            .collect();
        let mut energies = lattice.energies(&current);
        let mut current_cost = lattice.evaluate(&energies).cost;

        if current_cost < result.best_cost {
            result.best.clone_from(&current);
            result.best_cost = current_cost;
        }

        let mut temperature = config.initial_temperature;
        let mut moves = 0usize;
        let mut step = 0usize;

        'run: while temperature > config.min_temperature {
            for _ in 0..config.moves_per_temperature() {
                if result.best_cost <= EPS {
                    break 'run;
                }
                if config.max_iterations > 0 && moves >= config.max_iterations {
                    break 'run;
                }

                let Some((k, digit)) = neighbor(lattice, &current, &mut rng) else {
                    break 'run;
                };
                let shift = (digit as f64 - current[k] as f64) * lattice.step();
                lattice.shift(&mut energies, k, shift);
                let neighbor_cost = lattice.evaluate(&energies).cost;
                let delta = neighbor_cost - current_cost;

                // Metropolis acceptance criterion
                let accept = if delta < 0.0 {
                    result.improving_moves += 1;
                    true
                } else {
                    let probability = (-delta / temperature).exp();
                    rng.random_range(0.0..1.0) < probability
                };

                if accept {
                    current[k] = digit;
                    current_cost = neighbor_cost;
                    result.accepted_moves += 1;

                    if current_cost < result.best_cost {
                        result.best.clone_from(&current);
                        result.best_cost = current_cost;
                    }
                } else {
                    lattice.shift(&mut energies, k, -shift);
                }

                moves += 1;
            }

            temperature = config.next_temperature(temperature, step);
            step += 1;
        }

        result.iterations += moves;
        trace!(
            restart,
            moves,
            best_cost = result.best_cost,
            "annealing restart finished"
        );

        if result.best_cost <= EPS {
            break;
        }
    }

    result
}

/// Picks a parameter and its new lattice digit, one level up or down.
/// Parameters at the edge of their range move inward.
fn neighbor<R: Rng>(lattice: &Lattice, current: &[usize], rng: &mut R) -> Option<(usize, usize)> {
    let movable: Vec<usize> = (0..current.len())
        .filter(|&k| lattice.levels()[k] > 1)
        .collect();
    if movable.is_empty() {
        return None;
    }

    let k = movable[rng.random_range(0..movable.len())];
    let top = lattice.levels()[k] - 1;
    let digit = match current[k] {
        0 => 1,
        d if d == top => top - 1,
        d if rng.random_bool(0.5) => d + 1,
        d => d - 1,
    };
    Some((k, digit))
}
