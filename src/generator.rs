//! Random puzzle generation.
//!
//! A puzzle is built in four steps: share the colored cells out between the
//! colors, shuffle them into one pool, pour the pool into bottles front to
//! back, then carve free space off the bottle tops. Nothing here checks
//! solvability; [`generate_verified`] hands the result to the solver when the
//! configured [`AcceptancePolicy`] asks for it.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{AcceptancePolicy, CarvePolicy, ColorPolicy, Config};
use crate::error::GenerationError;
use crate::model::{Bottle, Color, PuzzleState};
use crate::solver::Solver;

/// Number of cells of each color, for colors `1..=K`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorCounts {
    counts: Vec<usize>,
}

impl ColorCounts {
    pub fn from_counts(counts: Vec<usize>) -> Self {
        Self { counts }
    }

    /// Count the colors actually present in a state. Colors above `colors`
    /// extend the table.
    pub fn from_state(state: &PuzzleState, colors: usize) -> Self {
        let mut counts = vec![0; colors];
        for (color, count) in state.get_available_colors_with_count() {
            if color > counts.len() {
                counts.resize(color, 0);
            }
            counts[color - 1] = count;
        }
        Self { counts }
    }

    pub fn get(&self, color: Color) -> usize {
        color
            .checked_sub(1)
            .and_then(|index| self.counts.get(index))
            .copied()
            .unwrap_or(0)
    }

    pub fn get_color_count(&self) -> usize {
        self.counts.len()
    }

    pub fn get_total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Color, usize)> + '_ {
        self.counts.iter().enumerate().map(|(index, &count)| (index + 1, count))
    }

    /// Colors that were requested but received no cells.
    pub fn unused_colors(&self) -> Vec<Color> {
        self.iter().filter(|&(_, count)| count == 0).map(|(color, _)| color).collect()
    }

    /// Expand into a flat pool, color 1 first.
    pub fn to_cells(&self) -> Vec<Color> {
        self.iter()
            .flat_map(|(color, count)| std::iter::repeat_n(color, count))
            .collect()
    }
}

/// A generated arrangement together with the distribution it holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    pub state: PuzzleState,
    pub counts: ColorCounts,
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

fn uniform_counts<R: Rng>(config: &Config, rng: &mut R) -> Vec<usize> {
    let max_per_color = config.get_max_cells_per_color();
    let mut counts = vec![0; config.get_colors()];
    let mut remaining = config.get_colored_cells();
    while remaining > 0 {
        let index = rng.random_range(0..counts.len());
        if counts[index] < max_per_color {
            counts[index] += 1;
            remaining -= 1;
        }
    }
    counts
}

fn guaranteed_minimum_counts<R: Rng>(config: &Config, rng: &mut R) -> Vec<usize> {
    let colors = config.get_colors();
    let max_per_color = config.get_max_cells_per_color();
    let mut counts = vec![1; colors];
    let mut remaining = config.get_colored_cells().saturating_sub(colors);

    // Each color may take at most a fair share of what is left, so later
    // colors are not starved by the early draws.
    for index in 0..colors {
        let share = remaining / (colors - index);
        let extra = rng.random_range(0..=share.min(max_per_color - counts[index]));
        counts[index] += extra;
        remaining -= extra;
    }

    while remaining > 0 {
        let index = rng.random_range(0..colors);
        if counts[index] < max_per_color {
            counts[index] += 1;
            remaining -= 1;
        }
    }
    counts
}

/// Share the colored cells out between the colors according to the
/// configured [`ColorPolicy`].
pub fn generate_color_counts<R: Rng>(
    config: &Config,
    rng: &mut R,
) -> Result<ColorCounts, GenerationError> {
    let counts = ColorCounts::from_counts(match config.get_color_policy() {
        ColorPolicy::Uniform => uniform_counts(config, rng),
        ColorPolicy::GuaranteedMinimum => guaranteed_minimum_counts(config, rng),
        ColorPolicy::WholeBottles => vec![config.get_capacity(); config.get_colors()],
    });

    let expected = config.get_colored_cells();
    if counts.get_total() != expected {
        return Err(GenerationError::Inconsistent {
            expected,
            actual: counts.get_total(),
        });
    }
    let unused = counts.unused_colors();
    if !unused.is_empty() {
        warn!("Colors {:?} received no cells.", unused);
    }
    Ok(counts)
}

fn fill_bottles(cells: Vec<Color>, bottles: usize, capacity: usize) -> Vec<Bottle> {
    let mut filled: Vec<Bottle> = (0..bottles).map(|_| Bottle::new(capacity)).collect();
    let mut cells = cells.into_iter();
    for bottle in filled.iter_mut() {
        while !bottle.is_full() {
            match cells.next() {
                Some(color) => {
                    bottle.add_color(color);
                }
                None => return filled,
            }
        }
    }
    filled
}

/// Pop one top cell per non-empty bottle per pass until `to_remove` cells are
/// gone or every bottle is empty. Returns how many cells were removed.
fn carve_tops(bottles: &mut [Bottle], mut to_remove: usize) -> usize {
    let mut removed = 0;
    while to_remove > 0 && bottles.iter().any(|b| !b.is_empty()) {
        for bottle in bottles.iter_mut() {
            if to_remove == 0 {
                break;
            }
            if bottle.pop_color().is_some() {
                to_remove -= 1;
                removed += 1;
            }
        }
    }
    removed
}

/// Generate one arrangement with the given randomness source. The result is
/// not checked for solvability.
pub fn generate_with_rng<R: Rng>(
    config: &Config,
    rng: &mut R,
) -> Result<Generated, GenerationError> {
    let mut counts = generate_color_counts(config, rng)?;

    let mut cells = counts.to_cells();
    cells.shuffle(rng);

    let mut bottles = fill_bottles(cells, config.get_bottles(), config.get_capacity());

    let free: usize = bottles.iter().map(Bottle::get_empty_space).sum();
    let to_remove = match config.get_carve_policy() {
        CarvePolicy::FreeSpace => config.get_empty().saturating_sub(free),
        CarvePolicy::DiscardTops => config.get_empty(),
    };
    let removed = carve_tops(&mut bottles, to_remove);

    let state = PuzzleState::new(bottles);
    if removed > 0 {
        debug!("Discarded {} top cells.", removed);
        counts = ColorCounts::from_state(&state, config.get_colors());
    }
    Ok(Generated { state, counts })
}

/// Generate one arrangement, seeded from `seed` or from the OS when `None`.
pub fn generate_puzzle(config: &Config, seed: Option<u64>) -> Result<PuzzleState, GenerationError> {
    let mut rng = seeded_rng(seed);
    Ok(generate_with_rng(config, &mut rng)?.state)
}

/// Generate an arrangement and apply the configured [`AcceptancePolicy`].
pub fn generate_verified_with_rng<R: Rng>(
    config: &Config,
    rng: &mut R,
) -> Result<Generated, GenerationError> {
    let max_attempts = match config.get_acceptance() {
        AcceptancePolicy::AcceptFirst => return generate_with_rng(config, rng),
        AcceptancePolicy::RequireSolvable { max_attempts } => max_attempts,
    };
    for attempt in 1..=max_attempts {
        let generated = generate_with_rng(config, rng)?;
        let outcome = Solver::new(generated.state.clone(), config.get_search_cap()).run();
        if outcome.is_solved() {
            info!(
                "Found a solvable puzzle on attempt {} after {} expansions.",
                attempt,
                outcome.get_expansions()
            );
            return Ok(generated);
        }
        debug!("Attempt {} is not solvable ({:?}), regenerating.", attempt, outcome);
    }
    Err(GenerationError::Unsolvable {
        attempts: max_attempts,
    })
}

pub fn generate_verified(config: &Config, seed: Option<u64>) -> Result<PuzzleState, GenerationError> {
    let mut rng = seeded_rng(seed);
    Ok(generate_verified_with_rng(config, &mut rng)?.state)
}

/// Generate and verify one puzzle per seed. Each puzzle is an independent
/// job on the rayon pool; results keep the order of `seeds`.
pub fn generate_batch(config: &Config, seeds: &[u64]) -> Vec<Result<PuzzleState, GenerationError>> {
    seeds
        .par_iter()
        .map(|&seed| generate_verified(config, Some(seed)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::error::ConfigError;

    fn whole_bottles() -> Config {
        ConfigBuilder::new(4, 3, 2, 6)
            .color_policy(ColorPolicy::WholeBottles)
            .build()
            .unwrap()
    }

    #[test]
    fn uniform_counts_sum_to_colored_cells() {
        let config = Config::new(6, 4, 4, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let counts = generate_color_counts(&config, &mut rng).unwrap();
            assert_eq!(counts.get_total(), 20);
            assert_eq!(counts.get_color_count(), 4);
        }
    }

    #[test]
    fn guaranteed_minimum_never_starves_a_color() {
        let config = ConfigBuilder::new(10, 3, 9, 3)
            .color_policy(ColorPolicy::GuaranteedMinimum)
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let counts = generate_color_counts(&config, &mut rng).unwrap();
            assert_eq!(counts.get_total(), 27);
            assert!(counts.unused_colors().is_empty());
            assert!(counts.iter().all(|(_, c)| c <= config.get_max_cells_per_color()));
        }
    }

    #[test]
    fn whole_bottles_gives_capacity_per_color() {
        let mut rng = StdRng::seed_from_u64(3);
        let counts = generate_color_counts(&whole_bottles(), &mut rng).unwrap();
        assert_eq!(counts, ColorCounts::from_counts(vec![3, 3]));
        assert_eq!(counts.get(2), 3);
        assert_eq!(counts.get(0), 0);
        assert_eq!(counts.get(3), 0);
    }

    #[test]
    fn fills_bottles_front_to_back() {
        let bottles = fill_bottles(vec![1, 2, 3, 4, 5], 3, 2);
        assert_eq!(
            PuzzleState::new(bottles).canonical_key(),
            vec![vec![1, 2], vec![3, 4], vec![5]]
        );
    }

    #[test]
    fn carving_goes_round_robin() {
        let mut bottles = fill_bottles(vec![1, 1, 2, 2, 3], 3, 2);
        assert_eq!(carve_tops(&mut bottles, 4), 4);
        assert_eq!(
            PuzzleState::new(bottles).canonical_key(),
            vec![vec![], vec![2], vec![]]
        );
    }

    #[test]
    fn carving_stops_when_everything_is_empty() {
        let mut bottles = fill_bottles(vec![1, 2], 2, 2);
        assert_eq!(carve_tops(&mut bottles, 10), 2);
        assert!(bottles.iter().all(Bottle::is_empty));
    }

    #[test]
    fn generated_state_has_expected_shape() {
        let config = Config::new(6, 4, 4, 4).unwrap();
        let generated = generate_with_rng(&config, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(generated.state.len(), 6);
        assert_eq!(generated.state.get_filled_cells_count(), 20);
        assert_eq!(generated.state.get_empty_spaces_count(), 4);
        assert_eq!(
            ColorCounts::from_state(&generated.state, 4),
            generated.counts
        );
    }

    #[test]
    fn discard_tops_removes_extra_cells() {
        let config = ConfigBuilder::new(6, 4, 4, 4)
            .carve_policy(CarvePolicy::DiscardTops)
            .build()
            .unwrap();
        let generated = generate_with_rng(&config, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(generated.state.get_filled_cells_count(), 16);
        assert_eq!(generated.counts.get_total(), 16);
        assert_eq!(
            ColorCounts::from_state(&generated.state, 4),
            generated.counts
        );
    }

    #[test]
    fn same_seed_same_puzzle() {
        let config = Config::new(8, 4, 6, 8).unwrap();
        assert_eq!(
            generate_puzzle(&config, Some(42)).unwrap(),
            generate_puzzle(&config, Some(42)).unwrap()
        );
    }

    #[test]
    fn accept_first_skips_the_search() {
        // Every seed gives colors {1: 1, 2: 1}, which can never fill a bottle.
        let config = ConfigBuilder::new(2, 2, 2, 2)
            .color_policy(ColorPolicy::GuaranteedMinimum)
            .acceptance(AcceptancePolicy::AcceptFirst)
            .build()
            .unwrap();
        let state = generate_verified(&config, Some(9)).unwrap();
        assert_eq!(state.get_filled_cells_count(), 2);
        assert!(!state.is_solved());
    }

    #[test]
    fn require_solvable_reports_unsolvable() {
        let config = ConfigBuilder::new(2, 2, 2, 2)
            .color_policy(ColorPolicy::GuaranteedMinimum)
            .acceptance(AcceptancePolicy::RequireSolvable { max_attempts: 5 })
            .build()
            .unwrap();
        assert_eq!(
            generate_verified(&config, Some(9)),
            Err(GenerationError::Unsolvable { attempts: 5 })
        );
    }

    #[test]
    fn require_solvable_returns_a_solvable_puzzle() {
        let config = whole_bottles();
        let state = generate_verified(&config, Some(2024)).unwrap();
        assert!(Solver::new(state, config.get_search_cap()).run().is_solved());
    }

    #[test]
    fn default_config_always_produces_a_puzzle() {
        for (bottles, capacity, colors, empty) in [(6, 4, 4, 8), (8, 4, 6, 8), (12, 4, 10, 8)] {
            let config = Config::new(bottles, capacity, colors, empty).unwrap();
            for seed in 0..20 {
                let state = generate_verified(&config, Some(seed)).unwrap();
                assert_eq!(state.get_filled_cells_count(), config.get_colored_cells());
            }
        }
    }

    #[test]
    fn whole_bottles_by_default_requires_solvable() {
        let config = whole_bottles();
        for seed in 0..10 {
            let state = generate_verified(&config, Some(seed)).unwrap();
            assert!(Solver::new(state, config.get_search_cap()).run().is_solved());
        }
    }

    #[test]
    fn batch_keeps_seed_order() {
        let config = whole_bottles();
        let seeds = [1, 2, 3, 4];
        let batch = generate_batch(&config, &seeds);
        assert_eq!(batch.len(), 4);
        for (result, &seed) in batch.iter().zip(seeds.iter()) {
            assert_eq!(result, &generate_verified(&config, Some(seed)));
        }
    }

    #[test]
    fn config_errors_convert() {
        let err: GenerationError = ConfigError::NoColors(0).into();
        assert_eq!(err.to_string(), "number of colors must be at least 1, got 0");
    }
}
