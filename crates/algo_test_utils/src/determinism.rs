//! Determinism testing utilities.
//!
//! Turn plans must be a pure function of the snapshot: the same board,
//! balances and configuration always commit the same actions in the same
//! order. Sources of non-determinism to watch for:
//!
//! - **Floating-point math**: all balances and damage use
//!   [`algo_core::math::Fixed`].
//! - **HashMap iteration order**: boards are kept in ordered maps and
//!   candidates are ranked with explicit tie-breaks.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps played per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let mut unique = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Planning is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash any hashable value with a fixed-key hasher.
#[must_use]
pub fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Replay `steps` steps from a fresh state `runs` times and compare hashes.
///
/// # Example
///
/// ```ignore
/// let result = verify_determinism(
///     3,
///     5,
///     || (funded_sandbox(20, 10), Agent::on_game_start(config.clone(), catalog.clone())),
///     |(engine, agent)| { agent.on_turn(engine); },
///     |(engine, _)| hash_of(engine.submitted_turns()),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..steps {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}
