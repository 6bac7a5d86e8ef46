//! Randomized level selection.
//!
//! A new node always participates in level 0 and is promoted one level at
//! a time, each promotion with probability 1/2, until a coin flip fails or
//! the cap is hit. Heights therefore follow a geometric distribution: a
//! node reaches height k with probability 2^-(k-1) and the expected height
//! is 2. That distribution is the entire balancing act - searches descend
//! through O(log n) expected levels and no restructuring ever happens.

use oorandom::Rand32;

/// The tallest any node can be. Roughly one draw in 2^31 reaches the cap.
pub const MAX_LEVEL: usize = 32;

/// Draws node heights for one list.
///
/// Every list owns a generator seeded from OS entropy at construction, so
/// no two lists share a random stream. Cloning a list copies the stream
/// state; the clone advances independently afterwards.
#[derive(Clone, Debug)]
pub struct LevelGenerator {
    rng: Rand32,
}

impl LevelGenerator {
    /// A generator seeded from OS entropy.
    pub fn new() -> LevelGenerator {
        let mut seed = [0u8; 8];
        getrandom::fill(&mut seed).expect("no OS entropy to seed the level generator");
        LevelGenerator::with_seed(u64::from_le_bytes(seed))
    }

    /// A generator with a fixed seed, for reproducible layouts in tests.
    pub fn with_seed(seed: u64) -> LevelGenerator {
        LevelGenerator {
            rng: Rand32::new(seed),
        }
    }

    /// Draw a height in 1..=MAX_LEVEL: one base level, plus one more per
    /// consecutive won coin flip.
    pub fn random_level(&mut self) -> usize {
        let mut level = 1;
        while level < MAX_LEVEL && self.rng.rand_u32() % 2 == 0 {
            level += 1;
        }
        level
    }
}

impl Default for LevelGenerator {
    fn default() -> LevelGenerator {
        LevelGenerator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_stay_in_range() {
        let mut levels = LevelGenerator::with_seed(7);
        for _ in 0..10_000 {
            let height = levels.random_level();
            assert!(height >= 1 && height <= MAX_LEVEL);
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = LevelGenerator::with_seed(42);
        let mut b = LevelGenerator::with_seed(42);
        for _ in 0..1_000 {
            assert_eq!(a.random_level(), b.random_level());
        }
    }

    #[test]
    fn fresh_generators_diverge() {
        // Entropy seeding makes identical streams vanishingly unlikely.
        let mut a = LevelGenerator::new();
        let mut b = LevelGenerator::new();
        let draws_a: Vec<usize> = (0..64).map(|_| a.random_level()).collect();
        let draws_b: Vec<usize> = (0..64).map(|_| b.random_level()).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn heights_follow_geometric_falloff() {
        let mut levels = LevelGenerator::with_seed(1234);
        let draws = 10_000;
        let mut ones = 0;
        for _ in 0..draws {
            if levels.random_level() == 1 {
                ones += 1;
            }
        }
        // About half the draws should stop at the first flip.
        assert!(
            ones > draws * 2 / 5 && ones < draws * 3 / 5,
            "{} of {} draws had height 1",
            ones,
            draws
        );
    }
}
