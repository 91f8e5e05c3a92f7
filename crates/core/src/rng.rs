//! RNG module - seeded piece generation
//!
//! Implements the "7-bag" randomizer: each bag contains one of each piece
//! (I, O, T, S, Z, J, L), shuffled, drawn until empty and then refilled.
//! A uniform randomizer (independent draws) is available as a variant.
//!
//! Both are driven by a simple LCG so a seed fully determines the sequence.

use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::types::{PieceKind, Randomizer, NEXT_QUEUE_LEN};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Current internal state, usable as a seed to continue the sequence
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Upcoming-piece generator with a fixed lookahead of [`NEXT_QUEUE_LEN`]
#[derive(Debug, Clone)]
pub struct PieceQueue {
    randomizer: Randomizer,
    bag: ArrayVec<PieceKind, 7>,
    rng: SimpleRng,
    /// Already generated pieces, front is the next to be drawn
    lookahead: VecDeque<PieceKind>,
}

impl PieceQueue {
    /// Create a 7-bag queue with the given seed
    pub fn new(seed: u32) -> Self {
        Self::with_randomizer(seed, Randomizer::SevenBag)
    }

    pub fn with_randomizer(seed: u32, randomizer: Randomizer) -> Self {
        let mut queue = Self {
            randomizer,
            bag: ArrayVec::new(),
            rng: SimpleRng::new(seed),
            lookahead: VecDeque::with_capacity(NEXT_QUEUE_LEN + 1),
        };
        while queue.lookahead.len() < NEXT_QUEUE_LEN {
            let kind = queue.generate();
            queue.lookahead.push_back(kind);
        }
        queue
    }

    fn generate(&mut self) -> PieceKind {
        match self.randomizer {
            Randomizer::SevenBag => {
                if self.bag.is_empty() {
                    self.bag.extend(PieceKind::ALL);
                    self.rng.shuffle(&mut self.bag);
                }
                // Draw from the back; the bag is already shuffled.
                self.bag.pop().unwrap_or(PieceKind::I)
            }
            Randomizer::Uniform => PieceKind::ALL[self.rng.next_range(7) as usize],
        }
    }

    /// Draw the next piece from the queue
    pub fn draw(&mut self) -> PieceKind {
        let next = self.generate();
        self.lookahead.push_back(next);
        self.lookahead.pop_front().unwrap_or(next)
    }

    /// Peek at the next piece without removing it
    pub fn peek(&self) -> Option<PieceKind> {
        self.lookahead.front().copied()
    }

    /// The upcoming pieces, next first
    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.lookahead.iter().copied()
    }

    pub fn randomizer(&self) -> Randomizer {
        self.randomizer
    }

    /// Current RNG state (for restarting with a continued sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);
        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_seven_bag_aligned_groups_are_permutations() {
        let mut queue = PieceQueue::new(42);
        for _ in 0..20 {
            let mut group: Vec<PieceKind> = (0..7).map(|_| queue.draw()).collect();
            group.sort_by_key(|k| k.tag());
            assert_eq!(group, PieceKind::ALL.to_vec());
        }
    }

    #[test]
    fn test_seven_bag_streak_and_gap_bounds() {
        for seed in 1..50 {
            let mut queue = PieceQueue::new(seed);
            let draws: Vec<PieceKind> = (0..700).map(|_| queue.draw()).collect();

            let mut streak = 1;
            for pair in draws.windows(2) {
                streak = if pair[0] == pair[1] { streak + 1 } else { 1 };
                assert!(streak <= 2, "seed {} streak {}", seed, streak);
            }

            for kind in PieceKind::ALL {
                let positions: Vec<usize> = draws
                    .iter()
                    .enumerate()
                    .filter(|(_, &k)| k == kind)
                    .map(|(i, _)| i)
                    .collect();
                for gap in positions.windows(2) {
                    assert!(gap[1] - gap[0] <= 13, "seed {} kind {:?}", seed, kind);
                }
            }
        }
    }

    #[test]
    fn test_peek_matches_draw() {
        let mut queue = PieceQueue::new(7);
        for _ in 0..30 {
            let upcoming: Vec<_> = queue.upcoming().collect();
            assert_eq!(upcoming.len(), NEXT_QUEUE_LEN);
            assert_eq!(queue.peek(), Some(upcoming[0]));
            assert_eq!(queue.draw(), upcoming[0]);
            assert_eq!(queue.peek(), Some(upcoming[1]));
        }
    }

    #[test]
    fn test_uniform_is_deterministic_and_covers_all_kinds() {
        let mut a = PieceQueue::with_randomizer(9, Randomizer::Uniform);
        let mut b = PieceQueue::with_randomizer(9, Randomizer::Uniform);
        let draws: Vec<_> = (0..200).map(|_| a.draw()).collect();
        let again: Vec<_> = (0..200).map(|_| b.draw()).collect();
        assert_eq!(draws, again);
        for kind in PieceKind::ALL {
            assert!(draws.contains(&kind));
        }
    }
}
