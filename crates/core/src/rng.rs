//! RNG module - token-bag piece randomizer
//!
//! Every piece type owns a token counter. A draw picks uniformly from a multiset in
//! which each type appears once per positive token, then rebalances: the winner
//! pays `NUM_TYPES - 1` tokens and every other type gains one. The token sum never
//! changes, so a type that has not been seen for a while keeps getting likelier.
//!
//! Unlike a strict 7-bag this never forbids an immediate repeat, yet the long-run
//! frequency of every type converges to `1/7` from any starting distribution.
//!
//! The underlying source is a small LCG so a seed fully determines the sequence.

use serde::{Deserialize, Serialize};

use crate::types::{PieceType, PIECE_TYPE_COUNT, STARTING_TOKENS};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
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
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales by the high bits; the low bits of an LCG have short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Convergent-fairness piece generator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Randomizer {
    tokens: [i32; PIECE_TYPE_COUNT],
    rng: SimpleRng,
}

impl Randomizer {
    /// Create a randomizer with `starting_tokens` for every type.
    ///
    /// Values below 1 are raised to 1 so the bag can always be drawn from.
    pub fn new(seed: u32, starting_tokens: i32) -> Self {
        Self {
            tokens: [starting_tokens.max(1); PIECE_TYPE_COUNT],
            rng: SimpleRng::new(seed),
        }
    }

    /// Create a randomizer from an arbitrary token distribution.
    ///
    /// Returns `None` unless the token sum is positive. Draws never change the
    /// sum, and a positive sum keeps at least one type drawable forever.
    pub fn with_tokens(seed: u32, tokens: [i32; PIECE_TYPE_COUNT]) -> Option<Self> {
        if tokens.iter().sum::<i32>() <= 0 {
            return None;
        }
        Some(Self {
            tokens,
            rng: SimpleRng::new(seed),
        })
    }

    /// Draw the next piece
    pub fn next(&mut self) -> PieceType {
        self.draw(&[])
    }

    /// Draw the next piece, skipping `excluded` types.
    ///
    /// Falls back to an unrestricted draw when the excluded types hold every
    /// positive token.
    pub fn next_excluding(&mut self, excluded: &[PieceType]) -> PieceType {
        self.draw(excluded)
    }

    fn draw(&mut self, excluded: &[PieceType]) -> PieceType {
        let weight = |i: usize, t: i32| -> u32 {
            if excluded.contains(&PieceType::ALL[i]) {
                0
            } else {
                t.max(0) as u32
            }
        };

        let mut total: u32 = self
            .tokens
            .iter()
            .enumerate()
            .map(|(i, &t)| weight(i, t))
            .sum();
        let restricted = total > 0;
        if !restricted {
            total = self.tokens.iter().map(|&t| t.max(0) as u32).sum();
        }
        debug_assert!(total > 0, "randomizer has no positive tokens");

        let mut pick = self.rng.next_range(total.max(1));
        let mut winner = PieceType::ALL[0];
        for (i, &t) in self.tokens.iter().enumerate() {
            let w = if restricted {
                weight(i, t)
            } else {
                t.max(0) as u32
            };
            if pick < w {
                winner = PieceType::ALL[i];
                break;
            }
            pick -= w;
        }

        self.rebalance(winner);
        winner
    }

    fn rebalance(&mut self, winner: PieceType) {
        for (i, token) in self.tokens.iter_mut().enumerate() {
            if i == winner.index() {
                *token -= PIECE_TYPE_COUNT as i32 - 1;
            } else {
                *token += 1;
            }
        }
    }

    pub fn tokens(&self) -> &[i32; PIECE_TYPE_COUNT] {
        &self.tokens
    }

    /// Get the current RNG state (for restarting with the same sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new(1, STARTING_TOKENS)
    }
}
