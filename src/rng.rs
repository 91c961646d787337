//! Random number providers.
//!
//! The engine draws from two independent streams. Real resolution advances the main
//! stream; simulated (AI lookahead) resolution advances only the simulated one, so a
//! preview can be thrown away without shifting any outcome of the real battle.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Offset mixed into the seed of the simulated stream.
const SIMULATED_STREAM_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

pub trait BattleRng {
    /// Uniform integer in `min..max_exclusive`. Returns `min` for an empty range.
    fn roll_int(&mut self, min: i32, max_exclusive: i32) -> i32;

    /// Same contract as `roll_int`, drawn from the dry-run stream.
    fn roll_simulated(&mut self, min: i32, max_exclusive: i32) -> i32;
}

/// Draws from the stream `simulated` selects and traces the result. Every engine draw
/// goes through here so a replay log shows the full sequence.
pub fn traced_roll(rng: &mut dyn BattleRng, min: i32, max_exclusive: i32, simulated: bool) -> i32 {
    let value = if simulated {
        rng.roll_simulated(min, max_exclusive)
    } else {
        rng.roll_int(min, max_exclusive)
    };
    tracing::trace!(min, max_exclusive, value, simulated, "rng draw");
    value
}

fn draw(rng: &mut StdRng, min: i32, max_exclusive: i32) -> i32 {
    if max_exclusive <= min {
        return min;
    }
    rng.random_range(min..max_exclusive)
}

/// Production provider: both streams derive from the encounter seed.
#[derive(Debug, Clone)]
pub struct SeededRng {
    real: StdRng,
    simulated: StdRng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            real: StdRng::seed_from_u64(seed),
            simulated: StdRng::seed_from_u64(seed ^ SIMULATED_STREAM_SALT),
        }
    }
}

impl BattleRng for SeededRng {
    fn roll_int(&mut self, min: i32, max_exclusive: i32) -> i32 {
        draw(&mut self.real, min, max_exclusive)
    }

    fn roll_simulated(&mut self, min: i32, max_exclusive: i32) -> i32 {
        draw(&mut self.simulated, min, max_exclusive)
    }
}

/// Replays a fixed script of outcomes, for tests that need to force a roll.
///
/// Each scripted value is clamped into the requested range. Once the script runs out
/// every draw returns `fallback` (also clamped). The simulated stream never touches
/// the script.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    script: VecDeque<i32>,
    fallback: i32,
    simulated: StdRng,
    consumed: usize,
}

impl ScriptedRng {
    pub fn new(script: Vec<i32>) -> Self {
        Self::with_fallback(script, 0)
    }

    pub fn with_fallback(script: Vec<i32>, fallback: i32) -> Self {
        Self {
            script: script.into(),
            fallback,
            simulated: StdRng::seed_from_u64(SIMULATED_STREAM_SALT),
            consumed: 0,
        }
    }

    /// How many scripted values are still waiting to be drawn.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl BattleRng for ScriptedRng {
    fn roll_int(&mut self, min: i32, max_exclusive: i32) -> i32 {
        if max_exclusive <= min {
            return min;
        }
        self.consumed += 1;
        let value = self.script.pop_front().unwrap_or(self.fallback);
        value.clamp(min, max_exclusive - 1)
    }

    fn roll_simulated(&mut self, min: i32, max_exclusive: i32) -> i32 {
        draw(&mut self.simulated, min, max_exclusive)
    }
}
