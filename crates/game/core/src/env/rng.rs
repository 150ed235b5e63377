//! Seedable randomness for critical-hit rolls.
//!
//! Every roll is a pure function of its seed. The seed for one skill
//! invocation is derived from the configured game seed, the controller's
//! invocation counter and the caster id, so replaying the same inputs
//! reproduces the same critical hits.

/// Source of deterministic random values.
pub trait RngOracle: Send + Sync {
    /// Random u32 derived from `seed`.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform draw in `[0, 1)`.
    fn roll_unit(&self, seed: u64) -> f32 {
        // 24 bits fit exactly in an f32 mantissa.
        (self.next_u32(seed) >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Returns true with probability `percent / 100`.
    fn roll_percent(&self, seed: u64, percent: f32) -> bool {
        self.roll_unit(seed) < percent / 100.0
    }
}

/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output.
///
/// See <https://www.pcg-random.org/>.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    /// `state' = state * multiplier + increment (mod 2^64)`
    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Purpose of a roll, mixed into the seed so independent rolls of the same
/// invocation never share a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum RollContext {
    Critical = 0,
}

/// Derives the seed for one roll.
///
/// # Arguments
///
/// * `game_seed` - Base seed from [`CombatConfig`](crate::CombatConfig)
/// * `nonce` - Invocation counter of the skill controller
/// * `caster` - Id of the casting entity
/// * `context` - Which roll of the invocation this is
pub fn compute_seed(game_seed: u64, nonce: u64, caster: u32, context: RollContext) -> u64 {
    let mut hash = game_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (caster as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u32 as u64).wrapping_mul(0x85ebca6b);

    // avalanche
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
