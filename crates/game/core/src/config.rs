/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Base seed mixed into every critical-hit roll.
    ///
    /// Two simulations with the same seed and the same inputs produce the same
    /// critical hits.
    pub game_seed: u64,

    /// Constant `K` in `reduction = resistance / (resistance + K)`.
    pub mitigation_constant: f32,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of normalized hit events per animation clip.
    pub const MAX_HIT_EVENTS: usize = 8;
    /// Maximum number of effect descriptors per skill definition.
    pub const MAX_EFFECTS_PER_SKILL: usize = 16;

    // ===== numerical bounds =====
    /// Smallest radius accepted by area queries.
    pub const MIN_AREA_RADIUS: f32 = 0.01;
    /// Smallest animation length / cast time used as a divisor.
    pub const MIN_TIMING: f32 = 0.0001;
    /// Tolerance used when deciding that an integrated value has converged.
    pub const CONVERGENCE_EPSILON: f32 = 1e-4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MITIGATION_CONSTANT: f32 = 100.0;

    pub fn new() -> Self {
        Self {
            game_seed: 0,
            mitigation_constant: Self::DEFAULT_MITIGATION_CONSTANT,
        }
    }

    pub fn with_seed(game_seed: u64) -> Self {
        Self {
            game_seed,
            ..Self::new()
        }
    }

    /// Mitigation constant clamped to a usable positive value.
    pub fn mitigation_constant(&self) -> f32 {
        if self.mitigation_constant > 0.0 {
            self.mitigation_constant
        } else {
            Self::DEFAULT_MITIGATION_CONSTANT
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
