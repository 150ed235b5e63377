//! Damage types and mitigation.

use crate::config::CombatConfig;

// ============================================================================
// Damage Type
// ============================================================================

/// Damage type selecting the caster stat that feeds a skill and the
/// resistance that mitigates it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DamageType {
    /// Scales with physical damage, mitigated by physical resistance.
    #[default]
    Physical,
    /// Scales with magical damage, mitigated by magical resistance.
    Magical,
    /// Scales with both; mitigated by the mean of both resistances.
    Mixed,
    /// Ignores caster stats and all resistances.
    True,
}

// ============================================================================
// Mitigation
// ============================================================================

/// Fraction of damage removed by `resistance`.
///
/// # Formula
///
/// ```text
/// reduction = resistance / (resistance + K)      K = 100 by default
/// ```
///
/// Negative resistance is clamped to zero. The result approaches but never
/// reaches 1.
pub fn mitigation(resistance: f32, config: &CombatConfig) -> f32 {
    let resistance = if resistance.is_nan() { 0.0 } else { resistance.max(0.0) };
    resistance / (resistance + config.mitigation_constant())
}

/// Damage left after mitigation: `raw * (1 - reduction)`.
pub fn mitigate(raw: f32, resistance: f32, config: &CombatConfig) -> f32 {
    raw.max(0.0) * (1.0 - mitigation(resistance, config))
}

/// Apply damage to current HP.
///
/// # Returns
///
/// New HP value (clamped to 0)
pub fn apply_damage(current_hp: f32, damage: f32) -> f32 {
    (current_hp - damage.max(0.0)).max(0.0)
}
