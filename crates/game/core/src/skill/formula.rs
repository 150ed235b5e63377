//! Damage and heal formulas.
//!
//! Both are split in two: the caster-side part is computed once when an
//! invocation starts and carried in a payload (so projectiles that land later
//! deliver what was cast), and the target-dependent part is resolved per
//! recipient.
//!
//! # Damage
//!
//! ```text
//! base     = base_damage + per_level * (level - 1)
//! combined = op(base, caster stat)        stat: Physical -> PD, Magical -> MD,
//!                                               Mixed -> PD + MD, True -> skipped
//! scaled   = combined + ratio * pool      pool: caster health / missing,
//!                                               target health / missing
//! final    = max(0, crit ? rule(scaled) : scaled)
//! ```
//!
//! # Heal
//!
//! ```text
//! base     = base_heal + per_level * (level - 1)
//! combined = op(base, caster MD)
//! final    = max(0, combined + ratio * pool)
//!            pool: 0 | target max HP | target missing HP | caster MD
//! ```

use super::definition::{CriticalRule, DamageScaling, DamageSpec, HealScaling, HealSpec};
use crate::combat::DamageType;
use crate::state::Combatant;
use crate::stats::StatVariable;

fn leveled(base: f32, per_level: f32, level: u32) -> f32 {
    base + per_level * (level.max(1) - 1) as f32
}

/// Caster stat feeding `damage_type`, `None` for true damage.
fn caster_stat(caster: &Combatant, damage_type: DamageType) -> Option<f32> {
    let stats = caster.stats();
    match damage_type {
        DamageType::Physical => Some(stats.total(StatVariable::PhysicalDamage)),
        DamageType::Magical => Some(stats.total(StatVariable::MagicalDamage)),
        DamageType::Mixed => {
            Some(stats.total(StatVariable::PhysicalDamage) + stats.total(StatVariable::MagicalDamage))
        }
        DamageType::True => None,
    }
}

/// Caster's critical chance in percent.
pub fn critical_chance(caster: &Combatant) -> f32 {
    caster.stats().total(StatVariable::CriticalChance).clamp(0.0, 100.0)
}

// ============================================================================
// Damage
// ============================================================================

/// Damage computed from the caster at cast start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamagePayload {
    pub damage_type: DamageType,
    /// Base, level, caster stat and caster-pool scaling combined.
    pub amount: f32,
    /// Scaling resolved against each recipient.
    pub target_scaling: DamageScaling,
    pub ratio: f32,
    /// Set when the invocation's critical roll succeeded.
    pub critical: Option<CriticalRule>,
}

impl DamagePayload {
    /// `critical` is the outcome of the invocation's roll.
    pub fn compute(spec: &DamageSpec, level: u32, caster: &Combatant, critical: bool) -> Self {
        let base = leveled(spec.base, spec.per_level, level);
        let mut amount = match caster_stat(caster, spec.damage_type) {
            Some(stat) => spec.operation.combine(base, stat),
            None => base,
        };
        match spec.scaling {
            DamageScaling::Health => amount += caster.health() * spec.ratio,
            DamageScaling::MissingHealth => amount += caster.missing_health() * spec.ratio,
            _ => {}
        }

        Self {
            damage_type: spec.damage_type,
            amount,
            target_scaling: if spec.scaling.reads_target() {
                spec.scaling
            } else {
                DamageScaling::None
            },
            ratio: spec.ratio,
            critical: if critical { spec.critical } else { None },
        }
    }

    pub fn is_critical(&self) -> bool {
        self.critical.is_some()
    }

    /// Raw damage against `target`, before mitigation.
    pub fn resolve(&self, target: Option<&Combatant>) -> f32 {
        let mut damage = self.amount;
        if let Some(target) = target {
            match self.target_scaling {
                DamageScaling::TargetHealth => damage += target.health() * self.ratio,
                DamageScaling::TargetMissingHealth => damage += target.missing_health() * self.ratio,
                _ => {}
            }
        }
        if let Some(rule) = self.critical {
            damage = rule.apply(damage);
        }
        damage.max(0.0)
    }
}

// ============================================================================
// Heal
// ============================================================================

/// Heal computed from the caster at cast start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealPayload {
    pub amount: f32,
    pub scaling: HealScaling,
    pub ratio: f32,
    /// Caster's magical damage total when the invocation started.
    pub spell_power: f32,
}

impl HealPayload {
    pub fn compute(spec: &HealSpec, level: u32, caster: &Combatant) -> Self {
        let spell_power = caster.stats().total(StatVariable::MagicalDamage);
        let base = leveled(spec.base, spec.per_level, level);
        Self {
            amount: spec.operation.combine(base, spell_power),
            scaling: spec.scaling,
            ratio: spec.ratio,
            spell_power,
        }
    }

    pub fn resolve(&self, target: Option<&Combatant>) -> f32 {
        let pool = match (self.scaling, target) {
            (HealScaling::FlatAmount, _) => 0.0,
            (HealScaling::SpellPower, _) => self.spell_power,
            (HealScaling::PercentMaxHp, Some(target)) => target.max_health(),
            (HealScaling::PercentMissingHp, Some(target)) => target.missing_health(),
            (_, None) => 0.0,
        };
        (self.amount + pool * self.ratio).max(0.0)
    }
}

// ============================================================================
// Payload
// ============================================================================

/// Everything an invocation delivers, carried by projectiles.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillPayload {
    /// Skill id, used to name over-time effects.
    pub source: String,
    pub damage: Option<DamagePayload>,
    pub heal: Option<HealPayload>,
}
