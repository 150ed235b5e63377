//! Immutable skill templates.
//!
//! A [`SkillDefinition`] is configuration data. Execution reads it and never
//! writes to it; every per-invocation value lives in
//! [`SkillContext`](super::SkillContext) or the controller.

use arrayvec::ArrayVec;

use crate::combat::DamageType;
use crate::config::CombatConfig;
use crate::effect::{EffectTiming, SkillEffect, Targeting};
use crate::state::{Position, ResourceKind};

// ============================================================================
// Cost
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCost {
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource: ResourceKind,
    pub amount: f32,
}

impl ResourceCost {
    pub fn energy(amount: f32) -> Self {
        Self {
            resource: ResourceKind::Energy,
            amount,
        }
    }

    pub fn health(amount: f32) -> Self {
        Self {
            resource: ResourceKind::Health,
            amount,
        }
    }
}

// ============================================================================
// Formulas
// ============================================================================

/// How the base amount is combined with the caster's stat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CombineOp {
    /// `base + stat`
    #[default]
    Add,
    /// `base * (1 + stat / 100)`
    Multiply,
    /// `stat`
    Override,
}

impl CombineOp {
    pub fn combine(self, base: f32, stat: f32) -> f32 {
        match self {
            CombineOp::Add => base + stat,
            CombineOp::Multiply => base * (1.0 + stat / 100.0),
            CombineOp::Override => stat,
        }
    }
}

/// Extra damage proportional to a health pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageScaling {
    #[default]
    None,
    /// Caster's current health.
    Health,
    /// Caster's missing health.
    MissingHealth,
    TargetHealth,
    TargetMissingHealth,
}

impl DamageScaling {
    pub fn reads_target(self) -> bool {
        matches!(self, DamageScaling::TargetHealth | DamageScaling::TargetMissingHealth)
    }
}

/// Bonus applied when the critical roll succeeds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CriticalRule {
    /// Adds a fixed amount.
    Flat(f32),
    /// Multiplies by `1 + percent / 100`.
    Percent(f32),
}

impl CriticalRule {
    pub fn apply(self, damage: f32) -> f32 {
        match self {
            CriticalRule::Flat(bonus) => damage + bonus,
            CriticalRule::Percent(percent) => damage * (1.0 + percent / 100.0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageSpec {
    pub base: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub per_level: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_type: DamageType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub operation: CombineOp,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scaling: DamageScaling,
    /// Fraction of the scaling pool added, e.g. `0.1` for 10%.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ratio: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub critical: Option<CriticalRule>,
}

impl DamageSpec {
    pub fn new(base: f32, damage_type: DamageType) -> Self {
        Self {
            base,
            damage_type,
            ..Self::default()
        }
    }

    pub fn with_operation(mut self, operation: CombineOp) -> Self {
        self.operation = operation;
        self
    }

    pub fn per_level(mut self, per_level: f32) -> Self {
        self.per_level = per_level;
        self
    }

    pub fn scaling(mut self, scaling: DamageScaling, ratio: f32) -> Self {
        self.scaling = scaling;
        self.ratio = ratio;
        self
    }

    pub fn with_critical(mut self, rule: CriticalRule) -> Self {
        self.critical = Some(rule);
        self
    }
}

/// Extra healing proportional to a pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HealScaling {
    #[default]
    FlatAmount,
    /// Target's maximum health.
    PercentMaxHp,
    /// Target's missing health.
    PercentMissingHp,
    /// Caster's total magical damage.
    SpellPower,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealSpec {
    pub base: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub per_level: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub operation: CombineOp,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scaling: HealScaling,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ratio: f32,
}

impl HealSpec {
    pub fn new(base: f32) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    pub fn with_operation(mut self, operation: CombineOp) -> Self {
        self.operation = operation;
        self
    }

    pub fn per_level(mut self, per_level: f32) -> Self {
        self.per_level = per_level;
        self
    }

    pub fn scaling(mut self, scaling: HealScaling, ratio: f32) -> Self {
        self.scaling = scaling;
        self.ratio = ratio;
        self
    }
}

// ============================================================================
// Animation & projectile
// ============================================================================

/// Clip reference and normalized hit timestamps.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationLink {
    /// `None` is a configuration error when the skill is used.
    pub clip: Option<String>,
    /// Clip length in seconds at playback speed 1.
    pub length: f32,
    #[cfg_attr(feature = "serde", serde(default = "default_playback_speed"))]
    pub playback_speed: f32,
    /// Multiply playback speed by the caster's `AttackSpeed` total.
    #[cfg_attr(feature = "serde", serde(default))]
    pub scales_with_attack_speed: bool,
    /// Sorted, each in `[0, 1]`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hit_events: ArrayVec<f32, { CombatConfig::MAX_HIT_EVENTS }>,
}

#[cfg(feature = "serde")]
fn default_playback_speed() -> f32 {
    1.0
}

impl AnimationLink {
    pub fn new(clip: impl Into<String>, length: f32) -> Self {
        Self {
            clip: Some(clip.into()),
            length,
            playback_speed: 1.0,
            scales_with_attack_speed: false,
            hit_events: ArrayVec::new(),
        }
    }

    /// Replaces the hit events with `events`, clamped into `[0, 1]` and
    /// sorted. Events past the capacity are dropped.
    pub fn with_hit_events(mut self, events: &[f32]) -> Self {
        self.hit_events.clear();
        for &event in events {
            if event.is_nan() {
                continue;
            }
            if self.hit_events.try_push(event.clamp(0.0, 1.0)).is_err() {
                tracing::warn!(
                    capacity = CombatConfig::MAX_HIT_EVENTS,
                    "too many hit events, extra events dropped"
                );
                break;
            }
        }
        self.hit_events.sort_by(f32::total_cmp);
        self
    }

    pub fn with_playback_speed(mut self, speed: f32) -> Self {
        self.playback_speed = speed;
        self
    }

    pub fn scaling_with_attack_speed(mut self) -> Self {
        self.scales_with_attack_speed = true;
        self
    }

    /// Effective playback speed for a caster with `attack_speed`.
    pub fn effective_speed(&self, attack_speed: f32) -> f32 {
        let mut speed = if self.playback_speed > 0.0 { self.playback_speed } else { 1.0 };
        if self.scales_with_attack_speed && attack_speed > 0.0 {
            speed *= attack_speed;
        }
        speed
    }

    /// Real-time duration in seconds at `speed`.
    pub fn duration(&self, speed: f32) -> f32 {
        self.length.max(CombatConfig::MIN_TIMING) / speed.max(CombatConfig::MIN_TIMING)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProjectileBehavior {
    #[default]
    Straight,
    /// Follows the target entity.
    Homing,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileSpec {
    pub prefab: String,
    pub speed: f32,
    pub lifetime: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub behavior: ProjectileBehavior,
    /// Spawn offset from the caster's position.
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset: Position,
}

impl ProjectileSpec {
    pub fn new(prefab: impl Into<String>, speed: f32, lifetime: f32) -> Self {
        Self {
            prefab: prefab.into(),
            speed,
            lifetime,
            behavior: ProjectileBehavior::Straight,
            offset: Position::ORIGIN,
        }
    }

    pub fn homing(mut self) -> Self {
        self.behavior = ProjectileBehavior::Homing;
        self
    }

    pub fn with_offset(mut self, offset: Position) -> Self {
        self.offset = offset;
        self
    }
}

// ============================================================================
// Definition
// ============================================================================

/// Configuration template for one skill.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: ResourceCost,
    /// Seconds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: f32,
    /// Seconds; zero resolves in the same call that starts the cast.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cast_time: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub targeting: Targeting,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<DamageSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal: Option<HealSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub animation: Option<AnimationLink>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub projectile: Option<ProjectileSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: ArrayVec<SkillEffect, { CombatConfig::MAX_EFFECTS_PER_SKILL }>,
}

impl SkillDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cost: ResourceCost::default(),
            cooldown: 0.0,
            cast_time: 0.0,
            targeting: Targeting::default(),
            damage: None,
            heal: None,
            animation: None,
            projectile: None,
            effects: ArrayVec::new(),
        }
    }

    pub fn with_cost(mut self, cost: ResourceCost) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_cooldown(mut self, seconds: f32) -> Self {
        self.cooldown = seconds;
        self
    }

    pub fn with_cast_time(mut self, seconds: f32) -> Self {
        self.cast_time = seconds;
        self
    }

    pub fn with_targeting(mut self, targeting: Targeting) -> Self {
        self.targeting = targeting;
        self
    }

    pub fn with_damage(mut self, damage: DamageSpec) -> Self {
        self.damage = Some(damage);
        self
    }

    pub fn with_heal(mut self, heal: HealSpec) -> Self {
        self.heal = Some(heal);
        self
    }

    pub fn with_animation(mut self, animation: AnimationLink) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_projectile(mut self, projectile: ProjectileSpec) -> Self {
        self.projectile = Some(projectile);
        self
    }

    /// Appends an effect. Effects past the capacity are dropped with a warning.
    pub fn with_effect(mut self, effect: SkillEffect) -> Self {
        if self.effects.try_push(effect).is_err() {
            tracing::warn!(
                skill = %self.id,
                capacity = CombatConfig::MAX_EFFECTS_PER_SKILL,
                "too many effects, extra effect dropped"
            );
        }
        self
    }

    pub fn effects_with(&self, timing: EffectTiming) -> impl Iterator<Item = &SkillEffect> {
        self.effects.iter().filter(move |e| e.timing == timing)
    }

    pub fn clamped_cooldown(&self) -> f32 {
        if self.cooldown.is_nan() { 0.0 } else { self.cooldown.max(0.0) }
    }

    pub fn clamped_cast_time(&self) -> f32 {
        if self.cast_time.is_nan() { 0.0 } else { self.cast_time.max(0.0) }
    }

    /// Number of hit events in the animation, zero without one.
    pub fn hit_event_count(&self) -> usize {
        self.animation.as_ref().map_or(0, |a| a.hit_events.len())
    }
}
