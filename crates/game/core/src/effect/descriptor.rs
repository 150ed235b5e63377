//! Effect descriptors attached to skill definitions.

use super::targeting::TargetFilter;
use crate::buff::BuffData;

/// When an effect is applied during an invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EffectTiming {
    /// Once, when the cast resolves.
    OnCast,
    /// At every hit event, or on projectile impact.
    #[default]
    OnHit,
    /// When the cast resolves, spread over `SkillEffect::duration`.
    OverTime,
    /// While the skill is equipped (`apply_passives`).
    Passive,
}

/// What an effect does to each recipient.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// The invocation's damage payload.
    Damage,
    /// The invocation's heal payload.
    Heal,
    ApplyBuff(BuffData),
    RemoveBuff(String),
    /// Removes every debuff.
    Cleanse,
}

/// One entry of a skill's effect list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillEffect {
    pub timing: EffectTiming,
    pub kind: EffectKind,
    /// Overrides the skill's target filter for this effect only.
    #[cfg_attr(feature = "serde", serde(default))]
    pub filter: Option<TargetFilter>,
    /// Seconds, for `OverTime` effects.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: f32,
}

impl SkillEffect {
    pub fn new(timing: EffectTiming, kind: EffectKind) -> Self {
        Self {
            timing,
            kind,
            filter: None,
            duration: 0.0,
        }
    }

    pub fn on_cast(kind: EffectKind) -> Self {
        Self::new(EffectTiming::OnCast, kind)
    }

    pub fn on_hit(kind: EffectKind) -> Self {
        Self::new(EffectTiming::OnHit, kind)
    }

    pub fn over_time(kind: EffectKind, duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            ..Self::new(EffectTiming::OverTime, kind)
        }
    }

    pub fn passive(buff: BuffData) -> Self {
        Self::new(EffectTiming::Passive, EffectKind::ApplyBuff(buff))
    }

    pub fn with_filter(mut self, filter: TargetFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}
