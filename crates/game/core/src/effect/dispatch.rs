//! Effect application for one skill.
//!
//! Recipients are resolved per effect, then mutated one after another. Each
//! target's stat block and buffs are only ever touched through that
//! target's own [`Combatant`](crate::state::Combatant) methods.

use super::descriptor::{EffectKind, EffectTiming, SkillEffect};
use super::targeting::{accepts, resolve_recipients};
use crate::buff::{ApplyOutcome, PeriodicEffect, PeriodicKind};
use crate::env::CombatEnv;
use crate::skill::{SkillContext, SkillDefinition, SkillPayload};
use crate::state::{DamageReport, EntityId, Roster};

// ============================================================================
// Report
// ============================================================================

/// What applying one effect to one recipient did.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectOutcome {
    Damage(DamageReport),
    Healed(f32),
    Buff(ApplyOutcome),
    BuffRemoved(bool),
    Cleansed(usize),
    /// An over-time damage or heal effect was started.
    PeriodicStarted,
    /// The recipient ignored the effect (dead, or nothing to deliver).
    Skipped,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectApplication {
    pub target: EntityId,
    pub timing: EffectTiming,
    pub outcome: EffectOutcome,
}

/// Every application made by one dispatch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchReport {
    pub applications: Vec<EffectApplication>,
}

impl DispatchReport {
    /// Distinct recipients, in first-application order.
    pub fn recipients(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = Vec::new();
        for application in &self.applications {
            if !ids.contains(&application.target) {
                ids.push(application.target);
            }
        }
        ids
    }

    pub fn damage_dealt(&self) -> f32 {
        self.applications
            .iter()
            .filter_map(|a| match a.outcome {
                EffectOutcome::Damage(report) => Some(report.delivered),
                _ => None,
            })
            .sum()
    }

    pub fn healed(&self) -> f32 {
        self.applications
            .iter()
            .filter_map(|a| match a.outcome {
                EffectOutcome::Healed(amount) => Some(amount),
                _ => None,
            })
            .sum()
    }

    pub fn kills(&self) -> usize {
        self.applications
            .iter()
            .filter(|a| matches!(a.outcome, EffectOutcome::Damage(report) if report.killed))
            .count()
    }

    pub fn merge(&mut self, other: DispatchReport) {
        self.applications.extend(other.applications);
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Resolves recipients and applies a definition's effects by timing.
#[derive(Clone, Copy, Debug)]
pub struct SkillEffectController<'a> {
    definition: &'a SkillDefinition,
}

impl<'a> SkillEffectController<'a> {
    pub fn new(definition: &'a SkillDefinition) -> Self {
        Self { definition }
    }

    /// Applies every effect tagged `timing` to its resolved recipients.
    pub fn dispatch(
        &self,
        timing: EffectTiming,
        ctx: &SkillContext,
        payload: &SkillPayload,
        roster: &mut Roster,
        env: &CombatEnv<'_>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        for effect in self.definition.effects_with(timing) {
            let recipients = resolve_recipients(&self.definition.targeting, effect.filter, ctx, roster, env);
            tracing::debug!(
                skill = %self.definition.id,
                timing = %timing,
                recipients = recipients.len(),
                "dispatching effect"
            );
            for target in recipients {
                let outcome = apply(effect, target, payload, roster, env);
                report.applications.push(EffectApplication { target, timing, outcome });
            }
        }
        report
    }

    /// Applies every effect tagged `timing` to `target` alone, if it passes
    /// each effect's filter. Used for projectile impacts.
    pub fn dispatch_to(
        &self,
        timing: EffectTiming,
        ctx: &SkillContext,
        target: EntityId,
        payload: &SkillPayload,
        roster: &mut Roster,
        env: &CombatEnv<'_>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        for effect in self.definition.effects_with(timing) {
            let filter = effect.filter.unwrap_or(self.definition.targeting.filter);
            if !accepts(filter, ctx.caster, target, roster) {
                continue;
            }
            let outcome = apply(effect, target, payload, roster, env);
            report.applications.push(EffectApplication { target, timing, outcome });
        }
        report
    }
}

fn apply(
    effect: &SkillEffect,
    target: EntityId,
    payload: &SkillPayload,
    roster: &mut Roster,
    env: &CombatEnv<'_>,
) -> EffectOutcome {
    let over_time = effect.timing == EffectTiming::OverTime;

    // Target-dependent amounts are read before the target is borrowed mutably.
    let amount = match &effect.kind {
        EffectKind::Damage => payload.damage.map(|damage| damage.resolve(roster.get(target))),
        EffectKind::Heal => payload.heal.map(|heal| heal.resolve(roster.get(target))),
        _ => None,
    };

    let Some(recipient) = roster.get_mut(target) else {
        return EffectOutcome::Skipped;
    };
    if !recipient.is_alive() {
        return EffectOutcome::Skipped;
    }

    match &effect.kind {
        EffectKind::Damage => {
            let (Some(raw), Some(damage)) = (amount, payload.damage) else {
                tracing::warn!(skill = %payload.source, "damage effect without damage formula");
                return EffectOutcome::Skipped;
            };
            if over_time {
                recipient.apply_periodic(PeriodicEffect::new(
                    payload.source.clone(),
                    PeriodicKind::Damage(damage.damage_type),
                    raw,
                    effect.duration,
                ));
                EffectOutcome::PeriodicStarted
            } else {
                EffectOutcome::Damage(recipient.take_damage(raw, damage.damage_type, env.config()))
            }
        }
        EffectKind::Heal => {
            let Some(heal) = amount else {
                tracing::warn!(skill = %payload.source, "heal effect without heal formula");
                return EffectOutcome::Skipped;
            };
            if over_time {
                recipient.apply_periodic(PeriodicEffect::new(
                    payload.source.clone(),
                    PeriodicKind::Heal,
                    heal,
                    effect.duration,
                ));
                EffectOutcome::PeriodicStarted
            } else {
                EffectOutcome::Healed(recipient.heal(heal))
            }
        }
        EffectKind::ApplyBuff(data) => {
            let outcome = if over_time && !data.distribute_over_time {
                let mut data = data.clone().distributed(data.tick_interval);
                if effect.duration > 0.0 {
                    data = data.with_duration(effect.duration);
                }
                recipient.apply_buff(&data)
            } else {
                recipient.apply_buff(data)
            };
            outcome.map_or(EffectOutcome::Skipped, EffectOutcome::Buff)
        }
        EffectKind::RemoveBuff(name) => EffectOutcome::BuffRemoved(recipient.remove_buff(name)),
        EffectKind::Cleanse => EffectOutcome::Cleansed(recipient.cleanse()),
    }
}
