//! Per-skill execution state machine.
//!
//! ```text
//! Idle ──try_execute──► Validating ──ok──► Casting ──cast done──► Resolving ──► Cooldown ──► Idle
//!                           │                 │                                   ▲
//!                           └──err──► (back)  └──try_interrupt / caster died──────┘
//! ```
//!
//! `Validating` and `Resolving` only exist inside a single call. `Casting`
//! persists across [`tick`](SkillExecutionController::tick) calls until the
//! cast time has elapsed.
//!
//! ## Tick order
//!
//! 1. Cooldown counts down
//! 2. Animation advances; crossed hit events fire
//! 3. State is re-evaluated (cast completion, return to idle)
//!
//! A hit event and a cooldown expiry falling in the same tick are each
//! observed exactly once.
//!
//! ## Cost and cooldown
//!
//! Both are committed when the cast starts. An interrupted cast is not
//! refunded and keeps its cooldown.

use std::fmt;
use std::sync::Arc;

use super::animation::{AnimationToken, CrossedHits, SkillAnimationController};
use super::context::SkillContext;
use super::definition::{ProjectileBehavior, ProjectileSpec, SkillDefinition};
use super::error::{ConfigError, UseError};
use super::events::{SkillEvent, SkillListener};
use super::formula::{DamagePayload, HealPayload, SkillPayload, critical_chance};
use super::requests::{AnimationRequest, ProjectileSpawnRequest, SkillRequest};
use super::timing::SkillTimesController;
use crate::effect::{DispatchReport, EffectKind, EffectTiming, SkillEffectController};
use crate::config::CombatConfig;
use crate::env::{CombatEnv, RollContext, compute_seed};
use crate::state::{EntityId, Position, Roster};
use crate::stats::StatVariable;

/// Execution phase of a skill controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkillState {
    #[default]
    Idle,
    Validating,
    Casting,
    Resolving,
    Cooldown,
}

/// State carried from cast start until the last hit event.
#[derive(Clone, Debug, PartialEq)]
struct Invocation {
    context: SkillContext,
    payload: SkillPayload,
}

/// Drives one skill for one caster.
pub struct SkillExecutionController {
    definition: Option<Arc<SkillDefinition>>,
    state: SkillState,
    times: SkillTimesController,
    animation: SkillAnimationController,
    invocation: Option<Invocation>,
    /// Invocation counter mixed into critical-roll seeds.
    nonce: u64,
    next_token: u64,
    last_failure: Option<UseError>,
    requests: Vec<SkillRequest>,
    report: DispatchReport,
    listeners: Vec<SkillListener>,
    passive_holder: Option<EntityId>,
}

impl SkillExecutionController {
    pub fn new(definition: impl Into<Arc<SkillDefinition>>) -> Self {
        Self {
            definition: Some(definition.into()),
            ..Self::empty()
        }
    }

    /// Controller with no definition; every use fails with
    /// [`UseError::MissingDefinition`].
    pub fn empty() -> Self {
        Self {
            definition: None,
            state: SkillState::Idle,
            times: SkillTimesController::new(),
            animation: SkillAnimationController::new(),
            invocation: None,
            nonce: 0,
            next_token: 0,
            last_failure: None,
            requests: Vec::new(),
            report: DispatchReport::default(),
            listeners: Vec::new(),
            passive_holder: None,
        }
    }

    pub fn set_definition(&mut self, definition: impl Into<Arc<SkillDefinition>>) {
        self.definition = Some(definition.into());
    }

    pub fn definition(&self) -> Option<&SkillDefinition> {
        self.definition.as_deref()
    }

    pub fn state(&self) -> SkillState {
        self.state
    }

    pub fn times(&self) -> &SkillTimesController {
        &self.times
    }

    pub fn animation(&self) -> &SkillAnimationController {
        &self.animation
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.times.cooldown_remaining()
    }

    /// Number of invocations started so far.
    pub fn invocations(&self) -> u64 {
        self.nonce
    }

    /// Error recorded by the last failed `can_use` or `try_execute`.
    pub fn last_failure(&self) -> Option<&UseError> {
        self.last_failure.as_ref()
    }

    /// Human-readable reason for the last failure.
    pub fn failure_reason(&self) -> Option<String> {
        self.last_failure.as_ref().map(ToString::to_string)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SkillEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Takes every queued request for external collaborators.
    pub fn drain_requests(&mut self) -> Vec<SkillRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Takes the effect applications made since the last call.
    pub fn take_report(&mut self) -> DispatchReport {
        std::mem::take(&mut self.report)
    }

    fn emit(&mut self, event: SkillEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn transition(&mut self, to: SkillState) {
        if self.state != to {
            tracing::debug!(
                skill = self.definition.as_ref().map_or("<none>", |d| d.id.as_str()),
                from = %self.state,
                to = %to,
                "skill state"
            );
            self.state = to;
        }
    }

    fn settled_state(&self) -> SkillState {
        if self.times.is_on_cooldown() || self.animation.is_playing() {
            SkillState::Cooldown
        } else {
            SkillState::Idle
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Gating checks, in order: definition, cooldown, caster, resource.
    ///
    /// ## Errors
    ///
    /// The first failing check. Nothing is mutated.
    pub fn check(&self, caster: EntityId, roster: &Roster) -> Result<(), UseError> {
        let definition = self.definition.as_ref().ok_or(UseError::MissingDefinition)?;

        if self.times.is_on_cooldown() {
            return Err(UseError::OnCooldown {
                remaining: self.times.cooldown_remaining(),
            });
        }
        if self.times.is_casting() || self.animation.is_playing() {
            return Err(UseError::Busy);
        }

        let combatant = roster.get(caster).ok_or(UseError::MissingCaster(caster))?;
        if !combatant.is_alive() {
            return Err(UseError::CasterDead(caster));
        }

        let cost = definition.cost;
        if !combatant.resources().can_afford(cost.resource, cost.amount) {
            return Err(UseError::InsufficientResource {
                resource: cost.resource,
                required: cost.amount,
                available: combatant.resources().get(cost.resource),
            });
        }
        Ok(())
    }

    /// Runs [`check`](Self::check) and records the failure reason.
    pub fn can_use(&mut self, caster: EntityId, roster: &Roster) -> bool {
        match self.check(caster, roster) {
            Ok(()) => {
                self.last_failure = None;
                true
            }
            Err(error) => {
                self.last_failure = Some(error);
                false
            }
        }
    }

    fn validate_config(definition: &SkillDefinition) -> Result<(), ConfigError> {
        if let Some(animation) = &definition.animation
            && animation.clip.as_deref().is_none_or(str::is_empty)
        {
            return Err(ConfigError::MissingAnimationClip {
                skill: definition.id.clone(),
            });
        }
        if let Some(projectile) = &definition.projectile
            && projectile.prefab.is_empty()
        {
            return Err(ConfigError::MissingProjectilePrefab {
                skill: definition.id.clone(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Starts an invocation.
    ///
    /// On success the cost is paid, the cooldown started, the damage and
    /// heal payloads computed, and the controller is `Casting`. A zero cast
    /// time resolves before this returns.
    ///
    /// ## Errors
    ///
    /// Gating failures and configuration errors. Nothing is mutated and the
    /// reason is kept in [`last_failure`](Self::last_failure).
    pub fn try_execute(
        &mut self,
        ctx: SkillContext,
        roster: &mut Roster,
        env: &CombatEnv<'_>,
    ) -> Result<(), UseError> {
        let resume = self.state;
        self.transition(SkillState::Validating);

        let validated = self.check(ctx.caster, roster).and_then(|()| match self.definition.as_deref() {
            Some(definition) => Self::validate_config(definition).map_err(UseError::from),
            None => Err(UseError::MissingDefinition),
        });
        if let Err(error) = validated {
            if error.is_gating() {
                tracing::debug!(caster = %ctx.caster, reason = %error, "skill use rejected");
            } else {
                tracing::error!(caster = %ctx.caster, reason = %error, "skill use failed");
            }
            self.transition(resume);
            self.last_failure = Some(error.clone());
            return Err(error);
        }
        self.last_failure = None;
        let Some(definition) = self.definition.clone() else {
            return Err(UseError::MissingDefinition);
        };

        let mut ctx = ctx;
        ctx.level = ctx.level();
        if ctx.target_position.is_none() {
            ctx.target_position = ctx
                .target_entity()
                .and_then(|id| roster.get(id))
                .map(|target| target.position);
        }

        let Some(caster) = roster.get_mut(ctx.caster) else {
            self.transition(resume);
            return Err(UseError::MissingCaster(ctx.caster));
        };
        ctx.origin.get_or_insert(caster.position);
        caster.spend(definition.cost.resource, definition.cost.amount);
        let attack_speed = caster.stats().total(StatVariable::AttackSpeed);

        self.times.start_cooldown(definition.clamped_cooldown());
        self.nonce += 1;
        let payload = self.compute_payload(&definition, &ctx, roster, env);

        tracing::debug!(
            skill = %definition.id,
            caster = %ctx.caster,
            level = ctx.level,
            nonce = self.nonce,
            critical = payload.damage.is_some_and(|d| d.is_critical()),
            "skill used"
        );
        self.emit(SkillEvent::Used {
            skill: definition.id.clone(),
            caster: ctx.caster,
        });

        if let Some(link) = &definition.animation {
            let speed = link.effective_speed(attack_speed);
            self.next_token += 1;
            let token = AnimationToken(self.next_token);
            self.animation.start(token, link.duration(speed), &link.hit_events);
            self.requests.push(SkillRequest::PlayAnimation(AnimationRequest {
                clip: link.clip.clone().unwrap_or_default(),
                playback_speed: speed,
                token,
            }));
        }

        self.invocation = Some(Invocation { context: ctx, payload });
        self.times.begin_cast(definition.clamped_cast_time());
        self.transition(SkillState::Casting);

        if self.times.is_cast_complete() {
            self.resolve(&definition, roster, env);
        }
        Ok(())
    }

    fn compute_payload(
        &self,
        definition: &SkillDefinition,
        ctx: &SkillContext,
        roster: &Roster,
        env: &CombatEnv<'_>,
    ) -> SkillPayload {
        let caster = roster.get(ctx.caster);
        let damage = definition.damage.zip(caster).map(|(spec, caster)| {
            let critical = spec.critical.is_some() && {
                let seed = compute_seed(env.config().game_seed, self.nonce, ctx.caster.0, RollContext::Critical);
                env.rng().roll_percent(seed, critical_chance(caster))
            };
            DamagePayload::compute(&spec, ctx.level(), caster, critical)
        });
        let heal = definition
            .heal
            .zip(caster)
            .map(|(spec, caster)| HealPayload::compute(&spec, ctx.level(), caster));

        SkillPayload {
            source: definition.id.clone(),
            damage,
            heal,
        }
    }

    /// Advances cooldown, animation and cast by `dt` seconds.
    pub fn tick(&mut self, dt: f32, roster: &mut Roster, env: &CombatEnv<'_>) {
        let dt = if dt.is_nan() { 0.0 } else { dt.max(0.0) };
        let Some(definition) = self.definition.clone() else {
            return;
        };

        let ready = self.times.tick_cooldown(dt);

        let crossed = self.animation.tick(dt);
        self.fire_hits(&definition, &crossed, roster, env);

        match self.state {
            SkillState::Casting => {
                let caster_alive = self
                    .invocation
                    .as_ref()
                    .and_then(|inv| roster.get(inv.context.caster))
                    .is_some_and(|caster| caster.is_alive());
                if !caster_alive {
                    tracing::debug!(skill = %definition.id, "caster lost during cast");
                    self.cancel(&definition);
                } else {
                    self.times.tick_cast(dt);
                    if self.times.is_cast_complete() {
                        self.resolve(&definition, roster, env);
                    }
                }
            }
            SkillState::Cooldown => self.settle(),
            _ => {}
        }

        if ready {
            tracing::debug!(skill = %definition.id, "cooldown ready");
            self.emit(SkillEvent::CooldownReady {
                skill: definition.id.clone(),
            });
        }
    }

    /// Cancels the current cast if it has not passed its committed fraction
    /// (`progress < cast_time / clip_length`). Progress runs faster than
    /// real time when playback is sped up, so a fast clip can commit before
    /// the cast time elapses. Without an animation the whole cast is
    /// interruptible. Returns true if the cast was cancelled.
    pub fn try_interrupt(&mut self) -> bool {
        if self.state != SkillState::Casting {
            return false;
        }
        let Some(definition) = self.definition.clone() else {
            return false;
        };

        let clip_length = definition.animation.as_ref().map(|link| link.length);
        let (progress, committed) = match clip_length {
            Some(length) if self.animation.is_playing() => (
                self.animation.normalized_progress(),
                self.times.cast_time() / length.max(CombatConfig::MIN_TIMING),
            ),
            _ => (self.times.cast_progress(), 1.0),
        };
        if progress >= committed {
            tracing::debug!(skill = %definition.id, progress, committed, "cast past commit point");
            return false;
        }
        self.cancel(&definition);
        true
    }

    fn cancel(&mut self, definition: &SkillDefinition) {
        if let Some(token) = self.animation.token() {
            self.requests.push(SkillRequest::StopAnimation(token));
        }
        self.animation.stop();
        self.times.end_cast();
        self.invocation = None;
        self.emit(SkillEvent::Interrupted {
            skill: definition.id.clone(),
        });
        let next = self.settled_state();
        self.transition(next);
    }

    fn settle(&mut self) {
        if self.settled_state() == SkillState::Idle {
            self.invocation = None;
            self.transition(SkillState::Idle);
        }
    }

    fn resolve(&mut self, definition: &SkillDefinition, roster: &mut Roster, env: &CombatEnv<'_>) {
        self.transition(SkillState::Resolving);
        self.times.end_cast();
        let Some(invocation) = self.invocation.take() else {
            self.settle();
            return;
        };

        let effects = SkillEffectController::new(definition);
        let mut report = effects.dispatch(
            EffectTiming::OnCast,
            &invocation.context,
            &invocation.payload,
            roster,
            env,
        );
        report.merge(effects.dispatch(
            EffectTiming::OverTime,
            &invocation.context,
            &invocation.payload,
            roster,
            env,
        ));
        if definition.hit_event_count() == 0 {
            report.merge(self.hit(definition, &invocation, None, roster, env));
        }

        let recipients = report.recipients().len();
        tracing::debug!(skill = %definition.id, recipients, damage = report.damage_dealt(), "skill resolved");
        self.report.merge(report);
        self.emit(SkillEvent::Resolved {
            skill: definition.id.clone(),
            recipients,
        });

        if self.animation.is_playing() {
            self.invocation = Some(invocation);
        }
        let next = self.settled_state();
        self.transition(next);
    }

    // ========================================================================
    // Hits
    // ========================================================================

    fn fire_hits(
        &mut self,
        definition: &SkillDefinition,
        crossed: &CrossedHits,
        roster: &mut Roster,
        env: &CombatEnv<'_>,
    ) {
        if crossed.is_empty() {
            return;
        }
        let Some(invocation) = self.invocation.take() else {
            return;
        };
        for &index in crossed {
            let report = self.hit(definition, &invocation, Some(index), roster, env);
            self.report.merge(report);
        }
        self.invocation = Some(invocation);
    }

    /// One hit: spawns a projectile, or applies on-hit effects directly.
    fn hit(
        &mut self,
        definition: &SkillDefinition,
        invocation: &Invocation,
        index: Option<usize>,
        roster: &mut Roster,
        env: &CombatEnv<'_>,
    ) -> DispatchReport {
        if let Some(index) = index {
            tracing::debug!(skill = %definition.id, index, "hit event");
            self.emit(SkillEvent::HitEvent {
                skill: definition.id.clone(),
                index,
            });
        }

        match &definition.projectile {
            Some(spec) => {
                let request = projectile_request(spec, invocation, roster);
                tracing::debug!(skill = %definition.id, prefab = %request.prefab, "projectile requested");
                self.requests.push(SkillRequest::SpawnProjectile(request));
                DispatchReport::default()
            }
            None => SkillEffectController::new(definition).dispatch(
                EffectTiming::OnHit,
                &invocation.context,
                &invocation.payload,
                roster,
                env,
            ),
        }
    }

    /// The animation collaborator finished the clip identified by `token`.
    /// Fires every hit event not yet reached.
    pub fn on_animation_complete(&mut self, token: AnimationToken, roster: &mut Roster, env: &CombatEnv<'_>) {
        let Some(definition) = self.definition.clone() else {
            return;
        };
        let crossed = self.animation.complete(token);
        self.fire_hits(&definition, &crossed, roster, env);
        if self.state == SkillState::Cooldown {
            self.settle();
        }
    }

    /// A projectile spawned from `request` struck `target`.
    pub fn on_projectile_hit(
        &mut self,
        request: &ProjectileSpawnRequest,
        target: EntityId,
        roster: &mut Roster,
        env: &CombatEnv<'_>,
    ) -> DispatchReport {
        let Some(definition) = self.definition.clone() else {
            tracing::error!(target_id = %target, "projectile hit without skill definition");
            return DispatchReport::default();
        };
        let report = SkillEffectController::new(&definition).dispatch_to(
            EffectTiming::OnHit,
            &request.context,
            target,
            &request.payload,
            roster,
            env,
        );
        tracing::debug!(skill = %definition.id, target_id = %target, damage = report.damage_dealt(), "projectile hit");
        self.report.merge(report.clone());
        report
    }

    // ========================================================================
    // Passives
    // ========================================================================

    /// Applies every `Passive` buff effect to `caster` with unbounded
    /// duration. Returns how many buffs were applied.
    pub fn apply_passives(&mut self, caster: EntityId, roster: &mut Roster) -> usize {
        let Some(definition) = self.definition.clone() else {
            return 0;
        };
        if self.passive_holder.is_some() {
            return 0;
        }
        let Some(combatant) = roster.get_mut(caster) else {
            return 0;
        };

        let mut applied = 0;
        for effect in definition.effects_with(EffectTiming::Passive) {
            if let EffectKind::ApplyBuff(data) = &effect.kind {
                let mut data = data.clone().with_duration(f32::INFINITY);
                data.distribute_over_time = false;
                if combatant.apply_buff(&data).is_some() {
                    applied += 1;
                }
            }
        }
        if applied > 0 {
            self.passive_holder = Some(caster);
            tracing::debug!(skill = %definition.id, caster = %caster, applied, "passives applied");
        }
        applied
    }

    /// Removes the passives applied by [`apply_passives`](Self::apply_passives).
    pub fn remove_passives(&mut self, roster: &mut Roster) -> usize {
        let (Some(definition), Some(holder)) = (self.definition.clone(), self.passive_holder.take()) else {
            return 0;
        };
        let Some(combatant) = roster.get_mut(holder) else {
            return 0;
        };
        definition
            .effects_with(EffectTiming::Passive)
            .filter(|effect| match &effect.kind {
                EffectKind::ApplyBuff(data) => combatant.remove_buff(&data.name),
                _ => false,
            })
            .count()
    }
}

fn projectile_request(spec: &ProjectileSpec, invocation: &Invocation, roster: &Roster) -> ProjectileSpawnRequest {
    let ctx = &invocation.context;
    let origin = ctx.origin.unwrap_or_default();
    let position = origin + spec.offset;

    // Homing projectiles aim at where the target is now.
    let aim = ctx
        .target_entity()
        .and_then(|id| roster.get(id))
        .map(|target| target.position)
        .or(ctx.target_position);
    let mut direction = aim.map_or(Position::ORIGIN, |point| position.direction_to(point));
    if direction == Position::ORIGIN {
        direction = Position::new(0.0, 0.0, 1.0);
    }

    ProjectileSpawnRequest {
        context: ctx.clone(),
        prefab: spec.prefab.clone(),
        position,
        rotation: direction.x.atan2(direction.z),
        direction,
        homing_target: match spec.behavior {
            ProjectileBehavior::Homing => ctx.target_entity(),
            ProjectileBehavior::Straight => None,
        },
        speed: spec.speed,
        lifetime: spec.lifetime,
        behavior: spec.behavior,
        payload: invocation.payload.clone(),
    }
}

impl fmt::Debug for SkillExecutionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillExecutionController")
            .field("definition", &self.definition.as_ref().map(|d| d.id.as_str()))
            .field("state", &self.state)
            .field("times", &self.times)
            .field("animation", &self.animation)
            .field("nonce", &self.nonce)
            .field("pending_requests", &self.requests.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
