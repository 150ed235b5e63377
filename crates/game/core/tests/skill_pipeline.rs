//! End-to-end skill execution against a shared roster.

mod common;

use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use combat_core::effect::EffectOutcome;
use combat_core::{
    AnimationLink, CombatConfig, CombatEnv, DamageSpec, DamageType, EffectKind, EntityId, HealSpec, LayerMask,
    Position, ProjectileSpec, ResourceCost, ResourceKind, SkillContext, SkillDefinition, SkillEffect, SkillEvent,
    SkillExecutionController, SkillRequest, SkillState, SpatialQuery, StatVariable, TargetFilter, Targeting,
    UseError,
};
use common::*;

fn record_events(controller: &mut SkillExecutionController) -> Rc<RefCell<Vec<SkillEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    controller.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn jab() -> SkillDefinition {
    SkillDefinition::new("jab")
        .with_cost(ResourceCost::energy(30.0))
        .with_cooldown(5.0)
        .with_targeting(Targeting::single(10.0).with_filter(TargetFilter::Enemies))
        .with_damage(DamageSpec::new(10.0, DamageType::True))
        .with_effect(SkillEffect::on_hit(EffectKind::Damage))
}

#[test]
fn gating_checks_report_the_first_failure() {
    init_tracing();
    let config = CombatConfig::new();
    let env = CombatEnv::new(&config);
    let mut roster = skirmish();

    let empty = SkillExecutionController::empty();
    assert_eq!(empty.check(PLAYER, &roster), Err(UseError::MissingDefinition));

    let mut controller = SkillExecutionController::new(jab());
    assert_eq!(controller.check(EntityId(99), &roster), Err(UseError::MissingCaster(EntityId(99))));

    if let Some(orc) = roster.get_mut(ORC) {
        orc.take_damage(1_000.0, DamageType::True, &config);
    }
    assert_eq!(controller.check(ORC, &roster), Err(UseError::CasterDead(ORC)));

    if let Some(player) = roster.get_mut(PLAYER) {
        assert!(player.spend(ResourceKind::Energy, 80.0));
    }
    let ctx = SkillContext::new(PLAYER).with_target_entity(GOBLIN);
    let rejected = controller.try_execute(ctx.clone(), &mut roster, &env);
    assert_eq!(
        rejected,
        Err(UseError::InsufficientResource {
            resource: ResourceKind::Energy,
            required: 30.0,
            available: 20.0,
        })
    );
    assert_eq!(controller.state(), SkillState::Idle);
    assert_eq!(controller.invocations(), 0);
    assert_eq!(energy(&roster, PLAYER), 20.0);
    assert_eq!(health(&roster, GOBLIN), 100.0);
    assert_eq!(
        controller.failure_reason().as_deref(),
        Some("insufficient energy: need 30, have 20")
    );

    if let Some(player) = roster.get_mut(PLAYER) {
        player.restore_energy(100.0);
    }
    assert!(controller.try_execute(ctx, &mut roster, &env).is_ok());
    assert!(controller.last_failure().is_none());

    // Cooldown is checked before the caster.
    assert!(matches!(
        controller.check(EntityId(99), &roster),
        Err(UseError::OnCooldown { remaining }) if remaining == 5.0
    ));
}

#[test]
fn casting_skill_is_busy_until_resolved() {
    let config = CombatConfig::new();
    let env = CombatEnv::new(&config);
    let mut roster = skirmish();
    let mut controller = SkillExecutionController::new(jab().with_cooldown(0.0).with_cast_time(1.0));
    let ctx = SkillContext::new(PLAYER).with_target_entity(GOBLIN);

    controller.try_execute(ctx.clone(), &mut roster, &env).expect("first cast starts");
    assert_eq!(controller.state(), SkillState::Casting);
    assert_eq!(controller.try_execute(ctx.clone(), &mut roster, &env), Err(UseError::Busy));
    assert_eq!(energy(&roster, PLAYER), 70.0);

    controller.tick(0.6, &mut roster, &env);
    assert_eq!(health(&roster, GOBLIN), 100.0);
    controller.tick(0.6, &mut roster, &env);
    assert_eq!(health(&roster, GOBLIN), 90.0);
    assert_eq!(controller.state(), SkillState::Idle);

    assert!(controller.try_execute(ctx, &mut roster, &env).is_ok());
}

#[test]
fn cooldown_counts_down_monotonically() {
    let config = CombatConfig::new();
    let env = CombatEnv::new(&config);
    let mut roster = skirmish();
    let mut controller = SkillExecutionController::new(jab().with_cooldown(1.0));
    let events = record_events(&mut controller);

    controller
        .try_execute(SkillContext::new(PLAYER).with_target_entity(GOBLIN), &mut roster, &env)
        .expect("ready");

    let mut previous = controller.cooldown_remaining();
    for dt in [0.1, 0.0, 0.35, -1.0, 0.2, f32::NAN, 0.5, 0.5] {
        controller.tick(dt, &mut roster, &env);
        let remaining = controller.cooldown_remaining();
        assert!(remaining <= previous, "{remaining} > {previous} after dt={dt}");
        assert!(remaining >= 0.0);
        previous = remaining;
    }

    assert_eq!(controller.cooldown_remaining(), 0.0);
    assert_eq!(controller.state(), SkillState::Idle);
    let ready = events
        .borrow()
        .iter()
        .filter(|event| matches!(event, SkillEvent::CooldownReady { .. }))
        .count();
    assert_eq!(ready, 1);
}

#[test]
fn hit_events_fire_across_the_cast() {
    init_tracing();
    let config = CombatConfig::new();
    let env = CombatEnv::new(&config);
    let mut roster = skirmish();
    let combo = jab()
        .with_cooldown(1.0)
        .with_cast_time(0.5)
        .with_animation(AnimationLink::new("combo", 1.0).with_hit_events(&[0.25, 0.75]));
    let mut controller = SkillExecutionController::new(combo);
    let events = record_events(&mut controller);

    controller
        .try_execute(SkillContext::new(PLAYER).with_target_entity(GOBLIN), &mut roster, &env)
        .expect("ready");
    let token = match controller.drain_requests().as_slice() {
        [SkillRequest::PlayAnimation(request)] => {
            assert_eq!(request.clip, "combo");
            assert_eq!(request.playback_speed, 1.0);
            request.token
        }
        other => panic!("unexpected requests {other:?}"),
    };

    controller.tick(0.3, &mut roster, &env);
    assert_eq!(health(&roster, GOBLIN), 90.0);
    assert_eq!(controller.state(), SkillState::Casting);

    controller.tick(0.3, &mut roster, &env);
    assert_eq!(controller.state(), SkillState::Cooldown);
    assert_eq!(health(&roster, GOBLIN), 90.0);

    controller.tick(0.3, &mut roster, &env);
    assert_eq!(health(&roster, GOBLIN), 80.0);

    controller.tick(0.3, &mut roster, &env);
    assert_eq!(controller.state(), SkillState::Idle);

    // A stale completion notice changes nothing.
    controller.on_animation_complete(token, &mut roster, &env);
    assert_eq!(health(&roster, GOBLIN), 80.0);

    let report = controller.take_report();
    assert_eq!(report.recipients(), vec![GOBLIN]);
    assert_eq!(report.damage_dealt(), 20.0);

    let events = events.borrow();
    assert_eq!(
        *events,
        vec![
            SkillEvent::Used { skill: "jab".into(), caster: PLAYER },
            SkillEvent::HitEvent { skill: "jab".into(), index: 0 },
            SkillEvent::Resolved { skill: "jab".into(), recipients: 0 },
            SkillEvent::HitEvent { skill: "jab".into(), index: 1 },
            SkillEvent::CooldownReady { skill: "jab".into() },
        ]
    );
}

#[test]
fn animation_completion_flushes_remaining_hits() {
    let config = CombatConfig::new();
    let env = CombatEnv::new(&config);
    let mut roster = skirmish();
    let flurry = jab().with_animation(AnimationLink::new("flurry", 2.0).with_hit_events(&[0.2, 0.4, 0.9]));
    let mut controller = SkillExecutionController::new(flurry);

    controller
        .try_execute(SkillContext::new(PLAYER).with_target_entity(GOBLIN), &mut roster, &env)
        .expect("ready");
    let Some(SkillRequest::PlayAnimation(request)) = controller.drain_requests().pop() else {
        panic!("animation was not requested");
    };

    controller.tick(0.5, &mut roster, &env);
    assert_eq!(health(&roster, GOBLIN), 90.0);

    controller.on_animation_complete(request.token, &mut roster, &env);
    assert_eq!(health(&roster, GOBLIN), 70.0);
    assert!(!controller.animation().is_playing());
}

#[test]
fn interrupt_before_commit_cancels_without_refund() {
    let config = CombatConfig::new();
    let env = CombatEnv::new(&config);
    let mut roster = skirmish();
    if let Some(player) = roster.get_mut(PLAYER) {
        player.take_damage(50.0, DamageType::True, &config);
    }
    let channel = SkillDefinition::new("channel")
        .with_cost(ResourceCost::energy(20.0))
        .with_cooldown(3.0)
        .with_cast_time(1.0)
        .with_targeting(Targeting::self_only())
        .with_heal(HealSpec::new(40.0))
        .with_animation(AnimationLink::new("channel", 2.0))
        .with_effect(SkillEffect::on_cast(EffectKind::Heal));
    let mut controller = SkillExecutionController::new(channel);
    let events = record_events(&mut controller);

    controller.try_execute(SkillContext::new(PLAYER), &mut roster, &env).expect("ready");
    controller.tick(0.2, &mut roster, &env);
    assert!(controller.try_interrupt());
    assert!(!controller.try_interrupt());

    let requests = controller.drain_requests();
    match requests.as_slice() {
        [SkillRequest::PlayAnimation(play), SkillRequest::StopAnimation(stopped)] => {
            assert_eq!(play.token, *stopped);
        }
        other => panic!("unexpected requests {other:?}"),
    }

    assert_eq!(controller.state(), SkillState::Cooldown);
    assert!(approx(controller.cooldown_remaining(), 2.8));
    assert_eq!(energy(&roster, PLAYER), 80.0);
    assert_eq!(health(&roster, PLAYER), 50.0);
    assert!(controller.take_report().is_empty());

    controller.tick(5.0, &mut roster, &env);
    assert_eq!(health(&roster, PLAYER), 50.0);
    assert!(events.borrow().contains(&SkillEvent::Interrupted { skill: "channel".into() }));
    assert!(!events.borrow().iter().any(|event| matches!(event, SkillEvent::Resolved { .. })));
}

#[test]
fn caster_death_cancels_the_cast() {
    let config = CombatConfig::new();
    let env = CombatEnv::new(&config);
    let mut roster = skirmish();
    let mut controller = SkillExecutionController::new(jab().with_cast_time(1.0));

    controller
        .try_execute(SkillContext::new(PLAYER).with_target_entity(GOBLIN), &mut roster, &env)
        .expect("ready");
    if let Some(player) = roster.get_mut(PLAYER) {
        player.take_damage(500.0, DamageType::True, &config);
    }
    controller.tick(2.0, &mut roster, &env);

    assert_eq!(health(&roster, GOBLIN), 100.0);
    assert_eq!(controller.state(), SkillState::Cooldown);
}

#[test]
fn projectiles_deliver_the_cast_time_payload() {
    init_tracing();
    let config = CombatConfig::new();
    let env = CombatEnv::new(&config);
    let mut roster = skirmish();
    let firebolt = SkillDefinition::new("firebolt")
        .with_cost(ResourceCost::energy(10.0))
        .with_cooldown(1.0)
        .with_targeting(Targeting::single(10.0).with_filter(TargetFilter::Enemies))
        .with_damage(DamageSpec::new(20.0, DamageType::Physical))
        .with_animation(AnimationLink::new("cast", 1.0).with_hit_events(&[0.5]))
        .with_projectile(ProjectileSpec::new("bolt", 12.0, 3.0).homing())
        .with_effect(SkillEffect::on_hit(EffectKind::Damage));
    let mut controller = SkillExecutionController::new(firebolt);

    controller
        .try_execute(SkillContext::new(PLAYER).with_target_entity(GOBLIN), &mut roster, &env)
        .expect("ready");
    controller.tick(0.6, &mut roster, &env);

    let mut requests = controller.drain_requests();
    assert_eq!(requests.len(), 2);
    let Some(SkillRequest::SpawnProjectile(bolt)) = requests.pop() else {
        panic!("projectile was not requested");
    };
    assert_eq!(bolt.prefab, "bolt");
    assert_eq!(bolt.position, Position::ORIGIN);
    assert!(approx(bolt.direction.x, 1.0) && approx(bolt.direction.z, 0.0));
    assert!(approx(bolt.rotation, FRAC_PI_2));
    assert_eq!(bolt.homing_target, Some(GOBLIN));
    assert_eq!(bolt.speed, 12.0);
    assert_eq!(health(&roster, GOBLIN), 100.0);

    // Stat changes after the cast do not affect the projectile in flight.
    if let Some(player) = roster.get_mut(PLAYER) {
        player.set_base(StatVariable::PhysicalDamage, 0.0);
    }

    let friendly = controller.on_projectile_hit(&bolt, ALLY, &mut roster, &env);
    assert!(friendly.is_empty());
    assert_eq!(health(&roster, ALLY), 100.0);

    let report = controller.on_projectile_hit(&bolt, GOBLIN, &mut roster, &env);
    assert_eq!(report.damage_dealt(), 47.0);
    assert_eq!(health(&roster, GOBLIN), 53.0);
}

struct OnlyEnemiesNear(Vec<EntityId>);

impl SpatialQuery for OnlyEnemiesNear {
    fn entities_within(&self, _center: Position, _radius: f32, layers: LayerMask) -> Vec<EntityId> {
        if layers.contains(LayerMask::ENEMY) {
            self.0.clone()
        } else {
            Vec::new()
        }
    }
}

#[test]
fn area_targeting_uses_injected_spatial_query() {
    let config = CombatConfig::new();
    let quake = SkillDefinition::new("quake")
        .with_targeting(Targeting::area(10.0).with_filter(TargetFilter::Enemies))
        .with_damage(DamageSpec::new(15.0, DamageType::True))
        .with_effect(SkillEffect::on_cast(EffectKind::Damage));
    let ctx = SkillContext::new(PLAYER).with_target_point(Position::ORIGIN);

    let mut roster = skirmish();
    let mut controller = SkillExecutionController::new(quake.clone());
    controller.try_execute(ctx.clone(), &mut roster, &CombatEnv::new(&config)).expect("ready");
    assert_eq!(controller.take_report().recipients(), vec![GOBLIN, ORC]);

    let spatial = OnlyEnemiesNear(vec![ORC]);
    let env = CombatEnv::new(&config).with_spatial(&spatial);
    let mut roster = skirmish();
    let mut controller = SkillExecutionController::new(quake);
    controller.try_execute(ctx, &mut roster, &env).expect("ready");

    assert_eq!(controller.take_report().recipients(), vec![ORC]);
    assert_eq!(health(&roster, ORC), 85.0);
    assert_eq!(health(&roster, GOBLIN), 100.0);
}

#[test]
fn over_time_heal_is_spread_across_updates() {
    let config = CombatConfig::new();
    let env = CombatEnv::new(&config);
    let mut roster = skirmish();
    if let Some(player) = roster.get_mut(PLAYER) {
        player.take_damage(50.0, DamageType::True, &config);
    }
    let rejuvenate = SkillDefinition::new("rejuvenate")
        .with_targeting(Targeting::self_only())
        .with_heal(HealSpec::new(40.0))
        .with_effect(SkillEffect::over_time(EffectKind::Heal, 2.0));
    let mut controller = SkillExecutionController::new(rejuvenate);

    controller.try_execute(SkillContext::new(PLAYER), &mut roster, &env).expect("ready");
    let report = controller.take_report();
    assert!(matches!(report.applications[0].outcome, EffectOutcome::PeriodicStarted));
    assert_eq!(health(&roster, PLAYER), 50.0);

    roster.update(1.0, &config);
    assert!(approx(health(&roster, PLAYER), 70.0));
    roster.update(1.0, &config);
    assert!(approx(health(&roster, PLAYER), 90.0));
    roster.update(1.0, &config);
    assert!(approx(health(&roster, PLAYER), 90.0));
}

#[test]
fn over_time_damage_and_heal_from_one_skill_coexist() {
    let config = CombatConfig::new();
    let env = CombatEnv::new(&config);
    let mut roster = skirmish();
    let blood_pact = SkillDefinition::new("blood_pact")
        .with_targeting(Targeting::self_only())
        .with_damage(DamageSpec::new(20.0, DamageType::True))
        .with_heal(HealSpec::new(0.0))
        .with_effect(SkillEffect::over_time(EffectKind::Damage, 2.0))
        .with_effect(SkillEffect::over_time(EffectKind::Heal, 2.0));
    let mut controller = SkillExecutionController::new(blood_pact);

    controller.try_execute(SkillContext::new(PLAYER), &mut roster, &env).expect("ready");
    for _ in 0..4 {
        roster.update(0.5, &config);
    }
    assert!(approx(health(&roster, PLAYER), 80.0));
}
