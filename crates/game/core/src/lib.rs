//! Real-time combat resolution for an action-RPG simulation.
//!
//! `combat-core` turns declarative skill definitions and layered character
//! statistics into damage, healing and temporary stat changes, while
//! enforcing resource costs, cooldowns, cast timing and animation-synced hit
//! events.
//!
//! Everything runs on one simulation thread advanced in discrete steps. Each
//! [`Combatant`] exclusively owns its [`StatBlock`] and [`BuffManager`];
//! skills borrow the [`Roster`] for the duration of one call.
pub mod buff;
pub mod combat;
pub mod config;
pub mod effect;
pub mod env;
pub mod error;
pub mod skill;
pub mod state;
pub mod stats;

pub use buff::{
    ApplyOutcome, BuffData, BuffEvent, BuffManager, BuffSlot, BuffTickReport, DistributedBuff,
    PeriodicEffect, PeriodicKind,
};
pub use combat::{DamageType, mitigate, mitigation};
pub use config::CombatConfig;
pub use effect::{
    DispatchReport, EffectKind, EffectOutcome, EffectTiming, SkillEffect, SkillEffectController,
    TargetFilter, Targeting, TargetingMode,
};
pub use env::{CombatEnv, LayerMask, PcgRng, RngOracle, SpatialQuery};
pub use error::{CombatError, ErrorSeverity};
pub use skill::{
    AnimationLink, AnimationRequest, AnimationToken, CombineOp, ConfigError, CriticalRule,
    DamageScaling, DamageSpec, HealScaling, HealSpec, ProjectileSpawnRequest, ProjectileSpec,
    ResourceCost, SkillContext, SkillDefinition, SkillEvent, SkillExecutionController,
    SkillRequest, SkillState, SkillTarget, UseError,
};
pub use state::{Combatant, DamageReport, EntityId, Faction, Position, ResourceKind, Resources, Roster};
pub use stats::{Equipment, Modifier, ModifierOp, StatBlock, StatLayer, StatVariable};
