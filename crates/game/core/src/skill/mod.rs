//! Skill definitions and their execution pipeline.
//!
//! A [`SkillExecutionController`] drives one skill for one caster through
//! validation, casting, resolution and cooldown. It borrows the [`Roster`]
//! for the duration of each call and never keeps references between calls.
//!
//! [`Roster`]: crate::state::Roster

pub mod animation;
pub mod context;
pub mod controller;
pub mod definition;
pub mod error;
pub mod events;
pub mod formula;
pub mod requests;
pub mod timing;

pub use animation::{AnimationToken, CrossedHits, SkillAnimationController};
pub use context::{SkillContext, SkillTarget};
pub use controller::{SkillExecutionController, SkillState};
pub use definition::{
    AnimationLink, CombineOp, CriticalRule, DamageScaling, DamageSpec, HealScaling, HealSpec,
    ProjectileBehavior, ProjectileSpec, ResourceCost, SkillDefinition,
};
pub use error::{ConfigError, UseError};
pub use events::{SkillEvent, SkillListener};
pub use formula::{DamagePayload, HealPayload, SkillPayload, critical_chance};
pub use requests::{AnimationRequest, ProjectileSpawnRequest, SkillRequest};
pub use timing::SkillTimesController;
