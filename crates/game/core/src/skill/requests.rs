//! Requests for external collaborators.
//!
//! The controller never plays animations or spawns objects itself. It queues
//! requests that the caller drains after each call and hands to the
//! animation and projectile systems.

use super::animation::AnimationToken;
use super::context::SkillContext;
use super::definition::ProjectileBehavior;
use super::formula::SkillPayload;
use crate::state::{EntityId, Position};

/// Play a clip; report completion with `token` through
/// [`SkillExecutionController::on_animation_complete`](super::SkillExecutionController::on_animation_complete).
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationRequest {
    pub clip: String,
    pub playback_speed: f32,
    pub token: AnimationToken,
}

/// Instantiate a projectile that delivers `payload` on impact.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSpawnRequest {
    pub context: SkillContext,
    pub prefab: String,
    pub position: Position,
    /// Yaw in radians around the vertical axis.
    pub rotation: f32,
    /// Unit vector.
    pub direction: Position,
    pub homing_target: Option<EntityId>,
    pub speed: f32,
    pub lifetime: f32,
    pub behavior: ProjectileBehavior,
    pub payload: SkillPayload,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SkillRequest {
    PlayAnimation(AnimationRequest),
    /// The cast was interrupted; stop the clip started with this token.
    StopAnimation(AnimationToken),
    SpawnProjectile(ProjectileSpawnRequest),
}
