//! Per-invocation input.

use crate::state::{EntityId, Position};

/// What a skill is aimed at.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillTarget {
    Entity(EntityId),
    Position(Position),
}

/// Transient description of one invocation.
///
/// Missing positions are filled from the roster when the invocation starts:
/// `origin` from the caster, `target_position` from the target entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillContext {
    pub caster: EntityId,
    pub target: Option<SkillTarget>,
    /// Skill level, at least 1.
    pub level: u32,
    pub origin: Option<Position>,
    pub target_position: Option<Position>,
}

impl SkillContext {
    pub fn new(caster: EntityId) -> Self {
        Self {
            caster,
            target: None,
            level: 1,
            origin: None,
            target_position: None,
        }
    }

    pub fn with_target_entity(mut self, target: EntityId) -> Self {
        self.target = Some(SkillTarget::Entity(target));
        self
    }

    /// Aims at a point; also sets `target_position`.
    pub fn with_target_point(mut self, point: Position) -> Self {
        self.target = Some(SkillTarget::Position(point));
        self.target_position = Some(point);
        self
    }

    pub fn with_target_position(mut self, position: Position) -> Self {
        self.target_position = Some(position);
        self
    }

    pub fn with_origin(mut self, origin: Position) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn target_entity(&self) -> Option<EntityId> {
        match self.target {
            Some(SkillTarget::Entity(id)) => Some(id),
            _ => None,
        }
    }

    pub fn level(&self) -> u32 {
        self.level.max(1)
    }
}
