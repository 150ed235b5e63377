//! Skill lifecycle notifications.

use crate::state::EntityId;

#[derive(Clone, Debug, PartialEq)]
pub enum SkillEvent {
    /// Cost paid and cooldown started.
    Used { skill: String, caster: EntityId },
    /// A hit event fired; `index` is its position in the animation's list.
    HitEvent { skill: String, index: usize },
    /// The cast completed and on-cast effects were dispatched.
    Resolved { skill: String, recipients: usize },
    Interrupted { skill: String },
    CooldownReady { skill: String },
}

impl SkillEvent {
    pub fn skill(&self) -> &str {
        match self {
            Self::Used { skill, .. }
            | Self::HitEvent { skill, .. }
            | Self::Resolved { skill, .. }
            | Self::Interrupted { skill }
            | Self::CooldownReady { skill } => skill,
        }
    }
}

/// Callback registered through
/// [`SkillExecutionController::subscribe`](super::SkillExecutionController::subscribe).
pub type SkillListener = Box<dyn FnMut(&SkillEvent)>;
