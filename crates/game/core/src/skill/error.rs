//! Skill usage errors.

use crate::error::{CombatError, ErrorSeverity};
use crate::state::{EntityId, ResourceKind};

/// Broken or incomplete configuration data.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The animation link names no clip.
    #[error("skill {skill} references an animation without a clip")]
    MissingAnimationClip { skill: String },

    /// A projectile prefab reference is empty.
    #[error("skill {skill} references a projectile without a prefab")]
    MissingProjectilePrefab { skill: String },
}

impl CombatError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingAnimationClip { .. } => "CONFIG_MISSING_ANIMATION_CLIP",
            Self::MissingProjectilePrefab { .. } => "CONFIG_MISSING_PROJECTILE_PREFAB",
        }
    }
}

/// Why a skill could not be used. `Display` is the human-readable reason.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum UseError {
    #[error("no skill definition assigned")]
    MissingDefinition,

    #[error("on cooldown ({remaining:.1}s remaining)")]
    OnCooldown { remaining: f32 },

    /// A previous invocation is still casting or animating.
    #[error("skill is busy")]
    Busy,

    #[error("caster {0} not found")]
    MissingCaster(EntityId),

    #[error("caster {0} is dead")]
    CasterDead(EntityId),

    #[error("insufficient {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: ResourceKind,
        required: f32,
        available: f32,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CombatError for UseError {
    fn severity(&self) -> ErrorSeverity {
        use UseError::*;
        match self {
            OnCooldown { .. } | Busy | InsufficientResource { .. } => ErrorSeverity::Recoverable,
            MissingCaster(_) | CasterDead(_) => ErrorSeverity::Validation,
            MissingDefinition => ErrorSeverity::Internal,
            Config(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        use UseError::*;
        match self {
            MissingDefinition => "SKILL_MISSING_DEFINITION",
            OnCooldown { .. } => "SKILL_ON_COOLDOWN",
            Busy => "SKILL_BUSY",
            MissingCaster(_) => "SKILL_MISSING_CASTER",
            CasterDead(_) => "SKILL_CASTER_DEAD",
            InsufficientResource { .. } => "SKILL_INSUFFICIENT_RESOURCE",
            Config(error) => error.error_code(),
        }
    }
}

impl UseError {
    /// Gating failures callers surface as "not ready" feedback.
    pub fn is_gating(&self) -> bool {
        self.severity().is_recoverable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_are_readable() {
        let error = UseError::InsufficientResource {
            resource: ResourceKind::Energy,
            required: 30.0,
            available: 10.0,
        };
        assert_eq!(error.to_string(), "insufficient energy: need 30, have 10");
        assert!(error.is_gating());
        assert_eq!(error.error_code(), "SKILL_INSUFFICIENT_RESOURCE");
    }

    #[test]
    fn config_errors_are_internal() {
        let error = UseError::from(ConfigError::MissingAnimationClip {
            skill: "slash".into(),
        });
        assert_eq!(error.severity(), ErrorSeverity::Internal);
        assert!(!error.is_gating());
    }
}
