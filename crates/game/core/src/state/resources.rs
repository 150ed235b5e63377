//! Current health and energy pools.

use crate::stats::{StatBlock, StatVariable};

/// Pool a skill cost is paid from.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ResourceKind {
    #[default]
    Energy,
    Health,
}

impl ResourceKind {
    /// Stat variable that caps this pool.
    pub fn maximum_variable(self) -> StatVariable {
        match self {
            ResourceKind::Energy => StatVariable::MaxEnergy,
            ResourceKind::Health => StatVariable::MaxHealth,
        }
    }

    /// Stat variable that regenerates this pool, per second.
    pub fn regen_variable(self) -> StatVariable {
        match self {
            ResourceKind::Energy => StatVariable::EnergyRegen,
            ResourceKind::Health => StatVariable::HealthRegen,
        }
    }
}

/// Current values of the two pools.
///
/// Maximums live in the stat block; every mutation goes through [`clamp`]
/// so the pools never exceed `Total(MaxHealth)` / `Total(MaxEnergy)`.
///
/// [`clamp`]: Resources::clamp
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resources {
    pub health: f32,
    pub energy: f32,
}

impl Resources {
    /// Both pools filled to the maximums in `stats`.
    pub fn full(stats: &StatBlock) -> Self {
        Self {
            health: maximum(stats, ResourceKind::Health),
            energy: maximum(stats, ResourceKind::Energy),
        }
    }

    pub fn get(&self, kind: ResourceKind) -> f32 {
        match kind {
            ResourceKind::Energy => self.energy,
            ResourceKind::Health => self.health,
        }
    }

    fn get_mut(&mut self, kind: ResourceKind) -> &mut f32 {
        match kind {
            ResourceKind::Energy => &mut self.energy,
            ResourceKind::Health => &mut self.health,
        }
    }

    /// Returns true if `amount` can be paid from `kind`.
    pub fn can_afford(&self, kind: ResourceKind, amount: f32) -> bool {
        self.get(kind) >= amount.max(0.0)
    }

    /// Removes up to `amount` from `kind` and returns what was removed.
    pub fn drain(&mut self, kind: ResourceKind, amount: f32) -> f32 {
        let pool = self.get_mut(kind);
        let drained = amount.max(0.0).min(*pool);
        *pool -= drained;
        drained
    }

    /// Adds up to `amount` to `kind` without exceeding its maximum. Returns
    /// what was actually restored.
    pub fn restore(&mut self, kind: ResourceKind, amount: f32, stats: &StatBlock) -> f32 {
        let cap = maximum(stats, kind);
        let pool = self.get_mut(kind);
        let target = (*pool + amount.max(0.0)).min(cap);
        if target <= *pool {
            return 0.0;
        }
        let restored = target - *pool;
        *pool = target;
        restored
    }

    /// Clamps both pools into `[0, maximum]`.
    pub fn clamp(&mut self, stats: &StatBlock) {
        self.health = self.health.clamp(0.0, maximum(stats, ResourceKind::Health));
        self.energy = self.energy.clamp(0.0, maximum(stats, ResourceKind::Energy));
    }

    /// `maximum - current` for `kind`, never negative.
    pub fn missing(&self, kind: ResourceKind, stats: &StatBlock) -> f32 {
        (maximum(stats, kind) - self.get(kind)).max(0.0)
    }
}

/// Maximum of the pool, never negative.
pub fn maximum(stats: &StatBlock, kind: ResourceKind) -> f32 {
    stats.total(kind.maximum_variable()).max(0.0)
}
