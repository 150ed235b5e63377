//! Over-time damage and healing on current health.
//!
//! Periodic effects use the same linear integration and final residual
//! correction as distributed buffs, but target the health pool instead of a
//! stat layer and are never reverted.

use crate::combat::DamageType;
use crate::config::CombatConfig;

/// What a periodic effect does to the health pool.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PeriodicKind {
    /// Raw damage, mitigated by the receiver on every tick.
    Damage(DamageType),
    Heal,
}

/// Amount delivered by one periodic effect during one update.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicTick {
    pub name: String,
    pub kind: PeriodicKind,
    pub amount: f32,
}

/// Damage or healing spread over a duration.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicEffect {
    name: String,
    kind: PeriodicKind,
    total: f32,
    delivered: f32,
    duration: f32,
    remaining_time: f32,
}

impl PeriodicEffect {
    pub fn new(name: impl Into<String>, kind: PeriodicKind, total: f32, duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            name: name.into(),
            kind,
            total: total.max(0.0),
            delivered: 0.0,
            duration,
            remaining_time: duration,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PeriodicKind {
        self.kind
    }

    pub fn total(&self) -> f32 {
        self.total
    }

    pub fn delivered(&self) -> f32 {
        self.delivered
    }

    pub fn remaining_time(&self) -> f32 {
        self.remaining_time
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_time <= CombatConfig::CONVERGENCE_EPSILON
    }

    /// Restores the remaining time and tops the total up to the new amount.
    pub fn refresh(&mut self, total: f32, duration: f32) {
        self.remaining_time = duration.max(0.0);
        self.duration = self.duration.max(self.remaining_time);
        self.total = self.delivered + total.max(0.0);
    }

    /// Advances by `dt` and returns the amount to deliver now.
    pub fn step(&mut self, dt: f32) -> f32 {
        let dt = dt.max(0.0).min(self.remaining_time);
        self.remaining_time -= dt;

        let amount = if self.is_expired() {
            self.total - self.delivered
        } else if self.duration > 0.0 {
            (self.total * dt / self.duration).min(self.total - self.delivered)
        } else {
            0.0
        };

        self.delivered += amount;
        if self.is_expired() {
            self.delivered = self.total;
        }
        amount
    }
}
