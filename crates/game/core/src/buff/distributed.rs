//! Buffs whose magnitude is integrated linearly over their duration.
//!
//! Each update applies `total * dt' / duration` with `dt' = min(dt, remaining)`.
//! On the final update the residual `total - applied_so_far` is written, so the
//! integrated amount equals the total exactly regardless of frame-time
//! variance. The owner then reverts the whole amount.

use super::data::BuffData;
use crate::config::CombatConfig;
use crate::stats::{Modifier, StatBlock, StatLayer, StatVariable};

/// Integration state for one modifier of a distributed buff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickModifier {
    pub original: Modifier,
    /// Absolute magnitude to reach at expiry, fixed when the buff was created.
    pub total_absolute_value: f32,
    pub applied_so_far: f32,
}

impl TickModifier {
    fn new(original: Modifier, stats: &StatBlock) -> Self {
        Self {
            original,
            total_absolute_value: original.absolute_delta(stats),
            applied_so_far: 0.0,
        }
    }

    fn variable(&self) -> StatVariable {
        self.original.variable
    }

    /// Portion still to be written before reaching the total.
    fn outstanding(&self) -> f32 {
        self.total_absolute_value - self.applied_so_far
    }

    /// Applies `amount`, never overshooting the total.
    fn advance(&mut self, amount: f32, stats: &mut StatBlock) {
        let outstanding = self.outstanding();
        let step = if outstanding >= 0.0 {
            amount.clamp(0.0, outstanding)
        } else {
            amount.clamp(outstanding, 0.0)
        };
        if step != 0.0 {
            stats.apply_layer_modifier(StatLayer::External, self.variable(), step);
            self.applied_so_far += step;
        }
    }

    /// Writes the remaining residual so `applied_so_far == total_absolute_value`.
    fn settle(&mut self, stats: &mut StatBlock) {
        let residual = self.outstanding();
        if residual != 0.0 {
            stats.apply_layer_modifier(StatLayer::External, self.variable(), residual);
        }
        self.applied_so_far = self.total_absolute_value;
    }

    fn revert(&mut self, stats: &mut StatBlock) {
        if self.applied_so_far != 0.0 {
            stats.apply_layer_modifier(StatLayer::External, self.variable(), -self.applied_so_far);
        }
        self.applied_so_far = 0.0;
    }
}

/// A buff spread over its duration.
#[derive(Clone, Debug, PartialEq)]
pub struct DistributedBuff {
    name: String,
    duration: f32,
    remaining_time: f32,
    tick_interval: f32,
    /// Time aged but not yet integrated (only non-zero with a tick interval).
    pending_time: f32,
    is_debuff: bool,
    modifiers: Vec<TickModifier>,
}

impl DistributedBuff {
    /// Fixes each modifier's total against `stats` as they are now.
    pub fn new(data: &BuffData, stats: &StatBlock) -> Self {
        let duration = data.clamped_duration();
        Self {
            name: data.name.clone(),
            duration,
            remaining_time: duration,
            tick_interval: data.tick_interval.max(0.0),
            pending_time: 0.0,
            is_debuff: data.is_debuff,
            modifiers: data
                .modifiers
                .iter()
                .map(|modifier| TickModifier::new(*modifier, stats))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn remaining_time(&self) -> f32 {
        self.remaining_time
    }

    pub fn is_debuff(&self) -> bool {
        self.is_debuff
    }

    pub fn modifiers(&self) -> &[TickModifier] {
        &self.modifiers
    }

    /// Remaining time within [`CombatConfig::CONVERGENCE_EPSILON`] counts as
    /// expired, so accumulated frame times never leave a sliver update.
    pub fn is_expired(&self) -> bool {
        self.remaining_time <= CombatConfig::CONVERGENCE_EPSILON
    }

    /// Restores the remaining time without touching integration state.
    pub fn refresh(&mut self, duration: f32) {
        self.remaining_time = duration.max(0.0);
    }

    /// Integrates `dt` seconds. Returns true when the buff reached expiry, at
    /// which point every modifier has been settled to its exact total.
    pub fn step(&mut self, dt: f32, stats: &mut StatBlock) -> bool {
        let dt = dt.max(0.0).min(self.remaining_time);
        self.remaining_time -= dt;
        self.pending_time += dt;

        let expired = self.is_expired();
        let due = self.tick_interval <= 0.0 || self.pending_time >= self.tick_interval;
        if (due || expired) && self.pending_time > 0.0 {
            let portion = if self.duration > 0.0 {
                self.pending_time / self.duration
            } else {
                1.0
            };
            for modifier in &mut self.modifiers {
                modifier.advance(modifier.total_absolute_value * portion, stats);
            }
            self.pending_time = 0.0;
        }

        if expired {
            for modifier in &mut self.modifiers {
                modifier.settle(stats);
            }
        }
        expired
    }

    /// Reverts everything integrated so far.
    pub fn revert(&mut self, stats: &mut StatBlock) {
        for modifier in &mut self.modifiers {
            modifier.revert(stats);
        }
    }
}
