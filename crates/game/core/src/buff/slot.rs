//! Stackable, duration-bound buff instance.
//!
//! # Bookkeeping invariant
//!
//! The magnitude a slot has written into the external layer always equals
//! `source_modifiers * last_applied_stack_count`. The stack count may run
//! ahead of what has been applied (several reapplications in one frame);
//! [`BuffSlot::sync`] consumes exactly the pending stack delta, so applying
//! twice or reverting twice never double-counts.

use super::data::BuffData;
use crate::stats::{Modifier, StatBlock, StatLayer};

/// One named buff on one character.
#[derive(Clone, Debug, PartialEq)]
pub struct BuffSlot {
    name: String,
    source_modifiers: Vec<Modifier>,
    /// Absolute amount currently written per source modifier.
    applied: Vec<f32>,
    stack_count: u32,
    max_stacks: u32,
    duration: f32,
    remaining_time: f32,
    last_applied_stack_count: u32,
    is_debuff: bool,
}

impl BuffSlot {
    /// Creates a slot holding one pending stack. Nothing is applied until
    /// [`BuffSlot::sync`] runs.
    pub fn new(data: &BuffData) -> Self {
        let duration = data.clamped_duration();
        Self {
            name: data.name.clone(),
            source_modifiers: data.modifiers.clone(),
            applied: vec![0.0; data.modifiers.len()],
            stack_count: 1,
            max_stacks: data.stack_cap(),
            duration,
            remaining_time: duration,
            last_applied_stack_count: 0,
            is_debuff: data.is_debuff,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stack_count(&self) -> u32 {
        self.stack_count
    }

    pub fn max_stacks(&self) -> u32 {
        self.max_stacks
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn remaining_time(&self) -> f32 {
        self.remaining_time
    }

    pub fn last_applied_stack_count(&self) -> u32 {
        self.last_applied_stack_count
    }

    pub fn is_debuff(&self) -> bool {
        self.is_debuff
    }

    pub fn is_at_max_stacks(&self) -> bool {
        self.stack_count >= self.max_stacks
    }

    /// Slot is finished and must be reverted.
    pub fn is_expired(&self) -> bool {
        self.remaining_time <= 0.0 || self.stack_count == 0
    }

    /// Absolute amount currently applied for each source modifier.
    pub fn applied_amounts(&self) -> impl Iterator<Item = (&Modifier, f32)> {
        self.source_modifiers.iter().zip(self.applied.iter().copied())
    }

    /// Adds one stack (clamped to the cap). Returns true if the count changed.
    pub fn add_stack(&mut self) -> bool {
        if self.is_at_max_stacks() {
            return false;
        }
        self.stack_count += 1;
        true
    }

    /// Removes one stack. Returns true if the count changed.
    pub fn remove_stack(&mut self) -> bool {
        if self.stack_count == 0 {
            return false;
        }
        self.stack_count -= 1;
        true
    }

    /// Restores the full duration.
    pub fn refresh(&mut self) {
        self.remaining_time = self.duration;
    }

    /// Ages the slot by `dt`. Returns true once it has expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining_time = (self.remaining_time - dt.max(0.0)).max(0.0);
        self.is_expired()
    }

    /// Returns the stack delta not yet applied and marks it as applied.
    pub fn consume_stack_delta(&mut self) -> i32 {
        let delta = self.stack_count as i32 - self.last_applied_stack_count as i32;
        self.last_applied_stack_count = self.stack_count;
        delta
    }

    /// Brings the external layer in line with the current stack count.
    ///
    /// Positive deltas apply only the added stacks. Negative deltas revert
    /// the removed stacks' share of what was recorded at application time.
    pub fn sync(&mut self, stats: &mut StatBlock) -> i32 {
        let previous = self.last_applied_stack_count;
        let delta = self.consume_stack_delta();

        if delta > 0 {
            for (modifier, applied) in self.source_modifiers.iter().zip(self.applied.iter_mut()) {
                let amount = modifier.scaled(delta).absolute_delta(stats);
                stats.apply_layer_modifier(StatLayer::External, modifier.variable, amount);
                *applied += amount;
            }
        } else if delta < 0 && previous > 0 {
            let removed = (-delta) as u32;
            for (modifier, applied) in self.source_modifiers.iter().zip(self.applied.iter_mut()) {
                let amount = if removed >= previous {
                    *applied
                } else {
                    *applied * removed as f32 / previous as f32
                };
                stats.apply_layer_modifier(StatLayer::External, modifier.variable, -amount);
                *applied -= amount;
            }
        }
        delta
    }

    /// Reverts everything this slot has applied.
    pub fn revert(&mut self, stats: &mut StatBlock) {
        for (modifier, applied) in self.source_modifiers.iter().zip(self.applied.iter_mut()) {
            if *applied != 0.0 {
                stats.apply_layer_modifier(StatLayer::External, modifier.variable, -*applied);
            }
            *applied = 0.0;
        }
        self.last_applied_stack_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatVariable;

    fn might() -> BuffData {
        BuffData::new(
            "might",
            10.0,
            vec![Modifier::flat(StatVariable::PhysicalDamage, 5.0)],
        )
        .with_max_stacks(3)
    }

    #[test]
    fn new_slot_has_one_pending_stack() {
        let slot = BuffSlot::new(&might());
        assert_eq!(slot.stack_count(), 1);
        assert_eq!(slot.last_applied_stack_count(), 0);
        assert_eq!(slot.remaining_time(), 10.0);
    }

    #[test]
    fn sync_applies_only_the_delta() {
        let mut stats = StatBlock::zeroed();
        let mut slot = BuffSlot::new(&might());

        assert_eq!(slot.sync(&mut stats), 1);
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 5.0);

        slot.add_stack();
        slot.add_stack();
        assert_eq!(slot.sync(&mut stats), 2);
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 15.0);

        // Nothing pending: syncing again is a no-op.
        assert_eq!(slot.sync(&mut stats), 0);
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 15.0);
    }

    #[test]
    fn stacks_clamp_to_cap() {
        let mut slot = BuffSlot::new(&might());
        assert!(slot.add_stack());
        assert!(slot.add_stack());
        assert!(!slot.add_stack());
        assert_eq!(slot.stack_count(), 3);
        assert!(slot.is_at_max_stacks());
    }

    #[test]
    fn removing_a_stack_reverts_its_share() {
        let mut stats = StatBlock::zeroed();
        let mut slot = BuffSlot::new(&might());
        slot.add_stack();
        slot.sync(&mut stats);
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 10.0);

        slot.remove_stack();
        assert_eq!(slot.sync(&mut stats), -1);
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 5.0);
    }

    #[test]
    fn revert_restores_external_layer() {
        let mut stats = StatBlock::zeroed().with_base(StatVariable::PhysicalDamage, 80.0);
        let data = BuffData::new(
            "fury",
            5.0,
            vec![Modifier::percent_mult(StatVariable::PhysicalDamage, 25.0)],
        );
        let mut slot = BuffSlot::new(&data);
        slot.sync(&mut stats);
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 20.0);

        // The total changes afterwards; revert still subtracts the recorded 20.
        stats.apply_layer_modifier(StatLayer::Equipment, StatVariable::PhysicalDamage, 40.0);
        slot.revert(&mut stats);
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 0.0);
        assert_eq!(slot.last_applied_stack_count(), 0);
    }

    #[test]
    fn tick_expires_at_zero() {
        let mut slot = BuffSlot::new(&might());
        assert!(!slot.tick(4.0));
        slot.refresh();
        assert_eq!(slot.remaining_time(), 10.0);
        assert!(slot.tick(10.0));
        assert_eq!(slot.remaining_time(), 0.0);
    }
}
