//! Per-character owner of every active buff.
//!
//! The manager never holds its character's [`StatBlock`]; every mutating call
//! receives it by reference. Both are owned by the same character, so there is
//! exactly one writer.
//!
//! ## Update order
//!
//! 1. Discrete slots age; expired slots are reverted, then removed
//! 2. Distributed buffs integrate; expired ones settle, revert, then are removed
//! 3. Periodic health effects advance and report what they delivered

use core::fmt;

use super::data::BuffData;
use super::distributed::DistributedBuff;
use super::events::{BuffEvent, BuffListener};
use super::periodic::{PeriodicEffect, PeriodicTick};
use super::slot::BuffSlot;
use crate::stats::StatBlock;

/// Result of [`BuffManager::apply_buff`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new entry was created and fully applied.
    Created,
    /// An existing slot gained a stack; only the delta was applied.
    Stacked { stacks: u32 },
    /// Duration refreshed only (slot at max stacks, or distributed buff).
    Refreshed,
}

/// What happened during one [`BuffManager::update`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuffTickReport {
    /// Names of entries that expired this update, in expiry order.
    pub expired: Vec<String>,
    /// Health changes produced by periodic effects.
    pub periodic: Vec<PeriodicTick>,
}

impl BuffTickReport {
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.periodic.is_empty()
    }
}

/// Read-only summary of one active entry.
#[derive(Clone, Debug, PartialEq)]
pub struct BuffView<'a> {
    pub name: &'a str,
    pub stacks: u32,
    pub remaining_time: f32,
    pub is_debuff: bool,
    pub distributed: bool,
}

/// Active buffs for one character.
#[derive(Default)]
pub struct BuffManager {
    slots: Vec<BuffSlot>,
    distributed: Vec<DistributedBuff>,
    periodic: Vec<PeriodicEffect>,
    listeners: Vec<BuffListener>,
}

impl BuffManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a lifecycle callback.
    pub fn subscribe(&mut self, listener: impl FnMut(&BuffEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: BuffEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // ========================================================================
    // Apply / Remove
    // ========================================================================

    /// Applies `data` to `stats`.
    ///
    /// - Distributed buff already active: only its remaining time is refreshed.
    /// - Slot already active: one stack is added and only the stack delta is
    ///   applied. At max stacks the duration is refreshed and nothing is applied.
    /// - Otherwise a new entry is created and its full modifier set applied once.
    pub fn apply_buff(&mut self, stats: &mut StatBlock, data: &BuffData) -> ApplyOutcome {
        if data.distribute_over_time {
            if let Some(buff) = self.distributed.iter_mut().find(|b| b.name() == data.name) {
                buff.refresh(data.clamped_duration());
                tracing::debug!(buff = %data.name, "refreshed distributed buff");
                self.emit(BuffEvent::Refreshed {
                    name: data.name.clone(),
                });
                return ApplyOutcome::Refreshed;
            }

            self.distributed.push(DistributedBuff::new(data, stats));
            tracing::debug!(buff = %data.name, duration = data.duration, "applied distributed buff");
            self.emit(BuffEvent::Applied {
                name: data.name.clone(),
                is_debuff: data.is_debuff,
            });
            return ApplyOutcome::Created;
        }

        if let Some(slot) = self.slots.iter_mut().find(|s| s.name() == data.name) {
            slot.refresh();
            if !slot.add_stack() {
                tracing::trace!(buff = %data.name, "slot at max stacks, refreshed duration");
                self.emit(BuffEvent::Refreshed {
                    name: data.name.clone(),
                });
                return ApplyOutcome::Refreshed;
            }
            slot.sync(stats);
            let stacks = slot.stack_count();
            tracing::debug!(buff = %data.name, stacks, "added buff stack");
            self.emit(BuffEvent::StackChanged {
                name: data.name.clone(),
                stacks,
            });
            return ApplyOutcome::Stacked { stacks };
        }

        let mut slot = BuffSlot::new(data);
        slot.sync(stats);
        self.slots.push(slot);
        tracing::debug!(buff = %data.name, duration = data.duration, debuff = data.is_debuff, "applied buff");
        self.emit(BuffEvent::Applied {
            name: data.name.clone(),
            is_debuff: data.is_debuff,
        });
        ApplyOutcome::Created
    }

    /// Starts (or refreshes) an over-time health effect. Entries are keyed
    /// by name and kind, so a heal never refreshes a damage effect.
    pub fn apply_periodic(&mut self, effect: PeriodicEffect) {
        if let Some(existing) = self
            .periodic
            .iter_mut()
            .find(|p| p.name() == effect.name() && p.kind() == effect.kind())
        {
            existing.refresh(effect.total(), effect.remaining_time());
            let name = effect.name().to_owned();
            self.emit(BuffEvent::Refreshed { name });
            return;
        }
        let name = effect.name().to_owned();
        tracing::debug!(effect = %name, total = effect.total(), "applied periodic effect");
        self.periodic.push(effect);
        self.emit(BuffEvent::Applied {
            name,
            is_debuff: false,
        });
    }

    /// Reverts exactly what the named buff applied and deletes it.
    ///
    /// Returns false if nothing with that name was active.
    pub fn remove_buff_by_name(&mut self, stats: &mut StatBlock, name: &str) -> bool {
        let mut removed = false;

        if let Some(index) = self.slots.iter().position(|s| s.name() == name) {
            let mut slot = self.slots.remove(index);
            slot.revert(stats);
            removed = true;
        }
        if let Some(index) = self.distributed.iter().position(|b| b.name() == name) {
            let mut buff = self.distributed.remove(index);
            buff.revert(stats);
            removed = true;
        }
        let before = self.periodic.len();
        self.periodic.retain(|p| p.name() != name);
        removed |= self.periodic.len() != before;

        if removed {
            tracing::debug!(buff = name, "removed buff");
            self.emit(BuffEvent::Removed {
                name: name.to_owned(),
            });
        }
        removed
    }

    /// Removes a single stack from the named slot, deleting it at zero stacks.
    pub fn remove_stack(&mut self, stats: &mut StatBlock, name: &str) -> bool {
        let Some(index) = self.slots.iter().position(|s| s.name() == name) else {
            return false;
        };
        let slot = &mut self.slots[index];
        slot.remove_stack();
        slot.sync(stats);
        let stacks = slot.stack_count();

        if slot.is_expired() {
            let mut slot = self.slots.remove(index);
            slot.revert(stats);
            self.emit(BuffEvent::Removed {
                name: name.to_owned(),
            });
        } else {
            self.emit(BuffEvent::StackChanged {
                name: name.to_owned(),
                stacks,
            });
        }
        true
    }

    /// Removes every debuff. Returns how many entries were removed.
    pub fn remove_debuffs(&mut self, stats: &mut StatBlock) -> usize {
        let names: Vec<String> = self
            .slots
            .iter()
            .filter(|s| s.is_debuff())
            .map(|s| s.name().to_owned())
            .chain(
                self.distributed
                    .iter()
                    .filter(|b| b.is_debuff())
                    .map(|b| b.name().to_owned()),
            )
            .collect();

        names
            .iter()
            .filter(|name| self.remove_buff_by_name(stats, name))
            .count()
    }

    /// Reverts every active entry unconditionally (death/reset).
    pub fn clear_all_buffs(&mut self, stats: &mut StatBlock) {
        let count = self.slots.len() + self.distributed.len() + self.periodic.len();
        for slot in &mut self.slots {
            slot.revert(stats);
        }
        for buff in &mut self.distributed {
            buff.revert(stats);
        }
        self.slots.clear();
        self.distributed.clear();
        self.periodic.clear();

        if count > 0 {
            tracing::debug!(count, "cleared all buffs");
            self.emit(BuffEvent::Cleared { count });
        }
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances every entry by `dt` seconds.
    pub fn update(&mut self, stats: &mut StatBlock, dt: f32) -> BuffTickReport {
        let mut report = BuffTickReport::default();
        let dt = dt.max(0.0);

        // (a) discrete slots: revert before removal
        let mut index = 0;
        while index < self.slots.len() {
            if self.slots[index].tick(dt) {
                let mut slot = self.slots.remove(index);
                slot.revert(stats);
                tracing::debug!(buff = slot.name(), "buff expired");
                report.expired.push(slot.name().to_owned());
            } else {
                index += 1;
            }
        }

        // (b) distributed buffs: settle residual, revert, remove
        let mut index = 0;
        while index < self.distributed.len() {
            if self.distributed[index].step(dt, stats) {
                let mut buff = self.distributed.remove(index);
                buff.revert(stats);
                tracing::debug!(buff = buff.name(), "distributed buff expired");
                report.expired.push(buff.name().to_owned());
            } else {
                index += 1;
            }
        }

        // (c) periodic health effects
        let mut index = 0;
        while index < self.periodic.len() {
            let effect = &mut self.periodic[index];
            let amount = effect.step(dt);
            if amount > 0.0 {
                report.periodic.push(PeriodicTick {
                    name: effect.name().to_owned(),
                    kind: effect.kind(),
                    amount,
                });
            }
            if effect.is_expired() {
                let effect = self.periodic.remove(index);
                report.expired.push(effect.name().to_owned());
            } else {
                index += 1;
            }
        }

        for name in report.expired.clone() {
            self.emit(BuffEvent::Expired { name });
        }
        report
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns true if any entry with this name is active.
    pub fn has_buff(&self, name: &str) -> bool {
        self.slots.iter().any(|s| s.name() == name)
            || self.distributed.iter().any(|b| b.name() == name)
            || self.periodic.iter().any(|p| p.name() == name)
    }

    /// Stack count of the named slot.
    pub fn stack_count(&self, name: &str) -> Option<u32> {
        self.slot(name).map(BuffSlot::stack_count)
    }

    /// Remaining time of the named entry.
    pub fn remaining_time(&self, name: &str) -> Option<f32> {
        self.slot(name)
            .map(BuffSlot::remaining_time)
            .or_else(|| self.distributed(name).map(DistributedBuff::remaining_time))
            .or_else(|| {
                self.periodic
                    .iter()
                    .find(|p| p.name() == name)
                    .map(PeriodicEffect::remaining_time)
            })
    }

    /// The named discrete slot.
    pub fn slot(&self, name: &str) -> Option<&BuffSlot> {
        self.slots.iter().find(|s| s.name() == name)
    }

    /// The named distributed buff.
    pub fn distributed(&self, name: &str) -> Option<&DistributedBuff> {
        self.distributed.iter().find(|b| b.name() == name)
    }

    /// Summary of every slot and distributed buff.
    pub fn active_buffs(&self) -> impl Iterator<Item = BuffView<'_>> {
        let slots = self.slots.iter().map(|s| BuffView {
            name: s.name(),
            stacks: s.stack_count(),
            remaining_time: s.remaining_time(),
            is_debuff: s.is_debuff(),
            distributed: false,
        });
        let distributed = self.distributed.iter().map(|b| BuffView {
            name: b.name(),
            stacks: 1,
            remaining_time: b.remaining_time(),
            is_debuff: b.is_debuff(),
            distributed: true,
        });
        slots.chain(distributed)
    }

    /// Number of active entries of every kind.
    pub fn len(&self) -> usize {
        self.slots.len() + self.distributed.len() + self.periodic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for BuffManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuffManager")
            .field("slots", &self.slots)
            .field("distributed", &self.distributed)
            .field("periodic", &self.periodic)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::buff::PeriodicKind;
    use crate::combat::DamageType;
    use crate::stats::{Modifier, StatVariable};

    fn stacking_might() -> BuffData {
        BuffData::new(
            "might",
            10.0,
            vec![Modifier::flat(StatVariable::PhysicalDamage, 5.0)],
        )
        .with_max_stacks(3)
    }

    #[test]
    fn stacks_never_exceed_cap() {
        let mut stats = StatBlock::zeroed();
        let mut buffs = BuffManager::new();

        let outcomes: Vec<_> = (0..5).map(|_| buffs.apply_buff(&mut stats, &stacking_might())).collect();

        assert_eq!(outcomes[0], ApplyOutcome::Created);
        assert_eq!(outcomes[1], ApplyOutcome::Stacked { stacks: 2 });
        assert_eq!(outcomes[2], ApplyOutcome::Stacked { stacks: 3 });
        assert_eq!(outcomes[3], ApplyOutcome::Refreshed);
        assert_eq!(outcomes[4], ApplyOutcome::Refreshed);
        assert_eq!(buffs.stack_count("might"), Some(3));
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 15.0);
    }

    #[test]
    fn reapplication_at_cap_refreshes_duration() {
        let mut stats = StatBlock::zeroed();
        let mut buffs = BuffManager::new();
        let data = BuffData::new("ward", 4.0, vec![Modifier::flat(StatVariable::MagicalResistance, 10.0)]);

        buffs.apply_buff(&mut stats, &data);
        buffs.update(&mut stats, 3.0);
        assert_eq!(buffs.remaining_time("ward"), Some(1.0));

        assert_eq!(buffs.apply_buff(&mut stats, &data), ApplyOutcome::Refreshed);
        assert_eq!(buffs.remaining_time("ward"), Some(4.0));
        assert_eq!(stats.external(StatVariable::MagicalResistance), 10.0);
    }

    #[test]
    fn expiry_reverts_before_removal() {
        let mut stats = StatBlock::zeroed();
        let mut buffs = BuffManager::new();
        buffs.apply_buff(&mut stats, &stacking_might());
        buffs.apply_buff(&mut stats, &stacking_might());

        let report = buffs.update(&mut stats, 10.0);
        assert_eq!(report.expired, vec!["might".to_owned()]);
        assert!(!buffs.has_buff("might"));
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 0.0);
    }

    #[test]
    fn remove_by_name_reverts_exactly() {
        let mut stats = StatBlock::zeroed().with_base(StatVariable::PhysicalDamage, 100.0);
        let mut buffs = BuffManager::new();
        let fury = BuffData::new("fury", 8.0, vec![Modifier::percent_mult(StatVariable::PhysicalDamage, 50.0)]);

        buffs.apply_buff(&mut stats, &fury);
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 50.0);
        // Another buff changes the total; fury still removes exactly its 50.
        buffs.apply_buff(&mut stats, &stacking_might());
        assert!(buffs.remove_buff_by_name(&mut stats, "fury"));
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 5.0);
        assert!(!buffs.remove_buff_by_name(&mut stats, "fury"));
    }

    #[test]
    fn distributed_reapplication_only_refreshes() {
        let mut stats = StatBlock::zeroed();
        let mut buffs = BuffManager::new();
        let rot = BuffData::new("rot", 4.0, vec![Modifier::flat(StatVariable::PhysicalResistance, -40.0)])
            .debuff()
            .distributed(0.0);

        assert_eq!(buffs.apply_buff(&mut stats, &rot), ApplyOutcome::Created);
        buffs.update(&mut stats, 2.0);
        assert_eq!(buffs.apply_buff(&mut stats, &rot), ApplyOutcome::Refreshed);
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs.remaining_time("rot"), Some(4.0));
        let integrated = buffs.distributed("rot").map(|b| b.modifiers()[0].total_absolute_value);
        assert_eq!(integrated, Some(-40.0));
    }

    #[test]
    fn clear_all_reverts_everything() {
        let mut stats = StatBlock::zeroed();
        let mut buffs = BuffManager::new();
        buffs.apply_buff(&mut stats, &stacking_might());
        buffs.apply_buff(
            &mut stats,
            &BuffData::new("rot", 4.0, vec![Modifier::flat(StatVariable::Luck, 8.0)]).distributed(0.0),
        );
        buffs.update(&mut stats, 1.0);
        assert!(stats.external(StatVariable::Luck) > 0.0);

        buffs.clear_all_buffs(&mut stats);
        assert!(buffs.is_empty());
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 0.0);
        assert!(stats.external(StatVariable::Luck).abs() < 1e-4);
    }

    #[test]
    fn remove_stack_and_debuffs() {
        let mut stats = StatBlock::zeroed();
        let mut buffs = BuffManager::new();
        buffs.apply_buff(&mut stats, &stacking_might());
        buffs.apply_buff(&mut stats, &stacking_might());
        buffs.apply_buff(
            &mut stats,
            &BuffData::new("weaken", 5.0, vec![Modifier::flat(StatVariable::PhysicalDamage, -3.0)]).debuff(),
        );
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 7.0);

        assert!(buffs.remove_stack(&mut stats, "might"));
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 2.0);

        assert_eq!(buffs.remove_debuffs(&mut stats), 1);
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 5.0);

        assert!(buffs.remove_stack(&mut stats, "might"));
        assert!(!buffs.has_buff("might"));
        assert_eq!(stats.external(StatVariable::PhysicalDamage), 0.0);
    }

    #[test]
    fn listeners_observe_lifecycle() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut stats = StatBlock::zeroed();
        let mut buffs = BuffManager::new();
        buffs.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        buffs.apply_buff(&mut stats, &stacking_might());
        buffs.apply_buff(&mut stats, &stacking_might());
        buffs.update(&mut stats, 20.0);

        let events = events.borrow();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], BuffEvent::Applied { .. }));
        assert!(matches!(events[1], BuffEvent::StackChanged { stacks: 2, .. }));
        assert_eq!(events[2], BuffEvent::Expired { name: "might".into() });
    }

    #[test]
    fn periodic_damage_and_heal_share_a_name() {
        let mut stats = StatBlock::zeroed();
        let mut buffs = BuffManager::new();
        buffs.apply_periodic(PeriodicEffect::new(
            "blood_pact",
            PeriodicKind::Damage(DamageType::True),
            20.0,
            2.0,
        ));
        buffs.apply_periodic(PeriodicEffect::new("blood_pact", PeriodicKind::Heal, 8.0, 2.0));

        let report = buffs.update(&mut stats, 2.0);
        assert_eq!(report.periodic.len(), 2);
        assert_eq!(report.periodic[0].kind, PeriodicKind::Damage(DamageType::True));
        assert!((report.periodic[0].amount - 20.0).abs() < 1e-4);
        assert_eq!(report.periodic[1].kind, PeriodicKind::Heal);
        assert!((report.periodic[1].amount - 8.0).abs() < 1e-4);

        buffs.apply_periodic(PeriodicEffect::new("blood_pact", PeriodicKind::Heal, 5.0, 1.0));
        buffs.apply_periodic(PeriodicEffect::new(
            "blood_pact",
            PeriodicKind::Damage(DamageType::True),
            5.0,
            1.0,
        ));
        assert!(buffs.remove_buff_by_name(&mut stats, "blood_pact"));
        assert!(buffs.is_empty());
    }

    #[test]
    fn periodic_effects_report_delivered_amounts() {
        let mut stats = StatBlock::zeroed();
        let mut buffs = BuffManager::new();
        buffs.apply_periodic(PeriodicEffect::new("regrowth", PeriodicKind::Heal, 10.0, 2.0));

        let first = buffs.update(&mut stats, 1.0);
        assert_eq!(first.periodic.len(), 1);
        assert!((first.periodic[0].amount - 5.0).abs() < 1e-4);

        let second = buffs.update(&mut stats, 1.5);
        assert!((second.periodic[0].amount - 5.0).abs() < 1e-4);
        assert_eq!(second.expired, vec!["regrowth".to_owned()]);
    }
}
