//! Equipment layer bookkeeping.
//!
//! Gear itself lives outside this crate. What the core owns is the contract:
//! equipping writes the item's modifiers into the equipment layer and records
//! the absolute amounts, unequipping subtracts exactly those amounts.

use super::block::{StatBlock, StatLayer};
use super::modifier::{AppliedModifier, Modifier};

#[derive(Clone, Debug, PartialEq)]
struct EquippedItem {
    slot: String,
    applied: Vec<AppliedModifier>,
}

/// Items currently contributing to a character's equipment layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Equipment {
    items: Vec<EquippedItem>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equips an item into `slot`, replacing whatever occupied it.
    pub fn equip(&mut self, slot: &str, modifiers: &[Modifier], stats: &mut StatBlock) {
        self.unequip(slot, stats);

        let applied = modifiers
            .iter()
            .map(|modifier| {
                let amount = modifier.absolute_delta(stats);
                stats.apply_layer_modifier(StatLayer::Equipment, modifier.variable, amount);
                AppliedModifier::new(modifier.variable, amount)
            })
            .collect();

        tracing::debug!(slot, count = modifiers.len(), "equipped item");
        self.items.push(EquippedItem {
            slot: slot.to_owned(),
            applied,
        });
    }

    /// Removes the item in `slot`. Returns false if the slot was empty.
    pub fn unequip(&mut self, slot: &str, stats: &mut StatBlock) -> bool {
        let Some(index) = self.items.iter().position(|item| item.slot == slot) else {
            return false;
        };
        let item = self.items.swap_remove(index);
        for applied in item.applied.iter().rev() {
            stats.apply_layer_modifier(StatLayer::Equipment, applied.variable, -applied.amount);
        }
        tracing::debug!(slot, "unequipped item");
        true
    }

    /// Returns true if something is equipped in `slot`.
    pub fn is_equipped(&self, slot: &str) -> bool {
        self.items.iter().any(|item| item.slot == slot)
    }

    /// Occupied slot names.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.slot.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatVariable;

    #[test]
    fn equip_and_unequip_round_trip() {
        let mut stats = StatBlock::zeroed().with_base(StatVariable::PhysicalDamage, 50.0);
        let mut gear = Equipment::new();

        gear.equip(
            "weapon",
            &[
                Modifier::flat(StatVariable::PhysicalDamage, 10.0),
                Modifier::percent_add(StatVariable::PhysicalDamage, 10.0),
            ],
            &mut stats,
        );
        assert_eq!(stats.equipment(StatVariable::PhysicalDamage), 15.0);
        assert_eq!(stats.total(StatVariable::PhysicalDamage), 65.0);
        assert!(gear.is_equipped("weapon"));

        assert!(gear.unequip("weapon", &mut stats));
        assert_eq!(stats.equipment(StatVariable::PhysicalDamage), 0.0);
        assert!(!gear.unequip("weapon", &mut stats));
    }

    #[test]
    fn equipping_occupied_slot_replaces_item() {
        let mut stats = StatBlock::zeroed();
        let mut gear = Equipment::new();

        gear.equip("ring", &[Modifier::flat(StatVariable::Luck, 3.0)], &mut stats);
        gear.equip("ring", &[Modifier::flat(StatVariable::Luck, 5.0)], &mut stats);

        assert_eq!(stats.equipment(StatVariable::Luck), 5.0);
        assert_eq!(gear.slots().count(), 1);
    }
}
