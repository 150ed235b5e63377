//! Every combatant in one simulation.

use std::collections::BTreeMap;

use super::combatant::{Combatant, CombatantTick};
use super::common::{EntityId, Position};
use crate::config::CombatConfig;

/// Owns all combatants, keyed and iterated by id.
#[derive(Debug, Default)]
pub struct Roster {
    combatants: BTreeMap<EntityId, Combatant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a combatant, returning the one it replaced under the same id.
    pub fn insert(&mut self, combatant: Combatant) -> Option<Combatant> {
        self.combatants.insert(combatant.id(), combatant)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Combatant> {
        self.combatants.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.combatants.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.combatants.values_mut()
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Ids of combatants whose position lies within `radius` of `center`,
    /// dead ones included, in id order.
    pub fn within_radius(&self, center: Position, radius: f32) -> Vec<EntityId> {
        let radius = radius.max(CombatConfig::MIN_AREA_RADIUS);
        self.combatants
            .values()
            .filter(|c| c.position.distance(center) <= radius)
            .map(Combatant::id)
            .collect()
    }

    /// Advances every combatant by `dt`.
    pub fn update(&mut self, dt: f32, config: &CombatConfig) -> Vec<(EntityId, CombatantTick)> {
        self.combatants
            .values_mut()
            .map(|c| (c.id(), c.update(dt, config)))
            .collect()
    }
}
