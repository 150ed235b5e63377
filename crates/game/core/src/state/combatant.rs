//! A single character taking part in combat.
//!
//! `Combatant` owns everything the combat core mutates for one character:
//! the stat block, the buffs that write into its external layer, the gear
//! that writes into its equipment layer, and the current resource pools.
//! Every mutation goes through a method here so the pools are re-clamped
//! whenever a maximum may have moved.

use super::common::{EntityId, Faction, Position};
use super::resources::{ResourceKind, Resources};
use crate::buff::{ApplyOutcome, BuffData, BuffManager, BuffTickReport, PeriodicEffect, PeriodicKind};
use crate::combat::{self, DamageType};
use crate::config::CombatConfig;
use crate::stats::{Equipment, Modifier, StatBlock, StatVariable};

/// Outcome of [`Combatant::take_damage`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageReport {
    /// Damage before mitigation.
    pub raw: f32,
    /// Damage actually removed from health.
    pub delivered: f32,
    /// The hit reduced health to zero.
    pub killed: bool,
}

/// What one [`Combatant::update`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombatantTick {
    pub buffs: BuffTickReport,
    pub damage_taken: f32,
    pub healed: f32,
    pub died: bool,
}

#[derive(Debug)]
pub struct Combatant {
    id: EntityId,
    name: String,
    faction: Faction,
    pub position: Position,
    stats: StatBlock,
    buffs: BuffManager,
    equipment: Equipment,
    resources: Resources,
    alive: bool,
}

impl Combatant {
    /// Creates a living combatant with both pools full.
    pub fn new(id: EntityId, faction: Faction, stats: StatBlock) -> Self {
        let resources = Resources::full(&stats);
        Self {
            id,
            name: String::new(),
            faction,
            position: Position::ORIGIN,
            stats,
            buffs: BuffManager::new(),
            equipment: Equipment::new(),
            resources,
            alive: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn stats(&self) -> &StatBlock {
        &self.stats
    }

    pub fn buffs(&self) -> &BuffManager {
        &self.buffs
    }

    /// Mutable buff manager, for registering listeners.
    pub fn buffs_mut(&mut self) -> &mut BuffManager {
        &mut self.buffs
    }

    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn health(&self) -> f32 {
        self.resources.health
    }

    pub fn energy(&self) -> f32 {
        self.resources.energy
    }

    pub fn max_health(&self) -> f32 {
        self.stats.total(StatVariable::MaxHealth).max(0.0)
    }

    pub fn missing_health(&self) -> f32 {
        self.resources.missing(ResourceKind::Health, &self.stats)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Sets a base-layer value and re-clamps the pools.
    pub fn set_base(&mut self, variable: StatVariable, value: f32) {
        self.stats.set_base(variable, value);
        self.resources.clamp(&self.stats);
    }

    // ========================================================================
    // Health & resources
    // ========================================================================

    /// Resistance used against `damage_type`, or `None` when it is unmitigated.
    pub fn resistance(&self, damage_type: DamageType) -> Option<f32> {
        let physical = self.stats.total(StatVariable::PhysicalResistance);
        let magical = self.stats.total(StatVariable::MagicalResistance);
        match damage_type {
            DamageType::Physical => Some(physical),
            DamageType::Magical => Some(magical),
            DamageType::Mixed => Some((physical + magical) * 0.5),
            DamageType::True => None,
        }
    }

    /// Mitigates `raw` by the matching resistance and removes the result,
    /// rounded to the nearest whole point, from health.
    ///
    /// Reaching zero health kills the combatant and clears all of its buffs.
    pub fn take_damage(&mut self, raw: f32, damage_type: DamageType, config: &CombatConfig) -> DamageReport {
        self.receive_damage(raw, damage_type, config, true)
    }

    fn receive_damage(
        &mut self,
        raw: f32,
        damage_type: DamageType,
        config: &CombatConfig,
        round: bool,
    ) -> DamageReport {
        if !self.alive || !raw.is_finite() {
            return DamageReport::default();
        }
        let raw = raw.max(0.0);
        let mitigated = match self.resistance(damage_type) {
            Some(resistance) => combat::mitigate(raw, resistance, config),
            None => raw,
        };
        let amount = if round { mitigated.round() } else { mitigated };

        let before = self.resources.health;
        self.resources.health = combat::apply_damage(before, amount);
        let delivered = before - self.resources.health;

        let killed = self.resources.health <= 0.0;
        if killed {
            self.die();
        }
        tracing::debug!(
            target_id = %self.id,
            raw,
            delivered,
            damage_type = %damage_type,
            killed,
            "damage received"
        );
        DamageReport { raw, delivered, killed }
    }

    fn die(&mut self) {
        self.alive = false;
        self.resources.health = 0.0;
        self.buffs.clear_all_buffs(&mut self.stats);
        self.resources.clamp(&self.stats);
        tracing::debug!(id = %self.id, "combatant died");
    }

    /// Restores up to `amount` health. Returns what was restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.alive {
            return 0.0;
        }
        self.resources.restore(ResourceKind::Health, amount, &self.stats)
    }

    /// Restores up to `amount` energy. Returns what was restored.
    pub fn restore_energy(&mut self, amount: f32) -> f32 {
        if !self.alive {
            return 0.0;
        }
        self.resources.restore(ResourceKind::Energy, amount, &self.stats)
    }

    /// Returns true if `amount` of `kind` is available.
    pub fn can_afford(&self, kind: ResourceKind, amount: f32) -> bool {
        self.alive && self.resources.can_afford(kind, amount)
    }

    /// Pays `amount` from `kind`. Returns false, changing nothing, if the
    /// pool is too low.
    pub fn spend(&mut self, kind: ResourceKind, amount: f32) -> bool {
        if !self.can_afford(kind, amount) {
            return false;
        }
        self.resources.drain(kind, amount);
        if kind == ResourceKind::Health && self.resources.health <= 0.0 {
            self.die();
        }
        true
    }

    /// Brings a dead combatant back with full pools.
    pub fn revive(&mut self) {
        if self.alive {
            return;
        }
        self.alive = true;
        self.resources = Resources::full(&self.stats);
        tracing::debug!(id = %self.id, "combatant revived");
    }

    // ========================================================================
    // Buffs & equipment
    // ========================================================================

    /// Applies a buff. Dead combatants ignore buffs and return `None`.
    pub fn apply_buff(&mut self, data: &BuffData) -> Option<ApplyOutcome> {
        if !self.alive {
            return None;
        }
        let outcome = self.buffs.apply_buff(&mut self.stats, data);
        self.resources.clamp(&self.stats);
        Some(outcome)
    }

    /// Starts an over-time damage or heal effect.
    pub fn apply_periodic(&mut self, effect: PeriodicEffect) -> bool {
        if !self.alive {
            return false;
        }
        self.buffs.apply_periodic(effect);
        true
    }

    pub fn remove_buff(&mut self, name: &str) -> bool {
        let removed = self.buffs.remove_buff_by_name(&mut self.stats, name);
        self.resources.clamp(&self.stats);
        removed
    }

    pub fn remove_buff_stack(&mut self, name: &str) -> bool {
        let removed = self.buffs.remove_stack(&mut self.stats, name);
        self.resources.clamp(&self.stats);
        removed
    }

    /// Removes every debuff. Returns how many were removed.
    pub fn cleanse(&mut self) -> usize {
        let removed = self.buffs.remove_debuffs(&mut self.stats);
        self.resources.clamp(&self.stats);
        removed
    }

    pub fn equip(&mut self, slot: &str, modifiers: &[Modifier]) {
        self.equipment.equip(slot, modifiers, &mut self.stats);
        self.resources.clamp(&self.stats);
    }

    pub fn unequip(&mut self, slot: &str) -> bool {
        let removed = self.equipment.unequip(slot, &mut self.stats);
        self.resources.clamp(&self.stats);
        removed
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances buffs, periodic effects and regeneration by `dt` seconds.
    pub fn update(&mut self, dt: f32, config: &CombatConfig) -> CombatantTick {
        let mut tick = CombatantTick::default();
        if !self.alive {
            return tick;
        }
        let dt = dt.max(0.0);

        tick.buffs = self.buffs.update(&mut self.stats, dt);
        for periodic in &tick.buffs.periodic {
            match periodic.kind {
                PeriodicKind::Damage(damage_type) => {
                    let report = self.receive_damage(periodic.amount, damage_type, config, false);
                    tick.damage_taken += report.delivered;
                    if report.killed {
                        tick.died = true;
                        return tick;
                    }
                }
                PeriodicKind::Heal => tick.healed += self.heal(periodic.amount),
            }
        }

        let health_regen = self.stats.total(StatVariable::HealthRegen) * dt;
        let energy_regen = self.stats.total(StatVariable::EnergyRegen) * dt;
        tick.healed += self.heal(health_regen);
        self.restore_energy(energy_regen);
        self.resources.clamp(&self.stats);
        tick
    }
}
