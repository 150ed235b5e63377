//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Once;

use combat_core::{Combatant, EntityId, Faction, Position, RngOracle, Roster, StatBlock, StatVariable};

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
///
/// Filter with `RUST_LOG=combat_core=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// RNG returning the same value for every seed.
pub struct FixedRng(pub u32);

impl FixedRng {
    /// Every percent roll succeeds (except 0%).
    pub const ALWAYS: FixedRng = FixedRng(0);
    /// Every percent roll below 100% fails.
    pub const NEVER: FixedRng = FixedRng(u32::MAX);
}

impl RngOracle for FixedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }
}

pub const PLAYER: EntityId = EntityId(0);
pub const ALLY: EntityId = EntityId(1);
pub const GOBLIN: EntityId = EntityId(10);
pub const ORC: EntityId = EntityId(11);

/// Player at the origin, an ally beside them, and two enemies further out.
pub fn skirmish() -> Roster {
    let mut roster = Roster::new();
    roster.insert(
        Combatant::new(PLAYER, Faction::Player, StatBlock::new().with_base(StatVariable::PhysicalDamage, 50.0))
            .with_name("hero"),
    );
    roster.insert(
        Combatant::new(ALLY, Faction::Ally, StatBlock::new())
            .with_name("squire")
            .with_position(Position::flat(1.0, 0.0)),
    );
    roster.insert(
        Combatant::new(GOBLIN, Faction::Enemy, StatBlock::new().with_base(StatVariable::PhysicalResistance, 50.0))
            .with_name("goblin")
            .with_position(Position::flat(4.0, 0.0)),
    );
    roster.insert(
        Combatant::new(ORC, Faction::Enemy, StatBlock::new())
            .with_name("orc")
            .with_position(Position::flat(5.0, 1.0)),
    );
    roster
}

pub fn health(roster: &Roster, id: EntityId) -> f32 {
    roster.get(id).map_or(f32::NAN, Combatant::health)
}

pub fn energy(roster: &Roster, id: EntityId) -> f32 {
    roster.get(id).map_or(f32::NAN, Combatant::energy)
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
