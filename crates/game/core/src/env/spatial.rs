//! "Entities within radius" queries.
//!
//! A physics or spatial-index collaborator implements [`SpatialQuery`]. When
//! none is supplied the [`Roster`] answers by scanning every combatant.

use crate::state::{EntityId, Faction, Position, Roster};

bitflags::bitflags! {
    /// Faction layers a query may return.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct LayerMask: u8 {
        const PLAYER = 1 << 0;
        const ALLY = 1 << 1;
        const ENEMY = 1 << 2;
        const NEUTRAL = 1 << 3;
    }
}

const FACTIONS: [Faction; 4] = [Faction::Player, Faction::Ally, Faction::Enemy, Faction::Neutral];

impl LayerMask {
    pub fn contains_faction(self, faction: Faction) -> bool {
        self.contains(LayerMask::from(faction))
    }

    /// Layers of every faction friendly to `faction`, its own included.
    pub fn friendly_to(faction: Faction) -> Self {
        FACTIONS
            .into_iter()
            .filter(|other| faction.is_friendly_to(*other))
            .map(LayerMask::from)
            .collect()
    }

    /// Layers of every faction hostile to `faction`.
    pub fn hostile_to(faction: Faction) -> Self {
        LayerMask::friendly_to(faction).complement()
    }
}

impl From<Faction> for LayerMask {
    fn from(faction: Faction) -> Self {
        match faction {
            Faction::Player => LayerMask::PLAYER,
            Faction::Ally => LayerMask::ALLY,
            Faction::Enemy => LayerMask::ENEMY,
            Faction::Neutral => LayerMask::NEUTRAL,
        }
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::all()
    }
}

/// Spatial index over combatant positions.
pub trait SpatialQuery {
    /// Entities within `radius` of `center` whose faction is in `layers`.
    ///
    /// Finding nothing is a normal outcome, not an error.
    fn entities_within(&self, center: Position, radius: f32, layers: LayerMask) -> Vec<EntityId>;
}

impl SpatialQuery for Roster {
    fn entities_within(&self, center: Position, radius: f32, layers: LayerMask) -> Vec<EntityId> {
        self.within_radius(center, radius)
            .into_iter()
            .filter(|id| {
                self.get(*id)
                    .is_some_and(|combatant| layers.contains_faction(combatant.faction()))
            })
            .collect()
    }
}
