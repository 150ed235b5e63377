//! Identity, allegiance and position primitives.

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Unique identifier for any combatant tracked by a roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Conventional identifier for the controllable player character.
    pub const PLAYER: Self = Self(0);

    /// Returns true if this entity represents the player.
    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allegiance of a combatant.
///
/// `Player` and `Ally` are mutually friendly. Every other pair of distinct
/// factions is hostile.
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
pub enum Faction {
    #[default]
    Player,
    Ally,
    Enemy,
    Neutral,
}

impl Faction {
    /// Returns true if the two factions never hurt each other by allegiance.
    pub fn is_friendly_to(self, other: Faction) -> bool {
        match (self, other) {
            (Faction::Player | Faction::Ally, Faction::Player | Faction::Ally) => true,
            (a, b) => a == b,
        }
    }

    /// Returns true if the two factions are opposed.
    pub fn is_hostile_to(self, other: Faction) -> bool {
        !self.is_friendly_to(other)
    }
}

/// Continuous world-space position.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Position on the ground plane (`y = 0`).
    pub const fn flat(x: f32, z: f32) -> Self {
        Self::new(x, 0.0, z)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Position) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Position {
        let length = self.length();
        if length <= f32::EPSILON {
            Position::ORIGIN
        } else {
            self * (1.0 / length)
        }
    }

    /// Unit vector pointing from `self` towards `target`.
    pub fn direction_to(self, target: Position) -> Position {
        (target - self).normalized()
    }
}

impl Add for Position {
    type Output = Position;
    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Position {
    type Output = Position;
    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Position {
    type Output = Position;
    fn mul(self, rhs: f32) -> Position {
        Position::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}
