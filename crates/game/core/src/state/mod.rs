//! Characters and the roster that owns them.
//!
//! A [`Combatant`] is the single owner of its [`StatBlock`](crate::stats::StatBlock),
//! [`BuffManager`](crate::buff::BuffManager) and equipment. Nothing else holds
//! a reference across calls; skills and effects borrow a combatant from the
//! [`Roster`] for the duration of one operation.

pub mod combatant;
pub mod common;
pub mod resources;
pub mod roster;

pub use combatant::{Combatant, CombatantTick, DamageReport};
pub use common::{EntityId, Faction, Position};
pub use resources::{ResourceKind, Resources};
pub use roster::Roster;
