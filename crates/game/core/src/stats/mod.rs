//! Stat aggregation.
//!
//! # Architecture
//!
//! ```text
//! [ Base layer ]       class / race templates, set once
//!      +
//! [ Equipment layer ]  gear equip / unequip
//!      +
//! [ External layer ]   buff engine only
//!      =
//! [ Total ]            recomputed on every read
//! ```
//!
//! Modifier math ([`Modifier::absolute_delta`]) converts a
//! `{operation, variable, value}` triple into the absolute delta that is
//! written into one layer. Whoever writes a delta keeps the amount so it can
//! be reverted exactly.

pub mod block;
pub mod equipment;
pub mod modifier;
pub mod variable;

pub use block::{StatBlock, StatLayer};
pub use equipment::Equipment;
pub use modifier::{AppliedModifier, Modifier, ModifierOp, absolute_delta};
pub use variable::{LAYERED_STAT_COUNT, STAT_TABLE, StatSpec, StatVariable};
