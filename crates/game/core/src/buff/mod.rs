//! Buff/modifier stacking engine.
//!
//! # Entry kinds
//!
//! - [`BuffSlot`]: named, stackable, duration-bound. Stack changes apply only
//!   the delta; expiry or removal reverts exactly what was applied.
//! - [`DistributedBuff`]: total magnitude integrated linearly over the
//!   duration, settled exactly at expiry, then reverted.
//! - [`PeriodicEffect`]: over-time damage/healing on the health pool.
//!
//! [`BuffManager`] owns all three for one character.

pub mod data;
pub mod distributed;
pub mod events;
pub mod manager;
pub mod periodic;
pub mod slot;

pub use data::BuffData;
pub use distributed::{DistributedBuff, TickModifier};
pub use events::{BuffEvent, BuffListener};
pub use manager::{ApplyOutcome, BuffManager, BuffTickReport, BuffView};
pub use periodic::{PeriodicEffect, PeriodicKind, PeriodicTick};
pub use slot::BuffSlot;
