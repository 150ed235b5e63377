//! Combat resolution math.
//!
//! Pure functions shared by the skill pipeline and the character aggregate.
//!
//! # Core Functions
//!
//! - `mitigation`: `resistance / (resistance + K)`
//! - `mitigate`: raw damage after resistance
//! - `apply_damage`: HP reduction (clamped to 0)

pub mod damage;

pub use damage::{DamageType, apply_damage, mitigate, mitigation};
