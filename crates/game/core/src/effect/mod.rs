//! Who a skill's effects land on, and when.
//!
//! [`SkillEffectController`] resolves recipients through the targeting mode
//! and allegiance filter, then applies each effect tagged with the requested
//! [`EffectTiming`].

pub mod descriptor;
pub mod dispatch;
pub mod targeting;

pub use descriptor::{EffectKind, EffectTiming, SkillEffect};
pub use dispatch::{DispatchReport, EffectApplication, EffectOutcome, SkillEffectController};
pub use targeting::{TargetFilter, Targeting, TargetingMode, accepts, resolve_recipients};
