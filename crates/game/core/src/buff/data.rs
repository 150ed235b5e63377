//! Buff templates authored as configuration data.

use crate::stats::Modifier;

/// Immutable description of a buff or debuff.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffData {
    /// Identity used for stacking, refresh and removal.
    pub name: String,
    /// Seconds. `f32::INFINITY` never expires (passives).
    pub duration: f32,
    pub modifiers: Vec<Modifier>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_debuff: bool,
    /// Maximum stack count. Values below 1 are treated as 1.
    #[cfg_attr(feature = "serde", serde(default = "default_max_stacks"))]
    pub max_stacks: u32,
    /// Spread the total magnitude linearly over the duration.
    #[cfg_attr(feature = "serde", serde(default))]
    pub distribute_over_time: bool,
    /// Batch size in seconds for distributed application; 0 applies every update.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_interval: f32,
}

#[cfg(feature = "serde")]
fn default_max_stacks() -> u32 {
    1
}

impl BuffData {
    /// Single-stack buff lasting `duration` seconds.
    pub fn new(name: impl Into<String>, duration: f32, modifiers: Vec<Modifier>) -> Self {
        Self {
            name: name.into(),
            duration,
            modifiers,
            is_debuff: false,
            max_stacks: 1,
            distribute_over_time: false,
            tick_interval: 0.0,
        }
    }

    /// Marks this buff as a debuff (builder pattern).
    pub fn debuff(mut self) -> Self {
        self.is_debuff = true;
        self
    }

    /// Allows up to `max_stacks` stacks (builder pattern).
    pub fn with_max_stacks(mut self, max_stacks: u32) -> Self {
        self.max_stacks = max_stacks;
        self
    }

    /// Spreads the magnitude over the duration (builder pattern).
    pub fn distributed(mut self, tick_interval: f32) -> Self {
        self.distribute_over_time = true;
        self.tick_interval = tick_interval;
        self
    }

    /// Returns the same buff with a different duration.
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// Stack cap clamped to at least one.
    pub fn stack_cap(&self) -> u32 {
        self.max_stacks.max(1)
    }

    /// Duration clamped to be non-negative.
    pub fn clamped_duration(&self) -> f32 {
        if self.duration.is_nan() {
            0.0
        } else {
            self.duration.max(0.0)
        }
    }
}
