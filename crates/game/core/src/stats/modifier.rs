//! Modifier value objects and the math that turns them into absolute deltas.
//!
//! | Operation     | Contribution                          |
//! |---------------|---------------------------------------|
//! | `Flat`        | `value`                               |
//! | `PercentAdd`  | `Base(variable) * value / 100`        |
//! | `PercentMult` | `Total(variable) * value / 100`       |
//!
//! `PercentMult` reads the current total, so the order in which two
//! `PercentMult` modifiers are applied changes the final magnitude. The
//! result is still reproducible: the same order always yields the same value.

use super::block::StatBlock;
use super::variable::StatVariable;

/// How a modifier value is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ModifierOp {
    /// Absolute amount.
    Flat,
    /// Percentage of the base layer.
    PercentAdd,
    /// Percentage of the current total.
    PercentMult,
}

/// Immutable `{operation, variable, value}` triple.
///
/// `base_value` is the authored per-stack magnitude; `value` is the magnitude
/// currently represented (for example after scaling by a stack count).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub op: ModifierOp,
    pub variable: StatVariable,
    pub value: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub base_value: f32,
}

impl Modifier {
    pub const fn new(op: ModifierOp, variable: StatVariable, value: f32) -> Self {
        Self {
            op,
            variable,
            value,
            base_value: value,
        }
    }

    /// Create a flat modifier
    pub const fn flat(variable: StatVariable, value: f32) -> Self {
        Self::new(ModifierOp::Flat, variable, value)
    }

    /// Create a percentage-of-base modifier (20 = +20% of base)
    pub const fn percent_add(variable: StatVariable, percent: f32) -> Self {
        Self::new(ModifierOp::PercentAdd, variable, percent)
    }

    /// Create a percentage-of-total modifier (20 = +20% of current total)
    pub const fn percent_mult(variable: StatVariable, percent: f32) -> Self {
        Self::new(ModifierOp::PercentMult, variable, percent)
    }

    /// Same modifier representing `stacks` copies of the authored magnitude.
    pub fn scaled(&self, stacks: i32) -> Self {
        let per_stack = self.per_stack();
        Self {
            value: per_stack * stacks as f32,
            base_value: per_stack,
            ..*self
        }
    }

    /// Authored magnitude of a single stack.
    ///
    /// Falls back to `value` when `base_value` was left unset by data files.
    pub fn per_stack(&self) -> f32 {
        if self.base_value == 0.0 {
            self.value
        } else {
            self.base_value
        }
    }

    /// Absolute delta this modifier contributes against `stats` right now.
    pub fn absolute_delta(&self, stats: &StatBlock) -> f32 {
        absolute_delta(self.op, self.variable, self.value, stats)
    }
}

/// Converts `{operation, variable, value}` into an absolute delta.
pub fn absolute_delta(op: ModifierOp, variable: StatVariable, value: f32, stats: &StatBlock) -> f32 {
    match op {
        ModifierOp::Flat => value,
        ModifierOp::PercentAdd => stats.base(variable) * value / 100.0,
        ModifierOp::PercentMult => stats.total(variable) * value / 100.0,
    }
}

/// Absolute amount that was actually written to a layer for one modifier.
///
/// Reversal subtracts exactly this amount, independent of how the stats have
/// changed since application.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AppliedModifier {
    pub variable: StatVariable,
    pub amount: f32,
}

impl AppliedModifier {
    pub const fn new(variable: StatVariable, amount: f32) -> Self {
        Self { variable, amount }
    }
}
