//! Three-layer stat block.
//!
//! ```text
//! Total(v) = Base(v) + Equipment(v) + External(v)
//! ```
//!
//! Totals are always summed on read. Integer-valued variables keep an exact
//! running sum per layer and round only when that layer is mutated, so many
//! small fractional deltas (distributed buffs) never lose precision.

use super::variable::{LAYERED_STAT_COUNT, STAT_TABLE, StatVariable};

/// One of the three additive contributions to a stat total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatLayer {
    /// Set once at character initialization from class/race templates.
    Base,
    /// Mutated by gear equip/unequip.
    Equipment,
    /// Mutated exclusively by the buff engine.
    External,
}

impl StatLayer {
    const fn slot(self) -> usize {
        match self {
            Self::Base => 0,
            Self::Equipment => 1,
            Self::External => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct LayerValues {
    /// Exact accumulated sum of every delta applied to this layer.
    exact: [f32; LAYERED_STAT_COUNT],
    /// Value exposed to readers (rounded for integer variables).
    visible: [f32; LAYERED_STAT_COUNT],
}

impl LayerValues {
    const fn zeroed() -> Self {
        Self {
            exact: [0.0; LAYERED_STAT_COUNT],
            visible: [0.0; LAYERED_STAT_COUNT],
        }
    }

    fn add(&mut self, index: usize, delta: f32) {
        self.exact[index] += delta;
        self.visible[index] = if STAT_TABLE[index].integer {
            self.exact[index].round()
        } else {
            self.exact[index]
        };
    }

    fn set(&mut self, index: usize, value: f32) {
        self.exact[index] = value;
        self.visible[index] = if STAT_TABLE[index].integer {
            value.round()
        } else {
            value
        };
    }
}

/// Layered statistics for one character.
///
/// A stat block is exclusively owned by its character. Mutations happen only
/// through [`StatBlock::apply_layer_modifier`]; callers are responsible for
/// matched apply/revert pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct StatBlock {
    layers: [LayerValues; 3],
}

impl StatBlock {
    /// Creates a stat block whose base layer holds each variable's default.
    pub fn new() -> Self {
        let mut block = Self::zeroed();
        for (i, spec) in STAT_TABLE.iter().enumerate() {
            block.layers[StatLayer::Base.slot()].set(i, spec.default_base);
        }
        block
    }

    /// Creates a stat block with every layer at zero.
    pub fn zeroed() -> Self {
        Self {
            layers: [
                LayerValues::zeroed(),
                LayerValues::zeroed(),
                LayerValues::zeroed(),
            ],
        }
    }

    /// Sets a base value (builder pattern), used by class/race templates.
    pub fn with_base(mut self, variable: StatVariable, value: f32) -> Self {
        self.set_base(variable, value);
        self
    }

    /// Overwrites the base layer value of `variable`.
    pub fn set_base(&mut self, variable: StatVariable, value: f32) {
        match variable.index() {
            Some(i) => self.layers[StatLayer::Base.slot()].set(i, value),
            None => tracing::warn!(%variable, "ignoring base value for unsupported stat variable"),
        }
    }

    /// Adds `delta` to exactly one layer of `variable`.
    ///
    /// Unsupported variables are logged and ignored.
    pub fn apply_layer_modifier(&mut self, layer: StatLayer, variable: StatVariable, delta: f32) {
        let Some(i) = variable.index() else {
            tracing::warn!(%variable, %layer, delta, "ignoring modifier for unsupported stat variable");
            return;
        };
        if !delta.is_finite() {
            tracing::warn!(%variable, %layer, delta, "ignoring non-finite stat delta");
            return;
        }
        self.layers[layer.slot()].add(i, delta);
    }

    /// Value of a single layer.
    pub fn layer(&self, layer: StatLayer, variable: StatVariable) -> f32 {
        variable
            .index()
            .map_or(0.0, |i| self.layers[layer.slot()].visible[i])
    }

    /// Base layer value.
    pub fn base(&self, variable: StatVariable) -> f32 {
        self.layer(StatLayer::Base, variable)
    }

    /// Equipment layer value.
    pub fn equipment(&self, variable: StatVariable) -> f32 {
        self.layer(StatLayer::Equipment, variable)
    }

    /// External (buff) layer value.
    pub fn external(&self, variable: StatVariable) -> f32 {
        self.layer(StatLayer::External, variable)
    }

    /// `Base + Equipment + External`, recomputed on every call.
    pub fn total(&self, variable: StatVariable) -> f32 {
        self.base(variable) + self.equipment(variable) + self.external(variable)
    }
}

impl Default for StatBlock {
    fn default() -> Self {
        Self::new()
    }
}
