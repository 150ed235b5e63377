//! Named stat variables and the per-variable dispatch table.
//!
//! Every layered variable owns one row in [`STAT_TABLE`]. The stat block, the
//! modifier math and the buff engine all index through this table instead of
//! matching on the variable, so adding a stat means adding one enum variant
//! and one table row.

/// A named, layered character statistic.
///
/// `Unknown` absorbs variable names this build does not recognise when
/// configuration data is deserialized. Mutating it is a logged no-op.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatVariable {
    PhysicalDamage,
    MagicalDamage,
    PhysicalResistance,
    MagicalResistance,
    MaxHealth,
    MaxEnergy,
    HealthRegen,
    EnergyRegen,
    CriticalChance,
    AttackSpeed,
    Speed,
    Luck,
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

/// Static description of one layered variable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatSpec {
    pub variable: StatVariable,
    /// Integer-valued variables round when a layer is mutated, never on read.
    pub integer: bool,
    /// Value assumed for the base layer when no template sets it.
    pub default_base: f32,
}

impl StatSpec {
    const fn real(variable: StatVariable, default_base: f32) -> Self {
        Self {
            variable,
            integer: false,
            default_base,
        }
    }

    const fn integer(variable: StatVariable, default_base: f32) -> Self {
        Self {
            variable,
            integer: true,
            default_base,
        }
    }
}

/// Number of variables that carry layer storage (everything except `Unknown`).
pub const LAYERED_STAT_COUNT: usize = 12;

/// Dispatch table, ordered by [`StatVariable::index`].
pub const STAT_TABLE: [StatSpec; LAYERED_STAT_COUNT] = [
    StatSpec::real(StatVariable::PhysicalDamage, 0.0),
    StatSpec::real(StatVariable::MagicalDamage, 0.0),
    StatSpec::real(StatVariable::PhysicalResistance, 0.0),
    StatSpec::real(StatVariable::MagicalResistance, 0.0),
    StatSpec::integer(StatVariable::MaxHealth, 100.0),
    StatSpec::integer(StatVariable::MaxEnergy, 100.0),
    StatSpec::integer(StatVariable::HealthRegen, 0.0),
    StatSpec::real(StatVariable::EnergyRegen, 0.0),
    StatSpec::real(StatVariable::CriticalChance, 0.0),
    StatSpec::real(StatVariable::AttackSpeed, 1.0),
    StatSpec::real(StatVariable::Speed, 0.0),
    StatSpec::real(StatVariable::Luck, 0.0),
];

impl StatVariable {
    /// Row in [`STAT_TABLE`], or `None` for variables without layer storage.
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Unknown => None,
            // Discriminants follow declaration order, which matches the table.
            other => Some(other as usize),
        }
    }

    /// Table row for this variable.
    pub fn spec(self) -> Option<&'static StatSpec> {
        self.index().map(|i| &STAT_TABLE[i])
    }

    /// Returns true if layer mutations of this variable round to integers.
    pub fn is_integer(self) -> bool {
        self.spec().is_some_and(|spec| spec.integer)
    }

    /// Iterates every variable that has layer storage.
    pub fn layered() -> impl Iterator<Item = StatVariable> {
        STAT_TABLE.iter().map(|spec| spec.variable)
    }
}
