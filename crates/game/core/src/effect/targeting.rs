//! Recipient resolution for skill effects.
//!
//! Resolution never fails: an area with nobody in it, a missing single
//! target, or a filter that rejects everyone all yield an empty list.

use crate::config::CombatConfig;
use crate::env::{CombatEnv, LayerMask, SpatialQuery};
use crate::skill::SkillContext;
use crate::state::{EntityId, Faction, Roster};

// ============================================================================
// Targeting Mode
// ============================================================================

/// How a skill picks candidate recipients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetingMode {
    /// The caster only.
    SelfOnly,
    /// Everyone within the radius around the target point.
    Area,
    /// The context's target entity.
    #[default]
    Single,
}

// ============================================================================
// Target Filter
// ============================================================================

/// Allegiance rule applied to every candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetFilter {
    #[default]
    All,
    SelfOnly,
    AllExceptSelf,
    /// Friendly factions, the caster included.
    Allies,
    Enemies,
}

impl TargetFilter {
    /// Faction layers a spatial query needs to return for this filter.
    pub fn layers(self, caster_faction: Faction) -> LayerMask {
        match self {
            TargetFilter::All | TargetFilter::AllExceptSelf => LayerMask::all(),
            TargetFilter::SelfOnly => LayerMask::from(caster_faction),
            TargetFilter::Allies => LayerMask::friendly_to(caster_faction),
            TargetFilter::Enemies => LayerMask::hostile_to(caster_faction),
        }
    }

    pub fn allows(
        self,
        caster: EntityId,
        caster_faction: Faction,
        candidate: EntityId,
        candidate_faction: Faction,
    ) -> bool {
        match self {
            TargetFilter::All => true,
            TargetFilter::SelfOnly => candidate == caster,
            TargetFilter::AllExceptSelf => candidate != caster,
            TargetFilter::Allies => caster_faction.is_friendly_to(candidate_faction),
            TargetFilter::Enemies => caster_faction.is_hostile_to(candidate_faction),
        }
    }
}

/// Targeting section of a skill definition.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Targeting {
    pub mode: TargetingMode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub filter: TargetFilter,
    /// Maximum distance to a single target. Zero means unlimited.
    #[cfg_attr(feature = "serde", serde(default))]
    pub range: f32,
    /// Area radius; clamped to `CombatConfig::MIN_AREA_RADIUS`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub radius: f32,
}

impl Default for Targeting {
    fn default() -> Self {
        Self::single(0.0)
    }
}

impl Targeting {
    pub fn self_only() -> Self {
        Self {
            mode: TargetingMode::SelfOnly,
            filter: TargetFilter::SelfOnly,
            range: 0.0,
            radius: 0.0,
        }
    }

    pub fn single(range: f32) -> Self {
        Self {
            mode: TargetingMode::Single,
            filter: TargetFilter::All,
            range,
            radius: 0.0,
        }
    }

    pub fn area(radius: f32) -> Self {
        Self {
            mode: TargetingMode::Area,
            filter: TargetFilter::All,
            range: 0.0,
            radius,
        }
    }

    pub fn with_filter(mut self, filter: TargetFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn clamped_radius(&self) -> f32 {
        if self.radius.is_nan() {
            CombatConfig::MIN_AREA_RADIUS
        } else {
            self.radius.max(CombatConfig::MIN_AREA_RADIUS)
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Candidates for `targeting`, before the allegiance filter. Area queries
/// are pre-filtered to `layers`.
fn candidates(
    targeting: &Targeting,
    layers: LayerMask,
    ctx: &SkillContext,
    roster: &Roster,
    env: &CombatEnv<'_>,
) -> Vec<EntityId> {
    match targeting.mode {
        TargetingMode::SelfOnly => vec![ctx.caster],
        TargetingMode::Area => {
            let Some(center) = ctx.target_position.or(ctx.origin) else {
                return Vec::new();
            };
            let radius = targeting.clamped_radius();
            match env.spatial() {
                Some(spatial) => spatial.entities_within(center, radius, layers),
                None => roster.entities_within(center, radius, layers),
            }
        }
        TargetingMode::Single => {
            let Some(target) = ctx.target_entity() else {
                return Vec::new();
            };
            if targeting.range > 0.0
                && let (Some(origin), Some(combatant)) = (ctx.origin, roster.get(target))
                && origin.distance(combatant.position) > targeting.range
            {
                tracing::debug!(target_id = %target, range = targeting.range, "target out of range");
                return Vec::new();
            }
            vec![target]
        }
    }
}

/// Living recipients of an effect, in candidate order.
///
/// `filter` overrides the definition's filter for a single effect. A
/// `SelfOnly` filter always resolves to the caster, whatever the mode.
pub fn resolve_recipients(
    targeting: &Targeting,
    filter: Option<TargetFilter>,
    ctx: &SkillContext,
    roster: &Roster,
    env: &CombatEnv<'_>,
) -> Vec<EntityId> {
    let Some(caster) = roster.get(ctx.caster) else {
        return Vec::new();
    };
    let filter = filter.unwrap_or(targeting.filter);
    let candidates = if filter == TargetFilter::SelfOnly {
        vec![ctx.caster]
    } else {
        candidates(targeting, filter.layers(caster.faction()), ctx, roster, env)
    };

    candidates
        .into_iter()
        .filter(|id| {
            roster.get(*id).is_some_and(|candidate| {
                candidate.is_alive()
                    && filter.allows(caster.id(), caster.faction(), candidate.id(), candidate.faction())
            })
        })
        .collect()
}

/// Returns true if `candidate` passes `filter` relative to the caster.
pub fn accepts(filter: TargetFilter, caster: EntityId, candidate: EntityId, roster: &Roster) -> bool {
    match (roster.get(caster), roster.get(candidate)) {
        (Some(c), Some(t)) => t.is_alive() && filter.allows(c.id(), c.faction(), t.id(), t.faction()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Combatant, Position};
    use crate::stats::StatBlock;

    fn roster() -> Roster {
        let mut roster = Roster::new();
        for (id, faction, x) in [
            (0, Faction::Player, 0.0),
            (1, Faction::Ally, 1.0),
            (2, Faction::Enemy, 2.0),
            (3, Faction::Enemy, 9.0),
            (4, Faction::Neutral, 1.5),
        ] {
            roster.insert(
                Combatant::new(EntityId(id), faction, StatBlock::new()).with_position(Position::flat(x, 0.0)),
            );
        }
        roster
    }

    fn ctx() -> SkillContext {
        SkillContext::new(EntityId(0)).with_origin(Position::ORIGIN)
    }

    #[test]
    fn allies_include_the_caster() {
        let roster = roster();
        let config = CombatConfig::new();
        let env = CombatEnv::new(&config);
        let targeting = Targeting::area(3.0).with_filter(TargetFilter::Allies);
        let ctx = ctx().with_target_position(Position::ORIGIN);

        let ids = resolve_recipients(&targeting, None, &ctx, &roster, &env);
        assert_eq!(ids, vec![EntityId(0), EntityId(1)]);
    }

    #[test]
    fn enemies_include_neutrals() {
        let roster = roster();
        let config = CombatConfig::new();
        let env = CombatEnv::new(&config);
        let targeting = Targeting::area(3.0).with_filter(TargetFilter::Enemies);
        let ctx = ctx().with_target_position(Position::ORIGIN);

        let ids = resolve_recipients(&targeting, None, &ctx, &roster, &env);
        assert_eq!(ids, vec![EntityId(2), EntityId(4)]);
    }

    #[test]
    fn empty_area_is_not_an_error() {
        let roster = roster();
        let config = CombatConfig::new();
        let env = CombatEnv::new(&config);
        let ctx = ctx().with_target_position(Position::flat(50.0, 50.0));
        assert!(resolve_recipients(&Targeting::area(0.0), None, &ctx, &roster, &env).is_empty());
    }

    #[test]
    fn single_target_respects_range_and_liveness() {
        let mut roster = roster();
        let config = CombatConfig::new();
        let env = CombatEnv::new(&config);

        let far = ctx().with_target_entity(EntityId(3));
        assert!(resolve_recipients(&Targeting::single(5.0), None, &far, &roster, &env).is_empty());

        let near = ctx().with_target_entity(EntityId(2));
        assert_eq!(
            resolve_recipients(&Targeting::single(5.0), None, &near, &roster, &env),
            vec![EntityId(2)]
        );

        if let Some(target) = roster.get_mut(EntityId(2)) {
            target.take_damage(1_000.0, crate::combat::DamageType::True, &config);
        }
        assert!(resolve_recipients(&Targeting::single(5.0), None, &near, &roster, &env).is_empty());
    }

    #[test]
    fn self_filter_ignores_mode() {
        let roster = roster();
        let config = CombatConfig::new();
        let env = CombatEnv::new(&config);
        let ctx = ctx().with_target_entity(EntityId(2));
        let ids = resolve_recipients(&Targeting::single(0.0), Some(TargetFilter::SelfOnly), &ctx, &roster, &env);
        assert_eq!(ids, vec![EntityId(0)]);
    }

    #[test]
    fn area_query_receives_filter_layers() {
        use std::cell::RefCell;

        struct Recording(RefCell<Vec<LayerMask>>);

        impl SpatialQuery for Recording {
            fn entities_within(&self, _center: Position, _radius: f32, layers: LayerMask) -> Vec<EntityId> {
                self.0.borrow_mut().push(layers);
                Vec::new()
            }
        }

        let roster = roster();
        let config = CombatConfig::new();
        let spatial = Recording(RefCell::new(Vec::new()));
        let env = CombatEnv::new(&config).with_spatial(&spatial);
        let ctx = ctx().with_target_position(Position::ORIGIN);

        for filter in [TargetFilter::Enemies, TargetFilter::Allies, TargetFilter::All] {
            resolve_recipients(&Targeting::area(3.0).with_filter(filter), None, &ctx, &roster, &env);
        }
        assert_eq!(
            *spatial.0.borrow(),
            vec![
                LayerMask::ENEMY | LayerMask::NEUTRAL,
                LayerMask::PLAYER | LayerMask::ALLY,
                LayerMask::all(),
            ]
        );
    }

    #[test]
    fn per_effect_filter_overrides() {
        let roster = roster();
        let config = CombatConfig::new();
        let env = CombatEnv::new(&config);
        let targeting = Targeting::area(3.0).with_filter(TargetFilter::Enemies);
        let ctx = ctx().with_target_position(Position::ORIGIN);

        let ids = resolve_recipients(&targeting, Some(TargetFilter::AllExceptSelf), &ctx, &roster, &env);
        assert_eq!(ids, vec![EntityId(1), EntityId(2), EntityId(4)]);
    }
}
