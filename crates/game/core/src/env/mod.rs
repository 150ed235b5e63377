//! Collaborators injected into skill execution.
//!
//! [`CombatEnv`] bundles the run configuration with the optional spatial and
//! randomness providers. Missing providers fall back to the roster scan and
//! to [`PcgRng`] respectively.
mod rng;
mod spatial;

pub use rng::{PcgRng, RngOracle, RollContext, compute_seed};
pub use spatial::{LayerMask, SpatialQuery};

use crate::config::CombatConfig;

static DEFAULT_RNG: PcgRng = PcgRng;

/// Read-only collaborators for one simulation step.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    config: &'a CombatConfig,
    spatial: Option<&'a dyn SpatialQuery>,
    rng: Option<&'a dyn RngOracle>,
}

impl<'a> CombatEnv<'a> {
    pub fn new(config: &'a CombatConfig) -> Self {
        Self {
            config,
            spatial: None,
            rng: None,
        }
    }

    pub fn with_spatial(mut self, spatial: &'a dyn SpatialQuery) -> Self {
        self.spatial = Some(spatial);
        self
    }

    pub fn with_rng(mut self, rng: &'a dyn RngOracle) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn config(&self) -> &'a CombatConfig {
        self.config
    }

    /// Injected spatial index, if any.
    pub fn spatial(&self) -> Option<&'a dyn SpatialQuery> {
        self.spatial
    }

    /// Injected randomness, or the default PCG generator.
    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng.unwrap_or(&DEFAULT_RNG)
    }
}

impl core::fmt::Debug for CombatEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CombatEnv")
            .field("config", self.config)
            .field("spatial", &self.spatial.is_some())
            .field("rng", &self.rng.is_some())
            .finish()
    }
}
