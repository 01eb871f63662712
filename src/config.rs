//! Simulation parameters.
//!
//! Every field has a default, so a YAML document only needs to name what it
//! changes:
//!
//! ```yaml
//! width: 1200
//! height: 800
//! capacity: 4
//! theta: 0.7
//! gravity:
//!   g: 5000.0
//!   softening: 1.0e-10
//! aggregation: refreshed      # or "snapshot"
//! integration: newtonian      # or "force_as_acceleration"
//! parallel: true
//! ```

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gravity::Gravity;
use crate::region::Region;

/// How internal tree nodes obtain their mass and center of mass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Internal nodes keep the aggregate captured at the moment they
    /// subdivided; bodies inserted into their subtree later are not counted.
    Snapshot,
    /// Internal node aggregates are recomputed from their children after
    /// every tree build.
    #[default]
    Refreshed,
}

/// How accumulated force turns into a velocity change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    /// `vel += force * dt`, mass is ignored. The default `G` is tuned for this.
    #[default]
    ForceAsAcceleration,
    /// `vel += force / mass * dt`.
    Newtonian,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationConfig {
    /// Domain width, centered on the origin.
    pub width: f64,
    /// Domain height, centered on the origin.
    pub height: f64,
    /// Bodies a node holds directly before it subdivides.
    pub capacity: usize,
    /// Opening threshold: a node is treated as one mass when
    /// `width / distance <= theta`.
    pub theta: f64,
    pub gravity: Gravity,
    pub aggregation: Aggregation,
    pub integration: Integration,
    /// Compute forces and integrate with rayon.
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
            capacity: 1,
            theta: 0.5,
            gravity: Gravity::default(),
            aggregation: Aggregation::default(),
            integration: Integration::default(),
            parallel: false,
        }
    }
}

impl SimulationConfig {
    pub fn with_domain(width: f64, height: f64, capacity: usize) -> Self {
        Self {
            width,
            height,
            capacity,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_reader(reader: impl Read) -> Result<Self> {
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// The simulation domain, centered on the origin.
    pub fn domain(&self) -> Region {
        Region::centered(self.width, self.height)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.width) || !positive(self.height) {
            return Err(Error::InvalidConfig(format!(
                "domain must have positive finite size, got {}x{}",
                self.width, self.height
            )));
        }
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be at least 1".into()));
        }
        if !positive(self.theta) {
            return Err(Error::InvalidConfig(format!(
                "theta must be positive and finite, got {}",
                self.theta
            )));
        }
        if !positive(self.gravity.g) {
            return Err(Error::InvalidConfig(format!(
                "gravitational constant must be positive and finite, got {}",
                self.gravity.g
            )));
        }
        if !self.gravity.softening.is_finite() || self.gravity.softening < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "softening must be non-negative and finite, got {}",
                self.gravity.softening
            )));
        }
        Ok(())
    }
}
