use serde::{Deserialize, Serialize};
use ultraviolet::DVec2;

/// Pairwise Newtonian attraction with a softened separation.
///
/// `g` is a scale constant tuned for the default domain units, not a
/// physical value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gravity {
    #[serde(default = "Gravity::default_g")]
    pub g: f64,
    /// Added to the separation before it is squared.
    #[serde(default = "Gravity::default_softening")]
    pub softening: f64,
}

impl Default for Gravity {
    fn default() -> Self {
        Self {
            g: Self::DEFAULT_G,
            softening: Self::DEFAULT_SOFTENING,
        }
    }
}

impl Gravity {
    pub const DEFAULT_G: f64 = 5000.0;
    pub const DEFAULT_SOFTENING: f64 = 1e-10;

    fn default_g() -> f64 {
        Self::DEFAULT_G
    }

    fn default_softening() -> f64 {
        Self::DEFAULT_SOFTENING
    }

    /// Force exerted by `source` on `target`.
    ///
    /// The result has length `g * m1 * m2 / d^2` with `d = |r| + softening`
    /// and points from the target toward the source. Coincident points
    /// exert no force, whatever the softening.
    #[inline(always)]
    pub fn force(&self, source_pos: DVec2, source_mass: f64, target_pos: DVec2, target_mass: f64) -> DVec2 {
        let r = source_pos - target_pos;
        let separation = r.mag();
        if separation == 0.0 {
            return DVec2::zero();
        }
        let distance = separation + self.softening;
        let magnitude = self.g * source_mass * target_mass / (distance * distance);
        r * (magnitude / distance)
    }
}
