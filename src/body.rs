use ultraviolet::DVec2;

use crate::config::Integration;
use crate::error::{Error, Result};

/// A point mass in the simulation.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Position vector.
    pub pos: DVec2,
    /// Velocity vector.
    pub vel: DVec2,
    /// Net force accumulated during the current step (reset each step).
    pub force: DVec2,
    /// Mass of the body. Fixed after creation.
    pub mass: f64,
}

impl Default for Body {
    fn default() -> Self {
        Self::new(DVec2::zero(), DVec2::zero(), 1.0)
    }
}

impl Body {
    /// Creates a new Body with the given properties.
    /// Initial net force is zero.
    pub fn new(pos: DVec2, vel: DVec2, mass: f64) -> Self {
        Self {
            pos,
            vel,
            force: DVec2::zero(),
            mass,
        }
    }

    /// Shorthand for a body at rest.
    pub fn at_rest(x: f64, y: f64, mass: f64) -> Self {
        Self::new(DVec2::new(x, y), DVec2::zero(), mass)
    }

    /// Checks that the body can safely enter the force law.
    /// `index` is only used to label the error.
    pub fn validate(&self, index: usize) -> Result<()> {
        let reason = if !self.mass.is_finite() || self.mass <= 0.0 {
            "mass must be positive and finite"
        } else if !(self.pos.x.is_finite() && self.pos.y.is_finite()) {
            "position must be finite"
        } else if !(self.vel.x.is_finite() && self.vel.y.is_finite()) {
            "velocity must be finite"
        } else {
            return Ok(());
        };
        Err(Error::InvalidBody { index, reason })
    }

    pub fn reset_force(&mut self) {
        self.force = DVec2::zero();
    }

    /// Advances velocity and position by `dt` using semi-implicit Euler
    /// (velocity first, then position with the new velocity).
    pub fn integrate(&mut self, dt: f64, mode: Integration) {
        let acc = match mode {
            Integration::ForceAsAcceleration => self.force,
            Integration::Newtonian => self.force / self.mass,
        };
        self.vel += acc * dt;
        self.pos += self.vel * dt;
    }

    pub fn momentum(&self) -> DVec2 {
        self.vel * self.mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_bad_mass_and_non_finite_state() {
        assert!(Body::at_rest(0.0, 0.0, 1.0).validate(0).is_ok());
        assert!(Body::at_rest(0.0, 0.0, 0.0).validate(0).is_err());
        assert!(Body::at_rest(0.0, 0.0, -2.0).validate(0).is_err());
        assert!(Body::at_rest(0.0, 0.0, f64::NAN).validate(0).is_err());
        assert!(Body::at_rest(f64::INFINITY, 0.0, 1.0).validate(0).is_err());

        let moving = Body::new(DVec2::zero(), DVec2::new(f64::NAN, 0.0), 1.0);
        match moving.validate(7) {
            Err(Error::InvalidBody { index, reason }) => {
                assert_eq!(index, 7);
                assert_eq!(reason, "velocity must be finite");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn integrate_uses_updated_velocity_for_position() {
        let mut body = Body::new(DVec2::new(1.0, 2.0), DVec2::new(3.0, 0.0), 4.0);
        body.force = DVec2::new(8.0, -4.0);
        body.integrate(0.5, Integration::ForceAsAcceleration);
        assert_relative_eq!(body.vel.x, 7.0);
        assert_relative_eq!(body.vel.y, -2.0);
        assert_relative_eq!(body.pos.x, 4.5);
        assert_relative_eq!(body.pos.y, 1.0);
    }

    #[test]
    fn newtonian_integration_divides_by_mass() {
        let mut body = Body::at_rest(0.0, 0.0, 4.0);
        body.force = DVec2::new(8.0, 0.0);
        body.integrate(1.0, Integration::Newtonian);
        assert_relative_eq!(body.vel.x, 2.0);
        assert_relative_eq!(body.pos.x, 2.0);
    }

    #[test]
    fn reset_force_clears_accumulator() {
        let mut body = Body::default();
        body.force = DVec2::new(1.0, 1.0);
        body.reset_force();
        assert_eq!(body.force, DVec2::zero());
    }
}
