use crate::{
    body::Body,
    config::{Aggregation, SimulationConfig},
    error::{Error, Result},
    quadtree::Quadtree,
    region::Region,
};

use rayon::prelude::*;
use tracing::{debug, warn};
use ultraviolet::DVec2;

/// Drives the Barnes-Hut simulation one step at a time.
///
/// Each step rebuilds the quadtree from scratch. This costs O(n log n) per
/// step but keeps the tree free of any state carried across steps.
#[derive(Clone, Debug)]
pub struct Simulation {
    /// Number of completed steps.
    pub frame: usize,
    config: SimulationConfig,
    domain: Region,
    bodies: Vec<Body>,
    /// The tree built by the most recent step.
    quadtree: Quadtree,
    /// Per-body force scratch buffer, reused across steps.
    forces: Vec<DVec2>,
}

impl Simulation {
    /// Validates `config` and every body, rejecting bodies outside the domain.
    pub fn new(config: SimulationConfig, bodies: Vec<Body>) -> Result<Self> {
        config.validate()?;
        let domain = config.domain();
        let quadtree = Quadtree::new(config.capacity, config.theta, config.gravity);

        let mut sim = Self {
            frame: 0,
            config,
            domain,
            bodies: Vec::with_capacity(bodies.len()),
            quadtree,
            forces: Vec::new(),
        };
        for body in bodies {
            sim.add_body(body)?;
        }
        sim.quadtree.clear(sim.domain.empty_copy());
        Ok(sim)
    }

    /// Adds a body with zeroed force and returns its index.
    pub fn add_body(&mut self, mut body: Body) -> Result<usize> {
        let index = self.bodies.len();
        if index >= u32::MAX as usize {
            return Err(Error::InvalidConfig("too many bodies".into()));
        }
        if let Err(err) = body.validate(index) {
            warn!(index, %err, "rejected body");
            return Err(err);
        }
        if !self.domain.contains(&body) {
            warn!(index, x = body.pos.x, y = body.pos.y, "rejected body outside the domain");
            return Err(Error::OutOfBounds { index, pos: body.pos });
        }
        body.reset_force();
        self.bodies.push(body);
        Ok(index)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn domain(&self) -> &Region {
        &self.domain
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn positions(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.bodies.iter().map(|b| b.pos)
    }

    pub fn quadtree(&self) -> &Quadtree {
        &self.quadtree
    }

    /// Advances the simulation by `dt`.
    ///
    /// Either every body is updated or, on error, none is.
    pub fn step(&mut self, dt: f64) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::InvalidTimestep(dt));
        }

        self.build_tree()?;
        self.attract();
        self.iterate(dt);
        self.frame += 1;

        debug!(
            frame = self.frame,
            bodies = self.bodies.len(),
            nodes = self.quadtree.nodes.len(),
            depth = self.quadtree.depth(),
            "step complete"
        );
        Ok(())
    }

    /// Runs `steps` consecutive steps, stopping at the first error.
    pub fn run(&mut self, steps: usize, dt: f64) -> Result<()> {
        for _ in 0..steps {
            self.step(dt)?;
        }
        Ok(())
    }

    /// Rebuilds the quadtree from the current body positions, inserting in
    /// index order, and aggregates it per the configured mode.
    pub fn build_tree(&mut self) -> Result<()> {
        self.quadtree.clear(self.domain.empty_copy());

        for (index, body) in self.bodies.iter().enumerate() {
            if !self.quadtree.insert(index, &self.bodies) {
                warn!(index, x = body.pos.x, y = body.pos.y, "body left the domain, step aborted");
                return Err(Error::OutOfBounds { index, pos: body.pos });
            }
        }

        if self.config.aggregation == Aggregation::Refreshed {
            self.quadtree.propagate();
        }
        Ok(())
    }

    /// Resets and recomputes every body's net force from the current tree.
    fn attract(&mut self) {
        let quadtree = &self.quadtree;
        let bodies = &self.bodies;

        self.forces.clear();
        self.forces.resize(bodies.len(), DVec2::zero());

        if self.config.parallel {
            self.forces
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, force)| *force = quadtree.compute_force(i, bodies));
        } else {
            for (i, force) in self.forces.iter_mut().enumerate() {
                *force = quadtree.compute_force(i, bodies);
            }
        }

        for (body, force) in self.bodies.iter_mut().zip(&self.forces) {
            body.reset_force();
            body.force += *force;
        }
    }

    /// Integrates every body and clamps it back into the domain.
    fn iterate(&mut self, dt: f64) {
        let mode = self.config.integration;
        let domain = &self.domain;
        let update = |body: &mut Body| {
            body.integrate(dt, mode);
            body.pos = domain.clamp(body.pos);
        };

        if self.config.parallel {
            self.bodies.par_iter_mut().for_each(update);
        } else {
            self.bodies.iter_mut().for_each(update);
        }
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.mass).sum()
    }

    pub fn total_momentum(&self) -> DVec2 {
        self.bodies
            .iter()
            .fold(DVec2::zero(), |acc, b| acc + b.momentum())
    }

    /// Mass-weighted mean position of all bodies, or `None` when empty.
    pub fn center_of_mass(&self) -> Option<DVec2> {
        let mass = self.total_mass();
        if mass <= 0.0 {
            return None;
        }
        let weighted = self
            .bodies
            .iter()
            .fold(DVec2::zero(), |acc, b| acc + b.pos * b.mass);
        Some(weighted / mass)
    }
}
