use tracing::{trace, warn};
use ultraviolet::DVec2;

use crate::body::Body;
use crate::gravity::Gravity;
use crate::region::Region;

#[derive(Clone, Debug)]
pub struct Node {
    /// Bounds plus the bodies assigned directly at this level.
    pub region: Region,
    /// Index of the first of four contiguous children (0 if leaf).
    /// Children are ordered NE, SE, SW, NW.
    pub children: u32,
    /// Distance from the root.
    pub depth: u32,
}

impl Node {
    pub fn new(region: Region, depth: u32) -> Self {
        Self {
            region,
            children: 0,
            depth,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children == 0
    }

    pub fn is_branch(&self) -> bool {
        self.children != 0
    }

    /// Indices of the four children, NE first. Empty for a leaf.
    pub fn child_indices(&self) -> std::ops::Range<usize> {
        if self.is_leaf() {
            return 0..0;
        }
        let first = self.children as usize;
        first..first + 4
    }
}

/// Barnes-Hut quadtree over a fixed domain.
///
/// Nodes live in a flat vector and refer to each other by index. The tree is
/// rebuilt from scratch every step; [`Quadtree::clear`] keeps the vector's
/// allocation so rebuilding does not churn the allocator.
#[derive(Clone, Debug)]
pub struct Quadtree {
    /// Bodies a node holds directly before it subdivides.
    pub capacity: usize,
    /// Opening threshold on `width / distance`.
    pub theta: f64,
    pub gravity: Gravity,
    /// Linearized tree nodes.
    pub nodes: Vec<Node>,
    /// Nodes in the order they subdivided, used for bottom-up aggregation.
    pub parents: Vec<usize>,
}

impl Quadtree {
    pub const ROOT: usize = 0;

    /// Nodes this deep never subdivide. Bodies that share a position cannot
    /// be separated by splitting, so they pile up in one leaf instead.
    pub const MAX_DEPTH: u32 = 48;

    pub fn new(capacity: usize, theta: f64, gravity: Gravity) -> Self {
        Self {
            capacity,
            theta,
            gravity,
            nodes: Vec::new(),
            parents: Vec::new(),
        }
    }

    /// Resets the tree to a single empty root covering `region`.
    pub fn clear(&mut self, region: Region) {
        self.nodes.clear();
        self.parents.clear();
        self.nodes.push(Node::new(region.empty_copy(), 0));
    }

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Depth of the deepest node.
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Inserts `bodies[index]`. Returns false if it lies outside the root or
    /// `index` is not in `bodies`.
    pub fn insert(&mut self, index: usize, bodies: &[Body]) -> bool {
        if self.nodes.is_empty() || index >= bodies.len() {
            return false;
        }
        let Ok(index) = u32::try_from(index) else {
            return false;
        };
        self.insert_at(Self::ROOT, index, bodies)
    }

    fn insert_at(&mut self, node: usize, index: u32, bodies: &[Body]) -> bool {
        let n = &self.nodes[node];
        if !n.region.contains(&bodies[index as usize]) {
            return false;
        }

        if n.is_leaf() && (n.region.len() < self.capacity || n.depth >= Self::MAX_DEPTH) {
            return self.nodes[node].region.insert(index, bodies);
        }

        if n.is_leaf() {
            self.subdivide(node, bodies);
        }

        self.nodes[node]
            .child_indices()
            .any(|child| self.insert_at(child, index, bodies))
    }

    /// Splits a leaf into four quadrants and routes its assigned bodies into
    /// them. The node keeps its own list and aggregate as they were.
    fn subdivide(&mut self, node: usize, bodies: &[Body]) {
        let quads = self.nodes[node].region.quadrants();
        let depth = self.nodes[node].depth + 1;
        let first = self.nodes.len();

        self.nodes.extend(quads.into_iter().map(|region| Node::new(region, depth)));
        self.nodes[node].children = first as u32;
        self.parents.push(node);

        trace!(node, depth, bodies = self.nodes[node].region.len(), "subdivided");

        let assigned = std::mem::take(&mut self.nodes[node].region.bodies);
        for &index in &assigned {
            if !(first..first + 4).any(|child| self.insert_at(child, index, bodies)) {
                warn!(node, index, "body fell between quadrants");
            }
        }
        self.nodes[node].region.bodies = assigned;
    }

    /// Recomputes every internal node's mass and center of mass from its
    /// children. Call once after all insertions.
    pub fn propagate(&mut self) {
        // Children always subdivide after their parent, so walking backwards
        // visits the deepest nodes first.
        for &node in self.parents.iter().rev() {
            let (mass, weighted) = self.nodes[node]
                .child_indices()
                .map(|i| &self.nodes[i].region)
                .fold((0.0, DVec2::zero()), |(m, w), r| (m + r.total_mass, w + r.com * r.total_mass));

            let region = &mut self.nodes[node].region;
            region.total_mass = mass;
            if mass > 0.0 {
                region.com = weighted / mass;
            }
        }
    }

    /// Approximate net force on `bodies[index]` from every other body.
    /// Zero if `index` is not in `bodies`.
    pub fn compute_force(&self, index: usize, bodies: &[Body]) -> DVec2 {
        let mut force = DVec2::zero();
        if !self.nodes.is_empty() && index < bodies.len() {
            self.accumulate(Self::ROOT, index, bodies, &mut force);
        }
        force
    }

    fn accumulate(&self, node: usize, index: usize, bodies: &[Body], force: &mut DVec2) {
        let n = &self.nodes[node];
        let region = &n.region;
        if region.is_empty() {
            return;
        }

        let target = &bodies[index];
        let d = (region.com - target.pos).mag();
        // Covers a leaf holding only the target itself.
        if d == 0.0 {
            return;
        }

        if region.width() / d <= self.theta {
            *force += self.gravity.force(region.com, region.total_mass, target.pos, target.mass);
        } else if n.is_branch() {
            for child in n.child_indices() {
                self.accumulate(child, index, bodies, force);
            }
        } else {
            for &other in &region.bodies {
                let other = other as usize;
                if other != index {
                    let source = &bodies[other];
                    *force += self.gravity.force(source.pos, source.mass, target.pos, target.mass);
                }
            }
        }
    }

    /// The leaf whose own list holds `bodies[index]`, if the body is in the tree.
    pub fn leaf_of(&self, index: usize, bodies: &[Body]) -> Option<usize> {
        let pos = bodies.get(index)?.pos;
        let index = u32::try_from(index).ok()?;
        let mut node = Self::ROOT;
        if self.nodes.is_empty() || !self.nodes[node].region.contains_point(pos) {
            return None;
        }
        while self.nodes[node].is_branch() {
            node = self.nodes[node]
                .child_indices()
                .find(|&child| self.nodes[child].region.contains_point(pos))?;
        }
        self.nodes[node]
            .region
            .bodies
            .contains(&index)
            .then_some(node)
    }

    /// `(total_mass, com)` of every node in arena order.
    pub fn aggregates(&self) -> Vec<(f64, DVec2)> {
        self.nodes.iter().map(|n| (n.region.total_mass, n.region.com)).collect()
    }
}
