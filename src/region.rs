use ultraviolet::DVec2;

use crate::body::Body;

/// Axis-aligned rectangle that also tracks the bodies assigned to it.
///
/// Membership is half-open (`min <= p < max`), so sibling regions tile
/// their parent without overlap or gaps. Corners are stored directly so a
/// child's outer edges are bit-identical to its parent's.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Inclusive lower corner.
    pub min: DVec2,
    /// Exclusive upper corner.
    pub max: DVec2,
    /// Indices into the body slice of bodies assigned at this level.
    pub bodies: Vec<u32>,
    /// Sum of the assigned bodies' masses.
    pub total_mass: f64,
    /// Mass-weighted mean position of the assigned bodies.
    pub com: DVec2,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_corners(DVec2::new(x, y), DVec2::new(x + width, y + height))
    }

    pub fn from_corners(min: DVec2, max: DVec2) -> Self {
        Self {
            min,
            max,
            bodies: Vec::new(),
            total_mass: 0.0,
            com: DVec2::zero(),
        }
    }

    /// A `width` x `height` region centered on the origin.
    pub fn centered(width: f64, height: f64) -> Self {
        Self::new(-width / 2.0, -height / 2.0, width, height)
    }

    /// Same bounds, no bodies.
    pub fn empty_copy(&self) -> Self {
        Self::from_corners(self.min, self.max)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn contains_point(&self, pos: DVec2) -> bool {
        self.min.x <= pos.x && pos.x < self.max.x && self.min.y <= pos.y && pos.y < self.max.y
    }

    pub fn contains(&self, body: &Body) -> bool {
        self.contains_point(body.pos)
    }

    /// Assigns `bodies[index]` to this region and recomputes the aggregate
    /// from the full assigned list. Returns false if the body lies outside
    /// or the index is not in `bodies`.
    pub fn insert(&mut self, index: u32, bodies: &[Body]) -> bool {
        match bodies.get(index as usize) {
            Some(body) if self.contains(body) => {}
            _ => return false,
        }
        self.bodies.push(index);
        self.recompute(bodies);
        true
    }

    fn recompute(&mut self, bodies: &[Body]) {
        let (mass, weighted) = self
            .bodies
            .iter()
            .map(|&i| &bodies[i as usize])
            .fold((0.0, DVec2::zero()), |(m, w), b| (m + b.mass, w + b.pos * b.mass));
        self.total_mass = mass;
        if mass > 0.0 {
            self.com = weighted / mass;
        }
    }

    /// The four quadrants in NE, SE, SW, NW order.
    ///
    /// All four share one midpoint and reuse the parent's edges, so every
    /// point of the parent lies in exactly one of them.
    pub fn quadrants(&self) -> [Region; 4] {
        let (min, max) = (self.min, self.max);
        let mid = DVec2::new(
            min.x + (max.x - min.x) / 2.0,
            min.y + (max.y - min.y) / 2.0,
        );
        [
            Region::from_corners(DVec2::new(mid.x, min.y), DVec2::new(max.x, mid.y)),
            Region::from_corners(mid, max),
            Region::from_corners(DVec2::new(min.x, mid.y), DVec2::new(mid.x, max.y)),
            Region::from_corners(min, mid),
        ]
    }

    /// Saturates `pos` into the region. The open upper edge maps to the
    /// largest value strictly below it so the result always satisfies
    /// [`Region::contains_point`].
    pub fn clamp(&self, pos: DVec2) -> DVec2 {
        DVec2::new(
            pos.x.clamp(self.min.x, self.max.x.next_down()),
            pos.y.clamp(self.min.y, self.max.y.next_down()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn half_open_membership() {
        let region = Region::new(0.0, 0.0, 10.0, 10.0);
        assert!(region.contains_point(DVec2::new(0.0, 0.0)));
        assert!(region.contains_point(DVec2::new(9.999, 9.999)));
        assert!(!region.contains_point(DVec2::new(10.0, 5.0)));
        assert!(!region.contains_point(DVec2::new(5.0, 10.0)));
        assert!(!region.contains_point(DVec2::new(-0.001, 5.0)));
    }

    #[test]
    fn insert_rejects_outside_and_tracks_aggregate() {
        let bodies = [
            Body::at_rest(1.0, 1.0, 1.0),
            Body::at_rest(5.0, 1.0, 3.0),
            Body::at_rest(20.0, 1.0, 1.0),
        ];
        let mut region = Region::new(0.0, 0.0, 10.0, 10.0);
        assert!(region.insert(0, &bodies));
        assert_relative_eq!(region.total_mass, 1.0);
        assert_relative_eq!(region.com.x, 1.0);

        assert!(region.insert(1, &bodies));
        assert_relative_eq!(region.total_mass, 4.0);
        assert_relative_eq!(region.com.x, 4.0);
        assert_relative_eq!(region.com.y, 1.0);

        assert!(!region.insert(2, &bodies));
        assert_eq!(region.bodies, vec![0, 1]);
        assert_relative_eq!(region.total_mass, 4.0);
    }

    #[test]
    fn quadrants_tile_the_parent() {
        let region = Region::centered(800.0, 800.0);
        let quads = region.quadrants();
        assert_eq!(quads[0].min, DVec2::new(0.0, -400.0));
        assert_eq!(quads[1].min, DVec2::new(0.0, 0.0));
        assert_eq!(quads[2].min, DVec2::new(-400.0, 0.0));
        assert_eq!(quads[3].min, DVec2::new(-400.0, -400.0));
        assert!(quads.iter().all(|q| q.width() == 400.0 && q.height() == 400.0));

        let probes = [
            DVec2::new(0.0, 0.0),
            DVec2::new(-0.0001, 0.0),
            DVec2::new(0.0, -0.0001),
            DVec2::new(-400.0, -400.0),
            DVec2::new(399.9, -12.5),
            DVec2::new(-123.0, 321.0),
        ];
        for p in probes {
            let hits = quads.iter().filter(|q| q.contains_point(p)).count();
            assert_eq!(hits, 1, "{p:?} should land in exactly one quadrant");
        }
    }

    #[test]
    fn clamp_keeps_points_inside_the_half_open_bounds() {
        let region = Region::centered(800.0, 600.0);
        let clamped = region.clamp(DVec2::new(1e6, -1e6));
        assert!(region.contains_point(clamped));
        assert!(clamped.x < 400.0 && clamped.x > 399.999);
        assert_eq!(clamped.y, -300.0);

        let inside = DVec2::new(12.0, -7.0);
        assert_eq!(region.clamp(inside), inside);
    }

    fn owners(quads: &[Region; 4], p: DVec2) -> usize {
        quads.iter().filter(|q| q.contains_point(p)).count()
    }

    #[test]
    fn quadrants_tile_non_dyadic_regions_at_every_depth() {
        let mut rng = fastrand::Rng::with_seed(17);
        for _ in 0..200 {
            let mut region = Region::centered(100.0 + rng.f64() * 900.0, 100.0 + rng.f64() * 900.0);
            for depth in 0..40 {
                let quads = region.quadrants();
                let mut probes = vec![
                    region.min,
                    DVec2::new(region.max.x.next_down(), region.max.y.next_down()),
                    DVec2::new(region.min.x, region.max.y.next_down()),
                    quads[1].min,
                    DVec2::new(quads[1].min.x.next_down(), quads[1].min.y.next_down()),
                ];
                for _ in 0..8 {
                    probes.push(DVec2::new(
                        region.min.x + rng.f64() * region.width(),
                        region.min.y + rng.f64() * region.height(),
                    ));
                }
                for p in probes.into_iter().filter(|&p| region.contains_point(p)) {
                    assert_eq!(owners(&quads, p), 1, "{p:?} at depth {depth} of {region:?}");
                }
                region = quads[rng.usize(0..4)].empty_copy();
            }
        }
    }

    #[test]
    fn point_beside_the_midline_is_owned_all_the_way_down() {
        let mut region = Region::centered(559.3892784684049, 559.3892784684049);
        let p = DVec2::new(-5e-324, -209.77097942565186);
        assert!(region.contains_point(p));
        for depth in 0..48 {
            let quads = region.quadrants();
            assert_eq!(owners(&quads, p), 1, "depth {depth}");
            let Some(next) = quads.into_iter().find(|q| q.contains_point(p)) else {
                unreachable!();
            };
            region = next;
        }
    }

    #[test]
    fn insert_ignores_unknown_indices() {
        let bodies = [Body::at_rest(1.0, 1.0, 1.0)];
        let mut region = Region::new(0.0, 0.0, 10.0, 10.0);
        assert!(!region.insert(1, &bodies));
        assert!(!region.insert(u32::MAX, &bodies));
        assert!(region.is_empty());
    }
}
