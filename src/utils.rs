use crate::body::Body;
use crate::region::Region;
use ultraviolet::DVec2;

/// Generates `n` bodies scattered uniformly over `region`, reproducible for a given `seed`.
/// - Positions keep a 10 unit margin from the edges (less for tiny regions).
/// - Velocity components are drawn from [-60, 60).
/// - Masses are drawn from [5, 100).
pub fn uniform_box(n: usize, region: &Region, seed: u64) -> Vec<Body> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let margin_x = 10.0_f64.min(region.width() / 4.0);
    let margin_y = 10.0_f64.min(region.height() / 4.0);
    let span_x = region.width() - 2.0 * margin_x;
    let span_y = region.height() - 2.0 * margin_y;

    let mut uniform = |lo: f64, span: f64| lo + rng.f64() * span;

    (0..n)
        .map(|_| {
            let pos = DVec2::new(
                uniform(region.min.x + margin_x, span_x),
                uniform(region.min.y + margin_y, span_y),
            );
            let vel = DVec2::new(uniform(-60.0, 120.0), uniform(-60.0, 120.0));
            let mass = uniform(5.0, 95.0);
            Body::new(pos, vel, mass)
        })
        .collect()
}
