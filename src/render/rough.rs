//! Hand-drawn line perturbation.
//!
//! A straight segment becomes a quadratic curve whose control point is pushed
//! off the midpoint (bowing) and whose endpoints wander a little (roughness).
//! Every call draws fresh random values; drawing the same segment twice gives
//! two different strokes.

use rand::Rng;
use std::fmt::Write;

/// Fraction of the segment length used as the bow amplitude at `bowing = 1`.
pub const BOW_LENGTH_FACTOR: f64 = 0.05;

/// A point in grid coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Quadratic Bézier from `start` to `end` bent towards `control`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchCurve {
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

impl SketchCurve {
    /// Straight curve (control point at the midpoint).
    pub fn straight(start: Point, end: Point) -> Self {
        Self {
            start,
            control: Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0),
            end,
        }
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        Point::new(
            u * u * self.start.x + 2.0 * u * t * self.control.x + t * t * self.end.x,
            u * u * self.start.y + 2.0 * u * t * self.control.y + t * t * self.end.y,
        )
    }

    /// Polyline approximation with `steps` segments.
    pub fn flatten(&self, steps: usize) -> Vec<Point> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| self.point_at(i as f64 / steps as f64))
            .collect()
    }

    /// Length of the control polygon; an upper bound on the arc length.
    pub fn hull_length(&self) -> f64 {
        self.start.distance(self.control) + self.control.distance(self.end)
    }

    /// SVG path data: `M x y Q cx cy x y`.
    pub fn to_path_data(&self) -> String {
        let mut d = String::with_capacity(64);
        let _ = write!(
            d,
            "M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
        );
        d
    }
}

/// Uniform offset in `[-amplitude, amplitude]`; zero when the amplitude is
/// zero, negative or not finite.
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f64) -> f64 {
    if amplitude.is_finite() && amplitude > 0.0 {
        rng.gen_range(-amplitude..=amplitude)
    } else {
        0.0
    }
}

/// Perturb the segment `a -> b` into a hand-drawn curve.
///
/// The control point is displaced perpendicular to the segment by up to
/// `length x 0.05 x bowing`; each endpoint moves by up to `roughness` on both
/// axes. With both parameters at zero the result is exactly straight.
pub fn sketch_line<R: Rng + ?Sized>(
    rng: &mut R,
    a: Point,
    b: Point,
    roughness: f64,
    bowing: f64,
) -> SketchCurve {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = dx.hypot(dy);
    let (nx, ny) = if length > 0.0 {
        (-dy / length, dx / length)
    } else {
        (0.0, 0.0)
    };

    let bow = jitter(rng, length * BOW_LENGTH_FACTOR * bowing);
    let control = Point::new(a.x + dx / 2.0 + nx * bow, a.y + dy / 2.0 + ny * bow);

    let start = Point::new(a.x + jitter(rng, roughness), a.y + jitter(rng, roughness));
    let end = Point::new(b.x + jitter(rng, roughness), b.y + jitter(rng, roughness));

    SketchCurve {
        start,
        control,
        end,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_parameters_give_straight_line() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = Point::new(0.0, 10.0);
        let b = Point::new(100.0, 10.0);
        let curve = sketch_line(&mut rng, a, b, 0.0, 0.0);
        assert_eq!(curve, SketchCurve::straight(a, b));
    }

    #[test]
    fn test_jitter_stays_within_amplitude() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 200.0);
        for _ in 0..200 {
            let curve = sketch_line(&mut rng, a, b, 2.0, 1.0);
            assert!((curve.start.x - a.x).abs() <= 2.0);
            assert!((curve.start.y - a.y).abs() <= 2.0);
            assert!((curve.end.x - b.x).abs() <= 2.0);
            assert!((curve.end.y - b.y).abs() <= 2.0);
            // Vertical segment: bow moves the control point along x only
            assert!((curve.control.y - 100.0).abs() < 1e-9);
            assert!(curve.control.x.abs() <= 200.0 * BOW_LENGTH_FACTOR + 1e-9);
        }
    }

    #[test]
    fn test_repeated_calls_differ() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = Point::new(0.0, 0.0);
        let b = Point::new(50.0, 0.0);
        let first = sketch_line(&mut rng, a, b, 1.0, 1.0);
        let second = sketch_line(&mut rng, a, b, 1.0, 1.0);
        assert_ne!(first, second);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let a = Point::new(5.0, 5.0);
        let b = Point::new(80.0, 40.0);
        let one = sketch_line(&mut StdRng::seed_from_u64(9), a, b, 1.5, 1.0);
        let two = sketch_line(&mut StdRng::seed_from_u64(9), a, b, 1.5, 1.0);
        assert_eq!(one, two);
    }

    #[test]
    fn test_zero_length_segment() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = Point::new(3.0, 4.0);
        let curve = sketch_line(&mut rng, p, p, 0.0, 5.0);
        assert_eq!(curve.control, p);
    }

    #[test]
    fn test_flatten_hits_endpoints() {
        let curve = SketchCurve {
            start: Point::new(0.0, 0.0),
            control: Point::new(5.0, 10.0),
            end: Point::new(10.0, 0.0),
        };
        let points = curve.flatten(4);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], curve.start);
        assert_eq!(points[4], curve.end);
        assert_eq!(points[2], Point::new(5.0, 5.0));
    }

    #[test]
    fn test_path_data_format() {
        let curve = SketchCurve::straight(Point::new(0.0, 0.0), Point::new(10.0, 0.5));
        assert_eq!(curve.to_path_data(), "M 0.00 0.00 Q 5.00 0.25 10.00 0.50");
    }
}
