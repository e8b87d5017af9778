//! Timing functions as cubic bezier curves.
//!
//! Every named timing function is a fixed curve from `(0, 0)` to `(1, 1)`:
//!
//! | name          | p1            | p2            |
//! |---------------|---------------|---------------|
//! | `ease`        | `(0.25, 0.1)` | `(0.25, 1)`   |
//! | `ease-in`     | `(0.42, 0)`   | `(1, 1)`      |
//! | `ease-out`    | `(0, 0)`      | `(0.58, 1)`   |
//! | `ease-in-out` | `(0.42, 0)`   | `(0.58, 1)`   |
//! | `linear`      | `(0, 0)`      | `(1, 1)`      |

use lux_ir::TimingFunction;

use super::bezier::{Point, bezier_parameter, de_casteljau};

/// Evaluation of a [`TimingFunction`].
pub trait Easing {
    /// Control points `[p0, p1, p2, p3]` of the curve.
    fn control_points(&self) -> [Point; 4];

    /// Eased ratio for a linear `progress`.
    ///
    /// Solves the curve's x coordinate for `progress`, then reads y at that
    /// parameter. The result may leave `[0, 1]` for overshooting curves.
    fn evaluate(&self, progress: f64) -> f64 {
        let points = self.control_points();
        let t = bezier_parameter(points[1].x, points[2].x, progress);
        de_casteljau(t, &points).y
    }
}

impl Easing for TimingFunction {
    fn control_points(&self) -> [Point; 4] {
        let (p1, p2) = match *self {
            TimingFunction::Ease => (Point::new(0.25, 0.1), Point::new(0.25, 1.0)),
            TimingFunction::EaseIn => (Point::new(0.42, 0.0), Point::new(1.0, 1.0)),
            TimingFunction::EaseOut => (Point::new(0.0, 0.0), Point::new(0.58, 1.0)),
            TimingFunction::EaseInOut => (Point::new(0.42, 0.0), Point::new(0.58, 1.0)),
            TimingFunction::Linear => (Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            TimingFunction::CubicBezier { x1, y1, x2, y2 } => {
                (Point::new(x1, y1), Point::new(x2, y2))
            }
        };
        [Point::new(0.0, 0.0), p1, p2, Point::new(1.0, 1.0)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-5;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_linear() {
        for t in [0.0, 0.2, 0.5, 0.8, 1.0] {
            assert!(approx_eq(TimingFunction::Linear.evaluate(t), t));
        }
    }

    #[test]
    fn test_boundaries() {
        for f in [
            TimingFunction::Ease,
            TimingFunction::EaseIn,
            TimingFunction::EaseOut,
            TimingFunction::EaseInOut,
            TimingFunction::Linear,
        ] {
            assert!(approx_eq(f.evaluate(0.0), 0.0), "{f} at 0");
            assert!(approx_eq(f.evaluate(1.0), 1.0), "{f} at 1");
        }
    }

    #[test]
    fn test_ease() {
        assert!(approx_eq(TimingFunction::Ease.evaluate(0.002), 0.000819));
        assert!(approx_eq(TimingFunction::Ease.evaluate(0.5), 0.802403));
    }

    #[test]
    fn test_ease_in_out_is_symmetric() {
        assert!(approx_eq(TimingFunction::EaseInOut.evaluate(0.5), 0.5));
        let a = TimingFunction::EaseInOut.evaluate(0.3);
        let b = TimingFunction::EaseInOut.evaluate(0.7);
        assert!(approx_eq(a + b, 1.0));
    }

    #[test]
    fn test_ease_in_starts_slow() {
        assert!(TimingFunction::EaseIn.evaluate(0.25) < 0.25);
        assert!(TimingFunction::EaseOut.evaluate(0.25) > 0.25);
    }

    #[test]
    fn test_custom_bezier_overshoots() {
        let back = TimingFunction::CubicBezier {
            x1: 0.3,
            y1: 1.5,
            x2: 0.7,
            y2: 1.5,
        };
        assert!(back.evaluate(0.5) > 1.0);
    }
}
