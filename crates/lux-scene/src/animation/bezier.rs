//! Cubic bezier kernel: closed-form cubic roots and De Casteljau evaluation.

const EPSILON: f64 = 1e-12;
/// Slack allowed around `[0, 1]` when keeping bezier parameters.
const PARAMETER_TOLERANCE: f64 = 1e-9;

/// A 2D control point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn lerp(self, to: Point, t: f64) -> Point {
        Point::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

/// Real roots of `a·x³ + b·x² + c·x + d = 0`.
///
/// Uses the depressed cubic `u³ + p·u + q = 0` with `x = u - b/3a`: a zero
/// discriminant gives a triple or a double root, a positive one a single real
/// root (Cardano), a negative one three real roots (trigonometric method).
/// When `a` vanishes the quadratic or linear equation is solved instead.
pub fn solve_cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a.abs() < EPSILON {
        return solve_quadratic_roots(b, c, d);
    }

    let p = (3.0 * a * c - b * b) / (3.0 * a * a);
    let q = (2.0 * b * b * b - 9.0 * a * b * c + 27.0 * a * a * d) / (27.0 * a * a * a);
    let shift = -b / (3.0 * a);
    let discriminant = (q / 2.0).powi(2) + (p / 3.0).powi(3);

    if discriminant.abs() < EPSILON {
        if p.abs() < EPSILON {
            vec![shift]
        } else {
            vec![3.0 * q / p + shift, -3.0 * q / (2.0 * p) + shift]
        }
    } else if discriminant > 0.0 {
        let sqrt_disc = discriminant.sqrt();
        let u = (-q / 2.0 + sqrt_disc).cbrt();
        let v = (-q / 2.0 - sqrt_disc).cbrt();
        vec![u + v + shift]
    } else {
        // p < 0 here, otherwise the discriminant could not be negative
        let radius = 2.0 * (-p / 3.0).sqrt();
        let cos_arg = ((3.0 * q / (2.0 * p)) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0);
        let phi = cos_arg.acos() / 3.0;
        (0..3)
            .map(|k| {
                radius * (phi - 2.0 * std::f64::consts::PI * f64::from(k) / 3.0).cos() + shift
            })
            .collect()
    }
}

fn solve_quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < EPSILON {
        if b.abs() < EPSILON {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant.abs() < EPSILON {
        vec![-b / (2.0 * a)]
    } else if discriminant > 0.0 {
        let sqrt_disc = discriminant.sqrt();
        vec![(-b + sqrt_disc) / (2.0 * a), (-b - sqrt_disc) / (2.0 * a)]
    } else {
        Vec::new()
    }
}

/// Parameters `t ∈ [0, 1]` at which the x coordinate of the timing curve
/// `(0,0) (p1x,·) (p2x,·) (1,1)` equals `x0`.
///
/// Roots just outside the interval are clamped into it; the caller takes the
/// last one.
pub fn solve_bezier_parameter(p1x: f64, p2x: f64, x0: f64) -> Vec<f64> {
    let a = 1.0 + 3.0 * p1x - 3.0 * p2x;
    let b = 3.0 * p2x - 6.0 * p1x;
    let c = 3.0 * p1x;
    let d = -x0;
    solve_cubic_roots(a, b, c, d)
        .into_iter()
        .filter(|t| (-PARAMETER_TOLERANCE..=1.0 + PARAMETER_TOLERANCE).contains(t))
        .map(|t| t.clamp(0.0, 1.0))
        .collect()
}

/// Bezier parameter for `x0`, falling back to Newton-Raphson when the closed
/// form yields nothing in range.
pub fn bezier_parameter(p1x: f64, p2x: f64, x0: f64) -> f64 {
    solve_bezier_parameter(p1x, p2x, x0)
        .last()
        .copied()
        .unwrap_or_else(|| solve_bezier_x_newton(p1x, p2x, x0))
}

/// Point at `t` on the curve through `points`, by repeated affine
/// interpolation. `t` is not clamped.
pub fn de_casteljau(t: f64, points: &[Point]) -> Point {
    match points {
        [] => Point::default(),
        [only] => *only,
        _ => {
            let reduced: Vec<Point> = points.windows(2).map(|w| w[0].lerp(w[1], t)).collect();
            de_casteljau(t, &reduced)
        }
    }
}

fn solve_bezier_x_newton(x1: f64, x2: f64, target_x: f64) -> f64 {
    let mut t = target_x.clamp(0.0, 1.0);
    for _ in 0..16 {
        let x = bezier_x(x1, x2, t) - target_x;
        if x.abs() < 1e-9 {
            break;
        }
        let dx = bezier_x_derivative(x1, x2, t);
        if dx.abs() < 1e-9 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }
    t
}

/// x(t) = 3(1-t)²t·x1 + 3(1-t)t²·x2 + t³
#[inline]
fn bezier_x(x1: f64, x2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * x1 + 3.0 * mt * t * t * x2 + t * t * t
}

/// dx/dt = 3(1-t)²·x1 + 6(1-t)t·(x2-x1) + 3t²·(1-x2)
#[inline]
fn bezier_x_derivative(x1: f64, x2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * x1 + 6.0 * mt * t * (x2 - x1) + 3.0 * t * t * (1.0 - x2)
}
