//! Pairwise interpolation of style values.
//!
//! Channel values are interpolated as `trunc(from + (to - from) * t)` and
//! clamped to the byte range, so curves that overshoot saturate instead of
//! wrapping. Values whose discrete part differs (a named color, a pulse
//! direction, an auto program, a rotation mode) do not blend: the starting
//! value is kept.

use lux_ir::{Auto, Color, Pulse, Rotation, Strobe, StyleValue};

/// Trait for types that can be interpolated between two values.
pub trait Interpolate: Sized {
    /// `t = 0` returns `self`, `t = 1` returns `to`.
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

/// Linear interpolation of a channel byte, truncating toward zero.
#[inline]
fn lerp_u8(from: u8, to: u8, t: f64) -> u8 {
    let from = f64::from(from);
    let value = from + (f64::from(to) - from) * t;
    value.trunc().clamp(0.0, 255.0) as u8
}

impl Interpolate for u8 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        lerp_u8(*self, *to, t)
    }
}

impl Interpolate for Color {
    /// A named color is returned unchanged, `self` first.
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        if self.name.is_some() {
            return self.clone();
        }
        if to.name.is_some() {
            return to.clone();
        }
        Color {
            red: self.red.interpolate(&to.red, t),
            green: self.green.interpolate(&to.green, t),
            blue: self.blue.interpolate(&to.blue, t),
            white: self.white.interpolate(&to.white, t),
            alpha: self.alpha.interpolate(&to.alpha, t),
            name: None,
        }
    }
}

impl Interpolate for Strobe {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Strobe {
            speed: self.speed.interpolate(&to.speed, t),
        }
    }
}

impl Interpolate for Pulse {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        if self.direction != to.direction {
            return *self;
        }
        Pulse {
            direction: self.direction,
            speed: self.speed.interpolate(&to.speed, t),
        }
    }
}

impl Interpolate for Auto {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        if self.name != to.name {
            return self.clone();
        }
        Auto {
            name: self.name.clone(),
            speed: self.speed.interpolate(&to.speed, t),
        }
    }
}

impl Interpolate for Rotation {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        if self.mode != to.mode {
            return *self;
        }
        Rotation {
            mode: self.mode,
            position: self.position.interpolate(&to.position, t),
            speed: self.speed.interpolate(&to.speed, t),
        }
    }
}

impl Interpolate for StyleValue {
    /// Values of different properties never blend, `self` is returned.
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        match (self, to) {
            (StyleValue::Color(a), StyleValue::Color(b)) => StyleValue::Color(a.interpolate(b, t)),
            (StyleValue::Strobe(a), StyleValue::Strobe(b)) => {
                StyleValue::Strobe(a.interpolate(b, t))
            }
            (StyleValue::Pulse(a), StyleValue::Pulse(b)) => StyleValue::Pulse(a.interpolate(b, t)),
            (StyleValue::Auto(a), StyleValue::Auto(b)) => StyleValue::Auto(a.interpolate(b, t)),
            (StyleValue::Rotation(a), StyleValue::Rotation(b)) => {
                StyleValue::Rotation(a.interpolate(b, t))
            }
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_ir::{Direction, RotationMode};

    #[test]
    fn test_u8_truncates() {
        assert_eq!(0u8.interpolate(&255, 0.5), 127);
        assert_eq!(255u8.interpolate(&0, 0.5), 127);
        assert_eq!(255u8.interpolate(&0, 0.000819), 254);
        assert_eq!(0u8.interpolate(&255, 0.0), 0);
        assert_eq!(0u8.interpolate(&255, 1.0), 255);
    }

    #[test]
    fn test_u8_saturates_on_overshoot() {
        assert_eq!(100u8.interpolate(&200, 2.0), 255);
        assert_eq!(100u8.interpolate(&200, -2.0), 0);
    }

    #[test]
    fn test_color_channels() {
        let from = Color::rgb(255, 0, 0).with_alpha(255);
        let to = Color::rgb(255, 0, 0).with_alpha(0);
        let mid = from.interpolate(&to, 0.802403);
        assert_eq!(mid, Color::rgb(255, 0, 0).with_alpha(50));
    }

    #[test]
    fn test_named_color_wins() {
        let named = Color::named("amber");
        let plain = Color::rgb(10, 10, 10);
        assert_eq!(named.interpolate(&plain, 0.5), named);
        assert_eq!(plain.interpolate(&named, 0.5), named);
        let other = Color::named("cyan");
        assert_eq!(named.interpolate(&other, 0.9), named);
    }

    #[test]
    fn test_discrete_mismatch_keeps_start() {
        let a = Pulse {
            direction: Direction::Normal,
            speed: 0,
        };
        let b = Pulse {
            direction: Direction::Reverse,
            speed: 255,
        };
        assert_eq!(a.interpolate(&b, 0.5), a);

        let manual = Rotation {
            mode: RotationMode::Manual,
            position: 10,
            speed: 0,
        };
        let auto = Rotation {
            mode: RotationMode::Auto,
            position: 0,
            speed: 200,
        };
        assert_eq!(manual.interpolate(&auto, 0.5), manual);

        let rainbow = Auto {
            name: "rainbow".into(),
            speed: 0,
        };
        let fast = Auto {
            name: "rainbow".into(),
            speed: 100,
        };
        assert_eq!(rainbow.interpolate(&fast, 0.5).speed, 50);
        let chase = Auto {
            name: "chase".into(),
            speed: 100,
        };
        assert_eq!(rainbow.interpolate(&chase, 0.5), rainbow);
    }

    #[test]
    fn test_variant_mismatch_keeps_start() {
        let color = StyleValue::Color(Color::rgb(1, 2, 3));
        let strobe = StyleValue::Strobe(Strobe { speed: 9 });
        assert_eq!(color.interpolate(&strobe, 0.5), color);
    }
}
