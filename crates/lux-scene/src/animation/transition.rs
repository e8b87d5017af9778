//! Transitions from a property's base value toward its declared value.
//!
//! The show starts with every fixture at rest, so a transition runs once
//! from `t = 0`: the base value (zero channels, same program or mode) is
//! blended toward the declared value over the transition's duration.

use lux_ir::{StyleValue, Transition};

use super::easing::Easing;
use super::interpolate::Interpolate;

/// Eased progress of `transition` at `t` seconds. A finished transition,
/// or one with a zero duration, is exactly at its target.
pub fn transition_ratio(transition: &Transition, t: f64) -> f64 {
    if t >= transition.duration {
        return 1.0;
    }
    let progress = (t / transition.duration).max(0.0);
    transition.function.evaluate(progress)
}

/// Value of `target` at `t` under `transition`.
pub fn apply_transition(target: &StyleValue, transition: &Transition, t: f64) -> StyleValue {
    target
        .base()
        .interpolate(target, transition_ratio(transition, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_ir::{Color, Strobe, TimingFunction};

    fn linear(duration: f64) -> Transition {
        Transition {
            duration,
            function: TimingFunction::Linear,
        }
    }

    #[test]
    fn test_zero_duration_is_immediate() {
        assert_eq!(transition_ratio(&linear(0.0), 0.0), 1.0);
    }

    #[test]
    fn test_ratio_saturates() {
        let transition = linear(2.0);
        assert!(transition_ratio(&transition, 0.0).abs() < 1e-9);
        assert!((transition_ratio(&transition, 1.0) - 0.5).abs() < 1e-9);
        assert!((transition_ratio(&transition, 10.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fades_in_from_base() {
        let target = StyleValue::Color(Color::rgb(201, 101, 0));
        let transition = linear(2.0);
        assert_eq!(
            apply_transition(&target, &transition, 0.0),
            StyleValue::Color(Color::rgb(0, 0, 0).with_alpha(0))
        );
        assert_eq!(
            apply_transition(&target, &transition, 1.0),
            StyleValue::Color(Color::rgb(100, 50, 0).with_alpha(127))
        );
        assert_eq!(apply_transition(&target, &transition, 5.0), target);
    }

    #[test]
    fn test_strobe_ramps_up() {
        let target = StyleValue::Strobe(Strobe { speed: 102 });
        let mid = apply_transition(&target, &linear(4.0), 1.0);
        assert_eq!(mid, StyleValue::Strobe(Strobe { speed: 25 }));
    }
}
