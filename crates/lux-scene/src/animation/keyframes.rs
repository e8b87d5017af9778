//! Keyframe animation sampling.
//!
//! Animations carry no runtime state: every sample is computed from the
//! absolute show time, so the same `t` always yields the same values.
//!
//! For one animation at time `t`:
//!
//! 1. Nothing is produced before `delay`, or when `duration` is not positive.
//! 2. `local = t - delay` is the time spent animating.
//! 3. The direction may mirror `local` within the current iteration.
//! 4. The animation is live while its iteration count is infinite or the
//!    (possibly mirrored) `local <= duration * count`. A mirrored `local`
//!    never exceeds one duration, so finite `reverse` animations keep
//!    playing, and finite alternating ones are live on their mirrored
//!    half-cycles.
//! 5. The position inside the iteration selects the two keyframes around it,
//!    and the timing function eases the ratio between them.

use std::collections::BTreeMap;

use lux_ir::{Animation, AnimationSet, Direction, IterationCount, Keyframe, KeyframeRule};

use super::easing::Easing;
use super::interpolate::Interpolate;
use crate::error::EvalError;
use crate::style::ResolvedStyle;

/// Keyframe rules by name, as collected from a stylesheet.
pub type KeyframeMap = BTreeMap<String, KeyframeRule>;

/// Sample every animation of `animations` at show time `t`, in seconds.
///
/// Animations are applied in declaration order, so a later animation wins
/// on a property both of them drive. `node` labels the owner in errors.
pub fn compute_animations(
    animations: &AnimationSet,
    keyframes: &KeyframeMap,
    node: &str,
    t: f64,
) -> Result<ResolvedStyle, EvalError> {
    let mut resolved = ResolvedStyle::new();
    for (name, animation) in animations.iter() {
        let rule = keyframes
            .get(name)
            .ok_or_else(|| EvalError::MissingKeyframes {
                name: name.to_string(),
                node: node.to_string(),
            })?;
        if rule.frames.first().map(|f| f.selector) != Some(0) {
            return Err(EvalError::MissingStartFrame {
                name: name.to_string(),
                node: node.to_string(),
            });
        }
        if let Some(values) = sample(animation, rule, t) {
            resolved.extend(values);
        }
    }
    Ok(resolved)
}

/// Position inside the current iteration, in `[0, 1)`, or `None` when the
/// animation is not live at `t`.
pub fn iteration_progress(animation: &Animation, t: f64) -> Option<f64> {
    let duration = animation.duration;
    if t < animation.delay || duration <= 0.0 {
        return None;
    }
    let mut local = t - animation.delay;

    let backwards = match animation.direction {
        Direction::Normal => false,
        Direction::Reverse => true,
        Direction::Alternate => (local % (2.0 * duration)) / duration > 1.0,
        Direction::AlternateReverse => (local % (2.0 * duration)) / duration <= 1.0,
    };
    if backwards {
        local = duration - (local % duration);
    }

    let live = match animation.iteration {
        IterationCount::Infinite => true,
        IterationCount::Count(count) => local <= duration * f64::from(count),
    };
    if !live {
        return None;
    }

    Some((local % duration) / duration)
}

fn sample(animation: &Animation, rule: &KeyframeRule, t: f64) -> Option<ResolvedStyle> {
    let percent = iteration_progress(animation, t)?;
    let frames = &rule.frames;

    let Some(upper) = frames.iter().position(|f| f.offset() > percent) else {
        // past the last frame: hold its values
        let last = frames.last()?;
        return Some(frame_values(last));
    };
    // the first frame sits at 0%, so `upper` is never the first frame
    let lower = &frames[upper.checked_sub(1)?];
    let higher = &frames[upper];

    let x0 = (percent - lower.offset()) / (higher.offset() - lower.offset());
    let ratio = animation.function.evaluate(x0);

    let values = lower
        .declarations
        .iter()
        .filter_map(|from| {
            let to = higher.value(from.property())?;
            Some((from.property(), from.interpolate(to, ratio)))
        })
        .collect();
    Some(values)
}

fn frame_values(frame: &Keyframe) -> ResolvedStyle {
    frame
        .declarations
        .iter()
        .map(|value| (value.property(), value.clone()))
        .collect()
}
