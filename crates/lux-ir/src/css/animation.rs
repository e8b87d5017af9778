//! The `animation` and `transition` shorthands.

use cssparser::Parser;

use crate::error::ParseError;

use super::types::{Animation, AnimationSet, Property, Transition, TransitionSet};
use super::values::{
    CssError, describe, direction, identifier, iteration_count, parse_all, time, timing_function,
};

/// Parse `<name> [<time>] [<timingfn>] [<time>] [<infinite|int>] [<direction>]`,
/// possibly several separated by commas.
///
/// Fields are positional but optional, each one is consumed only if the next
/// token has the right shape. Any token left over is an error.
pub fn parse_animation(raw: &str) -> Result<AnimationSet, ParseError> {
    parse_all(raw, animation_list).map_err(|err| ParseError::InvalidAnimation {
        value: raw.trim().to_string(),
        reason: describe(&err.kind),
    })
}

pub(crate) fn animation_list<'i>(p: &mut Parser<'i, '_>) -> Result<AnimationSet, CssError<'i>> {
    let items = p.parse_comma_separated(single_animation)?;
    let mut set = AnimationSet::new();
    for (name, animation) in items {
        set.insert(name, animation);
    }
    Ok(set)
}

fn single_animation<'i>(p: &mut Parser<'i, '_>) -> Result<(String, Animation), CssError<'i>> {
    let name = identifier(p)?;
    let mut animation = Animation::default();
    p.skip_whitespace();
    let start = p.position();
    if let Ok(duration) = p.try_parse(time) {
        if duration < 0.0 {
            let literal = p.slice_from(start).trim();
            return Err(p.new_custom_error(ParseError::Syntax(format!(
                "negative duration '{literal}'"
            ))));
        }
        animation.duration = duration;
    }
    if let Ok(function) = p.try_parse(timing_function) {
        animation.function = function;
    }
    if let Ok(delay) = p.try_parse(time) {
        animation.delay = delay;
    }
    if let Ok(iteration) = p.try_parse(iteration_count) {
        animation.iteration = iteration;
    }
    if let Ok(value) = p.try_parse(direction) {
        animation.direction = value;
    }
    p.expect_exhausted()?;
    Ok((name, animation))
}

/// Parse `<property> <time> [<timingfn>]`, possibly several separated by
/// commas. The property must be one of the value properties.
pub fn parse_transition(raw: &str) -> Result<TransitionSet, ParseError> {
    parse_all(raw, transition_list).map_err(|err| ParseError::InvalidTransition {
        value: raw.trim().to_string(),
        reason: describe(&err.kind),
    })
}

pub(crate) fn transition_list<'i>(p: &mut Parser<'i, '_>) -> Result<TransitionSet, CssError<'i>> {
    let items = p.parse_comma_separated(single_transition)?;
    let mut set = TransitionSet::new();
    for (property, transition) in items {
        set.insert(property, transition);
    }
    Ok(set)
}

fn single_transition<'i>(p: &mut Parser<'i, '_>) -> Result<(Property, Transition), CssError<'i>> {
    let name = identifier(p)?;
    let property = Property::from_name(&name).ok_or_else(|| {
        p.new_custom_error(ParseError::Syntax(format!("'{name}' cannot transition")))
    })?;
    p.skip_whitespace();
    let start = p.position();
    let duration = time(p)?;
    if duration < 0.0 {
        let literal = p.slice_from(start).trim();
        return Err(p.new_custom_error(ParseError::Syntax(format!(
            "negative duration '{literal}'"
        ))));
    }
    let function = p.try_parse(timing_function).unwrap_or_default();
    p.expect_exhausted()?;
    Ok((property, Transition { duration, function }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::types::{Direction, IterationCount, TimingFunction};

    #[test]
    fn full_shorthand() {
        let set = parse_animation("red2green 5s ease-in 2s infinite alternate").unwrap();
        let anim = set.get("red2green").unwrap();
        assert_eq!(anim.duration, 5.0);
        assert_eq!(anim.function, TimingFunction::EaseIn);
        assert_eq!(anim.delay, 2.0);
        assert_eq!(anim.iteration, IterationCount::Infinite);
        assert_eq!(anim.direction, Direction::Alternate);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let set = parse_animation("fade").unwrap();
        assert_eq!(set.get("fade"), Some(&Animation::default()));

        let set = parse_animation("fade 500ms 3 reverse").unwrap();
        let anim = set.get("fade").unwrap();
        assert_eq!(anim.duration, 0.5);
        assert_eq!(anim.function, TimingFunction::Ease);
        assert_eq!(anim.iteration, IterationCount::Count(3));
        assert_eq!(anim.direction, Direction::Reverse);
    }

    #[test]
    fn several_animations_keep_order() {
        let set =
            parse_animation("b 1s cubic-bezier(0.1, 0.2, 0.3, 0.4), a 2s linear -1s").unwrap();
        let names: Vec<_> = set.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(set.get("a").unwrap().delay, -1.0);
        assert_eq!(
            set.get("b").unwrap().function,
            TimingFunction::CubicBezier {
                x1: 0.1,
                y1: 0.2,
                x2: 0.3,
                y2: 0.4
            }
        );
    }

    #[test]
    fn rejects_leftovers_and_bad_fields() {
        assert!(parse_animation("fade 5s ease 1s 2 normal extra").is_err());
        assert!(parse_animation("fade 5s bounce").is_err());
        assert!(parse_animation("fade -5s").is_err());
        assert!(parse_animation("fade 5s 0").is_err());
        assert!(parse_animation("fade 5s,").is_err());
        assert!(parse_animation("").is_err());
    }

    #[test]
    fn transitions() {
        let set = parse_transition("color 0.5s linear, strobe 2s").unwrap();
        assert_eq!(
            set.get(&Property::Color),
            Some(&Transition {
                duration: 0.5,
                function: TimingFunction::Linear
            })
        );
        assert_eq!(set.get(&Property::Strobe).unwrap().function, TimingFunction::Ease);
        assert!(parse_transition("animation 1s").is_err());
        assert!(parse_transition("color").is_err());
        assert!(parse_transition("color 1s ease extra").is_err());
    }
}
