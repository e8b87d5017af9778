use std::collections::BTreeMap;
use std::fmt;

use crate::error::ParseError;

use super::properties::StyleValue;

/// The closed set of value properties a fixture can be driven by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Property {
    Color,
    Strobe,
    Pulse,
    Auto,
    Rotation,
}

impl Property {
    pub const ALL: [Property; 5] = [
        Property::Color,
        Property::Strobe,
        Property::Pulse,
        Property::Auto,
        Property::Rotation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Property::Color => "color",
            Property::Strobe => "strobe",
            Property::Pulse => "pulse",
            Property::Auto => "auto",
            Property::Rotation => "rotation",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The error reported for an unparsable value of this property.
    pub fn invalid_value(self, raw: &str) -> ParseError {
        let raw = raw.trim().to_string();
        match self {
            Property::Color => ParseError::InvalidColor(raw),
            Property::Strobe => ParseError::InvalidRatio(raw),
            Property::Pulse => ParseError::InvalidPulse(raw),
            Property::Auto => ParseError::InvalidAuto(raw),
            Property::Rotation => ParseError::InvalidRotation(raw),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of animation playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Play forward each iteration.
    #[default]
    Normal,
    /// Play backward each iteration.
    Reverse,
    /// Forward on even iterations, backward on odd ones.
    Alternate,
    /// Backward on even iterations, forward on odd ones.
    AlternateReverse,
}

impl Direction {
    pub fn name(self) -> &'static str {
        match self {
            Direction::Normal => "normal",
            Direction::Reverse => "reverse",
            Direction::Alternate => "alternate",
            Direction::AlternateReverse => "alternate-reverse",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(Direction::Normal),
            "reverse" => Some(Direction::Reverse),
            "alternate" => Some(Direction::Alternate),
            "alternate-reverse" => Some(Direction::AlternateReverse),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pacing curve of an animation or transition.
///
/// The named functions are shorthands for fixed cubic-bezier control points.
/// `CubicBezier` keeps both x coordinates in `[0, 1]`, the parser rejects
/// anything else.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TimingFunction {
    #[default]
    Ease,
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl fmt::Display for TimingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingFunction::Ease => f.write_str("ease"),
            TimingFunction::Linear => f.write_str("linear"),
            TimingFunction::EaseIn => f.write_str("ease-in"),
            TimingFunction::EaseOut => f.write_str("ease-out"),
            TimingFunction::EaseInOut => f.write_str("ease-in-out"),
            TimingFunction::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}

/// How many times an animation plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationCount {
    Count(u32),
    Infinite,
}

impl Default for IterationCount {
    fn default() -> Self {
        Self::Count(1)
    }
}

impl fmt::Display for IterationCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterationCount::Count(n) => write!(f, "{n}"),
            IterationCount::Infinite => f.write_str("infinite"),
        }
    }
}

/// One entry of the `animation` shorthand. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Animation {
    pub duration: f64,
    pub function: TimingFunction,
    /// May be negative, which starts the animation part way through.
    pub delay: f64,
    pub iteration: IterationCount,
    pub direction: Direction,
}

impl Animation {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn with_function(mut self, function: TimingFunction) -> Self {
        self.function = function;
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_iteration(mut self, iteration: IterationCount) -> Self {
        self.iteration = iteration;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}s {} {}s {} {}",
            self.duration, self.function, self.delay, self.iteration, self.direction
        )
    }
}

/// Animations keyed by the keyframe rule they play, in declaration order.
///
/// Inserting a name that is already present replaces the entry in place so
/// its existing position is kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationSet(Vec<(String, Animation)>);

impl AnimationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, animation: Animation) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = animation,
            None => self.0.push((name, animation)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Animation> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Animation)> {
        self.0.iter().map(|(n, a)| (n.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Animation)> for AnimationSet {
    fn from_iter<I: IntoIterator<Item = (String, Animation)>>(iter: I) -> Self {
        let mut set = AnimationSet::new();
        for (name, animation) in iter {
            set.insert(name, animation);
        }
        set
    }
}

/// One entry of the `transition` shorthand. Duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transition {
    pub duration: f64,
    pub function: TimingFunction,
}

pub type TransitionSet = BTreeMap<Property, Transition>;

/// A parsed declaration inside a rule body.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Value(StyleValue),
    Animation(AnimationSet),
    Transition(TransitionSet),
}

/// Simple selectors only: compound and combinator selectors are rejected
/// by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Id(String),
    Class(String),
    Tag(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "#{id}"),
            Selector::Class(class) => write!(f, ".{class}"),
            Selector::Tag(tag) => f.write_str(tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// A single percentage stop of a keyframe rule. `selector` is in `0..=100`.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub selector: u8,
    pub declarations: Vec<StyleValue>,
}

impl Keyframe {
    /// Offset of this stop as a fraction of one iteration.
    pub fn offset(&self) -> f64 {
        f64::from(self.selector) / 100.0
    }

    pub fn value(&self, property: Property) -> Option<&StyleValue> {
        self.declarations.iter().rev().find(|v| v.property() == property)
    }
}

/// A named `@keyframes` block with frames sorted by percentage.
///
/// Always holds at least two frames and starts at 0%.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeRule {
    pub name: String,
    pub frames: Vec<Keyframe>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
    pub keyframes: BTreeMap<String, KeyframeRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_names_round_trip() {
        for property in Property::ALL {
            assert_eq!(Property::from_name(property.name()), Some(property));
        }
        assert_eq!(Property::from_name("animation"), None);
    }

    #[test]
    fn animation_set_keeps_first_position_on_replace() {
        let mut set = AnimationSet::new();
        set.insert("a", Animation::new(1.0));
        set.insert("b", Animation::new(2.0));
        set.insert("a", Animation::new(3.0));
        let names: Vec<_> = set.iter().map(|(n, a)| (n.to_string(), a.duration)).collect();
        assert_eq!(names, vec![("a".into(), 3.0), ("b".into(), 2.0)]);
    }

    #[test]
    fn animation_defaults() {
        let anim = Animation::default();
        assert_eq!(anim.duration, 0.0);
        assert_eq!(anim.function, TimingFunction::Ease);
        assert_eq!(anim.delay, 0.0);
        assert_eq!(anim.iteration, IterationCount::Count(1));
        assert_eq!(anim.direction, Direction::Normal);
    }
}
