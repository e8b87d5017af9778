//! Typed values for the value properties (`color`, `strobe`, `pulse`,
//! `auto`, `rotation`) and their parsers.

use std::fmt;

use crate::error::ParseError;

use cssparser::{Parser, Token};

use super::types::{Direction, Property};
use super::values::{CssError, direction, identifier, is_identifier, parse_all, ratio};

/// An RGBWA color. A named color (for color-wheel fixtures) keeps its RGB
/// channels at zero and is carried by `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub white: u8,
    pub alpha: u8,
    pub name: Option<String>,
}

impl Default for Color {
    fn default() -> Self {
        Self {
            red: 0,
            green: 0,
            blue: 0,
            white: 0,
            alpha: 255,
            name: None,
        }
    }
}

impl Color {
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_white(mut self, white: u8) -> Self {
        self.white = white;
        self
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = alpha;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Strobe {
    pub speed: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pulse {
    pub direction: Direction,
    pub speed: u8,
}

/// A fixture's built-in program, selected by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auto {
    pub name: String,
    pub speed: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationMode {
    #[default]
    Manual,
    Auto,
}

/// In `Manual` mode only `position` is meaningful, in `Auto` only `speed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rotation {
    pub mode: RotationMode,
    pub position: u8,
    pub speed: u8,
}

/// A resolved value of one of the value properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleValue {
    Color(Color),
    Strobe(Strobe),
    Pulse(Pulse),
    Auto(Auto),
    Rotation(Rotation),
}

impl StyleValue {
    pub fn property(&self) -> Property {
        match self {
            StyleValue::Color(_) => Property::Color,
            StyleValue::Strobe(_) => Property::Strobe,
            StyleValue::Pulse(_) => Property::Pulse,
            StyleValue::Auto(_) => Property::Auto,
            StyleValue::Rotation(_) => Property::Rotation,
        }
    }

    /// Zero value of the same variant, keeping the enumerated field
    /// (pulse direction, auto program, rotation mode). Transitions start here.
    pub fn base(&self) -> StyleValue {
        match self {
            StyleValue::Color(_) => StyleValue::Color(Color {
                alpha: 0,
                ..Color::default()
            }),
            StyleValue::Strobe(_) => StyleValue::Strobe(Strobe::default()),
            StyleValue::Pulse(p) => StyleValue::Pulse(Pulse {
                direction: p.direction,
                speed: 0,
            }),
            StyleValue::Auto(a) => StyleValue::Auto(Auto {
                name: a.name.clone(),
                speed: 0,
            }),
            StyleValue::Rotation(r) => StyleValue::Rotation(Rotation {
                mode: r.mode,
                ..Rotation::default()
            }),
        }
    }

    /// Parse the raw declaration text of `property`.
    pub fn parse(property: Property, raw: &str) -> Result<StyleValue, ParseError> {
        parse_all(raw, |p| StyleValue::parse_tokens(property, p))
            .map_err(|_| property.invalid_value(raw))
    }

    pub(crate) fn parse_tokens<'i>(
        property: Property,
        p: &mut Parser<'i, '_>,
    ) -> Result<StyleValue, CssError<'i>> {
        Ok(match property {
            Property::Color => StyleValue::Color(color(p)?),
            Property::Strobe => StyleValue::Strobe(Strobe { speed: ratio(p)? }),
            Property::Pulse => StyleValue::Pulse(pulse(p)?),
            Property::Auto => StyleValue::Auto(auto(p)?),
            Property::Rotation => StyleValue::Rotation(rotation(p)?),
        })
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Color(Color {
                name: Some(name), ..
            }) => f.write_str(name),
            StyleValue::Color(c) => write!(
                f,
                "rgbwa({}, {}, {}, {}, {})",
                c.red, c.green, c.blue, c.white, c.alpha
            ),
            StyleValue::Strobe(s) => write!(f, "{}", s.speed),
            StyleValue::Pulse(p) => write!(f, "{} {}", p.direction, p.speed),
            StyleValue::Auto(a) => write!(f, "{} {}", a.name, a.speed),
            StyleValue::Rotation(r) => match r.mode {
                RotationMode::Manual => write!(f, "{}", r.position),
                RotationMode::Auto => write!(f, "auto {}", r.speed),
            },
        }
    }
}

fn parse_hex<'i>(p: &Parser<'i, '_>, digits: &str) -> Result<Color, CssError<'i>> {
    let invalid = || -> CssError<'i> { p.new_custom_error(ParseError::InvalidColor(format!("#{digits}"))) };
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map_err(|_| invalid());
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    match digits.len() {
        // #rgb shifts each digit into the high nibble: #B16 is (0xb0, 0x10, 0x60)
        3 => Ok(Color::rgb(nibble(0)? << 4, nibble(1)? << 4, nibble(2)? << 4)),
        6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        _ => Err(invalid()),
    }
}

/// A color channel: an integer in `0..=255`.
fn channel<'i>(p: &mut Parser<'i, '_>) -> Result<u8, CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    let value = match *p.next()? {
        Token::Number {
            int_value: Some(value),
            ..
        } => u8::try_from(value).ok(),
        _ => None,
    };
    value.ok_or_else(|| {
        let literal = p.slice_from(start).trim().to_string();
        p.new_custom_error(ParseError::InvalidColor(literal))
    })
}

/// Arguments of `rgb()`, `rgba()`, `rgbw()` and `rgbwa()`: three or four
/// channels, then a ratio for the `a` variants.
fn color_args<'i>(p: &mut Parser<'i, '_>, channels: usize, alpha: bool) -> Result<Color, CssError<'i>> {
    let mut values = [0u8; 4];
    for (i, slot) in values.iter_mut().take(channels).enumerate() {
        if i > 0 {
            p.expect_comma()?;
        }
        *slot = channel(p)?;
    }
    let mut color = Color::rgb(values[0], values[1], values[2]).with_white(values[3]);
    if alpha {
        p.expect_comma()?;
        color.alpha = ratio(p)?;
    }
    p.expect_exhausted()?;
    Ok(color)
}

pub(crate) fn color<'i>(p: &mut Parser<'i, '_>) -> Result<Color, CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    let token = p.next()?.clone();
    let color = match token {
        Token::Hash(ref digits) | Token::IDHash(ref digits) => parse_hex(p, digits).ok(),
        Token::Function(ref name) => {
            let shape = match &**name {
                "rgb" => Some((3, false)),
                "rgba" => Some((3, true)),
                "rgbw" => Some((4, false)),
                "rgbwa" => Some((4, true)),
                _ => None,
            };
            // the block is consumed even for unknown functions
            let args = p.parse_nested_block(|p| match shape {
                Some((channels, alpha)) => color_args(p, channels, alpha),
                None => Err(p.new_custom_error(ParseError::InvalidColor(name.to_string()))),
            });
            args.ok()
        }
        Token::Ident(ref name) if is_identifier(name) => Some(Color::named(&**name)),
        _ => None,
    };
    color.ok_or_else(|| {
        let literal = p.slice_from(start).trim().to_string();
        p.new_custom_error(ParseError::InvalidColor(literal))
    })
}

/// `<direction> <ratio>`
pub(crate) fn pulse<'i>(p: &mut Parser<'i, '_>) -> Result<Pulse, CssError<'i>> {
    Ok(Pulse {
        direction: direction(p)?,
        speed: ratio(p)?,
    })
}

/// `<name>` or `<name> <ratio>`
pub(crate) fn auto<'i>(p: &mut Parser<'i, '_>) -> Result<Auto, CssError<'i>> {
    let name = identifier(p)?;
    let speed = if p.is_exhausted() { 0 } else { ratio(p)? };
    Ok(Auto { name, speed })
}

/// `<ratio>` for a manual position, `auto <ratio>` for continuous rotation.
pub(crate) fn rotation<'i>(p: &mut Parser<'i, '_>) -> Result<Rotation, CssError<'i>> {
    if p.try_parse(|p| p.expect_ident_matching("auto")).is_ok() {
        return Ok(Rotation {
            mode: RotationMode::Auto,
            position: 0,
            speed: ratio(p)?,
        });
    }
    Ok(Rotation {
        mode: RotationMode::Manual,
        position: ratio(p)?,
        speed: 0,
    })
}

/// Parse `rgb()`, `rgba()`, `rgbw()`, `rgbwa()`, `#rgb`, `#rrggbb` or a
/// color name.
pub fn parse_color(raw: &str) -> Result<Color, ParseError> {
    parse_all(raw, color).map_err(|_| ParseError::InvalidColor(raw.to_string()))
}

pub fn parse_strobe(raw: &str) -> Result<Strobe, ParseError> {
    parse_all(raw, |p| Ok(Strobe { speed: ratio(p)? }))
        .map_err(|_| ParseError::InvalidRatio(raw.to_string()))
}

pub fn parse_pulse(raw: &str) -> Result<Pulse, ParseError> {
    parse_all(raw, pulse).map_err(|_| ParseError::InvalidPulse(raw.to_string()))
}

pub fn parse_auto(raw: &str) -> Result<Auto, ParseError> {
    parse_all(raw, auto).map_err(|_| ParseError::InvalidAuto(raw.to_string()))
}

pub fn parse_rotation(raw: &str) -> Result<Rotation, ParseError> {
    parse_all(raw, rotation).map_err(|_| ParseError::InvalidRotation(raw.to_string()))
}
