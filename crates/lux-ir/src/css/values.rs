//! Scalar literals shared by the property and shorthand parsers.
//!
//! Tokenizing is left to `cssparser`; the functions here read one value off
//! a [`Parser`] and give it DSS semantics (ratios scaled to a channel byte,
//! times in seconds, the closed set of timing functions).

use cssparser::{BasicParseErrorKind, ParseErrorKind, Parser, ParserInput, ToCss, Token};

use crate::error::ParseError;

use super::types::{Direction, IterationCount, TimingFunction};

/// A `cssparser` error whose custom payload is a DSS [`ParseError`].
pub(crate) type CssError<'i> = cssparser::ParseError<'i, ParseError>;

/// Run `parse` over the whole of `raw`. Leftover tokens are an error.
pub(crate) fn parse_all<'i, T>(
    raw: &'i str,
    parse: impl for<'t> FnOnce(&mut Parser<'i, 't>) -> Result<T, CssError<'i>>,
) -> Result<T, CssError<'i>> {
    let mut input = ParserInput::new(raw);
    let mut parser = Parser::new(&mut input);
    let value = parse(&mut parser)?;
    parser.expect_exhausted()?;
    Ok(value)
}

/// Human readable reason for a failed parse, without location.
pub(crate) fn describe(kind: &ParseErrorKind<'_, ParseError>) -> String {
    match kind {
        ParseErrorKind::Custom(ParseError::Syntax(message)) => message.clone(),
        ParseErrorKind::Custom(err) => err.to_string(),
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
            "unexpected end of input".to_string()
        }
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected token '{}'", token.to_css_string())
        }
        ParseErrorKind::Basic(BasicParseErrorKind::AtRuleInvalid(name)) => {
            format!("unsupported at-rule '@{}'", &**name)
        }
        ParseErrorKind::Basic(other) => format!("{other:?}"),
    }
}

/// Consume whatever is left in the current (delimited) parser.
pub(crate) fn skip_rest(p: &mut Parser<'_, '_>) {
    while p.next().is_ok() {}
}

/// A plain number. `cssparser` hands numbers out as `f32`, so the literal is
/// re-read to keep `f64` precision.
pub(crate) fn number<'i>(p: &mut Parser<'i, '_>) -> Result<f64, CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    let value = p.expect_number()?;
    Ok(p.slice_from(start).parse().unwrap_or(f64::from(value)))
}

/// A ratio in `[0, 1]`, scaled to a channel byte and truncated.
pub(crate) fn ratio<'i>(p: &mut Parser<'i, '_>) -> Result<u8, CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    match number(p) {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok((value * 255.0) as u8),
        _ => {
            let literal = p.slice_from(start).trim().to_string();
            Err(p.new_custom_error(ParseError::InvalidRatio(literal)))
        }
    }
}

/// A `<number>s` or `<number>ms` dimension, in seconds.
pub(crate) fn time<'i>(p: &mut Parser<'i, '_>) -> Result<f64, CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    let token = p.next()?.clone();
    let literal = p.slice_from(start);
    match token {
        Token::Dimension {
            value, ref unit, ..
        } if matches!(&**unit, "s" | "ms") => {
            let seconds = literal
                .strip_suffix(&**unit)
                .and_then(|n| n.parse::<f64>().ok())
                .unwrap_or(f64::from(value));
            Ok(if &**unit == "ms" {
                seconds / 1000.0
            } else {
                seconds
            })
        }
        _ => Err(p.new_custom_error(ParseError::InvalidTime(literal.to_string()))),
    }
}

pub(crate) fn timing_function<'i>(p: &mut Parser<'i, '_>) -> Result<TimingFunction, CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    let token = p.next()?.clone();
    let function = match token {
        Token::Ident(ref name) => match &**name {
            "ease" => Some(TimingFunction::Ease),
            "linear" => Some(TimingFunction::Linear),
            "ease-in" => Some(TimingFunction::EaseIn),
            "ease-out" => Some(TimingFunction::EaseOut),
            "ease-in-out" => Some(TimingFunction::EaseInOut),
            _ => None,
        },
        Token::Function(ref name) if &**name == "cubic-bezier" => {
            p.parse_nested_block(bezier_params).ok()
        }
        _ => None,
    };
    function.ok_or_else(|| {
        let literal = p.slice_from(start).trim().to_string();
        p.new_custom_error(ParseError::InvalidTimingFunction(literal))
    })
}

/// `x1, y1, x2, y2` with both x coordinates in `[0, 1]`.
fn bezier_params<'i>(p: &mut Parser<'i, '_>) -> Result<TimingFunction, CssError<'i>> {
    let x1 = number(p)?;
    p.expect_comma()?;
    let y1 = number(p)?;
    p.expect_comma()?;
    let x2 = number(p)?;
    p.expect_comma()?;
    let y2 = number(p)?;
    p.expect_exhausted()?;
    let x_range = 0.0..=1.0;
    if !x_range.contains(&x1) || !x_range.contains(&x2) || !y1.is_finite() || !y2.is_finite() {
        return Err(p.new_custom_error(ParseError::Syntax(
            "cubic-bezier x values must be in [0, 1]".to_string(),
        )));
    }
    Ok(TimingFunction::CubicBezier { x1, y1, x2, y2 })
}

pub(crate) fn iteration_count<'i>(p: &mut Parser<'i, '_>) -> Result<IterationCount, CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    let count = match *p.next()? {
        Token::Ident(ref name) if &**name == "infinite" => Some(IterationCount::Infinite),
        Token::Number {
            int_value: Some(n), ..
        } if n >= 1 => Some(IterationCount::Count(n as u32)),
        _ => None,
    };
    count.ok_or_else(|| {
        let literal = p.slice_from(start).trim().to_string();
        p.new_custom_error(ParseError::InvalidIterationCount(literal))
    })
}

pub(crate) fn direction<'i>(p: &mut Parser<'i, '_>) -> Result<Direction, CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    let direction = match *p.next()? {
        Token::Ident(ref name) => Direction::from_name(name),
        _ => None,
    };
    direction.ok_or_else(|| {
        let literal = p.slice_from(start).trim().to_string();
        p.new_custom_error(ParseError::InvalidDirection(literal))
    })
}

/// An identifier token restricted to `[A-Za-z0-9_-]+`.
pub(crate) fn identifier<'i>(p: &mut Parser<'i, '_>) -> Result<String, CssError<'i>> {
    let name = p.expect_ident()?.to_string();
    if is_identifier(&name) {
        Ok(name)
    } else {
        Err(p.new_custom_error(ParseError::Syntax(format!(
            "'{name}' is not a valid identifier"
        ))))
    }
}

/// Parse a ratio in `[0, 1]` and scale it to a channel byte, truncating.
pub fn parse_ratio(raw: &str) -> Result<u8, ParseError> {
    parse_all(raw, ratio).map_err(|_| ParseError::InvalidRatio(raw.to_string()))
}

/// Parse `<number>ms` or `<number>s` into seconds.
pub fn parse_time(raw: &str) -> Result<f64, ParseError> {
    parse_all(raw, time).map_err(|_| ParseError::InvalidTime(raw.to_string()))
}

pub fn parse_timing_function(raw: &str) -> Result<TimingFunction, ParseError> {
    parse_all(raw, timing_function)
        .map_err(|_| ParseError::InvalidTimingFunction(raw.to_string()))
}

pub fn parse_iteration_count(raw: &str) -> Result<IterationCount, ParseError> {
    parse_all(raw, iteration_count)
        .map_err(|_| ParseError::InvalidIterationCount(raw.to_string()))
}

pub fn parse_direction(raw: &str) -> Result<Direction, ParseError> {
    parse_all(raw, direction).map_err(|_| ParseError::InvalidDirection(raw.to_string()))
}

/// `[A-Za-z0-9_-]+`
pub fn is_identifier(raw: &str) -> bool {
    !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn ratio_scales_and_truncates() {
        assert_eq!(parse_ratio("0").unwrap(), 0);
        assert_eq!(parse_ratio("1").unwrap(), 255);
        assert_eq!(parse_ratio("0.5").unwrap(), 127);
        assert_eq!(parse_ratio("0.2").unwrap(), 51);
        assert_eq!(parse_ratio(" 0.3 ").unwrap(), 76);
    }

    #[test]
    fn ratio_out_of_range_is_rejected() {
        assert!(parse_ratio("1.01").is_err());
        assert!(parse_ratio("-0.1").is_err());
        assert!(parse_ratio("half").is_err());
        assert!(parse_ratio("50%").is_err());
        assert!(parse_ratio("0.5 0.5").is_err());
    }

    #[test]
    fn time_units() {
        assert!(approx_eq(parse_time("5s").unwrap(), 5.0));
        assert!(approx_eq(parse_time("250ms").unwrap(), 0.25));
        assert!(approx_eq(parse_time("-2s").unwrap(), -2.0));
        assert!(approx_eq(parse_time("0.1s").unwrap(), 0.1));
        assert!(parse_time("5").is_err());
        assert!(parse_time("ms").is_err());
        assert!(parse_time("fives").is_err());
        assert!(parse_time("5min").is_err());
    }

    #[test]
    fn timing_function_names() {
        assert_eq!(parse_timing_function("ease").unwrap(), TimingFunction::Ease);
        assert_eq!(
            parse_timing_function("ease-in-out").unwrap(),
            TimingFunction::EaseInOut
        );
        assert_eq!(
            parse_timing_function("cubic-bezier(0.1, 0.7, 1, 0.1)").unwrap(),
            TimingFunction::CubicBezier {
                x1: 0.1,
                y1: 0.7,
                x2: 1.0,
                y2: 0.1
            }
        );
        assert_eq!(
            parse_timing_function("cubic-bezier(0,-0.5,1,1.5)").unwrap(),
            TimingFunction::CubicBezier {
                x1: 0.0,
                y1: -0.5,
                x2: 1.0,
                y2: 1.5
            }
        );
    }

    #[test]
    fn timing_function_rejects_bad_input() {
        assert!(parse_timing_function("bounce").is_err());
        assert!(parse_timing_function("ease(1)").is_err());
        assert!(parse_timing_function("cubic-bezier").is_err());
        assert!(parse_timing_function("cubic-bezier(0.1, 0.2, 0.3)").is_err());
        assert!(parse_timing_function("cubic-bezier(0.1, 0.2, 0.3, 0.4, 0.5)").is_err());
        assert!(parse_timing_function("cubic-bezier(1.5, 0, 0.5, 1)").is_err());
        assert!(parse_timing_function("cubic-bezier(0.5, 0, -0.1, 1)").is_err());
    }

    #[test]
    fn iteration_count() {
        assert_eq!(parse_iteration_count("infinite").unwrap(), IterationCount::Infinite);
        assert_eq!(parse_iteration_count("3").unwrap(), IterationCount::Count(3));
        assert!(parse_iteration_count("0").is_err());
        assert!(parse_iteration_count("-1").is_err());
        assert!(parse_iteration_count("1.5").is_err());
        assert!(parse_iteration_count("forever").is_err());
    }

    #[test]
    fn direction_names() {
        assert_eq!(
            parse_direction("alternate-reverse").unwrap(),
            Direction::AlternateReverse
        );
        assert!(parse_direction("sideways").is_err());
    }

    #[test]
    fn errors_keep_the_literal() {
        assert_eq!(parse_time("fives"), Err(ParseError::InvalidTime("fives".into())));
        assert_eq!(parse_ratio("2"), Err(ParseError::InvalidRatio("2".into())));
    }
}
