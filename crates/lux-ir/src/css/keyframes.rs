//! `@keyframes` bodies.

use cssparser::{Delimiter, ParseErrorKind, Parser, SourceLocation, Token};

use crate::error::ParseError;

use super::parser::{block, declaration_list};
use super::properties::StyleValue;
use super::types::{Declaration, Keyframe, KeyframeRule};
use super::values::{CssError, describe, parse_all};

/// Parse the text between the outer braces of `@keyframes <name> { ... }`.
///
/// Each block is introduced by a comma separated list of `from`, `to` or
/// `N%` selectors; a shared block is copied to every selector. Frames come
/// back sorted by percentage (stable for duplicates).
pub fn parse_keyframe_frames(name: &str, body: &str) -> Result<KeyframeRule, ParseError> {
    parse_all(body, |p| keyframe_blocks(p, name)).map_err(|err| match err.kind {
        ParseErrorKind::Custom(err) => err,
        kind => ParseError::InvalidKeyframes {
            name: name.to_string(),
            reason: describe(&kind),
        },
    })
}

/// Every error out of here is an [`ParseError::InvalidKeyframes`] for `name`.
pub(crate) fn keyframe_blocks<'i>(
    p: &mut Parser<'i, '_>,
    name: &str,
) -> Result<KeyframeRule, CssError<'i>> {
    let invalid = |reason: String, location: SourceLocation| CssError {
        kind: ParseErrorKind::Custom(ParseError::InvalidKeyframes {
            name: name.to_string(),
            reason,
        }),
        location,
    };

    let mut frames =
        frame_list(p).map_err(|err| invalid(describe(&err.kind), err.location))?;
    if frames.len() < 2 {
        let location = p.current_source_location();
        return Err(invalid("at least two frames are required".to_string(), location));
    }
    if !frames.iter().any(|f| f.selector == 0) {
        let location = p.current_source_location();
        return Err(invalid("a 0% (or from) frame is required".to_string(), location));
    }
    frames.sort_by_key(|f| f.selector);
    Ok(KeyframeRule {
        name: name.to_string(),
        frames,
    })
}

fn frame_list<'i>(p: &mut Parser<'i, '_>) -> Result<Vec<Keyframe>, CssError<'i>> {
    let mut frames = Vec::new();
    while !p.is_exhausted() {
        let selectors = p.parse_until_before(Delimiter::CurlyBracketBlock, |p| {
            p.parse_comma_separated(frame_selector)
        })?;
        let values = block(p, frame_values)?;
        for selector in selectors {
            frames.push(Keyframe {
                selector,
                declarations: values.clone(),
            });
        }
    }
    Ok(frames)
}

/// `from`, `to` or an integer percentage up to 100.
fn frame_selector<'i>(p: &mut Parser<'i, '_>) -> Result<u8, CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    let selector = match *p.next()? {
        Token::Ident(ref name) if &**name == "from" => Some(0),
        Token::Ident(ref name) if &**name == "to" => Some(100),
        Token::Percentage {
            int_value: Some(n), ..
        } => u8::try_from(n).ok().filter(|n| *n <= 100),
        _ => None,
    };
    let selector = selector.ok_or_else(|| {
        let literal = p.slice_from(start).trim();
        p.new_custom_error(ParseError::Syntax(format!(
            "expected a percentage, from or to, got '{literal}'"
        )))
    })?;
    p.expect_exhausted()?;
    Ok(selector)
}

fn frame_values<'i>(p: &mut Parser<'i, '_>) -> Result<Vec<StyleValue>, CssError<'i>> {
    declaration_list(p)?
        .into_iter()
        .map(|decl| match decl {
            Declaration::Value(value) => Ok(value),
            Declaration::Animation(_) => Err(p.new_custom_error(ParseError::UnsupportedProperty(
                "animation (inside @keyframes)".to_string(),
            ))),
            Declaration::Transition(_) => Err(p.new_custom_error(
                ParseError::UnsupportedProperty("transition (inside @keyframes)".to_string()),
            )),
        })
        .collect()
}
