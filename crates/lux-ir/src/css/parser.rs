use cssparser::{Delimiter, ParseErrorKind, Parser, ParserInput, Token};

use crate::diagnostics::diagnostics_enabled;
use crate::error::ParseError;

use super::animation::{animation_list, parse_animation, parse_transition, transition_list};
use super::keyframes::keyframe_blocks;
use super::properties::StyleValue;
use super::types::{Declaration, Property, Rule, Selector, Stylesheet};
use super::values::{CssError, describe, identifier, is_identifier, parse_all, skip_rest};

/// Parse a complete DSS stylesheet.
///
/// Top-level items are either style rules (`selector[, selector] { ... }`)
/// or `@keyframes name { ... }` blocks. The first error aborts the parse.
pub fn parse_stylesheet(source: &str) -> Result<Stylesheet, ParseError> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut sheet = Stylesheet::default();
    while !parser.is_exhausted() {
        top_level_item(&mut parser, &mut sheet).map_err(into_parse_error)?;
    }
    Ok(sheet)
}

/// DSS errors pass through. Tokenizer level errors become a positioned
/// [`ParseError::Syntax`].
fn into_parse_error(err: CssError<'_>) -> ParseError {
    match err.kind {
        ParseErrorKind::Custom(err) => err,
        kind => ParseError::Syntax(format!(
            "{} at {}:{}",
            describe(&kind),
            err.location.line + 1,
            err.location.column
        )),
    }
}

fn top_level_item<'i>(p: &mut Parser<'i, '_>, sheet: &mut Stylesheet) -> Result<(), CssError<'i>> {
    let state = p.state();
    let token = p.next()?.clone();
    match token {
        Token::AtKeyword(ref keyword) if &**keyword == "keyframes" => keyframes_rule(p, sheet),
        Token::AtKeyword(keyword) => Err(p.new_custom_error(ParseError::Syntax(format!(
            "unsupported at-rule '@{}'",
            &*keyword
        )))),
        _ => {
            p.reset(&state);
            style_rule(p, sheet)
        }
    }
}

fn keyframes_rule<'i>(p: &mut Parser<'i, '_>, sheet: &mut Stylesheet) -> Result<(), CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    let name = p.parse_until_before(Delimiter::CurlyBracketBlock, |p| -> Result<_, CssError<'i>> {
        let name = identifier(p)?;
        p.expect_exhausted()?;
        Ok(name)
    });
    let Ok(name) = name else {
        let raw = p.slice_from(start).trim().to_string();
        return Err(p.new_custom_error(ParseError::InvalidKeyframes {
            name: raw,
            reason: "expected exactly one identifier".to_string(),
        }));
    };
    let rule = block(p, |p| keyframe_blocks(p, &name))?;
    if diagnostics_enabled("css") {
        tracing::info!(name = %rule.name, frames = rule.frames.len(), "diagnostics: parsed keyframes");
    }
    sheet.keyframes.insert(name, rule);
    Ok(())
}

fn style_rule<'i>(p: &mut Parser<'i, '_>, sheet: &mut Stylesheet) -> Result<(), CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    let selectors = p.parse_until_before(Delimiter::CurlyBracketBlock, |p| {
        p.parse_comma_separated(selector)
    })?;
    let prelude = p.slice_from(start).trim();
    let declarations = block(p, declaration_list)?;
    if diagnostics_enabled("css") {
        tracing::info!(selectors = %prelude, declarations = declarations.len(), "diagnostics: parsed rule");
    }
    sheet.rules.push(Rule {
        selectors,
        declarations,
    });
    Ok(())
}

/// Parse the `{ ... }` block that comes next with `parse`. A block cut off
/// by the end of input is an error.
pub(crate) fn block<'i, T>(
    p: &mut Parser<'i, '_>,
    parse: impl for<'t> FnOnce(&mut Parser<'i, 't>) -> Result<T, CssError<'i>>,
) -> Result<T, CssError<'i>> {
    let start = p.position();
    p.expect_curly_bracket_block()?;
    let value = p.parse_nested_block(|p| -> Result<T, CssError<'i>> {
        let value = parse(p)?;
        p.expect_exhausted()?;
        Ok(value)
    })?;
    // cssparser closes blocks left open at EOF
    if !p.slice_from(start).ends_with('}') {
        return Err(p.new_custom_error(ParseError::Syntax("unclosed block".to_string())));
    }
    Ok(value)
}

/// `#id`, `.class` or a bare tag name. Anything compound is rejected.
pub fn parse_selector(raw: &str) -> Result<Selector, ParseError> {
    parse_all(raw, selector).map_err(|_| ParseError::UnsupportedSelector(raw.trim().to_string()))
}

fn selector<'i>(p: &mut Parser<'i, '_>) -> Result<Selector, CssError<'i>> {
    p.skip_whitespace();
    let start = p.position();
    p.try_parse(simple_selector).or_else(|_| {
        skip_rest(p);
        let raw = p.slice_from(start).trim();
        Err(p.new_custom_error(ParseError::UnsupportedSelector(raw.to_string())))
    })
}

fn simple_selector<'i>(p: &mut Parser<'i, '_>) -> Result<Selector, CssError<'i>> {
    let token = p.next_including_whitespace()?.clone();
    let selector = match token {
        Token::IDHash(id) | Token::Hash(id) => Selector::Id(id.to_string()),
        Token::Delim('.') => match p.next_including_whitespace()?.clone() {
            Token::Ident(class) => Selector::Class(class.to_string()),
            token => return Err(p.new_unexpected_token_error(token)),
        },
        Token::Ident(tag) => Selector::Tag(tag.to_string()),
        token => return Err(p.new_unexpected_token_error(token)),
    };
    let (Selector::Id(name) | Selector::Class(name) | Selector::Tag(name)) = &selector;
    if !is_identifier(name) {
        return Err(p.new_custom_error(ParseError::UnsupportedSelector(name.clone())));
    }
    p.expect_exhausted()?;
    Ok(selector)
}

/// Parse `name: value;` pairs. The trailing semicolon is optional.
pub fn parse_declarations(body: &str) -> Result<Vec<Declaration>, ParseError> {
    parse_all(body, declaration_list).map_err(into_parse_error)
}

pub(crate) fn declaration_list<'i>(
    p: &mut Parser<'i, '_>,
) -> Result<Vec<Declaration>, CssError<'i>> {
    let mut declarations = Vec::new();
    loop {
        while p.try_parse(|p| p.expect_semicolon()).is_ok() {}
        if p.is_exhausted() {
            return Ok(declarations);
        }
        declarations.push(p.parse_until_after(Delimiter::Semicolon, declaration)?);
    }
}

/// One `name: value`. A bad value is reported with its whole literal.
fn declaration<'i>(p: &mut Parser<'i, '_>) -> Result<Declaration, CssError<'i>> {
    let name = p.expect_ident()?.clone();
    p.expect_colon()?;
    let property = match &*name {
        "animation" | "transition" => None,
        other => Some(Property::from_name(other).ok_or_else(|| {
            p.new_custom_error(ParseError::UnsupportedProperty(other.to_string()))
        })?),
    };
    p.skip_whitespace();
    let start = p.position();
    let value = match property {
        Some(property) => StyleValue::parse_tokens(property, p).map(Declaration::Value),
        None if &*name == "animation" => animation_list(p).map(Declaration::Animation),
        None => transition_list(p).map(Declaration::Transition),
    };
    let value = value.and_then(|value| {
        p.expect_exhausted()?;
        Ok(value)
    });
    value.map_err(|err| {
        skip_rest(p);
        let raw = p.slice_from(start).trim().to_string();
        let error = match property {
            Some(property) => property.invalid_value(&raw),
            None if &*name == "animation" => ParseError::InvalidAnimation {
                value: raw,
                reason: describe(&err.kind),
            },
            None => ParseError::InvalidTransition {
                value: raw,
                reason: describe(&err.kind),
            },
        };
        CssError {
            kind: ParseErrorKind::Custom(error),
            location: err.location,
        }
    })
}

pub fn parse_declaration(name: &str, value: &str) -> Result<Declaration, ParseError> {
    match name {
        "animation" => parse_animation(value).map(Declaration::Animation),
        "transition" => parse_transition(value).map(Declaration::Transition),
        other => {
            let property = Property::from_name(other)
                .ok_or_else(|| ParseError::UnsupportedProperty(other.to_string()))?;
            StyleValue::parse(property, value).map(Declaration::Value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::properties::{Color, Strobe};
    use crate::css::types::Transition;

    const SHOW: &str = r#"
        /* main wash */
        #spot1, .wash { color: rgb(255, 0, 0); strobe: 0.5 }
        par {
            animation: fade 5s ease 0s infinite alternate;
            transition: color 1s linear;
        }
        @keyframes fade {
            from { color: rgba(255, 255, 255, 1) }
            to { color: rgba(255, 255, 255, 0) }
        }
    "#;

    #[test]
    fn parses_rules_and_keyframes() {
        let sheet = parse_stylesheet(SHOW).unwrap();
        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(
            sheet.rules[0].selectors,
            vec![Selector::Id("spot1".into()), Selector::Class("wash".into())]
        );
        assert_eq!(
            sheet.rules[0].declarations,
            vec![
                Declaration::Value(StyleValue::Color(Color::rgb(255, 0, 0))),
                Declaration::Value(StyleValue::Strobe(Strobe { speed: 127 })),
            ]
        );
        match &sheet.rules[1].declarations[1] {
            Declaration::Transition(set) => assert_eq!(
                set.get(&Property::Color),
                Some(&Transition {
                    duration: 1.0,
                    function: crate::css::TimingFunction::Linear
                })
            ),
            other => panic!("expected a transition, got {other:?}"),
        }
        assert_eq!(sheet.keyframes["fade"].frames.len(), 2);
    }

    #[test]
    fn selectors() {
        assert_eq!(parse_selector("#a").unwrap(), Selector::Id("a".into()));
        assert_eq!(parse_selector(".b").unwrap(), Selector::Class("b".into()));
        assert_eq!(parse_selector("par").unwrap(), Selector::Tag("par".into()));
        for raw in ["par.b", "a > b", "a b", "*", "#", "[x]", "a:hover"] {
            assert_eq!(
                parse_selector(raw),
                Err(ParseError::UnsupportedSelector(raw.to_string()))
            );
        }
    }

    #[test]
    fn unknown_property_is_rejected() {
        assert_eq!(
            parse_stylesheet("a { opacity: 1 }"),
            Err(ParseError::UnsupportedProperty("opacity".into()))
        );
    }

    #[test]
    fn any_error_aborts_the_parse() {
        assert!(parse_stylesheet("a { color: red } b { color: rgb(1) }").is_err());
        assert!(parse_stylesheet("a { color: red").is_err());
        assert!(parse_stylesheet("a { color }").is_err());
        assert!(parse_stylesheet("@media screen { a { color: red } }").is_err());
        assert!(parse_stylesheet("a { b { color: red } }").is_err());
        assert!(parse_stylesheet("stray").is_err());
    }

    #[test]
    fn comment_left_open_runs_to_the_end() {
        let sheet = parse_stylesheet("a { color: red } /* b { color: blue }").unwrap();
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn value_errors_keep_the_whole_literal() {
        assert_eq!(
            parse_stylesheet("a { color: rgb(1, 2) }"),
            Err(ParseError::InvalidColor("rgb(1, 2)".into()))
        );
        assert_eq!(
            parse_stylesheet("a { strobe: 0.5 0.5; color: red }"),
            Err(ParseError::InvalidRatio("0.5 0.5".into()))
        );
        match parse_stylesheet("a { animation: fade 5s bounce }") {
            Err(ParseError::InvalidAnimation { value, .. }) => assert_eq!(value, "fade 5s bounce"),
            other => panic!("expected an animation error, got {other:?}"),
        }
    }

    #[test]
    fn syntax_errors_carry_a_position() {
        match parse_stylesheet("a { color: red }\nstray") {
            Err(ParseError::Syntax(message)) => assert!(message.contains("at 2:"), "{message}"),
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn single_declaration() {
        assert_eq!(
            parse_declaration("strobe", "1"),
            Ok(Declaration::Value(StyleValue::Strobe(Strobe { speed: 255 })))
        );
        assert!(matches!(
            parse_declaration("animation", "fade 1s"),
            Ok(Declaration::Animation(_))
        ));
        assert_eq!(
            parse_declaration("opacity", "1"),
            Err(ParseError::UnsupportedProperty("opacity".into()))
        );
    }

    #[test]
    fn declaration_list_tolerates_stray_semicolons() {
        let declarations = parse_declarations(";; color: red;; strobe: 1;").unwrap();
        assert_eq!(declarations.len(), 2);
    }

    #[test]
    fn empty_stylesheet() {
        let sheet = parse_stylesheet("  /* nothing */ ").unwrap();
        assert!(sheet.rules.is_empty());
        assert!(sheet.keyframes.is_empty());
    }
}
