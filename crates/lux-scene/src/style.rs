//! Per-node style resolution at a point in time.

use std::collections::BTreeMap;

use lux_ir::{Property, StyleValue, TreeNode};

use crate::animation::{KeyframeMap, apply_transition, compute_animations};
use crate::error::EvalError;

/// The value of every property a node carries at one instant.
pub type ResolvedStyle = BTreeMap<Property, StyleValue>;

/// Resolve the style of `node` at show time `t`, in seconds.
///
/// Static values pass through, or follow their transition when one is
/// declared for the property. Live animations then override both.
pub fn compute_style(
    node: &TreeNode,
    keyframes: &KeyframeMap,
    t: f64,
) -> Result<ResolvedStyle, EvalError> {
    let style = &node.style;
    let mut resolved: ResolvedStyle = style
        .values
        .iter()
        .map(|(property, value)| {
            let value = match style.transitions.get(property) {
                Some(transition) => apply_transition(value, transition, t),
                None => value.clone(),
            };
            (*property, value)
        })
        .collect();

    if !style.animations.is_empty() {
        let animated = compute_animations(&style.animations, keyframes, &node.label(), t)?;
        resolved.extend(animated);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::apply_stylesheet;
    use lux_ir::{Color, parse_stylesheet};

    fn styled(css: &str) -> (TreeNode, KeyframeMap) {
        let sheet = parse_stylesheet(css).unwrap();
        let tree = apply_stylesheet(&TreeNode::new("par"), &sheet);
        (tree, sheet.keyframes)
    }

    #[test]
    fn test_static_values_pass_through() {
        let (node, keyframes) = styled("par { color: #102030; }");
        let style = compute_style(&node, &keyframes, 12.0).unwrap();
        assert_eq!(
            style.get(&Property::Color),
            Some(&StyleValue::Color(Color::rgb(16, 32, 48)))
        );
    }

    #[test]
    fn test_transition_starts_at_base() {
        let (node, keyframes) = styled("par { color: #ff0000; transition: color 2s linear; }");
        let start = compute_style(&node, &keyframes, 0.0).unwrap();
        assert_eq!(
            start.get(&Property::Color),
            Some(&StyleValue::Color(Color::rgb(0, 0, 0).with_alpha(0)))
        );
        let done = compute_style(&node, &keyframes, 3.0).unwrap();
        assert_eq!(
            done.get(&Property::Color),
            Some(&StyleValue::Color(Color::rgb(255, 0, 0)))
        );
    }

    #[test]
    fn test_animation_overrides_static_value() {
        let (node, keyframes) = styled(
            "par { color: #00ff00; animation: fade 5s infinite; }\n\
             @keyframes fade { from { color: rgba(255, 0, 0, 1) } to { color: rgba(255, 0, 0, 0) } }",
        );
        let style = compute_style(&node, &keyframes, 2.5).unwrap();
        assert_eq!(
            style.get(&Property::Color),
            Some(&StyleValue::Color(Color::rgb(255, 0, 0).with_alpha(50)))
        );
    }

    #[test]
    fn test_missing_keyframes_names_the_node() {
        let (node, keyframes) = styled("par { animation: ghost 1s; }");
        let err = compute_style(&node, &keyframes, 0.0).unwrap_err();
        assert_eq!(
            err,
            EvalError::MissingKeyframes {
                name: "ghost".into(),
                node: "par".into()
            }
        );
    }
}
