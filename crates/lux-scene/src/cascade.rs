//! Stylesheet cascade.

use lux_ir::diagnostics::diagnostics_enabled;
use lux_ir::{Stylesheet, TreeNode};

/// Apply every rule of `sheet` to a copy of `tree`.
///
/// Rules run in source order, and so do their selectors and declarations;
/// a matching node passes each declaration on to its whole subtree. There
/// is no specificity: whatever is applied last wins.
pub fn apply_stylesheet(tree: &TreeNode, sheet: &Stylesheet) -> TreeNode {
    let mut styled = tree.clone();
    for rule in &sheet.rules {
        for selector in &rule.selectors {
            let mut matched = 0usize;
            styled.for_each_match_mut(selector, &mut |node: &mut TreeNode| {
                matched += 1;
                for declaration in &rule.declarations {
                    node.add_style(declaration);
                }
            });
            if matched == 0 {
                tracing::debug!(selector = %selector, "selector matches no node");
            } else if diagnostics_enabled("cascade") {
                tracing::debug!(
                    selector = %selector,
                    nodes = matched,
                    declarations = rule.declarations.len(),
                    "rule applied"
                );
            }
        }
    }
    styled
}
