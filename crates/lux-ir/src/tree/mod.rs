//! The scene tree: fixtures and groups of fixtures, styled by selector.

mod loader;

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::css::{AnimationSet, Declaration, Property, Selector, StyleValue, TransitionSet};

pub use loader::{load_tree, parse_tree_json, parse_tree_xml};

/// Style carried by a node after the cascade.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeStyle {
    pub values: BTreeMap<Property, StyleValue>,
    pub animations: AnimationSet,
    pub transitions: TransitionSet,
}

impl NodeStyle {
    /// Later declarations overwrite earlier ones. An `animation` or
    /// `transition` declaration replaces the whole set.
    pub fn apply(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Value(value) => {
                self.values.insert(value.property(), value.clone());
            }
            Declaration::Animation(set) => self.animations = set.clone(),
            Declaration::Transition(set) => self.transitions = set.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.animations.is_empty() && self.transitions.is_empty()
    }
}

/// A node of the scene tree.
///
/// `offset` shifts every channel of the node's device, so the same device
/// description can be placed several times in one universe.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeNode {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub offset: u16,
    pub style: NodeStyle,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_offset(mut self, offset: u16) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// The explicit `id`, or the tag when none was given.
    pub fn effective_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.tag)
    }

    pub fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Id(id) => self.effective_id() == id.as_str(),
            Selector::Class(class) => self.classes.iter().any(|c| c == class),
            Selector::Tag(tag) => self.tag == *tag,
        }
    }

    /// Depth-first pre-order traversal of this node and its descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Nodes matching `selector`, in `walk` order. Lazy and restartable.
    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = &'a TreeNode> + 'a {
        self.walk().filter(move |node| node.matches(selector))
    }

    /// Set `declaration` on this node and every descendant.
    pub fn add_style(&mut self, declaration: &Declaration) {
        self.style.apply(declaration);
        for child in &mut self.children {
            child.add_style(declaration);
        }
    }

    /// Visit every node matching `selector` in pre-order. `f` may mutate
    /// the node's subtree; traversal continues into the mutated children.
    pub fn for_each_match_mut<F>(&mut self, selector: &Selector, f: &mut F)
    where
        F: FnMut(&mut TreeNode),
    {
        if self.matches(selector) {
            f(self);
        }
        for child in &mut self.children {
            child.for_each_match_mut(selector, f);
        }
    }

    /// `tag#id.class1.class2`
    pub fn label(&self) -> String {
        let mut out = self.tag.clone();
        if let Some(id) = &self.id {
            let _ = write!(out, "#{id}");
        }
        for class in &self.classes {
            let _ = write!(out, ".{class}");
        }
        out
    }

    /// Render the tree with its styles, one node per line.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&mut out, 0);
        out
    }

    fn describe_into(&self, out: &mut String, depth: usize) {
        if depth > 0 {
            let _ = write!(out, "{}└ ", " ".repeat(depth - 1));
        }
        out.push_str(&self.label());
        if self.offset != 0 {
            let _ = write!(out, " @{}", self.offset);
        }
        for (property, value) in &self.style.values {
            let _ = write!(out, " {property}: {value};");
        }
        if !self.style.animations.is_empty() {
            let names: Vec<_> = self.style.animations.iter().map(|(n, _)| n).collect();
            let _ = write!(out, " animation: {};", names.join(", "));
        }
        if !self.style.transitions.is_empty() {
            let props: Vec<_> = self.style.transitions.keys().map(|p| p.name()).collect();
            let _ = write!(out, " transition: {};", props.join(", "));
        }
        out.push('\n');
        for child in &self.children {
            child.describe_into(out, depth + 1);
        }
    }
}

/// Iterator returned by [`TreeNode::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
