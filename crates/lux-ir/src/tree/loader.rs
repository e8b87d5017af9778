use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Deserialize;

use crate::error::LoadError;

use super::TreeNode;

/// Load a tree from `.xml` or `.json`, picked by extension.
pub fn load_tree(path: impl AsRef<Path>) -> Result<TreeNode, LoadError> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let tree = match path.extension().and_then(|e| e.to_str()) {
        Some("xml") => parse_tree_xml(&text, &origin)?,
        Some("json") => parse_tree_json(&text, &origin)?,
        _ => {
            return Err(LoadError::InvalidTree {
                origin,
                reason: "expected a .xml or .json file".to_string(),
            });
        }
    };
    tracing::info!(path = %path.display(), nodes = tree.walk().count(), "loaded tree");
    Ok(tree)
}

/// Element name is the tag; `id`, `class` (space separated) and `offset`
/// attributes are read, everything else is ignored.
pub fn parse_tree_xml(text: &str, origin: &str) -> Result<TreeNode, LoadError> {
    let xml_err = |message: String| LoadError::Xml {
        origin: origin.to_string(),
        message,
    };
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<TreeNode> = Vec::new();
    let mut root: Option<TreeNode> = None;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_err(format!("{e} at byte {}", reader.buffer_position())))?;
        match event {
            Event::Start(ref e) => stack.push(node_from_element(e, origin)?),
            Event::Empty(ref e) => {
                let node = node_from_element(e, origin)?;
                attach(node, &mut stack, &mut root, origin)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| xml_err("unexpected closing tag".to_string()))?;
                attach(node, &mut stack, &mut root, origin)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(xml_err("unclosed element".to_string()));
    }
    root.ok_or_else(|| LoadError::InvalidTree {
        origin: origin.to_string(),
        reason: "no root element".to_string(),
    })
}

fn node_from_element(element: &BytesStart<'_>, origin: &str) -> Result<TreeNode, LoadError> {
    let invalid = |reason: String| LoadError::InvalidTree {
        origin: origin.to_string(),
        reason,
    };
    let tag = String::from_utf8_lossy(element.name().as_ref()).to_string();
    let mut node = TreeNode::new(tag);
    for attr in element.attributes() {
        let attr = attr.map_err(|e| LoadError::Xml {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;
        let value = attr
            .unescape_value()
            .map_err(|e| LoadError::Xml {
                origin: origin.to_string(),
                message: e.to_string(),
            })?
            .to_string();
        match attr.key.as_ref() {
            b"id" => node.id = Some(value),
            b"class" => node.classes = value.split_whitespace().map(str::to_string).collect(),
            b"offset" => {
                node.offset = value.trim().parse().map_err(|_| {
                    invalid(format!("offset '{value}' of <{}> is not a channel number", node.tag))
                })?
            }
            _ => {}
        }
    }
    Ok(node)
}

fn attach(
    node: TreeNode,
    stack: &mut [TreeNode],
    root: &mut Option<TreeNode>,
    origin: &str,
) -> Result<(), LoadError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => {
            return Err(LoadError::InvalidTree {
                origin: origin.to_string(),
                reason: "more than one root element".to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassList {
    Joined(String),
    List(Vec<String>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeDocument {
    tag: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    class: Option<ClassList>,
    #[serde(default)]
    offset: u16,
    #[serde(default)]
    children: Vec<NodeDocument>,
}

impl From<NodeDocument> for TreeNode {
    fn from(doc: NodeDocument) -> Self {
        let classes = match doc.class {
            Some(ClassList::Joined(s)) => s.split_whitespace().map(str::to_string).collect(),
            Some(ClassList::List(list)) => list,
            None => Vec::new(),
        };
        TreeNode {
            tag: doc.tag,
            id: doc.id,
            classes,
            offset: doc.offset,
            style: Default::default(),
            children: doc.children.into_iter().map(TreeNode::from).collect(),
        }
    }
}

/// `{ "tag": ..., "id"?: ..., "class"?: "a b" | ["a", "b"], "offset"?: n, "children"?: [...] }`
pub fn parse_tree_json(text: &str, origin: &str) -> Result<TreeNode, LoadError> {
    let doc: NodeDocument = serde_json::from_str(text).map_err(|source| LoadError::Json {
        origin: origin.to_string(),
        source,
    })?;
    Ok(doc.into())
}
