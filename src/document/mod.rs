//! Content tree model
//!
//! The engine never owns the caller's document; it takes a snapshot as a
//! [`ContentNode`] tree and indexes it into an arena so nodes can be
//! addressed by [`NodeId`] and walked upward to the root.

mod block;
pub mod path;

pub use block::{normalize_tag, BlockKind, BoxStyle, Display};
pub use path::{resolve_path, PathStep, StructuralPath};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Indentation width per list level
pub const INDENT_WIDTH: f32 = 24.0;

/// Handle to a node inside a [`ContentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Nested, serializable form of a content tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentNode {
    pub tag: String,
    pub text: String,
    pub children: Vec<ContentNode>,
    #[serde(skip_serializing_if = "BoxStyle::is_empty")]
    pub style: BoxStyle,
}

impl ContentNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Element with a text run
    pub fn text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ContentNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_style(mut self, style: BoxStyle) -> Self {
        self.style = style;
        self
    }

    /// Parse a nested node from JSON
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    text: String,
    style: BoxStyle,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
}

/// Arena-indexed content tree
#[derive(Debug, Clone)]
pub struct ContentTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl ContentTree {
    /// Create a tree with an empty root element
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![NodeData {
                tag: normalize_tag(root_tag),
                text: String::new(),
                style: BoxStyle::default(),
                parent: None,
                children: SmallVec::new(),
            }],
            root: NodeId(0),
        }
    }

    /// Index a nested node; the node becomes the root
    pub fn from_node(node: &ContentNode) -> Self {
        let mut tree = Self::new(node.tag.as_str());
        tree.nodes[0].text = node.text.clone();
        tree.nodes[0].style = node.style;
        for child in &node.children {
            tree.push_subtree(tree.root, child);
        }
        tree.demote_paragraph(tree.root);
        tree
    }

    /// Rebuild the nested form of the attached tree
    pub fn to_node(&self) -> ContentNode {
        self.subtree_node(self.root)
    }

    fn subtree_node(&self, id: NodeId) -> ContentNode {
        let data = &self.nodes[id.index()];
        ContentNode {
            tag: data.tag.clone(),
            text: data.text.clone(),
            style: data.style,
            children: data.children.iter().map(|&c| self.subtree_node(c)).collect(),
        }
    }

    fn push_subtree(&mut self, parent: NodeId, node: &ContentNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            tag: normalize_tag(&node.tag),
            text: node.text.clone(),
            style: node.style,
            parent: Some(parent),
            children: SmallVec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        for child in &node.children {
            self.push_subtree(id, child);
        }
        self.demote_paragraph(id);
        id
    }

    /// HTML parsers close a `p` at its first block child, which would shift
    /// sibling ordinals in the rendered copy. Such paragraphs become `div`.
    fn demote_paragraph(&mut self, id: NodeId) {
        if self.tag(id) == "p" && self.has_block_children(id) {
            self.nodes[id.index()].tag = "div".to_string();
        }
    }

    /// Append a subtree as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, node: &ContentNode) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let id = self.push_subtree(parent, node);
        self.demote_paragraph(parent);
        Some(id)
    }

    /// Unlink a node from its parent. The node keeps its id but no longer
    /// reaches the root.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        self.nodes[parent.index()].children.retain(|c| *c != id);
        self.nodes[id.index()].parent = None;
        true
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[self.root.index()].children.is_empty()
            && self.nodes[self.root.index()].text.trim().is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Whether the node's ancestor chain reaches the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        // Bound the walk by the arena size
        for _ in 0..=self.nodes.len() {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn tag(&self, id: NodeId) -> &str {
        self.nodes.get(id.index()).map(|n| n.tag.as_str()).unwrap_or("")
    }

    pub fn own_text(&self, id: NodeId) -> &str {
        self.nodes.get(id.index()).map(|n| n.text.as_str()).unwrap_or("")
    }

    pub fn style(&self, id: NodeId) -> BoxStyle {
        self.nodes.get(id.index()).map(|n| n.style).unwrap_or_default()
    }

    pub fn display(&self, id: NodeId) -> Display {
        Display::of_tag(self.tag(id))
    }

    pub fn block_kind(&self, id: NodeId) -> BlockKind {
        BlockKind::from_tag(self.tag(id))
    }

    /// 1-based position among the parent's children
    pub fn ordinal(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent)
            .iter()
            .position(|c| *c == id)
            .map(|p| p + 1)
    }

    /// Own text followed by the text of inline descendants
    pub fn visible_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if self.tag(id).eq_ignore_ascii_case("br") {
            out.push('\n');
        }
        out.push_str(self.own_text(id));
        for &child in self.children(id) {
            if self.display(child) == Display::Inline {
                self.collect_text(child, out);
            }
        }
    }

    pub fn has_block_children(&self, id: NodeId) -> bool {
        self.children(id)
            .iter()
            .any(|&c| self.display(c) == Display::Block)
    }

    /// A block carrying visible text with no block-level children
    pub fn is_leaf_text_block(&self, id: NodeId) -> bool {
        self.display(id) == Display::Block
            && !self.has_block_children(id)
            && !self.visible_text(id).trim().is_empty()
    }

    /// Attached nodes in document (pre-)order, root first
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![self.root],
        }
    }
}

/// Pre-order walk over attached nodes
pub struct Descendants<'a> {
    tree: &'a ContentTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContentNode {
        ContentNode::new("div").with_children([
            ContentNode::text("h1", "Jane Doe"),
            ContentNode::new("section").with_children([
                ContentNode::text("p", "Built things ").with_child(ContentNode::text("strong", "fast")),
                ContentNode::new("ul").with_children([
                    ContentNode::text("li", "Rust"),
                    ContentNode::text("li", "   "),
                ]),
            ]),
        ])
    }

    #[test]
    fn test_from_node_round_trip() {
        let node = sample();
        let tree = ContentTree::from_node(&node);
        assert_eq!(tree.len(), 8);
        assert_eq!(tree.to_node(), node);
    }

    #[test]
    fn test_document_order() {
        let tree = ContentTree::from_node(&sample());
        let tags: Vec<_> = tree.descendants().map(|id| tree.tag(id).to_string()).collect();
        assert_eq!(tags, ["div", "h1", "section", "p", "strong", "ul", "li", "li"]);
    }

    #[test]
    fn test_leaf_text_blocks() {
        let tree = ContentTree::from_node(&sample());
        let leaves: Vec<_> = tree
            .descendants()
            .filter(|&id| tree.is_leaf_text_block(id))
            .map(|id| tree.visible_text(id))
            .collect();
        assert_eq!(leaves, ["Jane Doe", "Built things fast", "Rust"]);
    }

    #[test]
    fn test_ordinal_and_detach() {
        let mut tree = ContentTree::from_node(&sample());
        let section = tree.children(tree.root())[1];
        assert_eq!(tree.ordinal(section), Some(2));
        assert!(tree.is_attached(section));

        assert!(tree.detach(section));
        assert!(!tree.is_attached(section));
        assert_eq!(tree.ordinal(section), None);
        assert_eq!(tree.descendants().count(), 2);
        assert!(!tree.detach(section));
    }

    #[test]
    fn test_append() {
        let mut tree = ContentTree::new("div");
        let root = tree.root();
        assert!(tree.is_empty());
        let p = tree.append(root, &ContentNode::text("p", "hello")).unwrap();
        assert_eq!(tree.parent(p), Some(root));
        assert!(!tree.is_empty());
        assert_eq!(tree.append(NodeId(99), &ContentNode::new("p")), None);
    }

    #[test]
    fn test_tags_are_normalized() {
        let tree = ContentTree::from_node(
            &ContentNode::new("DIV").with_child(ContentNode::text("script", "alert(1)")),
        );
        assert_eq!(tree.tag(tree.root()), "div");
        assert_eq!(tree.tag(tree.children(tree.root())[0]), "div");
    }

    #[test]
    fn test_paragraph_with_block_child_becomes_div() {
        let mut tree = ContentTree::from_node(&ContentNode::new("div").with_children([
            ContentNode::text("p", "Skills").with_child(ContentNode::new("ul")),
            ContentNode::text("p", "Inline ").with_child(ContentNode::text("em", "only")),
        ]));
        let [first, second] = [tree.children(tree.root())[0], tree.children(tree.root())[1]];
        assert_eq!(tree.tag(first), "div");
        assert_eq!(tree.tag(second), "p");

        tree.append(second, &ContentNode::text("div", "block"));
        assert_eq!(tree.tag(second), "div");
    }

    #[test]
    fn test_br_becomes_newline() {
        let node = ContentNode::text("p", "a")
            .with_child(ContentNode::new("br"))
            .with_child(ContentNode::text("span", "b"));
        let tree = ContentTree::from_node(&node);
        assert_eq!(tree.visible_text(tree.root()), "a\nb");
    }

    #[test]
    fn test_from_json() {
        let node = ContentNode::from_json(
            r#"{ "tag": "div", "children": [ { "tag": "p", "text": "x", "style": { "height": 40 } } ] }"#,
        )
        .unwrap();
        assert_eq!(node.children[0].style.height, Some(40.0));
    }
}
