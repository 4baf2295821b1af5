//! Structural paths: position-based node addresses
//!
//! A path is the chain of `tag:nth-child(n)` steps from the content root
//! down to a node. It holds no live node reference, so the same path selects
//! the same node in the hidden measurement copy and in every page clone.

use super::{ContentTree, NodeId};
use crate::error::ReflowError;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// One step of a structural path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathStep {
    pub tag: String,
    /// 1-based position among all element siblings
    pub ordinal: usize,
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:nth-child({})", self.tag.to_ascii_lowercase(), self.ordinal)
    }
}

/// Root-to-node address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StructuralPath {
    steps: SmallVec<[PathStep; 8]>,
}

impl StructuralPath {
    pub fn new(steps: impl IntoIterator<Item = PathStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Selector scoped under the content-root class
    pub fn selector(&self, root_class: &str) -> String {
        format!(".{} > {}", root_class, self)
    }
}

impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl FromStr for PathStep {
    type Err = ReflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReflowError::InvalidPath(s.to_string());
        let (tag, rest) = s.trim().split_once(":nth-child(").ok_or_else(invalid)?;
        let ordinal = rest
            .strip_suffix(')')
            .and_then(|n| n.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .ok_or_else(invalid)?;
        if tag.is_empty() {
            return Err(invalid());
        }
        Ok(PathStep {
            tag: tag.to_ascii_lowercase(),
            ordinal,
        })
    }
}

/// Parses the `Display` form. A leading `.class` step, as produced by
/// [`StructuralPath::selector`], is skipped.
impl FromStr for StructuralPath {
    type Err = ReflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let steps = s
            .split('>')
            .map(str::trim)
            .filter(|part| !part.starts_with('.'))
            .map(str::parse)
            .collect::<Result<SmallVec<[PathStep; 8]>, _>>()?;
        if steps.is_empty() {
            return Err(ReflowError::InvalidPath(s.to_string()));
        }
        Ok(StructuralPath { steps })
    }
}

/// Compute the structural path of `node` relative to the tree root.
///
/// Returns `None` for the root itself and for nodes that no longer reach
/// the root.
pub fn resolve_path(tree: &ContentTree, node: NodeId) -> Option<StructuralPath> {
    if node == tree.root() || !tree.contains(node) || !tree.is_attached(node) {
        return None;
    }

    let mut steps: SmallVec<[PathStep; 8]> = SmallVec::new();
    let mut current = node;
    while current != tree.root() {
        steps.push(PathStep {
            tag: tree.tag(current).to_string(),
            ordinal: tree.ordinal(current)?,
        });
        current = tree.parent(current)?;
    }
    steps.reverse();

    Some(StructuralPath { steps })
}

impl ContentTree {
    /// Find the node a path addresses; the inverse of [`resolve_path`]
    pub fn locate(&self, path: &StructuralPath) -> Option<NodeId> {
        if path.is_empty() {
            return None;
        }

        let mut current = self.root();
        for step in path.steps() {
            let index = step.ordinal.checked_sub(1)?;
            let child = *self.children(current).get(index)?;
            if !self.tag(child).eq_ignore_ascii_case(&step.tag) {
                return None;
            }
            current = child;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ContentNode;

    fn resume() -> ContentNode {
        ContentNode::new("div").with_children([
            ContentNode::text("h1", "Jane Doe"),
            ContentNode::new("section").with_children([
                ContentNode::text("h2", "Experience"),
                ContentNode::text("p", "Acme Corp"),
                ContentNode::new("ul").with_children([
                    ContentNode::text("li", "Shipped the thing"),
                    ContentNode::text("li", "Fixed the other thing"),
                ]),
            ]),
        ])
    }

    #[test]
    fn test_resolve_path_format() {
        let tree = ContentTree::from_node(&resume());
        let section = tree.children(tree.root())[1];
        let ul = tree.children(section)[2];
        let second_li = tree.children(ul)[1];

        let path = resolve_path(&tree, second_li).unwrap();
        assert_eq!(path.depth(), 3);
        assert_eq!(
            path.to_string(),
            "section:nth-child(2) > ul:nth-child(3) > li:nth-child(2)"
        );
        assert_eq!(
            path.selector("reflow-content"),
            ".reflow-content > section:nth-child(2) > ul:nth-child(3) > li:nth-child(2)"
        );
    }

    #[test]
    fn test_root_and_detached_have_no_path() {
        let mut tree = ContentTree::from_node(&resume());
        assert_eq!(resolve_path(&tree, tree.root()), None);
        assert_eq!(resolve_path(&tree, NodeId(1000)), None);

        let section = tree.children(tree.root())[1];
        let p = tree.children(section)[1];
        tree.detach(section);
        assert_eq!(resolve_path(&tree, p), None);
    }

    #[test]
    fn test_round_trip_across_identical_trees() {
        let measured = ContentTree::from_node(&resume());
        let clone = ContentTree::from_node(&resume());

        for id in measured.descendants().skip(1) {
            let path = resolve_path(&measured, id).unwrap();
            let found = clone.locate(&path).unwrap();
            assert_eq!(resolve_path(&clone, found).unwrap(), path);
            assert_eq!(clone.tag(found), measured.tag(id));
            assert_eq!(clone.own_text(found), measured.own_text(id));
        }
    }

    #[test]
    fn test_paths_are_unique() {
        let tree = ContentTree::from_node(&resume());
        let mut seen = std::collections::HashSet::new();
        for id in tree.descendants().skip(1) {
            assert!(seen.insert(resolve_path(&tree, id).unwrap()));
        }
    }

    #[test]
    fn test_locate_rejects_tag_mismatch() {
        let tree = ContentTree::from_node(&resume());
        let path = StructuralPath::new([PathStep {
            tag: "p".into(),
            ordinal: 1,
        }]);
        assert_eq!(tree.locate(&path), None);

        let out_of_range = StructuralPath::new([PathStep {
            tag: "h1".into(),
            ordinal: 9,
        }]);
        assert_eq!(tree.locate(&out_of_range), None);
        assert_eq!(tree.locate(&StructuralPath::default()), None);
    }

    #[test]
    fn test_parse_display_and_selector_forms() {
        let tree = ContentTree::from_node(&resume());
        let section = tree.children(tree.root())[1];
        let li = tree.children(tree.children(section)[2])[1];
        let path = resolve_path(&tree, li).unwrap();

        assert_eq!(path.to_string().parse::<StructuralPath>().unwrap(), path);
        assert_eq!(
            path.selector("reflow-content").parse::<StructuralPath>().unwrap(),
            path
        );
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        for bad in ["", ".reflow-content", "p", "p:nth-child(0)", "p:nth-child(x)", ":nth-child(1)"] {
            assert!(bad.parse::<StructuralPath>().is_err(), "{:?}", bad);
        }
    }
}
