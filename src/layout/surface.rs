//! Measurement surface contract
//!
//! A surface renders a content tree off-screen at a fixed width and answers
//! geometry queries. Browser hosts implement [`MeasurementSurface`] over a
//! hidden DOM copy; [`crate::layout::FlowSurface`] is the in-crate block
//! flow implementation.

use crate::document::{ContentTree, NodeId, StructuralPath};
use crate::error::Result;
use crate::style::AdjustmentSheet;
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Geometry of one node relative to the root's origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeBox {
    pub top: f32,
    pub height: f32,
    /// Resolved top margin, shift excluded
    pub margin_top: f32,
}

impl NodeBox {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Result of measuring a tree
#[derive(Debug, Clone, Default)]
pub struct Measurement {
    scroll_height: f32,
    boxes: FxHashMap<NodeId, NodeBox>,
}

impl Measurement {
    pub fn new(scroll_height: f32) -> Self {
        Self {
            scroll_height,
            boxes: FxHashMap::default(),
        }
    }

    pub fn with_scroll_height(mut self, scroll_height: f32) -> Self {
        self.scroll_height = scroll_height;
        self
    }

    pub fn insert(&mut self, id: NodeId, node_box: NodeBox) {
        self.boxes.insert(id, node_box);
    }

    /// Total rendered height of the root
    pub fn scroll_height(&self) -> f32 {
        self.scroll_height
    }

    pub fn node_box(&self, id: NodeId) -> Option<NodeBox> {
        self.boxes.get(&id).copied()
    }

    /// Whether the surface has laid the content out
    pub fn is_ready(&self) -> bool {
        self.scroll_height.is_finite() && self.scroll_height > 0.0
    }
}

/// A content tree with adjustments resolved to node shifts
#[derive(Debug, Clone)]
pub struct AdjustedTree<'a> {
    tree: &'a ContentTree,
    shifts: FxHashMap<NodeId, f32>,
    /// Adjustments that located a node
    sheet: AdjustmentSheet,
}

impl<'a> AdjustedTree<'a> {
    /// The tree as-is, no shifts
    pub fn unadjusted(tree: &'a ContentTree) -> Self {
        Self {
            tree,
            shifts: FxHashMap::default(),
            sheet: AdjustmentSheet::new(),
        }
    }

    pub fn tree(&self) -> &'a ContentTree {
        self.tree
    }

    /// Extra top offset for a node
    pub fn shift(&self, id: NodeId) -> f32 {
        self.shifts.get(&id).copied().unwrap_or(0.0)
    }

    /// Number of adjustments that located a node
    pub fn applied(&self) -> usize {
        self.shifts.len()
    }

    /// Rules a DOM-backed surface injects before measuring
    pub fn stylesheet(&self, root_class: &str) -> String {
        self.sheet.to_css(root_class)
    }
}

/// Resolve every adjustment path against `tree`. Paths that no longer
/// address a node are dropped.
pub fn apply_adjustments<'a>(tree: &'a ContentTree, sheet: &AdjustmentSheet) -> AdjustedTree<'a> {
    let mut adjusted = AdjustedTree::unadjusted(tree);
    for adjustment in sheet.iter() {
        match tree.locate(&adjustment.path) {
            Some(id) => {
                *adjusted.shifts.entry(id).or_insert(0.0) += adjustment.pixels;
                adjusted.sheet.add(adjustment.clone());
            }
            None => {
                log::debug!("dropping adjustment for unresolved path {}", adjustment.path);
            }
        }
    }
    adjusted
}

/// Off-screen render host exposing geometry queries
pub trait MeasurementSurface {
    /// Lay the tree out at `width` and report its geometry
    fn measure(&mut self, tree: &AdjustedTree<'_>, width: f32) -> Result<Measurement>;

    /// Inline style the host attaches to the content root. Surfaces without
    /// a style engine ignore it.
    fn set_style_override(&mut self, _style: Option<&str>) {}
}

impl<S: MeasurementSurface + ?Sized> MeasurementSurface for Box<S> {
    fn measure(&mut self, tree: &AdjustedTree<'_>, width: f32) -> Result<Measurement> {
        (**self).measure(tree, width)
    }

    fn set_style_override(&mut self, style: Option<&str>) {
        (**self).set_style_override(style)
    }
}

/// One box reported by a host surface, addressed by structural path
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostBox {
    /// Path in `Display` or selector form
    pub path: String,
    pub top: f32,
    pub height: f32,
    #[serde(default)]
    pub margin_top: f32,
}

/// Geometry read back from a host DOM, e.g.
/// `{ "scrollHeight": 1180, "boxes": [{ "path": "p:nth-child(2)", "top": 1100, "height": 80 }] }`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostMeasurement {
    pub scroll_height: f32,
    pub boxes: Vec<HostBox>,
}

impl HostMeasurement {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Map path-addressed boxes onto the nodes of `tree`. Boxes whose path
    /// does not parse or locate are skipped.
    pub fn resolve(&self, tree: &ContentTree) -> Measurement {
        let mut measurement = Measurement::new(self.scroll_height);
        for host_box in &self.boxes {
            let located = host_box
                .path
                .parse::<StructuralPath>()
                .ok()
                .and_then(|path| tree.locate(&path));
            match located {
                Some(id) => measurement.insert(
                    id,
                    NodeBox {
                        top: host_box.top,
                        height: host_box.height,
                        margin_top: host_box.margin_top,
                    },
                ),
                None => log::debug!("host box for unknown path {:?}", host_box.path),
            }
        }
        measurement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{resolve_path, ContentNode, PathStep, StructuralPath};
    use crate::style::Adjustment;

    #[test]
    fn test_apply_adjustments_resolves_paths() {
        let tree = ContentTree::from_node(&ContentNode::new("div").with_children([
            ContentNode::text("p", "one"),
            ContentNode::text("p", "two"),
        ]));
        let second = tree.children(tree.root())[1];

        let sheet = AdjustmentSheet::from_adjustments([
            Adjustment::new(resolve_path(&tree, second).unwrap(), 23.0),
            Adjustment::new(
                StructuralPath::new([PathStep {
                    tag: "p".into(),
                    ordinal: 7,
                }]),
                40.0,
            ),
        ]);

        let adjusted = apply_adjustments(&tree, &sheet);
        assert_eq!(adjusted.applied(), 1);
        assert_eq!(adjusted.shift(second), 23.0);
        assert_eq!(adjusted.shift(tree.root()), 0.0);
    }

    #[test]
    fn test_measurement_readiness() {
        assert!(!Measurement::new(0.0).is_ready());
        assert!(!Measurement::new(-4.0).is_ready());
        assert!(!Measurement::new(f32::NAN).is_ready());
        assert!(Measurement::new(12.0).is_ready());
    }

    #[test]
    fn test_adjusted_stylesheet_keeps_located_rules() {
        let tree = ContentTree::from_node(&ContentNode::new("div").with_children([
            ContentNode::text("p", "one"),
            ContentNode::text("p", "two"),
        ]));
        let second = tree.children(tree.root())[1];
        let sheet = AdjustmentSheet::from_adjustments([
            Adjustment::new(resolve_path(&tree, second).unwrap(), 23.0),
            Adjustment::new(
                StructuralPath::new([PathStep {
                    tag: "ul".into(),
                    ordinal: 1,
                }]),
                10.0,
            ),
        ]);

        let adjusted = apply_adjustments(&tree, &sheet);
        assert_eq!(
            adjusted.stylesheet("reflow-content"),
            ".reflow-content > p:nth-child(2) { margin-top: 23px !important; }\n"
        );
        assert_eq!(AdjustedTree::unadjusted(&tree).stylesheet("reflow-content"), "");
    }

    #[test]
    fn test_host_measurement_resolves_paths() {
        let tree = ContentTree::from_node(&ContentNode::new("div").with_children([
            ContentNode::text("p", "one"),
            ContentNode::new("section").with_child(ContentNode::text("p", "two")),
        ]));
        let host = HostMeasurement::from_json(
            r#"{
                "scrollHeight": 1180,
                "boxes": [
                    { "path": "p:nth-child(1)", "top": 0, "height": 1100 },
                    { "path": ".reflow-content > section:nth-child(2) > p:nth-child(1)", "top": 1100, "height": 80, "marginTop": 4 },
                    { "path": "ul:nth-child(9)", "top": 0, "height": 5 },
                    { "path": "garbage", "top": 0, "height": 5 }
                ]
            }"#,
        )
        .unwrap();

        let measurement = host.resolve(&tree);
        assert_eq!(measurement.scroll_height(), 1180.0);
        let section = tree.children(tree.root())[1];
        let nested = tree.children(section)[0];
        let nested_box = measurement.node_box(nested).unwrap();
        assert_eq!(nested_box.top, 1100.0);
        assert_eq!(nested_box.margin_top, 4.0);
        assert_eq!(measurement.node_box(section), None);
    }
}
