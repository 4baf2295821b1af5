//! Block-level classification and box metrics

use serde::{Deserialize, Serialize};

/// Tags that flow inline with their parent's text
const INLINE_TAGS: &[&str] = &[
    "a", "b", "br", "code", "em", "i", "mark", "small", "span", "strong", "sub", "sup", "u",
];

/// Elements never emitted into page markup
const BLOCKED_TAGS: &[&str] = &["iframe", "object", "script", "style", "template"];

/// Lowercase an element name, replacing anything that is not a plain,
/// renderable tag with `div`
pub fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim().to_ascii_lowercase();
    let plain = tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !plain || BLOCKED_TAGS.contains(&tag.as_str()) {
        return "div".to_string();
    }
    tag
}

/// How a tag participates in flow layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
}

impl Display {
    /// Classify an element name
    pub fn of_tag(tag: &str) -> Self {
        let tag = tag.trim();
        if INLINE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            Display::Inline
        } else {
            Display::Block
        }
    }
}

/// The kind of block element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    /// Regular paragraph
    #[default]
    Paragraph,
    /// Heading with level (1-6)
    Heading { level: u8 },
    /// List item
    ListItem,
    /// List wrapper (`ul` / `ol`)
    List,
    /// Sectioning or generic wrapper
    Container,
}

impl BlockKind {
    /// Derive the block kind from an element name
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "p" | "blockquote" | "pre" | "dd" | "dt" | "figcaption" => BlockKind::Paragraph,
            "h1" => BlockKind::Heading { level: 1 },
            "h2" => BlockKind::Heading { level: 2 },
            "h3" => BlockKind::Heading { level: 3 },
            "h4" => BlockKind::Heading { level: 4 },
            "h5" => BlockKind::Heading { level: 5 },
            "h6" => BlockKind::Heading { level: 6 },
            "li" => BlockKind::ListItem,
            "ul" | "ol" | "dl" => BlockKind::List,
            _ => BlockKind::Container,
        }
    }

    /// Get the line height multiplier for this block kind
    pub fn line_height_multiplier(&self) -> f32 {
        match self {
            BlockKind::Heading { level } => match level {
                1 => 1.5,
                2 => 1.4,
                3 => 1.3,
                _ => 1.2,
            },
            _ => 1.0,
        }
    }

    /// Get the spacing after this block (in line heights)
    pub fn spacing_after(&self) -> f32 {
        match self {
            BlockKind::Paragraph => 0.5,
            BlockKind::Heading { .. } => 0.25,
            BlockKind::ListItem => 0.15,
            BlockKind::List => 0.5,
            BlockKind::Container => 0.0,
        }
    }

    /// Indentation applied to children, in logical pixels
    pub fn child_indent(&self) -> f32 {
        match self {
            BlockKind::List => super::INDENT_WIDTH,
            _ => 0.0,
        }
    }

    /// Check if this is a heading
    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading { .. })
    }
}

/// Per-node box overrides, all in logical pixels.
///
/// `None` falls back to the metrics implied by the node's [`BlockKind`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoxStyle {
    pub margin_top: Option<f32>,
    pub margin_bottom: Option<f32>,
    pub padding_top: Option<f32>,
    pub padding_bottom: Option<f32>,
    pub padding_left: Option<f32>,
    /// Fixed content height; skips text measurement
    pub height: Option<f32>,
}

impl BoxStyle {
    /// A box with no margins or padding
    pub fn flush() -> Self {
        Self {
            margin_top: Some(0.0),
            margin_bottom: Some(0.0),
            padding_top: Some(0.0),
            padding_bottom: Some(0.0),
            padding_left: Some(0.0),
            height: None,
        }
    }

    /// A flush box with a fixed content height
    pub fn fixed(height: f32) -> Self {
        Self {
            height: Some(height),
            ..Self::flush()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
