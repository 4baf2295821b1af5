//! HTML output for browser hosts

use std::fmt::Write;

use crate::config::ReflowConfig;
use crate::document::{BoxStyle, ContentTree, NodeId};
use crate::engine::ReflowResult;
use crate::render::display::{DisplayItem, DisplayList, DisplayPage};

/// Escape text for element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn box_css(style: &BoxStyle) -> String {
    let mut css = String::new();
    let fields = [
        ("margin-top", style.margin_top),
        ("margin-bottom", style.margin_bottom),
        ("padding-top", style.padding_top),
        ("padding-bottom", style.padding_bottom),
        ("padding-left", style.padding_left),
        ("height", style.height),
    ];
    for (property, value) in fields {
        if let Some(value) = value {
            let _ = write!(css, "{}:{}px;", property, value);
        }
    }
    css
}

/// Render the content tree with the root carrying `root_class` and the
/// optional inline style override
pub fn render_content(tree: &ContentTree, root_class: &str, style_override: Option<&str>) -> String {
    let mut out = String::new();
    render_node(tree, tree.root(), Some((root_class, style_override)), &mut out);
    out
}

fn render_node(tree: &ContentTree, id: NodeId, root: Option<(&str, Option<&str>)>, out: &mut String) {
    let tag = tree.tag(id);
    let mut css = box_css(&tree.style(id));

    out.push('<');
    out.push_str(tag);
    if let Some((class, style_override)) = root {
        let _ = write!(out, " class=\"{}\"", escape_html(class));
        if let Some(extra) = style_override {
            css.push_str(extra);
        }
    }
    if !css.is_empty() {
        let _ = write!(out, " style=\"{}\"", escape_html(&css));
    }
    out.push('>');

    // Void element
    if tag == "br" {
        out.push_str(&escape_html(tree.own_text(id)));
        return;
    }

    out.push_str(&escape_html(tree.own_text(id)));
    for &child in tree.children(id) {
        render_node(tree, child, None, out);
    }
    let _ = write!(out, "</{}>", tag);
}

/// Hidden off-screen copy of the content used for measurement.
///
/// The host never shows it and it never receives pointer events or
/// accessibility focus.
pub fn measurement_host(tree: &ContentTree, config: &ReflowConfig, style_override: Option<&str>) -> String {
    measurement_markup(tree, &config.content_root_class, config.page_width, style_override)
}

/// [`measurement_host`] for an explicit root class and width
pub fn measurement_markup(
    tree: &ContentTree,
    root_class: &str,
    width: f32,
    style_override: Option<&str>,
) -> String {
    format!(
        "<div class=\"reflow-measure\" aria-hidden=\"true\" style=\"position:absolute;left:-100000px;top:0;width:{}px;visibility:hidden;pointer-events:none;\">{}</div>",
        width,
        render_content(tree, root_class, style_override)
    )
}

fn render_page(page: &DisplayPage, content: &str, config: &ReflowConfig, out: &mut String) {
    let _ = write!(
        out,
        "<div class=\"reflow-page\" data-page=\"{}\" style=\"position:relative;width:{}px;height:{}px;margin:0 auto {}px;\">",
        page.page_index + 1,
        page.clip.width,
        page.clip.height,
        config.inter_page_gap
    );

    for item in &page.items {
        match item {
            DisplayItem::Sheet { shadow, .. } => {
                let shadow = if *shadow { "box-shadow:0 2px 8px rgba(0,0,0,0.15);" } else { "" };
                let _ = write!(
                    out,
                    "<div class=\"reflow-sheet\" style=\"position:absolute;inset:0;background:#fff;{}\"></div>",
                    shadow
                );
            }
            DisplayItem::ContentClone { translate_y, .. } => {
                let _ = write!(
                    out,
                    "<div class=\"reflow-clip\" style=\"position:absolute;inset:0;overflow:hidden;\"><div style=\"transform:translateY({}px);\">{}</div></div>",
                    translate_y, content
                );
            }
            DisplayItem::PageNumber {
                position,
                number,
                total,
                exportable,
            } => {
                let export = if *exportable { "" } else { " data-export=\"exclude\"" };
                let _ = write!(
                    out,
                    "<div class=\"reflow-page-number\"{} style=\"position:absolute;left:0;right:0;top:{}px;text-align:center;\">{} / {}</div>",
                    export, position.y, number, total
                );
            }
        }
    }

    out.push_str("</div>");
}

/// Render the paginated view: the adjustment stylesheet followed by one
/// independent content clone per page
pub fn render_pages(
    tree: &ContentTree,
    result: &ReflowResult,
    config: &ReflowConfig,
    style_override: Option<&str>,
) -> String {
    let list = DisplayList::build(result, config, None);
    let content = render_content(tree, &config.content_root_class, style_override);

    let mut out = String::new();
    if !result.adjustment_styles.is_empty() {
        let _ = write!(out, "<style>{}</style>", result.adjustment_styles);
    }
    for page in &list.pages {
        render_page(page, &content, config, &mut out);
    }
    out
}
