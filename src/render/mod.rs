//! Render output: display list and HTML markup

mod display;
pub mod markup;

pub use display::{compose_pages, DisplayItem, DisplayList, DisplayPage};
pub use markup::{escape_html, measurement_host, measurement_markup, render_content, render_pages};
