//! Document model (Intermediate Representation).
//!
//! Format-specific converters build a [`Document`]; the Markdown renderer
//! turns it into text. PDFs bypass the model and are rendered page by page.

mod document;
mod paragraph;
mod style;
mod table;

pub use document::*;
pub use paragraph::*;
pub use style::*;
pub use table::*;
