//! Style definitions for text and paragraphs.

use serde::Serialize;

/// Text formatting style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Strikethrough
    pub strikethrough: bool,
}

impl TextStyle {
    /// Creates a bold style.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Creates an italic style.
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Default::default()
        }
    }

    /// Returns true if this style has any formatting.
    pub fn has_formatting(&self) -> bool {
        self.bold || self.italic || self.strikethrough
    }
}

/// Paragraph-level style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParagraphStyle {
    /// Heading level (0 = normal paragraph, 1-6 = heading levels)
    pub heading_level: u8,
    /// List style
    pub list_style: Option<ListStyle>,
    /// Indentation level (for nested lists)
    pub indent_level: u8,
}

impl ParagraphStyle {
    /// Creates a heading style, clamping the level to 6.
    pub fn heading(level: u8) -> Self {
        Self {
            heading_level: level.min(6),
            ..Default::default()
        }
    }

    /// Creates a list item style.
    pub fn list(style: ListStyle, indent_level: u8) -> Self {
        Self {
            list_style: Some(style),
            indent_level,
            ..Default::default()
        }
    }

    /// Returns true if this is a heading.
    pub fn is_heading(&self) -> bool {
        self.heading_level > 0
    }
}

/// List style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListStyle {
    /// Numbered list
    Ordered,
    /// Bulleted list
    Unordered,
}
