//! Rendering options for Markdown output.

use crate::cleanup::CleanupOptions;

/// Options for Markdown rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Heading level used for section titles (slides, sheets).
    /// Default: 2
    pub section_heading_level: u8,

    /// Maximum heading level to use (1-6).
    /// Headings beyond this level will use this level.
    pub max_heading_level: u8,

    /// Whether to preserve line breaks within paragraphs.
    pub preserve_line_breaks: bool,

    /// Character to use for unordered lists.
    /// Default: '-'
    pub list_marker: char,

    /// Whether to add blank lines between paragraphs.
    pub paragraph_spacing: bool,

    /// Whether the first table row is followed by a `---` separator row.
    pub table_header_separator: bool,

    /// Cleanup applied to the final output, if any.
    pub cleanup: Option<CleanupOptions>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            section_heading_level: 2,
            max_heading_level: 6,
            preserve_line_breaks: true,
            list_marker: '-',
            paragraph_spacing: true,
            table_header_separator: true,
            cleanup: Some(CleanupOptions::default()),
        }
    }
}

impl RenderOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum heading level (clamped to 1-6).
    pub fn with_max_heading_level(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Sets the heading level for section titles (clamped to 1-6).
    pub fn with_section_heading_level(mut self, level: u8) -> Self {
        self.section_heading_level = level.clamp(1, 6);
        self
    }

    /// Sets the cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Disables output cleanup.
    pub fn without_cleanup(mut self) -> Self {
        self.cleanup = None;
        self
    }

    /// Disables paragraph spacing.
    pub fn without_paragraph_spacing(mut self) -> Self {
        self.paragraph_spacing = false;
        self
    }

    /// Renders tables without a header separator row.
    pub fn without_table_separator(mut self) -> Self {
        self.table_header_separator = false;
        self
    }
}
