//! # Cleanup
//!
//! Normalization applied to text coming out of third-party extractors before
//! it is written as Markdown.
//!
//! 1. **String normalization** - Unicode NFC, control character removal,
//!    fullwidth/no-break space folding
//! 2. **Line normalization** - trailing whitespace, CRLF, runs of blank lines

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Three or more consecutive newlines.
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Cleanup configuration options
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Apply Unicode NFC normalization
    pub nfc: bool,
    /// Remove control characters other than tab and newline
    pub remove_control: bool,
    /// Remove PUA (Private Use Area) characters
    pub remove_pua: bool,
    /// Collapse runs of blank lines to a single blank line
    pub collapse_blank_lines: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            nfc: true,
            remove_control: true,
            remove_pua: true,
            collapse_blank_lines: true,
        }
    }
}

impl CleanupOptions {
    /// Only line-ending and whitespace fixes; characters are kept as-is.
    pub fn minimal() -> Self {
        Self {
            nfc: false,
            remove_control: false,
            remove_pua: false,
            collapse_blank_lines: true,
        }
    }
}

/// Stage 1: normalize characters.
pub fn normalize_string(input: &str, options: &CleanupOptions) -> String {
    let mut result = String::with_capacity(input.len());

    let chars: Box<dyn Iterator<Item = char>> = if options.nfc {
        Box::new(input.nfc())
    } else {
        Box::new(input.chars())
    };

    for c in chars {
        if options.remove_control && is_control_char(c) {
            continue;
        }
        if options.remove_pua && is_pua_char(c) {
            continue;
        }
        match c {
            '\u{3000}' | '\u{00A0}' => result.push(' '),
            // Form feed separates pages in some extractor output
            '\u{000C}' => result.push('\n'),
            _ => result.push(c),
        }
    }

    result
}

/// Stage 2: normalize lines.
pub fn normalize_lines(input: &str, options: &CleanupOptions) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");

    let mut result = unified
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");

    if options.collapse_blank_lines {
        result = EXCESS_NEWLINES.replace_all(&result, "\n\n").into_owned();
    }

    result.trim_matches('\n').to_string()
}

/// Runs both stages.
pub fn cleanup(input: &str, options: &CleanupOptions) -> String {
    let normalized = normalize_string(input, options);
    normalize_lines(&normalized, options)
}

/// Runs both stages with default options.
pub fn cleanup_default(input: &str) -> String {
    cleanup(input, &CleanupOptions::default())
}

fn is_control_char(c: char) -> bool {
    c.is_control() && !matches!(c, '\n' | '\t' | '\r' | '\u{000C}')
}

fn is_pua_char(c: char) -> bool {
    matches!(c as u32, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD)
}
