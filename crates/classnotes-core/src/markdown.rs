//! Markdown formatting commands for the note editor buffer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// A formatting command applied to the selected text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownFormat {
    Bold,
    Italic,
    #[serde(rename = "h1")]
    Heading1,
    #[serde(rename = "h2")]
    Heading2,
    #[serde(rename = "list")]
    BulletList,
    #[serde(rename = "ordered")]
    NumberedList,
}

impl MarkdownFormat {
    pub const ALL: [Self; 6] = [
        Self::Bold,
        Self::Italic,
        Self::Heading1,
        Self::Heading2,
        Self::BulletList,
        Self::NumberedList,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Heading1 => "h1",
            Self::Heading2 => "h2",
            Self::BulletList => "list",
            Self::NumberedList => "ordered",
        }
    }

    /// Wrap or prefix `selected` with this format's token.
    #[must_use]
    pub fn render(self, selected: &str) -> String {
        match self {
            Self::Bold => format!("**{selected}**"),
            Self::Italic => format!("*{selected}*"),
            Self::Heading1 => format!("# {selected}"),
            Self::Heading2 => format!("## {selected}"),
            Self::BulletList => format!("- {selected}"),
            Self::NumberedList => format!("1. {selected}"),
        }
    }
}

impl fmt::Display for MarkdownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkdownFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| {
                format!("unknown format '{s}' (expected bold, italic, h1, h2, list, ordered)")
            })
    }
}

/// Apply `format` to the byte range `selection` of `text`.
///
/// Returns `None` when the selection is reversed, extends past the end of the
/// text, or does not fall on character boundaries; text outside the selection
/// is never touched.
///
/// ```
/// use classnotes_core::markdown::{apply_markdown, MarkdownFormat};
///
/// let out = apply_markdown("say hello now", 4..9, MarkdownFormat::Bold);
/// assert_eq!(out.as_deref(), Some("say **hello** now"));
/// ```
#[must_use]
pub fn apply_markdown(
    text: &str,
    selection: Range<usize>,
    format: MarkdownFormat,
) -> Option<String> {
    let Range { start, end } = selection;
    if start > end || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        return None;
    }
    let selected = text.get(start..end)?;

    let mut out = String::with_capacity(text.len() + 4);
    out.push_str(&text[..start]);
    out.push_str(&format.render(selected));
    out.push_str(&text[end..]);
    Some(out)
}

/// Editable text held separately from the persisted note content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    selection: Range<usize>,
}

impl TextBuffer {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let end = text.len();
        Self {
            text,
            selection: end..end,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Replace the whole text; the cursor moves to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        *self = Self::new(text);
    }

    /// Select a byte range. Any range is accepted; invalid ones make
    /// formatting a no-op.
    pub fn select(&mut self, selection: Range<usize>) {
        self.selection = selection;
    }

    /// Select the first occurrence of `needle`. Returns false when absent.
    pub fn select_text(&mut self, needle: &str) -> bool {
        match self.text.find(needle) {
            Some(start) => {
                self.selection = start..start + needle.len();
                true
            }
            None => false,
        }
    }

    /// Format the current selection in place. Returns whether the text changed.
    pub fn apply(&mut self, format: MarkdownFormat) -> bool {
        match apply_markdown(&self.text, self.selection.clone(), format) {
            Some(formatted) => {
                self.text = formatted;
                true
            }
            None => false,
        }
    }
}
