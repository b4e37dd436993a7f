//! Formatted lines: the unit handed from layout to the encoders

use serde::{Deserialize, Serialize};

/// Horizontal alignment of a line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Character style set of a line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    pub bold: bool,
    pub double_height: bool,
}

impl TextStyle {
    pub const PLAIN: Self = Self {
        bold: false,
        double_height: false,
    };

    pub const BOLD: Self = Self {
        bold: true,
        double_height: false,
    };

    pub const TITLE: Self = Self {
        bold: true,
        double_height: true,
    };
}

/// One printed line
///
/// `content` is already laid out to the paper width: padding for center and
/// right alignment is part of the text, so a plain-text printer prints it
/// as-is. `align` keeps the intent for encoders that align in hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedLine {
    pub content: String,
    pub align: Align,
    pub style: TextStyle,
}

impl FormattedLine {
    pub fn new(content: impl Into<String>, align: Align, style: TextStyle) -> Self {
        Self {
            content: content.into(),
            align,
            style,
        }
    }

    /// Plain left-aligned line
    pub fn left(content: impl Into<String>) -> Self {
        Self::new(content, Align::Left, TextStyle::PLAIN)
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Content without the layout padding
    pub fn text(&self) -> &str {
        match self.align {
            Align::Left => self.content.trim_end(),
            Align::Center | Align::Right => self.content.trim(),
        }
    }
}
