//! Resolved numeric styles and alignment semantics
//!
//! A [`Style`] is resolved once per style definition and shared by every
//! unit that references it through `Arc<Style>`. Units never mutate it.

use core::fmt;

use crate::parser::StyleDef;
use crate::utils::{parse_field, parse_flag, Result};

bitflags::bitflags! {
    /// Text formatting options for resolved styles
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TextFormatting: u8 {
        /// Bold text formatting
        const BOLD = 1 << 0;
        /// Italic text formatting
        const ITALIC = 1 << 1;
        /// Underline text formatting
        const UNDERLINE = 1 << 2;
        /// Strike-through text formatting
        const STRIKE_OUT = 1 << 3;
    }
}

/// Horizontal anchor of an alignment code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Center,
    Right,
}

/// Vertical anchor of an alignment code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Bottom,
    Middle,
    Top,
}

/// Numpad alignment (1-9)
///
/// ```text
/// 7 8 9    top
/// 4 5 6    middle
/// 1 2 3    bottom
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    BottomLeft = 1,
    BottomCenter = 2,
    BottomRight = 3,
    MiddleLeft = 4,
    MiddleCenter = 5,
    MiddleRight = 6,
    TopLeft = 7,
    TopCenter = 8,
    TopRight = 9,
}

impl Alignment {
    /// Alignment for a numpad code, `None` outside 1-9
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::BottomLeft,
            2 => Self::BottomCenter,
            3 => Self::BottomRight,
            4 => Self::MiddleLeft,
            5 => Self::MiddleCenter,
            6 => Self::MiddleRight,
            7 => Self::TopLeft,
            8 => Self::TopCenter,
            9 => Self::TopRight,
            _ => return None,
        })
    }

    /// Numpad code
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn column(self) -> Column {
        match self {
            Self::BottomLeft | Self::MiddleLeft | Self::TopLeft => Column::Left,
            Self::BottomCenter | Self::MiddleCenter | Self::TopCenter => Column::Center,
            Self::BottomRight | Self::MiddleRight | Self::TopRight => Column::Right,
        }
    }

    #[must_use]
    pub const fn row(self) -> Row {
        match self {
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => Row::Bottom,
            Self::MiddleLeft | Self::MiddleCenter | Self::MiddleRight => Row::Middle,
            Self::TopLeft | Self::TopCenter | Self::TopRight => Row::Top,
        }
    }

    /// Middle-row codes (4, 5, 6) stack syllables vertically
    #[must_use]
    pub const fn stacks_vertically(self) -> bool {
        matches!(self.row(), Row::Middle)
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Resolved style with numeric fields
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    /// Style name
    pub name: String,
    /// Font family
    pub font_name: String,
    /// Font size in points
    pub font_size: f64,
    /// Bold/italic/underline/strikeout flags
    #[cfg_attr(feature = "serde", serde(with = "formatting_bits"))]
    pub formatting: TextFormatting,
    /// Horizontal scale percentage
    pub scale_x: f64,
    /// Vertical scale percentage
    pub scale_y: f64,
    /// Inter-unit spacing in pixels
    pub spacing: f64,
    /// Rotation angle in degrees
    pub angle: f64,
    /// Outline width
    pub outline: f64,
    /// Shadow depth
    pub shadow: f64,
    /// Raw numpad alignment code; values outside 1-9 are kept
    pub alignment: u8,
    pub margin_l: f64,
    pub margin_r: f64,
    pub margin_v: f64,
    /// Per-unit horizontal drift correction in pixels
    pub x_fix: f64,
}

impl Style {
    /// Style with the writer defaults (Arial 35, top-center, 2px outline)
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            font_name: "Arial".to_string(),
            font_size: 35.0,
            formatting: TextFormatting::empty(),
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            outline: 2.0,
            shadow: 0.0,
            alignment: 8,
            margin_l: 10.0,
            margin_r: 20.0,
            margin_v: 10.0,
            x_fix: 0.0,
        }
    }

    /// Resolve a parsed style definition
    ///
    /// # Example
    ///
    /// ```rust
    /// # use ass_fx::{parser::StyleDef, style::Style};
    /// let def = StyleDef { fontsize: "36", alignment: "8", ..StyleDef::default() };
    /// let style = Style::from_def(&def, 1.5)?;
    /// assert_eq!(style.font_size, 36.0);
    /// assert_eq!(style.x_fix, 1.5);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`FxError::InvalidNumeric`](crate::FxError::InvalidNumeric) if
    /// any numeric field does not parse.
    pub fn from_def(def: &StyleDef<'_>, x_fix: f64) -> Result<Self> {
        let mut formatting = TextFormatting::empty();
        formatting.set(TextFormatting::BOLD, parse_flag(def.bold, "bold")?);
        formatting.set(TextFormatting::ITALIC, parse_flag(def.italic, "italic")?);
        formatting.set(
            TextFormatting::UNDERLINE,
            parse_flag(def.underline, "underline")?,
        );
        formatting.set(
            TextFormatting::STRIKE_OUT,
            parse_flag(def.strikeout, "strikeout")?,
        );

        let font_name = if def.fontname.is_empty() {
            "Arial".to_string()
        } else {
            def.fontname.to_string()
        };

        Ok(Self {
            name: def.name.to_string(),
            font_name,
            font_size: parse_field(def.fontsize, "font size")?,
            formatting,
            scale_x: parse_field(def.scale_x, "scale x")?,
            scale_y: parse_field(def.scale_y, "scale y")?,
            spacing: parse_field(def.spacing, "spacing")?,
            angle: parse_field(def.angle, "angle")?,
            outline: parse_field(def.outline, "outline")?,
            shadow: parse_field(def.shadow, "shadow")?,
            alignment: parse_field(def.alignment, "alignment")?,
            margin_l: parse_field(def.margin_l, "left margin")?,
            margin_r: parse_field(def.margin_r, "right margin")?,
            margin_v: parse_field(def.margin_v, "vertical margin")?,
            x_fix,
        })
    }

    /// Alignment, `None` when the code is outside 1-9
    #[must_use]
    pub const fn alignment(&self) -> Option<Alignment> {
        Alignment::from_code(self.alignment)
    }

    #[must_use]
    pub const fn is_bold(&self) -> bool {
        self.formatting.contains(TextFormatting::BOLD)
    }

    #[must_use]
    pub const fn is_italic(&self) -> bool {
        self.formatting.contains(TextFormatting::ITALIC)
    }
}

#[cfg(feature = "serde")]
mod formatting_bits {
    use super::TextFormatting;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &TextFormatting, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(value.bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TextFormatting, D::Error> {
        u8::deserialize(d).map(TextFormatting::from_bits_truncate)
    }
}
