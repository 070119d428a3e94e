//! Style lines for generated scripts

use crate::color::Color;
use crate::parser::StyleDef;
use crate::style::{Style, TextFormatting};
use crate::utils::{parse_field, Result};

/// Style written to the `[V4+ Styles]` section
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputStyle {
    /// Numeric style fields
    pub style: Style,
    pub primary_colour: Color,
    /// Karaoke fill colour
    pub secondary_colour: Color,
    pub outline_colour: Color,
    pub back_colour: Color,
    /// 1 = outline and shadow, 3 = opaque box
    pub border_style: u8,
    pub encoding: u8,
}

impl OutputStyle {
    /// White text, blue karaoke fill, black outline and shadow
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            style: Style::new(name),
            primary_colour: Color::WHITE,
            secondary_colour: Color::BLUE,
            outline_colour: Color::BLACK,
            back_colour: Color::BLACK,
            border_style: 1,
            encoding: 1,
        }
    }

    /// Carry a parsed style definition over to the output
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or colour field does not parse.
    pub fn from_def(def: &StyleDef<'_>, x_fix: f64) -> Result<Self> {
        Ok(Self {
            style: Style::from_def(def, x_fix)?,
            primary_colour: Color::from_ass(def.primary_colour)?,
            secondary_colour: Color::from_ass(def.secondary_colour)?,
            outline_colour: Color::from_ass(def.outline_colour)?,
            back_colour: Color::from_ass(def.back_colour)?,
            border_style: parse_field(def.border_style, "border style")?,
            encoding: parse_field(def.encoding, "encoding")?,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.style.name
    }

    /// Render as a V4+ `Style:` line
    ///
    /// ```rust
    /// # use ass_fx::writer::OutputStyle;
    /// let line = OutputStyle::new("Karaoke").to_ass_string();
    /// assert!(line.starts_with("Style: Karaoke,Arial,35,&H00FFFFFF,&H00FF0000,"));
    /// ```
    #[must_use]
    pub fn to_ass_string(&self) -> String {
        let s = &self.style;
        let flag = |bit: TextFormatting| if s.formatting.contains(bit) { "-1" } else { "0" };

        format!(
            "Style: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            s.name,
            s.font_name,
            s.font_size,
            self.primary_colour.to_ass_style(),
            self.secondary_colour.to_ass_style(),
            self.outline_colour.to_ass_style(),
            self.back_colour.to_ass_style(),
            flag(TextFormatting::BOLD),
            flag(TextFormatting::ITALIC),
            flag(TextFormatting::UNDERLINE),
            flag(TextFormatting::STRIKE_OUT),
            s.scale_x,
            s.scale_y,
            s.spacing,
            s.angle,
            self.border_style,
            s.outline,
            s.shadow,
            s.alignment,
            s.margin_l,
            s.margin_r,
            s.margin_v,
            self.encoding
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FxError;
    use pretty_assertions::assert_eq;

    #[test]
    fn reproduces_definition() {
        let def = StyleDef {
            name: "Romaji",
            fontname: "Verdana",
            fontsize: "36",
            bold: "-1",
            scale_x: "95.5",
            alignment: "8",
            margin_v: "25",
            ..StyleDef::default()
        };
        let style = OutputStyle::from_def(&def, 0.0).unwrap();
        assert_eq!(
            style.to_ass_string(),
            "Style: Romaji,Verdana,36,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,-1,0,0,0,95.5,100,0,0,1,2,0,8,10,10,25,1"
        );
    }

    #[test]
    fn rejects_bad_colour() {
        let def = StyleDef {
            primary_colour: "white",
            ..StyleDef::default()
        };
        assert!(matches!(
            OutputStyle::from_def(&def, 0.0),
            Err(FxError::InvalidColor(_))
        ));
    }
}
