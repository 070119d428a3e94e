//! ASS script parser for the sections an effect pipeline consumes
//!
//! Reads [Script Info], [V4+ Styles] (or SSA [V4 Styles]) and [Events] into a
//! zero-copy [`Document`]. Other sections ([Fonts], [Graphics], project
//! garbage) are skipped.
//!
//! # Example
//!
//! ```rust
//! use ass_fx::parser::Document;
//!
//! let source = "[Script Info]\nPlayResX: 640\nPlayResY: 480\n\n[Events]\n\
//!               Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
//!               Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,{\\k100}hi";
//! let document = Document::parse(source)?;
//! assert_eq!(document.events().len(), 1);
//! assert_eq!(document.resolution().width, 640);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ast;
mod errors;

pub use ast::{Event, EventType, ScriptInfo, StyleDef};
pub use errors::ParseError;

use ast::{DEFAULT_EVENT_FORMAT, DEFAULT_STYLE_FORMAT};

use crate::karaoke::Resolution;

type ParseResult<T> = core::result::Result<T, ParseError>;

/// Section currently being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ScriptInfo,
    Styles,
    Events,
    Other,
}

impl Section {
    fn from_header(name: &str) -> Self {
        match name.trim() {
            "Script Info" => Self::ScriptInfo,
            "V4+ Styles" | "V4 Styles" | "V4++ Styles" => Self::Styles,
            "Events" => Self::Events,
            _ => Self::Other,
        }
    }
}

/// Parsed script borrowing from its source text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document<'a> {
    info: ScriptInfo<'a>,
    styles: Vec<StyleDef<'a>>,
    events: Vec<Event<'a>>,
}

impl<'a> Document<'a> {
    /// Parse script text
    ///
    /// A leading UTF-8 BOM is ignored. Blank lines and `;` comments are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for unclosed section headers, empty format lines,
    /// data lines with too few fields and unknown lines in [Events] or
    /// [V4+ Styles].
    pub fn parse(source: &'a str) -> ParseResult<Self> {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);

        let mut document = Self::default();
        let mut section = Section::Other;
        let mut style_format: Option<Vec<&'a str>> = None;
        let mut event_format: Option<Vec<&'a str>> = None;

        for (index, raw) in source.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with("!:") {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or(ParseError::UnclosedSectionHeader { line: line_number })?;
                section = Section::from_header(name);
                continue;
            }

            match section {
                Section::ScriptInfo => {
                    if let Some((key, value)) = line.split_once(':') {
                        document.info.fields.push((key.trim(), value.trim()));
                    }
                }
                Section::Styles => {
                    if let Some(rest) = line.strip_prefix("Format:") {
                        style_format = Some(parse_format_line(rest, line_number)?);
                    } else if let Some(data) = line.strip_prefix("Style:") {
                        let format = style_format.as_deref().unwrap_or(DEFAULT_STYLE_FORMAT);
                        document
                            .styles
                            .push(parse_style_line(data, format, line_number)?);
                    } else {
                        return Err(ParseError::InvalidStyleLine { line: line_number });
                    }
                }
                Section::Events => {
                    if let Some(rest) = line.strip_prefix("Format:") {
                        event_format = Some(parse_format_line(rest, line_number)?);
                    } else {
                        let format = event_format.as_deref().unwrap_or(DEFAULT_EVENT_FORMAT);
                        document
                            .events
                            .push(parse_event_line(line, format, line_number)?);
                    }
                }
                Section::Other => {}
            }
        }

        log::debug!(
            "parsed script: {} styles, {} events",
            document.styles.len(),
            document.events.len()
        );
        Ok(document)
    }

    /// [Script Info] fields
    #[must_use]
    pub const fn info(&self) -> &ScriptInfo<'a> {
        &self.info
    }

    /// Style definitions in source order
    #[must_use]
    pub fn styles(&self) -> &[StyleDef<'a>] {
        &self.styles
    }

    /// Events in source order
    #[must_use]
    pub fn events(&self) -> &[Event<'a>] {
        &self.events
    }

    /// Find a style by name
    #[must_use]
    pub fn style(&self, name: &str) -> Option<&StyleDef<'a>> {
        self.styles.iter().find(|style| style.name == name)
    }

    /// Script resolution, falling back to 384x288 when `PlayResX`/`PlayResY`
    /// are absent
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.info
            .play_resolution()
            .map_or(Resolution::DEFAULT, |(width, height)| Resolution {
                width,
                height,
            })
    }
}

fn parse_format_line(rest: &str, line_number: usize) -> ParseResult<Vec<&str>> {
    let fields: Vec<&str> = rest
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect();

    if fields.is_empty() {
        return Err(ParseError::InvalidFormatLine {
            line: line_number,
            reason: "no fields".to_string(),
        });
    }
    Ok(fields)
}

fn split_fields<'a>(
    data: &'a str,
    format: &[&str],
    line_number: usize,
) -> ParseResult<Vec<&'a str>> {
    // Last field absorbs remaining commas so text keeps them
    let parts: Vec<&str> = data.trim().splitn(format.len(), ',').collect();

    if parts.len() < format.len() {
        return Err(ParseError::InsufficientFields {
            expected: format.len(),
            found: parts.len(),
            line: line_number,
        });
    }
    Ok(parts)
}

fn field<'a>(format: &[&str], parts: &[&'a str], names: &[&str]) -> Option<&'a str> {
    format
        .iter()
        .position(|field| names.iter().any(|name| field.eq_ignore_ascii_case(name)))
        .and_then(|idx| parts.get(idx))
        .map(|value| value.trim())
}

fn parse_style_line<'a>(
    data: &'a str,
    format: &[&str],
    line_number: usize,
) -> ParseResult<StyleDef<'a>> {
    let parts = split_fields(data, format, line_number)?;
    let defaults = StyleDef::default();
    let get = |names: &[&str], fallback: &'a str| field(format, &parts, names).unwrap_or(fallback);

    Ok(StyleDef {
        name: get(&["Name"], defaults.name),
        fontname: get(&["Fontname"], defaults.fontname),
        fontsize: get(&["Fontsize"], defaults.fontsize),
        primary_colour: get(&["PrimaryColour"], defaults.primary_colour),
        secondary_colour: get(&["SecondaryColour"], defaults.secondary_colour),
        outline_colour: get(&["OutlineColour", "TertiaryColour"], defaults.outline_colour),
        back_colour: get(&["BackColour"], defaults.back_colour),
        bold: get(&["Bold"], defaults.bold),
        italic: get(&["Italic"], defaults.italic),
        underline: get(&["Underline"], defaults.underline),
        strikeout: get(&["StrikeOut", "Strikeout"], defaults.strikeout),
        scale_x: get(&["ScaleX"], defaults.scale_x),
        scale_y: get(&["ScaleY"], defaults.scale_y),
        spacing: get(&["Spacing"], defaults.spacing),
        angle: get(&["Angle"], defaults.angle),
        border_style: get(&["BorderStyle"], defaults.border_style),
        outline: get(&["Outline"], defaults.outline),
        shadow: get(&["Shadow"], defaults.shadow),
        alignment: get(&["Alignment"], defaults.alignment),
        margin_l: get(&["MarginL"], defaults.margin_l),
        margin_r: get(&["MarginR"], defaults.margin_r),
        margin_v: get(&["MarginV"], defaults.margin_v),
        encoding: get(&["Encoding"], defaults.encoding),
    })
}

fn parse_event_line<'a>(
    line: &'a str,
    format: &[&str],
    line_number: usize,
) -> ParseResult<Event<'a>> {
    let (kind, data) = line
        .split_once(':')
        .ok_or(ParseError::InvalidEventType { line: line_number })?;
    let event_type =
        EventType::parse_type(kind).ok_or(ParseError::InvalidEventType { line: line_number })?;

    let parts = split_fields(data, format, line_number)?;
    let get = |name: &str| field(format, &parts, &[name]).unwrap_or("");

    Ok(Event {
        event_type,
        layer: get("Layer"),
        start: get("Start"),
        end: get("End"),
        style: get("Style"),
        name: get("Name"),
        margin_l: get("MarginL"),
        margin_r: get("MarginR"),
        margin_v: get("MarginV"),
        effect: get("Effect"),
        text: get("Text"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCRIPT: &str = "\u{feff}[Script Info]
; comment line
Title: Karaoke
PlayResX: 1280
PlayResY: 720

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Romaji,Verdana,36,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,2,0,8,15,15,20,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Comment: 0,0:00:00.00,0:00:01.00,Romaji,,0,0,0,karaoke,note
Dialogue: 1,0:00:01.00,0:00:03.00,Romaji,Singer,0,0,0,,{\\k50}ka, {\\k50}ra

[Fonts]
fontname: something.ttf
";

    #[test]
    fn parses_sections() {
        let document = Document::parse(SCRIPT).unwrap();

        assert_eq!(document.info().title(), Some("Karaoke"));
        assert_eq!(
            document.resolution(),
            Resolution {
                width: 1280,
                height: 720
            }
        );

        let style = document.style("Romaji").unwrap();
        assert_eq!(style.fontname, "Verdana");
        assert_eq!(style.bold, "-1");
        assert_eq!(style.alignment, "8");

        assert_eq!(document.events().len(), 2);
        assert!(document.events()[0].is_comment());
        let dialogue = &document.events()[1];
        assert!(dialogue.is_dialogue());
        assert_eq!(dialogue.layer, "1");
        assert_eq!(dialogue.name, "Singer");
        assert_eq!(dialogue.text, "{\\k50}ka, {\\k50}ra");
    }

    #[test]
    fn missing_resolution_defaults() {
        let document = Document::parse("[Script Info]\nTitle: x\n").unwrap();
        assert_eq!(document.resolution(), Resolution::DEFAULT);
        assert!(document.style("Default").is_none());
    }

    #[test]
    fn events_without_format_use_default_order() {
        let document =
            Document::parse("[Events]\nDialogue: 0,0:00:00.00,0:00:01.00,Main,,0,0,0,,a,b")
                .unwrap();
        assert_eq!(document.events()[0].style, "Main");
        assert_eq!(document.events()[0].text, "a,b");
    }

    #[test]
    fn ssa_style_aliases() {
        let source = "[V4 Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, TertiaryColour, BackColour, Bold, Italic, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, AlphaLevel, Encoding
Style: Old,Tahoma,24,16777215,255,65280,0,0,0,1,2,0,2,10,10,10,0,0";
        let document = Document::parse(source).unwrap();
        let style = document.style("Old").unwrap();
        assert_eq!(style.outline_colour, "65280");
        assert_eq!(style.scale_x, "100");
    }

    #[test]
    fn structural_errors() {
        assert_eq!(
            Document::parse("[Events").unwrap_err(),
            ParseError::UnclosedSectionHeader { line: 1 }
        );
        assert_eq!(
            Document::parse("[Events]\nBogus: 1,2").unwrap_err(),
            ParseError::InvalidEventType { line: 2 }
        );
        assert!(matches!(
            Document::parse("[Events]\nDialogue: 0,0:00:00.00"),
            Err(ParseError::InsufficientFields { line: 2, .. })
        ));
        assert!(matches!(
            Document::parse("[V4+ Styles]\nFormat: ,\n"),
            Err(ParseError::InvalidFormatLine { line: 2, .. })
        ));
        assert_eq!(
            Document::parse("[V4+ Styles]\nNope").unwrap_err(),
            ParseError::InvalidStyleLine { line: 2 }
        );
    }
}
