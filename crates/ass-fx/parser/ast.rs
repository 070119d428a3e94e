//! AST nodes for the sections an effect pipeline reads
//!
//! All nodes borrow from the source text. Numeric interpretation happens
//! on demand so structural parsing never fails on a bad value.

use crate::utils::{parse_ass_time, parse_field, Result};

/// Field order used when a section has no `Format:` line
pub const DEFAULT_EVENT_FORMAT: &[&str] = &[
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

/// V4+ style field order
pub const DEFAULT_STYLE_FORMAT: &[&str] = &[
    "Name",
    "Fontname",
    "Fontsize",
    "PrimaryColour",
    "SecondaryColour",
    "OutlineColour",
    "BackColour",
    "Bold",
    "Italic",
    "Underline",
    "StrikeOut",
    "ScaleX",
    "ScaleY",
    "Spacing",
    "Angle",
    "BorderStyle",
    "Outline",
    "Shadow",
    "Alignment",
    "MarginL",
    "MarginR",
    "MarginV",
    "Encoding",
];

/// Event from [Events] section (dialogue, comments, etc.)
///
/// # Examples
///
/// ```rust
/// use ass_fx::parser::ast::{Event, EventType};
///
/// let event = Event {
///     event_type: EventType::Dialogue,
///     start: "0:00:05.00",
///     end: "0:00:10.00",
///     text: "{\\k50}ka{\\k50}ra",
///     ..Event::default()
/// };
///
/// assert!(event.is_dialogue());
/// assert_eq!(event.start_time_cs()?, 500);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<'a> {
    /// Event type (Dialogue, Comment, etc.)
    pub event_type: EventType,

    /// Layer for drawing order (higher layers drawn on top)
    pub layer: &'a str,

    /// Start time in ASS time format (H:MM:SS.CS)
    pub start: &'a str,

    /// End time in ASS time format (H:MM:SS.CS)
    pub end: &'a str,

    /// Style name reference
    pub style: &'a str,

    /// Character name or speaker
    pub name: &'a str,

    /// Left margin override (pixels)
    pub margin_l: &'a str,

    /// Right margin override (pixels)
    pub margin_r: &'a str,

    /// Vertical margin override (pixels)
    pub margin_v: &'a str,

    /// Effect field
    pub effect: &'a str,

    /// Text content with possible override blocks
    pub text: &'a str,
}

/// Event type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Dialogue line (displayed during playback)
    Dialogue,

    /// Comment (ignored during playback)
    Comment,

    /// Picture display event
    Picture,

    /// Sound playback event
    Sound,

    /// Movie playback event
    Movie,

    /// Command execution event
    Command,
}

impl EventType {
    /// Parse event type from its line prefix
    ///
    /// ```rust
    /// # use ass_fx::parser::ast::EventType;
    /// assert_eq!(EventType::parse_type("Comment"), Some(EventType::Comment));
    /// assert_eq!(EventType::parse_type("Unknown"), None);
    /// ```
    #[must_use]
    pub fn parse_type(s: &str) -> Option<Self> {
        match s.trim() {
            "Dialogue" => Some(Self::Dialogue),
            "Comment" => Some(Self::Comment),
            "Picture" => Some(Self::Picture),
            "Sound" => Some(Self::Sound),
            "Movie" => Some(Self::Movie),
            "Command" => Some(Self::Command),
            _ => None,
        }
    }

    /// Canonical ASS event type name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dialogue => "Dialogue",
            Self::Comment => "Comment",
            Self::Picture => "Picture",
            Self::Sound => "Sound",
            Self::Movie => "Movie",
            Self::Command => "Command",
        }
    }
}

impl Event<'_> {
    /// Check if this is a dialogue event
    #[must_use]
    pub const fn is_dialogue(&self) -> bool {
        matches!(self.event_type, EventType::Dialogue)
    }

    /// Check if this is a comment event
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self.event_type, EventType::Comment)
    }

    /// Start time in centiseconds
    ///
    /// # Errors
    ///
    /// Returns an error if the start field is not a valid ASS time.
    pub fn start_time_cs(&self) -> Result<u32> {
        parse_ass_time(self.start)
    }

    /// End time in centiseconds
    ///
    /// # Errors
    ///
    /// Returns an error if the end field is not a valid ASS time.
    pub fn end_time_cs(&self) -> Result<u32> {
        parse_ass_time(self.end)
    }

    /// Layer as a number, `0` when the field is empty
    ///
    /// # Errors
    ///
    /// Returns an error if the layer field is not an unsigned integer.
    pub fn layer_value(&self) -> Result<u32> {
        if self.layer.trim().is_empty() {
            Ok(0)
        } else {
            parse_field(self.layer, "layer")
        }
    }
}

impl Default for Event<'_> {
    fn default() -> Self {
        Self {
            event_type: EventType::Dialogue,
            layer: "0",
            start: "0:00:00.00",
            end: "0:00:00.00",
            style: "Default",
            name: "",
            margin_l: "0",
            margin_r: "0",
            margin_v: "0",
            effect: "",
            text: "",
        }
    }
}

/// Style definition from [V4+ Styles] section
///
/// ```rust
/// use ass_fx::parser::ast::StyleDef;
///
/// let style = StyleDef {
///     name: "Romaji",
///     fontsize: "36",
///     ..StyleDef::default()
/// };
/// assert_eq!(style.fontname, "Arial");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDef<'a> {
    /// Style name (unique within script)
    pub name: &'a str,

    /// Font family name
    pub fontname: &'a str,

    /// Font size in points
    pub fontsize: &'a str,

    /// Primary color (`&HAABBGGRR`)
    pub primary_colour: &'a str,

    /// Secondary (karaoke fill) color
    pub secondary_colour: &'a str,

    /// Outline color
    pub outline_colour: &'a str,

    /// Shadow/background color
    pub back_colour: &'a str,

    /// Bold flag (-1/0 or weight)
    pub bold: &'a str,

    /// Italic flag
    pub italic: &'a str,

    /// Underline flag
    pub underline: &'a str,

    /// Strikeout flag
    pub strikeout: &'a str,

    /// Horizontal scale percentage
    pub scale_x: &'a str,

    /// Vertical scale percentage
    pub scale_y: &'a str,

    /// Inter-character spacing in pixels
    pub spacing: &'a str,

    /// Rotation angle in degrees
    pub angle: &'a str,

    /// Border style (1=outline+shadow, 3=opaque box)
    pub border_style: &'a str,

    /// Outline width in pixels
    pub outline: &'a str,

    /// Shadow depth in pixels
    pub shadow: &'a str,

    /// Numpad alignment code
    pub alignment: &'a str,

    /// Left margin in pixels
    pub margin_l: &'a str,

    /// Right margin in pixels
    pub margin_r: &'a str,

    /// Vertical margin in pixels
    pub margin_v: &'a str,

    /// Font encoding identifier
    pub encoding: &'a str,
}

impl Default for StyleDef<'_> {
    fn default() -> Self {
        Self {
            name: "Default",
            fontname: "Arial",
            fontsize: "20",
            primary_colour: "&H00FFFFFF",
            secondary_colour: "&H000000FF",
            outline_colour: "&H00000000",
            back_colour: "&H00000000",
            bold: "0",
            italic: "0",
            underline: "0",
            strikeout: "0",
            scale_x: "100",
            scale_y: "100",
            spacing: "0",
            angle: "0",
            border_style: "1",
            outline: "2",
            shadow: "0",
            alignment: "2",
            margin_l: "10",
            margin_r: "10",
            margin_v: "10",
            encoding: "1",
        }
    }
}

/// Key-value pairs from [Script Info]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptInfo<'a> {
    /// Fields in source order
    pub fields: Vec<(&'a str, &'a str)>,
}

impl<'a> ScriptInfo<'a> {
    /// Look up a field by key
    #[must_use]
    pub fn get_field(&self, key: &str) -> Option<&'a str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
    }

    /// Script title, if set
    #[must_use]
    pub fn title(&self) -> Option<&'a str> {
        self.get_field("Title")
    }

    /// `PlayResX`/`PlayResY` when both are present and numeric
    #[must_use]
    pub fn play_resolution(&self) -> Option<(u32, u32)> {
        let x = self.get_field("PlayResX")?.trim().parse().ok()?;
        let y = self.get_field("PlayResY")?.trim().parse().ok()?;
        Some((x, y))
    }
}
