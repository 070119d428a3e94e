//! Generated script document and ASS serialization
//!
//! [`OutputScript`] collects styles and dialogues produced by an effect and
//! renders them as a complete `.ass` file. Scripts without a video get a
//! dummy video and silent audio reference so they open directly in editors.

mod style;

pub use style::OutputStyle;

use std::fs;
use std::path::Path;

use crate::color::Color;
use crate::karaoke::Resolution;
use crate::utils::Result;

/// NTSC film frame rate (24000/1001)
pub const FPS_NTSC_FILM: f64 = 24000.0 / 1001.0;

const DUMMY_AUDIO: &str = "dummy-audio:silence?sr=44100&bd=16&ch=1&ln=396900000:";
const DUMMY_VIDEO_SECONDS: u32 = 600;

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";
const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
    OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, \
    Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

/// `[Script Info]` and project metadata
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptMetadata {
    /// Header comment written as the first `;` line
    pub comment: String,
    pub title: String,
    pub original_script: String,
    pub translation: String,
    pub timing: String,
    /// Path the script was last saved to
    pub file_name: String,
    /// Empty for a generated dummy video
    pub video_path: String,
    pub video_zoom: f64,
    pub video_position: u32,
    pub video_aspect_ratio: f64,
    /// Empty to derive from the video path
    pub audio: String,
}

impl Default for ScriptMetadata {
    fn default() -> Self {
        Self {
            comment: "Script generated by ass-fx".to_string(),
            title: "Default ass-fx file".to_string(),
            original_script: String::new(),
            translation: String::new(),
            timing: String::new(),
            file_name: String::new(),
            video_path: String::new(),
            video_zoom: 0.75,
            video_position: 0,
            video_aspect_ratio: 0.0,
            audio: String::new(),
        }
    }
}

/// Event written to `[Events]`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputDialogue {
    pub layer: u32,
    /// Start in ASS time format
    pub start: String,
    /// End in ASS time format
    pub end: String,
    pub style: String,
    pub actor: String,
    pub effect: String,
    /// Override tags written as a leading `{...}` block
    pub tags: String,
    pub text: String,
    /// Written as `Comment:` instead of `Dialogue:`
    pub comment: bool,
}

impl OutputDialogue {
    /// Five-second `Default` dialogue
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            layer: 0,
            start: "0:00:00.00".to_string(),
            end: "0:00:05.00".to_string(),
            style: "Default".to_string(),
            actor: String::new(),
            effect: String::new(),
            tags: String::new(),
            text: text.into(),
            comment: false,
        }
    }

    /// Render as an `[Events]` line
    ///
    /// ```rust
    /// # use ass_fx::writer::OutputDialogue;
    /// let mut dialogue = OutputDialogue::new("ka");
    /// dialogue.tags = "\\an5\\pos(100,50)".to_string();
    /// assert_eq!(
    ///     dialogue.to_ass_string(),
    ///     "Dialogue: 0,0:00:00.00,0:00:05.00,Default,,0,0,0,,{\\an5\\pos(100,50)}ka"
    /// );
    /// ```
    #[must_use]
    pub fn to_ass_string(&self) -> String {
        let kind = if self.comment { "Comment" } else { "Dialogue" };
        let tags = if self.tags.is_empty() {
            String::new()
        } else {
            format!("{{{}}}", self.tags)
        };
        format!(
            "{kind}: {},{},{},{},{},0,0,0,{},{tags}{}",
            self.layer, self.start, self.end, self.style, self.actor, self.effect, self.text
        )
    }
}

/// Generated subtitle script
#[derive(Debug, Clone, PartialEq)]
pub struct OutputScript {
    pub metadata: ScriptMetadata,
    pub resolution: Resolution,
    styles: Vec<OutputStyle>,
    dialogues: Vec<OutputDialogue>,
}

impl Default for OutputScript {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputScript {
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: ScriptMetadata::default(),
            resolution: Resolution::DEFAULT,
            styles: Vec::new(),
            dialogues: Vec::new(),
        }
    }

    /// Add a style unless one with the same name exists
    ///
    /// Returns `false` when the style was already present.
    pub fn add_style(&mut self, style: OutputStyle) -> bool {
        if self.style(style.name()).is_some() {
            log::debug!("style {:?} already present, keeping the first", style.name());
            return false;
        }
        self.styles.push(style);
        true
    }

    #[must_use]
    pub fn style(&self, name: &str) -> Option<&OutputStyle> {
        self.styles.iter().find(|style| style.name() == name)
    }

    #[must_use]
    pub fn styles(&self) -> &[OutputStyle] {
        &self.styles
    }

    /// Append a dialogue; dialogues with empty text are dropped
    pub fn add_dialogue(&mut self, dialogue: OutputDialogue) {
        if dialogue.text.is_empty() {
            log::trace!("dropping dialogue with empty text at {}", dialogue.start);
            return;
        }
        self.dialogues.push(dialogue);
    }

    #[must_use]
    pub fn dialogues(&self) -> &[OutputDialogue] {
        &self.dialogues
    }

    fn video_and_audio(&self) -> (String, String) {
        let video = if self.metadata.video_path.is_empty() {
            dummy_video(
                FPS_NTSC_FILM,
                self.resolution,
                Color::BLACK,
                false,
                DUMMY_VIDEO_SECONDS,
            )
        } else {
            self.metadata.video_path.clone()
        };

        let audio = if !self.metadata.audio.is_empty() {
            self.metadata.audio.clone()
        } else if video.starts_with("?dummy") {
            DUMMY_AUDIO.to_string()
        } else {
            video.clone()
        };
        (video, audio)
    }

    /// Render the complete script
    #[must_use]
    pub fn to_ass_string(&self) -> String {
        let meta = &self.metadata;
        let (video, audio) = self.video_and_audio();
        let mut out = String::with_capacity(1024 + self.dialogues.len() * 96);

        out.push_str("[Script Info]\n");
        if !meta.comment.is_empty() {
            out.push_str(&format!("; {}\n", meta.comment));
        }
        out.push_str(&format!("Title: {}\n", meta.title));
        for (key, value) in [
            ("Original Script", &meta.original_script),
            ("Original Translation", &meta.translation),
            ("Original Timing", &meta.timing),
        ] {
            if !value.is_empty() {
                out.push_str(&format!("{key}: {value}\n"));
            }
        }
        out.push_str("ScriptType: v4.00+\n");
        out.push_str("WrapStyle: 0\n");
        out.push_str("ScaledBorderAndShadow: yes\n");
        out.push_str(&format!("PlayResX: {}\n", self.resolution.width));
        out.push_str(&format!("PlayResY: {}\n", self.resolution.height));

        out.push_str("\n[Aegisub Project Garbage]\n");
        out.push_str(&format!("Audio File: {audio}\n"));
        out.push_str(&format!("Video File: {video}\n"));
        if meta.video_aspect_ratio > 0.0 {
            out.push_str(&format!("Video AR Value: {:.6}\n", meta.video_aspect_ratio));
        }
        out.push_str(&format!("Video Zoom Percent: {:.6}\n", meta.video_zoom));
        out.push_str(&format!("Video Position: {}\n", meta.video_position));

        out.push_str("\n[V4+ Styles]\n");
        out.push_str(STYLE_FORMAT);
        out.push('\n');
        for style in &self.styles {
            out.push_str(&style.to_ass_string());
            out.push('\n');
        }

        out.push_str("\n[Events]\n");
        out.push_str(EVENT_FORMAT);
        out.push('\n');
        for dialogue in &self.dialogues {
            out.push_str(&dialogue.to_ass_string());
            out.push('\n');
        }
        out
    }

    /// Write the script with a UTF-8 BOM, recording `path` as its file name
    ///
    /// # Errors
    ///
    /// Returns [`FxError::Io`](crate::FxError::Io) if the file cannot be written.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.metadata.file_name = path.display().to_string();
        fs::write(path, format!("\u{feff}{}", self.to_ass_string()))?;
        log::info!(
            "wrote {} dialogues to {}",
            self.dialogues.len(),
            path.display()
        );
        Ok(())
    }
}

/// Aegisub dummy video reference
///
/// ```rust
/// use ass_fx::{writer::{dummy_video, FPS_NTSC_FILM}, Color, Resolution};
///
/// let video = dummy_video(FPS_NTSC_FILM, Resolution { width: 1280, height: 720 }, Color::BLACK, true, 10);
/// assert_eq!(video, "?dummy:23.976000:239:1280:720:0:0:0c:");
/// ```
#[must_use]
pub fn dummy_video(
    fps: f64,
    resolution: Resolution,
    color: Color,
    checkerboard: bool,
    seconds: u32,
) -> String {
    let fps = (fps * 1000.0).round() / 1000.0;
    let frames = (f64::from(seconds) * fps).floor() as u64;
    format!(
        "?dummy:{fps:.6}:{frames}:{}:{}:{}:{}:{}{}:",
        resolution.width,
        resolution.height,
        color.r,
        color.g,
        color.b,
        if checkerboard { "c" } else { "" }
    )
}
