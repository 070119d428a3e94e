//! Effect orchestration
//!
//! [`FxScript`] owns the input dialogues, one resolved style and one loaded
//! face per style, and the output document. Lines are built on request;
//! syllables and characters are derived from a line only when asked for,
//! so effects that never look below line level pay nothing for them.
//!
//! # Example
//!
//! ```rust
//! use ass_fx::{Document, FxConfig, FxScript, metrics::MonospaceMetrics};
//!
//! let source = "[Script Info]\nPlayResX: 640\nPlayResY: 360\n\n[V4+ Styles]\n\
//!     Style: Default,Arial,30,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,0,8,10,10,10,1\n\n\
//!     [Events]\nDialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,{\\k50}ka{\\k50}ra";
//! let document = Document::parse(source)?;
//! let config = FxConfig { keep_original: false, ..FxConfig::default() };
//! let mut fx = FxScript::new(&document, MonospaceMetrics::new(15.0), config)?;
//!
//! let lines = fx.lines()?;
//! let chars = fx.chars(&lines[0])?;
//! assert_eq!(chars.len(), 4);
//! for mut ch in chars {
//!     ch.unit.tags = format!("{}\\t(0,200,\\fscx120)", ch.unit.pos_tag());
//!     fx.add(&ch);
//! }
//! assert_eq!(fx.output().dialogues().len(), 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod unit;

pub use unit::{Character, DialogueUnit, Emit, Line, Syllable};

use std::any::{type_name, Any};
use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;

use crate::karaoke::{
    extract_syllables,
    geometry::{character_geometry, line_geometry, syllable_geometry},
    strip_override_tags,
    timing::{resolve_syllable_times, split_character_times},
    Interval, Resolution, Size, UnitMetrics,
};
use crate::metrics::FontMetrics;
use crate::parser::{Document, Event};
use crate::style::Style;
use crate::utils::{cs_to_ms, ms_to_ass, trim_space_count, FxError, Result};
use crate::writer::{OutputDialogue, OutputScript, OutputStyle};

/// Style used when a dialogue references an undefined style
pub const FALLBACK_STYLE: &str = "Default";

const ORIGINAL_MARKER: &str = "### Original Karaoke ###";
const EFFECT_MARKER: &str = "### Karaoke Effect ###";

/// Effect generation settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxConfig {
    /// Milliseconds added to every emitted start and end time
    pub shift_ms: i32,
    /// Per-unit horizontal drift correction in pixels
    pub x_fix: f64,
    /// Font size multiplier used while measuring
    pub supersampling: u32,
    /// Write the source karaoke as commented events ahead of the effect
    pub keep_original: bool,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            shift_ms: 0,
            x_fix: 0.0,
            supersampling: 1,
            keep_original: true,
        }
    }
}

/// Input event with times and style resolved
#[derive(Debug, Clone)]
struct SourceDialogue {
    layer: u32,
    interval: Interval,
    style: String,
    actor: String,
    effect: String,
    text: String,
    comment: bool,
}

impl SourceDialogue {
    fn from_event(event: &Event<'_>, style: String) -> Result<Self> {
        let start = cs_to_ms(event.start_time_cs()?);
        let end = cs_to_ms(event.end_time_cs()?);
        if end < start {
            log::warn!(
                "event {}-{} ends before it starts, clamping to zero duration",
                event.start,
                event.end
            );
        }

        Ok(Self {
            layer: event.layer_value()?,
            interval: Interval::new(start, end),
            style,
            actor: event.name.to_string(),
            effect: event.effect.to_string(),
            text: event.text.to_string(),
            comment: event.is_comment(),
        })
    }
}

/// Karaoke effect generator
pub struct FxScript<M: FontMetrics> {
    config: FxConfig,
    resolution: Resolution,
    metrics: M,
    styles: AHashMap<String, Arc<Style>>,
    faces: AHashMap<String, M::Face>,
    dialogues: Vec<SourceDialogue>,
    output: OutputScript,
}

impl<M: FontMetrics> FxScript<M> {
    /// Prepare an effect over `document`
    ///
    /// Resolves every style, loads one face per style, copies the script
    /// metadata and seeds the output with all input styles (and, when
    /// `keep_original` is set, the source events as comments).
    ///
    /// # Errors
    ///
    /// Fails on invalid style or event fields, undefined styles without a
    /// `Default` fallback, and fonts that cannot be loaded.
    pub fn new(document: &Document<'_>, metrics: M, config: FxConfig) -> Result<Self> {
        let resolution = document.resolution();
        let mut output = OutputScript::new();
        output.resolution = resolution;
        copy_metadata(document, &mut output);

        let supersampling = f64::from(config.supersampling.max(1));
        let mut styles = AHashMap::new();
        let mut faces = AHashMap::new();
        for def in document.styles() {
            let out_style = OutputStyle::from_def(def, config.x_fix)?;
            let style = Arc::new(out_style.style.clone());
            let face = metrics.load_font(&style, style.font_size * supersampling)?;

            faces.insert(style.name.clone(), face);
            styles.insert(style.name.clone(), style);
            output.add_style(out_style);
        }

        let dialogues = document
            .events()
            .iter()
            .filter(|event| event.is_dialogue() || event.is_comment())
            .map(|event| {
                let style = resolve_style_name(&styles, event.style)?;
                SourceDialogue::from_event(event, style)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut fx = Self {
            config,
            resolution,
            metrics,
            styles,
            faces,
            dialogues,
            output,
        };
        if config.keep_original {
            fx.write_original();
        }

        log::info!(
            "prepared effect: {} styles, {} dialogues at {}x{}",
            fx.styles.len(),
            fx.dialogues.len(),
            resolution.width,
            resolution.height
        );
        Ok(fx)
    }

    fn write_original(&mut self) {
        let marker = |text: &str| OutputDialogue {
            comment: true,
            ..OutputDialogue::new(text)
        };

        self.output.add_dialogue(marker(ORIGINAL_MARKER));
        for dialogue in &self.dialogues {
            self.output.add_dialogue(OutputDialogue {
                layer: dialogue.layer,
                start: ms_to_ass(dialogue.interval.start),
                end: ms_to_ass(dialogue.interval.end),
                style: dialogue.style.clone(),
                actor: dialogue.actor.clone(),
                effect: dialogue.effect.clone(),
                tags: String::new(),
                text: dialogue.text.clone(),
                comment: true,
            });
        }
        self.output.add_dialogue(marker(EFFECT_MARKER));
    }

    #[must_use]
    pub const fn config(&self) -> &FxConfig {
        &self.config
    }

    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Number of input dialogue and comment events
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.dialogues.len()
    }

    /// Resolved style by name
    #[must_use]
    pub fn style(&self, name: &str) -> Option<&Arc<Style>> {
        self.styles.get(name)
    }

    /// All resolved styles, in no particular order
    pub fn styles(&self) -> impl Iterator<Item = &Arc<Style>> {
        self.styles.values()
    }

    /// Register a new style for emitted units
    ///
    /// The style is added to the output (first definition wins) and loaded
    /// for measurement so units restyled with it can be decomposed.
    ///
    /// # Errors
    ///
    /// Returns [`FxError::FontLoad`] if its face cannot be loaded.
    pub fn add_style(&mut self, mut style: OutputStyle) -> Result<Arc<Style>> {
        if let Some(existing) = self.styles.get(style.name()) {
            return Ok(Arc::clone(existing));
        }

        style.style.x_fix = self.config.x_fix;
        let resolved = Arc::new(style.style.clone());
        let size = resolved.font_size * f64::from(self.config.supersampling.max(1));
        let face = self.metrics.load_font(&resolved, size)?;

        self.faces.insert(resolved.name.clone(), face);
        self.styles
            .insert(resolved.name.clone(), Arc::clone(&resolved));
        self.output.add_style(style);
        Ok(resolved)
    }

    fn face(&self, style: &Style) -> Result<&M::Face> {
        self.faces
            .get(&style.name)
            .ok_or_else(|| FxError::MissingStyle(style.name.clone()))
    }

    fn measure(&self, face: &M::Face, text: &str, style: &Style) -> Size {
        self.fit(self.metrics.measure(face, text), style)
    }

    fn measure_all(&self, face: &M::Face, texts: &[&str], style: &Style) -> Vec<Size> {
        self.metrics
            .measure_all(face, texts)
            .into_iter()
            .map(|raw| self.fit(raw, style))
            .collect()
    }

    /// Undo supersampling and apply the style scale
    fn fit(&self, raw: Size, style: &Style) -> Size {
        let supersampling = f64::from(self.config.supersampling.max(1));
        Size::new(raw.width / supersampling, raw.height / supersampling)
            .scaled(style.scale_x, style.scale_y)
    }

    /// Positioned lines for every non-comment event, in input order
    ///
    /// # Errors
    ///
    /// Returns [`FxError::InvalidKaraokeDuration`] if a line's karaoke tags
    /// are malformed.
    pub fn lines(&self) -> Result<Vec<Line>> {
        let lines = self
            .dialogues
            .iter()
            .filter(|dialogue| !dialogue.comment)
            .enumerate()
            .map(|(index, dialogue)| self.build_line(index, dialogue))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("built {} lines", lines.len());
        Ok(lines)
    }

    fn build_line(&self, index: usize, dialogue: &SourceDialogue) -> Result<Line> {
        let style = self
            .styles
            .get(&dialogue.style)
            .cloned()
            .ok_or_else(|| FxError::MissingStyle(dialogue.style.clone()))?;
        let face = self.face(&style)?;

        let text = strip_override_tags(&dialogue.text);
        let size = self.measure(face, &text, &style);
        let geometry = line_geometry(&style, self.resolution, size);

        let syllables = extract_syllables(&dialogue.text)?;
        let char_n = syllables
            .iter()
            .map(|syllable| syllable.text.trim().chars().count())
            .sum();

        Ok(Line {
            unit: DialogueUnit {
                layer: dialogue.layer,
                start_time: dialogue.interval.start,
                end_time: dialogue.interval.end,
                style,
                actor: dialogue.actor.clone(),
                effect: dialogue.effect.clone(),
                tags: String::new(),
                text,
                comment: false,
                size,
                geometry,
            },
            kara: dialogue.text.clone(),
            syl_n: syllables.len(),
            char_n,
            index,
            syllables,
        })
    }

    /// Rendered syllables of `line`
    ///
    /// Whitespace-only karaoke syllables are not returned; their time and
    /// width are absorbed by their neighbours.
    ///
    /// # Errors
    ///
    /// Returns [`FxError::MissingStyle`] if the line's style was never loaded.
    pub fn syllables(&self, line: &Line) -> Result<Vec<Syllable>> {
        let style = &line.unit.style;
        let face = self.face(style)?;
        let space_width = self.measure(face, " ", style).width;

        let trimmed: Vec<(&str, usize, usize)> = line
            .syllables
            .iter()
            .map(|syllable| trim_space_count(&syllable.text))
            .collect();
        let texts: Vec<&str> = trimmed.iter().map(|(text, _, _)| *text).collect();
        let sizes = self.measure_all(face, &texts, style);

        let units: Vec<UnitMetrics> = line
            .syllables
            .iter()
            .zip(&trimmed)
            .zip(&sizes)
            .map(|((syllable, &(_, leading_spaces, trailing_spaces)), size)| UnitMetrics {
                size: Size::new(size.width, line.unit.height()),
                leading_spaces,
                trailing_spaces,
                rendered: !syllable.is_gap(),
            })
            .collect();

        let times = resolve_syllable_times(line.unit.interval(), &line.syllables);
        let placements =
            syllable_geometry(style, self.resolution, &line.unit.geometry, &units, space_width);

        let rendered = line
            .syllables
            .iter()
            .zip(texts)
            .zip(&units)
            .filter(|(_, unit)| unit.rendered)
            .map(|((syllable, text), unit)| (syllable, text, unit.size));

        let syllables: Vec<Syllable> = rendered
            .zip(times)
            .zip(placements)
            .enumerate()
            .map(|(index, (((syllable, text, size), time), geometry))| Syllable {
                unit: DialogueUnit {
                    start_time: time.start,
                    end_time: time.end,
                    tags: String::new(),
                    text: text.to_string(),
                    size,
                    geometry,
                    ..line.unit.clone()
                },
                inline: syllable.inline.clone(),
                kind: syllable.kind,
                index,
            })
            .collect();

        log::debug!(
            "line {}: {} syllables from {} karaoke tags",
            line.index,
            syllables.len(),
            line.syl_n
        );
        Ok(syllables)
    }

    /// Characters of every rendered syllable of `line`
    ///
    /// # Errors
    ///
    /// Returns [`FxError::MissingStyle`] if the line's style was never loaded.
    pub fn chars(&self, line: &Line) -> Result<Vec<Character>> {
        let mut chars = Vec::with_capacity(line.char_n);
        for syllable in self.syllables(line)? {
            let offset = chars.len();
            chars.extend(self.split_syllable(&syllable, offset)?);
        }
        log::debug!("line {}: {} characters", line.index, chars.len());
        Ok(chars)
    }

    /// Characters of one syllable, numbered from `first_index`
    ///
    /// # Errors
    ///
    /// Returns [`FxError::MissingStyle`] if the syllable's style was never loaded.
    pub fn split_syllable(&self, syllable: &Syllable, first_index: usize) -> Result<Vec<Character>> {
        let style = &syllable.unit.style;
        let face = self.face(style)?;

        let glyphs: Vec<(usize, char)> = syllable.unit.text.char_indices().collect();
        let texts: Vec<&str> = glyphs
            .iter()
            .map(|&(at, ch)| &syllable.unit.text[at..at + ch.len_utf8()])
            .collect();
        let widths: Vec<f64> = self
            .measure_all(face, &texts, style)
            .iter()
            .map(|size| size.width)
            .collect();
        let glyphs: Vec<(char, f64)> = glyphs
            .into_iter()
            .map(|(_, ch)| ch)
            .zip(widths.iter().copied())
            .collect();

        let times = split_character_times(syllable.unit.interval(), glyphs.len());
        let placements = character_geometry(style, &syllable.unit.geometry, &widths);

        Ok(glyphs
            .into_iter()
            .zip(times)
            .zip(placements)
            .enumerate()
            .map(|(offset, (((ch, width), time), geometry))| Character {
                unit: DialogueUnit {
                    start_time: time.start,
                    end_time: time.end,
                    text: ch.to_string(),
                    size: Size::new(width, syllable.unit.height()),
                    geometry,
                    ..syllable.unit.clone()
                },
                inline: syllable.inline.clone(),
                syllable_time: syllable.unit.interval(),
                syllable_index: syllable.index,
                index: first_index + offset,
            })
            .collect())
    }

    /// Emit a unit, shifting its times by the configured offset
    pub fn add(&mut self, unit: &impl Emit) {
        let dialogue = unit.unit().to_output(self.config.shift_ms);
        self.output.add_dialogue(dialogue);
    }

    /// Emit a value whose concrete type is only known at runtime
    ///
    /// # Errors
    ///
    /// Returns the non-fatal [`FxError::UnsupportedUnit`] when `value` is not
    /// a [`Line`], [`Syllable`], [`Character`] or [`DialogueUnit`]; nothing
    /// is emitted in that case.
    pub fn add_any<T: Any>(&mut self, value: &T) -> Result<()> {
        let any = value as &dyn Any;
        let unit = any
            .downcast_ref::<Line>()
            .map(Emit::unit)
            .or_else(|| any.downcast_ref::<Syllable>().map(Emit::unit))
            .or_else(|| any.downcast_ref::<Character>().map(Emit::unit))
            .or_else(|| any.downcast_ref::<DialogueUnit>());

        match unit {
            Some(unit) => {
                let dialogue = unit.to_output(self.config.shift_ms);
                self.output.add_dialogue(dialogue);
                Ok(())
            }
            None => {
                let name = type_name::<T>();
                log::warn!("skipping unsupported value of type {name}");
                Err(FxError::UnsupportedUnit(name.to_string()))
            }
        }
    }

    #[must_use]
    pub const fn output(&self) -> &OutputScript {
        &self.output
    }

    /// Mutable output, for metadata edits before saving
    pub fn output_mut(&mut self) -> &mut OutputScript {
        &mut self.output
    }

    /// Write the output script
    ///
    /// # Errors
    ///
    /// Returns [`FxError::Io`] if the file cannot be written.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.output.save(path)
    }
}

#[cfg(feature = "parallel")]
impl<M> FxScript<M>
where
    M: FontMetrics + Sync,
    M::Face: Sync,
{
    /// [`Self::lines`] built on the rayon pool; order matches the input
    ///
    /// # Errors
    ///
    /// Same as [`Self::lines`].
    pub fn lines_par(&self) -> Result<Vec<Line>> {
        use rayon::prelude::*;

        let sources: Vec<&SourceDialogue> = self
            .dialogues
            .iter()
            .filter(|dialogue| !dialogue.comment)
            .collect();
        let lines = sources
            .par_iter()
            .enumerate()
            .map(|(index, dialogue)| self.build_line(index, dialogue))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("built {} lines in parallel", lines.len());
        Ok(lines)
    }
}

fn resolve_style_name(styles: &AHashMap<String, Arc<Style>>, name: &str) -> Result<String> {
    if styles.contains_key(name) {
        return Ok(name.to_string());
    }
    if styles.contains_key(FALLBACK_STYLE) {
        log::warn!("style {name:?} is not defined, using {FALLBACK_STYLE:?}");
        return Ok(FALLBACK_STYLE.to_string());
    }
    Err(FxError::MissingStyle(name.to_string()))
}

fn copy_metadata(document: &Document<'_>, output: &mut OutputScript) {
    let info = document.info();
    let meta = &mut output.metadata;
    let text = |key: &str| info.get_field(key).unwrap_or_default().to_string();

    if let Some(title) = info.title() {
        meta.title = title.to_string();
    }
    meta.original_script = text("Original Script");
    meta.translation = text("Original Translation");
    meta.timing = text("Original Timing");
    meta.video_path = text("Video File");
    meta.audio = text("Audio File");
    if let Some(zoom) = info.get_field("Video Zoom Percent").and_then(|v| v.parse().ok()) {
        meta.video_zoom = zoom;
    }
    if let Some(position) = info.get_field("Video Position").and_then(|v| v.parse().ok()) {
        meta.video_position = position;
    }
    if let Some(ratio) = info.get_field("Video AR Value").and_then(|v| v.parse().ok()) {
        meta.video_aspect_ratio = ratio;
    }
}
