//! Positioned, timed units at line, syllable and character granularity
//!
//! All three share [`DialogueUnit`] through composition. Units are plain
//! values: effects clone them, edit the copy and hand it back to
//! [`FxScript::add`](super::FxScript::add).

use std::sync::Arc;

use crate::karaoke::{Geometry, Interval, KaraokeKind, KaraokeSyllable, Size};
use crate::style::Style;
use crate::utils::{ms_to_ass, shift_ms};
use crate::writer::OutputDialogue;

/// Fields common to every unit
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueUnit {
    pub layer: u32,
    /// Start in milliseconds
    pub start_time: u32,
    /// End in milliseconds, never before `start_time` on generated units
    pub end_time: u32,
    /// Shared resolved style
    pub style: Arc<Style>,
    pub actor: String,
    pub effect: String,
    /// Override tags emitted ahead of the text
    pub tags: String,
    pub text: String,
    pub comment: bool,
    /// Scaled size
    pub size: Size,
    pub geometry: Geometry,
}

impl DialogueUnit {
    #[must_use]
    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time)
    }

    /// `end_time - start_time`
    #[must_use]
    pub fn duration(&self) -> u32 {
        self.interval().duration()
    }

    /// `start_time + duration / 2`
    #[must_use]
    pub fn mid_time(&self) -> u32 {
        self.interval().mid()
    }

    #[must_use]
    pub fn style_name(&self) -> &str {
        &self.style.name
    }

    #[must_use]
    pub const fn width(&self) -> f64 {
        self.size.width
    }

    #[must_use]
    pub const fn height(&self) -> f64 {
        self.size.height
    }

    /// `\anN\pos(x,y)` pinning the unit at its anchor
    ///
    /// The alignment tag is omitted when the style alignment is not 1-9.
    #[must_use]
    pub fn pos_tag(&self) -> String {
        let pos = format!(
            "\\pos({},{})",
            format_coord(self.geometry.x),
            format_coord(self.geometry.y)
        );
        match self.style.alignment() {
            Some(alignment) => format!("\\an{alignment}{pos}"),
            None => pos,
        }
    }

    /// Output event with times shifted by `shift` milliseconds
    #[must_use]
    pub fn to_output(&self, shift: i32) -> OutputDialogue {
        OutputDialogue {
            layer: self.layer,
            start: ms_to_ass(shift_ms(self.start_time, shift)),
            end: ms_to_ass(shift_ms(self.end_time, shift)),
            style: self.style.name.clone(),
            actor: self.actor.clone(),
            effect: self.effect.clone(),
            tags: self.tags.clone(),
            text: self.text.clone(),
            comment: self.comment,
        }
    }
}

/// Trims to three decimals, dropping trailing zeros
fn format_coord(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

/// Unit that can be written to the output script
pub trait Emit {
    fn unit(&self) -> &DialogueUnit;

    fn unit_mut(&mut self) -> &mut DialogueUnit;
}

impl Emit for DialogueUnit {
    fn unit(&self) -> &DialogueUnit {
        self
    }

    fn unit_mut(&mut self) -> &mut DialogueUnit {
        self
    }
}

/// A whole dialogue event
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub unit: DialogueUnit,
    /// Original text, karaoke tags included
    pub kara: String,
    /// Karaoke tags in the line, whitespace gaps included
    pub syl_n: usize,
    /// Characters across all rendered syllables
    pub char_n: usize,
    /// Position among generated lines
    pub index: usize,
    pub(crate) syllables: Vec<KaraokeSyllable>,
}

impl Line {
    /// Karaoke syllables as extracted from the original text
    #[must_use]
    pub fn karaoke(&self) -> &[KaraokeSyllable] {
        &self.syllables
    }

    /// Whether the line carries any karaoke tag
    #[must_use]
    pub fn has_karaoke(&self) -> bool {
        !self.syllables.is_empty()
    }
}

impl Emit for Line {
    fn unit(&self) -> &DialogueUnit {
        &self.unit
    }

    fn unit_mut(&mut self) -> &mut DialogueUnit {
        &mut self.unit
    }
}

/// One rendered karaoke syllable
#[derive(Debug, Clone, PartialEq)]
pub struct Syllable {
    pub unit: DialogueUnit,
    /// Inline tag following the karaoke duration (`{\k20-glow}`)
    pub inline: String,
    pub kind: KaraokeKind,
    /// Position among the line's rendered syllables
    pub index: usize,
}

impl Emit for Syllable {
    fn unit(&self) -> &DialogueUnit {
        &self.unit
    }

    fn unit_mut(&mut self) -> &mut DialogueUnit {
        &mut self.unit
    }
}

/// One character of a rendered syllable
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub unit: DialogueUnit,
    /// Inline tag of the parent syllable
    pub inline: String,
    /// Timing of the parent syllable
    pub syllable_time: Interval,
    /// Position of the parent syllable
    pub syllable_index: usize,
    /// Position within the line's characters
    pub index: usize,
}

impl Character {
    #[must_use]
    pub const fn syl_start_time(&self) -> u32 {
        self.syllable_time.start
    }

    #[must_use]
    pub const fn syl_end_time(&self) -> u32 {
        self.syllable_time.end
    }

    #[must_use]
    pub const fn syl_duration(&self) -> u32 {
        self.syllable_time.duration()
    }

    #[must_use]
    pub const fn syl_mid_time(&self) -> u32 {
        self.syllable_time.mid()
    }
}

impl Emit for Character {
    fn unit(&self) -> &DialogueUnit {
        &self.unit
    }

    fn unit_mut(&mut self) -> &mut DialogueUnit {
        &mut self.unit
    }
}
