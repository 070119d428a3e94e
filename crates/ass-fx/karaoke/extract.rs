//! Karaoke tag extraction
//!
//! Splits dialogue text at karaoke tags (`\k`, `\kf`, `\K`, `\ko`). Each tag
//! opens a syllable that runs until the next tag. Text before the first tag
//! is dropped and override blocks are stripped from syllable text. `\kt` is
//! not a syllable boundary.
//!
//! # Inline tags
//!
//! Anything following the duration digits of a karaoke tag, minus an optional
//! leading `-`, is kept as the syllable's inline tag (`{\k20-glow}ka` yields
//! inline `glow`). Effect scripts use it to pick per-syllable treatments.

use std::sync::LazyLock;

use regex::Regex;

use crate::utils::{cs_to_ms, FxError, Result};

static OVERRIDE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").expect("override block pattern is valid"));

static KARAOKE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(kf|ko|kt|k|K)([^\\]*)").expect("karaoke tag pattern is valid")
});

/// Highlight style requested by the karaoke tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KaraokeKind {
    /// `\k`: instant highlight
    Basic,
    /// `\kf` or `\K`: sweeping fill
    Fill,
    /// `\ko`: outline highlight
    Outline,
}

impl KaraokeKind {
    fn from_tag(name: &str) -> Option<Self> {
        match name {
            "k" => Some(Self::Basic),
            "kf" | "K" => Some(Self::Fill),
            "ko" => Some(Self::Outline),
            _ => None,
        }
    }

    /// Tag name without the backslash
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Basic => "k",
            Self::Fill => "kf",
            Self::Outline => "ko",
        }
    }
}

/// One karaoke tag and the text it covers
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KaraokeSyllable {
    /// Duration in centiseconds as written
    pub duration_cs: u32,
    /// Highlight kind
    pub kind: KaraokeKind,
    /// Inline tag following the duration
    pub inline: String,
    /// Covered text with override blocks removed, whitespace kept
    pub text: String,
}

impl KaraokeSyllable {
    /// Duration in milliseconds
    #[must_use]
    pub const fn duration_ms(&self) -> u32 {
        cs_to_ms(self.duration_cs)
    }

    /// Whitespace-only syllables are timing gaps and are never rendered
    #[must_use]
    pub fn is_gap(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split karaoke text into syllables
///
/// Text without karaoke tags yields an empty list.
///
/// # Example
///
/// ```rust
/// use ass_fx::karaoke::extract_syllables;
///
/// let syllables = extract_syllables("{\\k50}ka{\\kf30-up\\bord2}ra {\\k20}")?;
/// assert_eq!(syllables.len(), 3);
/// assert_eq!(syllables[1].text, "ra ");
/// assert_eq!(syllables[1].inline, "up");
/// assert!(syllables[2].is_gap());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns [`FxError::InvalidKaraokeDuration`] when a karaoke tag is not
/// followed by a centisecond count.
pub fn extract_syllables(text: &str) -> Result<Vec<KaraokeSyllable>> {
    let mut syllables = Vec::new();
    let mut current: Option<KaraokeSyllable> = None;
    let mut cursor = 0;

    for block in OVERRIDE_BLOCK.captures_iter(text) {
        let (Some(whole), Some(body)) = (block.get(0), block.get(1)) else {
            continue;
        };

        if let Some(syllable) = current.as_mut() {
            syllable.text.push_str(&text[cursor..whole.start()]);
        }
        cursor = whole.end();

        for tag in KARAOKE_TAG.captures_iter(body.as_str()) {
            let name = &tag[1];
            let Some(kind) = KaraokeKind::from_tag(name) else {
                continue;
            };
            let (duration_cs, inline) = parse_argument(name, &tag[2])?;

            let next = KaraokeSyllable {
                duration_cs,
                kind,
                inline,
                text: String::new(),
            };
            if let Some(done) = current.replace(next) {
                syllables.push(done);
            }
        }
    }

    if let Some(mut syllable) = current {
        syllable.text.push_str(&text[cursor..]);
        syllables.push(syllable);
    }

    Ok(syllables)
}

fn parse_argument(tag: &str, argument: &str) -> Result<(u32, String)> {
    let argument = argument.trim();
    let digits = argument
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(argument.len());

    let invalid = || FxError::InvalidKaraokeDuration {
        tag: tag.to_string(),
        value: argument.to_string(),
    };

    if digits == 0 {
        return Err(invalid());
    }
    let duration_cs = argument[..digits].parse().map_err(|_| invalid())?;
    let inline = argument[digits..].trim_start_matches('-').trim().to_string();

    Ok((duration_cs, inline))
}

/// Remove every `{...}` override block and trim the result
///
/// ```rust
/// # use ass_fx::karaoke::strip_override_tags;
/// assert_eq!(strip_override_tags(" {\\k50}ka{\\k50}ra "), "kara");
/// ```
#[must_use]
pub fn strip_override_tags(text: &str) -> String {
    OVERRIDE_BLOCK.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(syllables: &[KaraokeSyllable]) -> Vec<&str> {
        syllables.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn splits_basic_karaoke() {
        let syllables = extract_syllables("{\\k50}ka{\\k30}ra{\\k20}o{\\k40}ke").unwrap();
        assert_eq!(texts(&syllables), vec!["ka", "ra", "o", "ke"]);
        let durations: Vec<u32> = syllables.iter().map(|s| s.duration_cs).collect();
        assert_eq!(durations, vec![50, 30, 20, 40]);
        assert_eq!(syllables[0].duration_ms(), 500);
    }

    #[test]
    fn tag_kinds() {
        let syllables = extract_syllables("{\\k1}a{\\kf2}b{\\K3}c{\\ko4}d").unwrap();
        let kinds: Vec<KaraokeKind> = syllables.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                KaraokeKind::Basic,
                KaraokeKind::Fill,
                KaraokeKind::Fill,
                KaraokeKind::Outline
            ]
        );
    }

    #[test]
    fn strips_other_overrides_and_drops_prefix() {
        let syllables =
            extract_syllables("intro {\\k25\\bord3}ka{\\i1}i{\\k25}{\\c&H0000FF&}ra").unwrap();
        assert_eq!(texts(&syllables), vec!["kai", "ra"]);
    }

    #[test]
    fn keeps_whitespace_and_gaps() {
        let syllables = extract_syllables("{\\k10} {\\k20}ka {\\k30}ra").unwrap();
        assert_eq!(texts(&syllables), vec![" ", "ka ", "ra"]);
        assert!(syllables[0].is_gap());
        assert!(!syllables[1].is_gap());
    }

    #[test]
    fn inline_tags() {
        let syllables = extract_syllables("{\\k20-glow}ka{\\kf15shake}ra{\\k5}").unwrap();
        assert_eq!(syllables[0].inline, "glow");
        assert_eq!(syllables[1].inline, "shake");
        assert_eq!(syllables[2].inline, "");
    }

    #[test]
    fn kt_is_not_a_boundary() {
        let syllables = extract_syllables("{\\k10}a{\\kt50}b").unwrap();
        assert_eq!(texts(&syllables), vec!["ab"]);
    }

    #[test]
    fn consecutive_tags_in_one_block() {
        let syllables = extract_syllables("{\\k10\\k20}a").unwrap();
        assert_eq!(texts(&syllables), vec!["", "a"]);
    }

    #[test]
    fn no_karaoke_is_empty() {
        assert!(extract_syllables("plain {\\b1}text").unwrap().is_empty());
        assert!(extract_syllables("").unwrap().is_empty());
    }

    #[test]
    fn rejects_missing_duration() {
        let err = extract_syllables("{\\kabc}ka").unwrap_err();
        assert_eq!(
            err,
            FxError::InvalidKaraokeDuration {
                tag: "k".to_string(),
                value: "abc".to_string()
            }
        );
        assert!(extract_syllables("{\\kf}ka").is_err());
    }

    #[test]
    fn strips_blocks() {
        assert_eq!(strip_override_tags("{\\k10}a {\\k10}b"), "a b");
        assert_eq!(strip_override_tags("{\\an8}"), "");
    }
}
