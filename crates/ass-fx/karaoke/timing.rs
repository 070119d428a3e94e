//! Absolute timing for syllables and characters
//!
//! All values are milliseconds. Intervals never invert: a cursor that runs
//! past the line end is clamped to it.

use super::extract::KaraokeSyllable;

/// Closed-open time interval in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    /// Interval from `start` to `end`, raising `end` to `start` if needed
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    #[must_use]
    pub const fn duration(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Midpoint, truncated to whole milliseconds
    #[must_use]
    pub const fn mid(self) -> u32 {
        self.start + self.duration() / 2
    }
}

/// Resolve intervals for the rendered syllables of a line
///
/// Syllables are laid end to end from the line start. Whitespace-only
/// syllables still consume their duration: a leading gap delays the first
/// rendered syllable, any later gap extends the preceding one. The last
/// rendered syllable always ends exactly at the line end.
///
/// Returns one interval per non-gap syllable, in order.
///
/// # Example
///
/// ```rust
/// use ass_fx::karaoke::{extract_syllables, timing::resolve_syllable_times, Interval};
///
/// let syllables = extract_syllables("{\\k50}ka{\\k50}ra")?;
/// let times = resolve_syllable_times(Interval::new(1000, 2000), &syllables);
/// assert_eq!(times, vec![Interval::new(1000, 1500), Interval::new(1500, 2000)]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn resolve_syllable_times(line: Interval, syllables: &[KaraokeSyllable]) -> Vec<Interval> {
    let mut cursor = line.start;
    let mut times: Vec<Interval> = Vec::with_capacity(syllables.len());

    for syllable in syllables {
        let start = cursor.min(line.end);
        cursor = cursor.saturating_add(syllable.duration_ms());
        let end = cursor.min(line.end);

        if syllable.is_gap() {
            if let Some(previous) = times.last_mut() {
                previous.end = end;
            }
            continue;
        }
        times.push(Interval { start, end });
    }

    if let Some(last) = times.last_mut() {
        last.end = line.end;
    }
    times
}

/// Split a syllable interval evenly across `count` characters
///
/// Each character gets `duration / count` (integer division); the last one
/// absorbs the remainder and ends exactly at the syllable end. A single
/// character takes the whole interval.
///
/// ```rust
/// use ass_fx::karaoke::{timing::split_character_times, Interval};
///
/// let times = split_character_times(Interval::new(0, 100), 3);
/// assert_eq!(times[0], Interval::new(0, 33));
/// assert_eq!(times[2], Interval::new(66, 100));
/// ```
#[must_use]
pub fn split_character_times(syllable: Interval, count: usize) -> Vec<Interval> {
    if count == 0 {
        return Vec::new();
    }

    let share = u32::try_from(count).map_or(0, |n| syllable.duration() / n);
    let mut cursor = syllable.start;

    (0..count)
        .map(|index| {
            let start = cursor;
            cursor = cursor.saturating_add(share);
            let end = if index + 1 == count {
                syllable.end
            } else {
                cursor
            };
            Interval { start, end }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::karaoke::extract_syllables;
    use pretty_assertions::assert_eq;

    fn resolve(start: u32, end: u32, text: &str) -> Vec<Interval> {
        let syllables = extract_syllables(text).unwrap();
        resolve_syllable_times(Interval::new(start, end), &syllables)
    }

    #[test]
    fn interval_derived_values() {
        let interval = Interval::new(1000, 1501);
        assert_eq!(interval.duration(), 501);
        assert_eq!(interval.mid(), 1250);
        assert_eq!(Interval::new(500, 100), Interval::new(500, 500));
    }

    #[test]
    fn contiguous_syllables() {
        let times = resolve(1000, 3000, "{\\k50}ka{\\k30}ra{\\k20}o{\\k40}ke");
        assert_eq!(
            times,
            vec![
                Interval::new(1000, 1500),
                Interval::new(1500, 1800),
                Interval::new(1800, 2000),
                Interval::new(2000, 3000),
            ]
        );
    }

    #[test]
    fn overflow_clamps_to_line_end() {
        let times = resolve(0, 1000, "{\\k80}ka{\\k80}ra{\\k80}to");
        assert_eq!(
            times,
            vec![
                Interval::new(0, 800),
                Interval::new(800, 1000),
                Interval::new(1000, 1000),
            ]
        );
    }

    #[test]
    fn leading_gap_delays_first_syllable() {
        let times = resolve(0, 1000, "{\\k20} {\\k30}ka{\\k50}ra");
        assert_eq!(times, vec![Interval::new(200, 500), Interval::new(500, 1000)]);
    }

    #[test]
    fn inner_gap_extends_previous_syllable() {
        let times = resolve(0, 1000, "{\\k20}ka{\\k30} {\\k50}ra");
        assert_eq!(times, vec![Interval::new(0, 500), Interval::new(500, 1000)]);
    }

    #[test]
    fn all_gaps_render_nothing() {
        assert!(resolve(0, 1000, "{\\k20} {\\k30}").is_empty());
        assert!(resolve(0, 1000, "no karaoke").is_empty());
    }

    #[test]
    fn character_split() {
        let times = split_character_times(Interval::new(1000, 1500), 2);
        assert_eq!(times, vec![Interval::new(1000, 1250), Interval::new(1250, 1500)]);

        let single = split_character_times(Interval::new(10, 20), 1);
        assert_eq!(single, vec![Interval::new(10, 20)]);

        assert!(split_character_times(Interval::new(0, 10), 0).is_empty());
    }

    #[test]
    fn character_split_of_empty_interval() {
        let times = split_character_times(Interval::new(700, 700), 3);
        assert!(times.iter().all(|t| *t == Interval::new(700, 700)));
    }
}
