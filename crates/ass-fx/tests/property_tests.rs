//! Property-based tests for karaoke decomposition
//!
//! Uses proptest to check timing and layout invariants over generated
//! karaoke lines: syllables tile the line, characters tile their syllable,
//! and placement follows the style alignment.

use ass_fx::{
    karaoke::{
        extract_syllables,
        timing::{resolve_syllable_times, split_character_times},
    },
    metrics::MonospaceMetrics,
    Document, FxConfig, FxScript, Interval,
};
use proptest::prelude::*;

const EPSILON: f64 = 1e-6;

/// A karaoke syllable: duration in centiseconds and text, gaps included
fn arb_syllable() -> impl Strategy<Value = (u32, String)> {
    (
        0_u32..150,
        prop_oneof![
            4 => "[a-z]{1,4}",
            1 => Just(" ".to_string()),
            1 => "[a-z]{1,3} ",
        ],
    )
}

/// Karaoke text and the summed tag duration in milliseconds
fn arb_karaoke() -> impl Strategy<Value = (String, u32)> {
    prop::collection::vec(arb_syllable(), 1..12).prop_map(|syllables| {
        let total = syllables.iter().map(|(cs, _)| cs * 10).sum();
        let text = syllables
            .iter()
            .map(|(cs, text)| format!("{{\\k{cs}}}{text}"))
            .collect();
        (text, total)
    })
}

/// Horizontal-only karaoke: no whitespace anywhere
fn arb_solid_karaoke() -> impl Strategy<Value = String> {
    prop::collection::vec((1_u32..100, "[a-z]{1,4}"), 1..10).prop_map(|syllables| {
        syllables
            .iter()
            .map(|(cs, text)| format!("{{\\k{cs}}}{text}"))
            .collect()
    })
}

fn script(alignment: u8, spacing: u32, text: &str) -> String {
    format!(
        "[Script Info]\nPlayResX: 1280\nPlayResY: 720\n\n[V4+ Styles]\n\
         Style: Default,Arial,40,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,{spacing},0,1,2,0,{alignment},10,10,20,1\n\n\
         [Events]\nDialogue: 0,0:00:01.00,0:00:09.00,Default,,0,0,0,,{text}"
    )
}

fn decompose(source: &str) -> (ass_fx::Line, Vec<ass_fx::Syllable>) {
    let document = Document::parse(source).unwrap();
    let config = FxConfig {
        keep_original: false,
        ..FxConfig::default()
    };
    let fx = FxScript::new(&document, MonospaceMetrics::new(20.0), config).unwrap();
    let line = fx.lines().unwrap().remove(0);
    let syllables = fx.syllables(&line).unwrap();
    (line, syllables)
}

proptest! {
    /// Rendered syllables tile the line without gaps or overlaps
    #[test]
    fn syllable_times_tile_the_line(
        (text, total) in arb_karaoke(),
        start in 0_u32..100_000,
        slack in -500_i32..500,
    ) {
        let end = total.saturating_add_signed(slack).saturating_add(start).max(start);
        let line = Interval::new(start, end);
        let syllables = extract_syllables(&text)?;
        let times = resolve_syllable_times(line, &syllables);

        let rendered = syllables.iter().filter(|s| !s.is_gap()).count();
        prop_assert_eq!(times.len(), rendered);

        for time in &times {
            prop_assert!(time.start <= time.end);
            prop_assert!(time.start >= line.start);
            prop_assert!(time.end <= line.end);
        }
        for pair in times.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        if let Some(last) = times.last() {
            prop_assert_eq!(last.end, line.end);
        }
    }

    /// Characters tile their syllable and keep its total duration
    #[test]
    fn character_times_tile_the_syllable(
        start in 0_u32..100_000,
        duration in 0_u32..10_000,
        count in 1_usize..40,
    ) {
        let syllable = Interval::new(start, start + duration);
        let times = split_character_times(syllable, count);

        prop_assert_eq!(times.len(), count);
        prop_assert_eq!(times[0].start, syllable.start);
        prop_assert_eq!(times[count - 1].end, syllable.end);
        for pair in times.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        let sum: u32 = times.iter().map(|t| t.duration()).sum();
        prop_assert_eq!(sum, duration);
    }

    /// Horizontal alignments lay syllables end to end across the line box
    #[test]
    fn horizontal_syllables_span_the_line(
        text in arb_solid_karaoke(),
        alignment in prop::sample::select(vec![1_u8, 2, 3, 7, 8, 9]),
    ) {
        let (line, syllables) = decompose(&script(alignment, 0, &text));
        let first = &syllables[0].unit.geometry;
        let last = &syllables[syllables.len() - 1].unit.geometry;

        prop_assert!((first.left - line.unit.geometry.left).abs() < EPSILON);
        prop_assert!((last.right - line.unit.geometry.right).abs() < EPSILON);
        for pair in syllables.windows(2) {
            let gap = pair[1].unit.geometry.left - pair[0].unit.geometry.right;
            prop_assert!(gap.abs() < EPSILON);
        }
        for syllable in &syllables {
            prop_assert!((syllable.unit.geometry.y - line.unit.geometry.y).abs() < EPSILON);
        }
    }

    /// Middle-row alignments centre each row against the height stacked so far
    #[test]
    fn vertical_syllables_are_centred(
        text in arb_solid_karaoke(),
        alignment in 4_u8..=6,
        spacing in 0_u32..10,
    ) {
        let (_, syllables) = decompose(&script(alignment, spacing, &text));

        let mut stacked = 0.0;
        for syllable in &syllables {
            let geometry = &syllable.unit.geometry;
            stacked += syllable.unit.height();
            let expected_top = 360.0 - stacked / 2.0 + f64::from(spacing);

            prop_assert!((geometry.top - expected_top).abs() < EPSILON);
            prop_assert!((geometry.bottom - geometry.top - syllable.unit.height()).abs() < EPSILON);
            prop_assert!((geometry.y - geometry.middle).abs() < EPSILON);
            if alignment == 5 {
                prop_assert!((geometry.center - 640.0).abs() < EPSILON);
            }
        }
    }
}
