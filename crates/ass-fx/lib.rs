//! # ASS-FX
//!
//! Karaoke timing and layout decomposition for ASS (Advanced `SubStation` Alpha)
//! subtitle effects. Turns each karaoke dialogue of a timed script into
//! positioned, timed units at three granularities (line, syllable, character)
//! that effect programs clone, edit and re-emit into a new script.
//!
//! ## Features
//!
//! - **Three granularities**: lines eagerly, syllables and characters on demand
//! - **Alignment-aware layout**: horizontal flow for codes 1-3 and 7-9,
//!   vertical stacking for codes 4-6
//! - **Pluggable measurement**: system fonts through `fontdb` + `rustybuzz`, or
//!   any [`metrics::FontMetrics`] implementation
//! - **Thread-safe**: immutable shared styles behind `Arc`, optional `rayon`
//!   line building
//!
//! ## Quick Start
//!
//! ```rust
//! use ass_fx::{Document, FxConfig, FxScript, metrics::MonospaceMetrics};
//!
//! let source = r#"
//! [Script Info]
//! PlayResX: 1280
//! PlayResY: 720
//!
//! [V4+ Styles]
//! Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
//! Style: Default,Arial,40,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,0,8,10,10,20,1
//!
//! [Events]
//! Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
//! Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,{\k50}ka{\k50}ra
//! "#;
//!
//! let document = Document::parse(source)?;
//! let mut fx = FxScript::new(&document, MonospaceMetrics::new(20.0), FxConfig::default())?;
//!
//! for line in fx.lines()? {
//!     for mut syllable in fx.syllables(&line)? {
//!         syllable.unit.tags = syllable.unit.pos_tag();
//!         fx.add(&syllable);
//!     }
//! }
//! // The source karaoke is kept as commented events ahead of the effect
//! assert_eq!(fx.output().dialogues().len(), 5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]

pub mod color;
pub mod fx;
pub mod karaoke;
pub mod metrics;
pub mod parser;
pub mod style;
pub mod utils;
pub mod writer;

pub use color::Color;
pub use fx::{Character, DialogueUnit, Emit, FxConfig, FxScript, Line, Syllable};
pub use karaoke::{Geometry, Interval, KaraokeSyllable, Resolution, Size};
pub use parser::{Document, ParseError};
pub use style::{Alignment, Style};
pub use utils::{FxError, Result};
pub use writer::{OutputDialogue, OutputScript, OutputStyle};

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
