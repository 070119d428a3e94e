//! Karaoke decomposition primitives
//!
//! Pure functions that turn a karaoke line into syllable and character
//! timing and placement. The orchestrator in [`crate::fx`] feeds them
//! measured sizes; nothing here touches fonts or shared state.
//!
//! - [`extract`]: split `{\k..}` tagged text into syllables
//! - [`timing`]: absolute start/end for syllables and characters
//! - [`geometry`]: alignment-aware placement in script coordinates

pub mod extract;
pub mod geometry;
pub mod timing;

pub use extract::{extract_syllables, strip_override_tags, KaraokeKind, KaraokeSyllable};
pub use geometry::{Geometry, Resolution, Size, UnitMetrics};
pub use timing::Interval;
