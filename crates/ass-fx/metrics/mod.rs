//! Text measurement collaborators
//!
//! The decomposition engine never touches fonts directly. It loads one face
//! per style through [`FontMetrics::load_font`] and asks for the unscaled
//! size of each piece of text; style scale factors are applied by the caller.
//!
//! Two implementations ship with the crate:
//!
//! - [`SystemFonts`]: `fontdb` lookup and `rustybuzz` shaping
//! - [`MonospaceMetrics`]: fixed advance per character, for tests and dry runs

mod system;

pub use system::{SystemFace, SystemFonts};

pub use crate::karaoke::Size;
use crate::style::Style;
use crate::utils::Result;

/// Font loading and text measurement
pub trait FontMetrics {
    /// Loaded face, reused for every measurement in one style
    type Face;

    /// Load the face for `style` at `size` points
    ///
    /// # Errors
    ///
    /// Returns [`FxError::FontLoad`](crate::FxError::FontLoad) when no usable
    /// face can be found.
    fn load_font(&self, style: &Style, size: f64) -> Result<Self::Face>;

    /// Width and height of `text` rendered with `face`
    ///
    /// Height follows the line-height convention and equals the face size.
    fn measure(&self, face: &Self::Face, text: &str) -> Size;

    /// Sizes of several texts rendered with `face`, in order
    ///
    /// Providers with per-call setup cost override this to pay it once.
    fn measure_all(&self, face: &Self::Face, texts: &[&str]) -> Vec<Size> {
        texts.iter().map(|text| self.measure(face, text)).collect()
    }
}

/// Deterministic metrics with a fixed advance per character
///
/// ```rust
/// use ass_fx::{metrics::{FontMetrics, MonospaceMetrics}, Style};
///
/// let metrics = MonospaceMetrics::new(10.0);
/// let face = metrics.load_font(&Style::new("Default"), 40.0)?;
/// let size = metrics.measure(&face, "kara");
/// assert_eq!((size.width, size.height), (40.0, 40.0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    advance: f64,
}

/// Face handed out by [`MonospaceMetrics`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceFace {
    size: f64,
}

impl MonospaceMetrics {
    #[must_use]
    pub const fn new(advance: f64) -> Self {
        Self { advance }
    }

    #[must_use]
    pub const fn advance(&self) -> f64 {
        self.advance
    }
}

impl FontMetrics for MonospaceMetrics {
    type Face = MonospaceFace;

    fn load_font(&self, _style: &Style, size: f64) -> Result<MonospaceFace> {
        Ok(MonospaceFace { size })
    }

    fn measure(&self, face: &MonospaceFace, text: &str) -> Size {
        Size::new(text.chars().count() as f64 * self.advance, face.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_counts_characters() {
        let metrics = MonospaceMetrics::new(12.0);
        let face = metrics.load_font(&Style::new("Default"), 30.0).unwrap();

        assert_eq!(metrics.measure(&face, "かラ"), Size::new(24.0, 30.0));
        assert_eq!(metrics.measure(&face, ""), Size::new(0.0, 30.0));
        assert_eq!(metrics.measure(&face, " "), Size::new(12.0, 30.0));
    }

    #[test]
    fn batch_measurement_keeps_order() {
        let metrics = MonospaceMetrics::new(10.0);
        let face = metrics.load_font(&Style::new("Default"), 20.0).unwrap();

        let sizes = metrics.measure_all(&face, &["abc", "", "a"]);
        assert_eq!(
            sizes,
            vec![Size::new(30.0, 20.0), Size::new(0.0, 20.0), Size::new(10.0, 20.0)]
        );
    }
}
